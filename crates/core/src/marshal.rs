//! Marshalling contract between the core and the application's encoding.

use crate::types::{RemoteCall, RemoteResponse};

/// Failure to encode or decode a call or response.
#[derive(Debug, thiserror::Error)]
pub enum MarshalError {
	/// A call or response could not be encoded.
	#[error("encoding failed: {0}")]
	Encode(#[source] Box<dyn std::error::Error + Send + Sync>),
	/// A payload could not be decoded into a call or response.
	#[error("decoding failed: {0}")]
	Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MarshalError {
	/// Wraps an underlying encoder error.
	pub fn encode(source: impl std::error::Error + Send + Sync + 'static) -> Self {
		Self::Encode(Box::new(source))
	}

	/// Wraps an underlying decoder error.
	pub fn decode(source: impl std::error::Error + Send + Sync + 'static) -> Self {
		Self::Decode(Box::new(source))
	}
}

/// Encodes calls and responses to and from envelope payload bytes.
///
/// Implementations choose the encoding; the core only moves the resulting
/// bytes. Both directions must agree on the same marshaller.
pub trait Marshaller: Send + Sync {
	/// Encodes a call into payload bytes.
	fn encode_call(&self, call: &RemoteCall) -> Result<Vec<u8>, MarshalError>;

	/// Decodes payload bytes into a call.
	fn decode_call(&self, payload: &[u8]) -> Result<RemoteCall, MarshalError>;

	/// Encodes a response into payload bytes.
	fn encode_response(&self, response: &RemoteResponse) -> Result<Vec<u8>, MarshalError>;

	/// Decodes payload bytes into a response.
	fn decode_response(&self, payload: &[u8]) -> Result<RemoteResponse, MarshalError>;
}
