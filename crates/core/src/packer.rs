//! Packs typed calls and responses into wire envelopes and back.

use std::sync::Arc;

use crate::Result;
use crate::envelope::{Envelope, EnvelopeCodec, Intent, ProtocolError};
use crate::marshal::Marshaller;
use crate::types::{RemoteCall, RemoteResponse};

/// Bridges the typed call/response model and the wire envelope.
///
/// Packing marshals the message and stamps the matching intent; unpacking
/// verifies the intent before handing the payload to the marshaller. Neither
/// the packer nor the codec ever inspects payload bytes.
pub struct MessagePacker {
	marshaller: Arc<dyn Marshaller>,
	codec: Arc<dyn EnvelopeCodec>,
}

impl MessagePacker {
	/// Creates a packer over the given marshaller and envelope codec.
	#[must_use]
	pub fn new(marshaller: Arc<dyn Marshaller>, codec: Arc<dyn EnvelopeCodec>) -> Self {
		Self { marshaller, codec }
	}

	/// Packs a call into transport bytes.
	pub fn pack_call(&self, call: &RemoteCall) -> Result<Vec<u8>> {
		let payload = self.marshaller.encode_call(call)?;
		Ok(self.codec.encode(&Envelope::call(payload)))
	}

	/// Packs a response into transport bytes.
	pub fn pack_response(&self, response: &RemoteResponse) -> Result<Vec<u8>> {
		let payload = self.marshaller.encode_response(response)?;
		Ok(self.codec.encode(&Envelope::response(payload)))
	}

	/// Decodes transport bytes into an envelope.
	pub fn unwrap_envelope(&self, bytes: &[u8]) -> Result<Envelope> {
		Ok(self.codec.decode(bytes)?)
	}

	/// Unpacks a call from a call envelope.
	pub fn unpack_call(&self, envelope: &Envelope) -> Result<RemoteCall> {
		Self::expect_intent(envelope, Intent::Call)?;
		Ok(self.marshaller.decode_call(&envelope.payload)?)
	}

	/// Unpacks a response from a response envelope.
	pub fn unpack_response(&self, envelope: &Envelope) -> Result<RemoteResponse> {
		Self::expect_intent(envelope, Intent::Response)?;
		Ok(self.marshaller.decode_response(&envelope.payload)?)
	}

	fn expect_intent(envelope: &Envelope, expected: Intent) -> Result<(), ProtocolError> {
		if envelope.intent != expected {
			return Err(ProtocolError::WrongIntent {
				expected,
				found: envelope.intent,
			});
		}
		if envelope.payload.is_empty() {
			return Err(ProtocolError::EmptyPayload);
		}
		Ok(())
	}
}
