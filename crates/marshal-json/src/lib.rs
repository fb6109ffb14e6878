//! JSON marshaller for courier remote services.
//!
//! Encodes calls, responses and command values as JSON. Both endpoints of a
//! link must use it (or an equivalent encoding) on their services.

#![warn(missing_docs)]

use courier_core::marshal::{MarshalError, Marshaller};
use courier_core::types::{RemoteCall, RemoteResponse};

/// [`Marshaller`] speaking JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

impl JsonMarshaller {
	/// Creates the marshaller.
	#[must_use]
	pub const fn new() -> Self {
		Self
	}
}

impl Marshaller for JsonMarshaller {
	fn encode_call(&self, call: &RemoteCall) -> Result<Vec<u8>, MarshalError> {
		serde_json::to_vec(call).map_err(MarshalError::encode)
	}

	fn decode_call(&self, payload: &[u8]) -> Result<RemoteCall, MarshalError> {
		serde_json::from_slice(payload).map_err(MarshalError::decode)
	}

	fn encode_response(&self, response: &RemoteResponse) -> Result<Vec<u8>, MarshalError> {
		serde_json::to_vec(response).map_err(MarshalError::encode)
	}

	fn decode_response(&self, payload: &[u8]) -> Result<RemoteResponse, MarshalError> {
		serde_json::from_slice(payload).map_err(MarshalError::decode)
	}
}

#[cfg(test)]
mod tests {
	use courier_core::types::{CallKind, CallRef, ResponseOutcome};

	use super::*;

	#[test]
	fn calls_survive_a_round_trip() {
		let marshaller = JsonMarshaller::new();
		let call = RemoteCall::request(
			CallRef::fresh(),
			"add",
			vec![b"1".to_vec(), b"2".to_vec()],
		);
		let payload = marshaller.encode_call(&call).unwrap();
		let decoded = marshaller.decode_call(&payload).unwrap();
		assert_eq!(decoded, call);
		assert_eq!(decoded.kind, CallKind::AwaitCallback);
	}

	#[test]
	fn responses_survive_a_round_trip() {
		let marshaller = JsonMarshaller::new();
		let response = RemoteResponse::error(CallRef::fresh(), "nope");
		let payload = marshaller.encode_response(&response).unwrap();
		let decoded = marshaller.decode_response(&payload).unwrap();
		assert_eq!(decoded.outcome, ResponseOutcome::Error("nope".into()));
		assert_eq!(decoded.reference, response.reference);
	}

	#[test]
	fn garbage_payloads_fail_to_decode() {
		let marshaller = JsonMarshaller::new();
		assert!(matches!(
			marshaller.decode_call(b"{not json").unwrap_err(),
			MarshalError::Decode(_)
		));
	}
}
