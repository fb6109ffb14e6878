//! Wire envelope framing.
//!
//! The envelope is the minimal unit exchanged between endpoints: an intent
//! marker distinguishing call from response traffic, plus an opaque payload
//! produced by the marshaller. The default binary form is a single intent
//! byte followed by the payload; an empty payload serializes to just the
//! intent byte.

/// Violations of the envelope framing or unpack contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
	/// A zero-length buffer was given to the envelope decoder.
	#[error("empty message buffer")]
	EmptyBuffer,
	/// The intent byte does not name a known intent.
	#[error("unknown intent byte: {0}")]
	UnknownIntent(u8),
	/// An envelope was unpacked with the wrong intent.
	#[error("expected {expected} envelope, found {found}")]
	WrongIntent {
		/// Intent the unpack operation requires.
		expected: Intent,
		/// Intent actually carried by the envelope.
		found: Intent,
	},
	/// An envelope holding a call or response has no payload to decode.
	#[error("envelope payload is empty")]
	EmptyPayload,
}

/// Intent of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Intent {
	/// The envelope carries a remote call.
	Call = 0,
	/// The envelope carries a response to a remote call.
	Response = 1,
}

impl Intent {
	/// Wire byte of this intent.
	#[must_use]
	pub const fn to_byte(self) -> u8 {
		self as u8
	}

	/// Decodes an intent from its wire byte.
	pub const fn from_byte(byte: u8) -> Result<Self, ProtocolError> {
		match byte {
			0 => Ok(Self::Call),
			1 => Ok(Self::Response),
			other => Err(ProtocolError::UnknownIntent(other)),
		}
	}
}

impl std::fmt::Display for Intent {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Call => f.write_str("call"),
			Self::Response => f.write_str("response"),
		}
	}
}

/// A framed unit exchanged between endpoints.
///
/// Constructed per send/receive and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
	/// Whether the payload is a call or a response.
	pub intent: Intent,
	/// Marshalled content bytes.
	pub payload: Vec<u8>,
}

impl Envelope {
	/// Wraps `payload` as a call envelope.
	#[must_use]
	pub fn call(payload: Vec<u8>) -> Self {
		Self {
			intent: Intent::Call,
			payload,
		}
	}

	/// Wraps `payload` as a response envelope.
	#[must_use]
	pub fn response(payload: Vec<u8>) -> Self {
		Self {
			intent: Intent::Response,
			payload,
		}
	}
}

/// Serializes envelopes to and from raw transport bytes.
///
/// The default implementation is [`BinaryEnvelopeCodec`]; applications with
/// an existing framing convention can substitute their own.
pub trait EnvelopeCodec: Send + Sync {
	/// Encodes an envelope into transport bytes.
	fn encode(&self, envelope: &Envelope) -> Vec<u8>;

	/// Decodes transport bytes into an envelope.
	///
	/// # Errors
	///
	/// [`ProtocolError::EmptyBuffer`] if `bytes` is empty, or
	/// [`ProtocolError::UnknownIntent`] if the intent byte is not valid.
	fn decode(&self, bytes: &[u8]) -> Result<Envelope, ProtocolError>;
}

/// Default `[intent byte][payload]` envelope codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryEnvelopeCodec;

impl BinaryEnvelopeCodec {
	/// Creates the default codec.
	#[must_use]
	pub const fn new() -> Self {
		Self
	}
}

impl EnvelopeCodec for BinaryEnvelopeCodec {
	fn encode(&self, envelope: &Envelope) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(1 + envelope.payload.len());
		bytes.push(envelope.intent.to_byte());
		bytes.extend_from_slice(&envelope.payload);
		bytes
	}

	fn decode(&self, bytes: &[u8]) -> Result<Envelope, ProtocolError> {
		let (&intent_byte, payload) = bytes.split_first().ok_or(ProtocolError::EmptyBuffer)?;
		Ok(Envelope {
			intent: Intent::from_byte(intent_byte)?,
			payload: payload.to_vec(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_both_intents() {
		let codec = BinaryEnvelopeCodec::new();
		for envelope in [
			Envelope::call(vec![1, 2, 3]),
			Envelope::response(vec![0xff, 0x00, 0x7f]),
		] {
			let bytes = codec.encode(&envelope);
			assert_eq!(codec.decode(&bytes).unwrap(), envelope);
		}
	}

	#[test]
	fn empty_payload_serializes_to_the_intent_byte_alone() {
		let codec = BinaryEnvelopeCodec::new();
		let envelope = Envelope::response(vec![]);
		let bytes = codec.encode(&envelope);
		assert_eq!(bytes, vec![1]);
		assert_eq!(codec.decode(&bytes).unwrap(), envelope);
	}

	#[test]
	fn intent_bytes_are_wire_stable() {
		assert_eq!(Intent::Call.to_byte(), 0);
		assert_eq!(Intent::Response.to_byte(), 1);
	}

	#[test]
	fn decoding_an_empty_buffer_fails() {
		let codec = BinaryEnvelopeCodec::new();
		assert_eq!(codec.decode(&[]), Err(ProtocolError::EmptyBuffer));
	}

	#[test]
	fn decoding_an_unknown_intent_byte_fails() {
		let codec = BinaryEnvelopeCodec::new();
		assert_eq!(
			codec.decode(&[9, 1, 2]),
			Err(ProtocolError::UnknownIntent(9))
		);
	}
}
