//! Wire-facing data model for remote calls and responses.
//!
//! Command parameters and result values are opaque byte blobs: the core
//! never interprets them, only the application's marshaller does.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation reference linking an awaited request to its response.
///
/// Fire-and-forget calls carry [`CallRef::NIL`], which is never used for
/// correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallRef(pub Uuid);

impl CallRef {
	/// The nil reference used by fire-and-forget calls.
	pub const NIL: Self = Self(Uuid::nil());

	/// Generates a fresh unique reference.
	#[must_use]
	pub fn fresh() -> Self {
		Self(Uuid::new_v4())
	}

	/// Returns true if this is the nil reference.
	#[must_use]
	pub fn is_nil(&self) -> bool {
		self.0.is_nil()
	}
}

impl std::fmt::Display for CallRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// How a remote call expects to be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallKind {
	/// One-way call; no response is ever produced or awaited.
	FireAndForget,
	/// Request; the remote endpoint sends back a correlated response.
	AwaitCallback,
}

/// A call to a command on the remote endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCall {
	/// Completion expectation of the call.
	pub kind: CallKind,
	/// Correlation reference; nil for fire-and-forget calls.
	pub reference: CallRef,
	/// Name of the command to invoke.
	pub command: String,
	/// Ordered opaque parameter values.
	pub args: Vec<Vec<u8>>,
}

impl RemoteCall {
	/// Creates a fire-and-forget call with the nil reference.
	#[must_use]
	pub fn one_way(command: impl Into<String>, args: Vec<Vec<u8>>) -> Self {
		Self {
			kind: CallKind::FireAndForget,
			reference: CallRef::NIL,
			command: command.into(),
			args,
		}
	}

	/// Creates a request that expects a response under `reference`.
	#[must_use]
	pub fn request(reference: CallRef, command: impl Into<String>, args: Vec<Vec<u8>>) -> Self {
		Self {
			kind: CallKind::AwaitCallback,
			reference,
			command: command.into(),
			args,
		}
	}
}

/// Status of a received response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
	/// The remote invocation produced a value.
	Success,
	/// The remote invocation failed.
	Error,
}

/// The result carried by a response: a value or an error message, never
/// both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseOutcome {
	/// Opaque result value of a successful invocation.
	Success(Vec<u8>),
	/// Error message of a failed invocation.
	Error(String),
}

/// A response to an awaited remote call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteResponse {
	/// Echo of the originating call's reference.
	pub reference: CallRef,
	/// Value or failure produced by the invocation.
	pub outcome: ResponseOutcome,
}

impl RemoteResponse {
	/// Creates a success response carrying `value`.
	#[must_use]
	pub fn success(reference: CallRef, value: Vec<u8>) -> Self {
		Self {
			reference,
			outcome: ResponseOutcome::Success(value),
		}
	}

	/// Creates an error response carrying `message`.
	#[must_use]
	pub fn error(reference: CallRef, message: impl Into<String>) -> Self {
		Self {
			reference,
			outcome: ResponseOutcome::Error(message.into()),
		}
	}

	/// Returns the status implied by the outcome.
	#[must_use]
	pub fn status(&self) -> ResponseStatus {
		match self.outcome {
			ResponseOutcome::Success(_) => ResponseStatus::Success,
			ResponseOutcome::Error(_) => ResponseStatus::Error,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn one_way_calls_carry_the_nil_reference() {
		let call = RemoteCall::one_way("ping", vec![]);
		assert_eq!(call.kind, CallKind::FireAndForget);
		assert!(call.reference.is_nil());
	}

	#[test]
	fn fresh_references_are_unique_and_not_nil() {
		let a = CallRef::fresh();
		let b = CallRef::fresh();
		assert!(!a.is_nil());
		assert_ne!(a, b);
	}

	#[test]
	fn response_status_follows_outcome() {
		let reference = CallRef::fresh();
		assert_eq!(
			RemoteResponse::success(reference, vec![1]).status(),
			ResponseStatus::Success
		);
		assert_eq!(
			RemoteResponse::error(reference, "boom").status(),
			ResponseStatus::Error
		);
	}
}
