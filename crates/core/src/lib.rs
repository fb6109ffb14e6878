//! Transport-agnostic remote call core.
//!
//! Two endpoints invoke named commands on each other over any byte-oriented
//! channel, either fire-and-forget or as an awaited request. This crate is
//! the call engine only:
//! * [`CallDispatcher`]: issues outgoing calls and correlates responses
//! * [`CallHandler`]: invokes application commands for inbound calls
//! * [`MessagePacker`]: turns typed calls/responses into wire envelopes
//! * [`RemoteService`]: the composition root routing traffic between them
//!
//! Moving bytes ([`Transport`]), encoding call payloads ([`Marshaller`]) and
//! mapping command names to application logic ([`CommandInvoker`]) are
//! collaborator contracts supplied by the application.

#![warn(missing_docs)]

pub mod awaiter;
pub mod dispatch;
pub mod envelope;
pub mod handler;
pub mod invoke;
pub mod marshal;
pub mod packer;
pub mod service;
pub mod transport;
pub mod types;

pub use awaiter::{ResponseAwaiter, ResponseSignal};
pub use dispatch::{CallDispatcher, DispatcherOptions};
pub use envelope::{BinaryEnvelopeCodec, Envelope, EnvelopeCodec, Intent, ProtocolError};
pub use handler::{CallHandler, HandlerOptions};
pub use invoke::{CommandInvoker, InvokeError};
pub use marshal::{MarshalError, Marshaller};
pub use packer::MessagePacker;
pub use service::{RemoteService, ServiceMediator, ServiceOptions};
pub use transport::Transport;
pub use types::{CallKind, CallRef, RemoteCall, RemoteResponse, ResponseOutcome, ResponseStatus};

/// A convenient type alias for `Result` with `E` = [`enum@Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The peer sent a malformed envelope, or an envelope was unpacked with
	/// the wrong intent or an empty payload.
	#[error("protocol error: {0}")]
	Protocol(#[from] ProtocolError),
	/// The marshaller failed to encode or decode a call or response.
	#[error("marshalling failed: {0}")]
	Marshal(#[from] MarshalError),
	/// No response arrived within the configured request timeout.
	#[error("request for command `{}` timed out", call.command)]
	RequestTimeout {
		/// The call that went unanswered.
		call: RemoteCall,
	},
	/// The remote endpoint reported a failed command invocation.
	#[error("{message}")]
	RequestInvoke {
		/// The error message reported by the remote endpoint.
		message: String,
		/// The call whose invocation failed remotely.
		call: RemoteCall,
	},
	/// A send was attempted while no transport is attached.
	#[error("no transport attached")]
	NoTransport,
	/// A dispatch operation was invoked on a service without a dispatcher.
	#[error("service is not configured for call dispatching")]
	NoDispatcher,
	/// A service was configured with neither a dispatcher nor a handler.
	#[error("service must be configured with a dispatcher, a handler, or both")]
	Unconfigured,
	/// The owning service was dropped while a component was still in use.
	#[error("service stopped")]
	ServiceStopped,
	/// A blocking request was made but no tokio runtime was captured when
	/// the dispatcher was built, or the surrounding runtime cannot host a
	/// blocking wait.
	#[error("no tokio runtime available for a blocking request")]
	RuntimeUnavailable,
	/// The transport failed to send.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}
