//! Application-side command invocation contract.

use async_trait::async_trait;

/// Failure of a local command invocation.
#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
	/// No command is registered under the requested name.
	#[error("unknown command: {0}")]
	UnknownCommand(String),
	/// The command rejected its arguments.
	#[error("invalid arguments for command `{command}`: {message}")]
	InvalidArguments {
		/// The command that rejected the call.
		command: String,
		/// What was wrong with the arguments.
		message: String,
	},
	/// The command ran and failed.
	#[error("{0}")]
	Command(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl InvokeError {
	/// Wraps a command's own failure.
	pub fn command(source: impl std::error::Error + Send + Sync + 'static) -> Self {
		Self::Command(Box::new(source))
	}
}

/// Maps command names and opaque arguments onto application logic.
///
/// The single seam between the call engine and the application's commands.
/// Implementations decode the argument blobs themselves and encode the
/// result value the same way the peer's marshaller will read it.
#[async_trait]
pub trait CommandInvoker: Send + Sync {
	/// Invokes `command` with `args`, returning the encoded result value.
	async fn invoke(&self, command: &str, args: &[Vec<u8>]) -> Result<Vec<u8>, InvokeError>;
}
