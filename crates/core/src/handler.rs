//! Inbound call handling and command invocation.

use std::sync::{Arc, Weak};

use crate::invoke::CommandInvoker;
use crate::service::ServiceMediator;
use crate::types::{CallKind, RemoteCall, RemoteResponse};

/// Configuration for a [`CallHandler`].
#[derive(Debug, Clone)]
pub struct HandlerOptions {
	/// Whether inbound calls run on spawned tasks instead of inline on the
	/// delivery path. Defaults to true.
	pub handle_asynchronously: bool,
}

impl Default for HandlerOptions {
	fn default() -> Self {
		Self {
			handle_asynchronously: true,
		}
	}
}

/// Runs inbound calls against the application's [`CommandInvoker`] and sends
/// back responses for awaited ones.
///
/// Invocation failures never escape: a fire-and-forget call swallows them, an
/// awaited call turns them into an error response for the caller.
pub struct CallHandler {
	mediator: Weak<dyn ServiceMediator>,
	invoker: Arc<dyn CommandInvoker>,
	handle_asynchronously: bool,
}

impl CallHandler {
	/// Creates a handler invoking commands through `invoker` and replying
	/// through `mediator`.
	#[must_use]
	pub fn new(
		mediator: Weak<dyn ServiceMediator>,
		invoker: Arc<dyn CommandInvoker>,
		options: HandlerOptions,
	) -> Self {
		Self {
			mediator,
			invoker,
			handle_asynchronously: options.handle_asynchronously,
		}
	}

	/// Handles one inbound call.
	///
	/// In asynchronous mode the call is spawned onto the runtime and this
	/// returns immediately; in synchronous mode it completes, including the
	/// response send, before returning.
	pub async fn handle_received_call(self: &Arc<Self>, call: RemoteCall) {
		if self.handle_asynchronously {
			let handler = Arc::clone(self);
			tokio::spawn(async move {
				handler.process(call).await;
			});
		} else {
			self.process(call).await;
		}
	}

	async fn process(&self, call: RemoteCall) {
		tracing::debug!(
			reference = %call.reference,
			command = %call.command,
			kind = ?call.kind,
			"handling inbound call"
		);
		let outcome = self.invoker.invoke(&call.command, &call.args).await;
		match call.kind {
			CallKind::FireAndForget => {
				if let Err(err) = outcome {
					tracing::warn!(
						command = %call.command,
						error = %err,
						"fire-and-forget invocation failed"
					);
				}
			}
			CallKind::AwaitCallback => {
				let response = match outcome {
					Ok(value) => RemoteResponse::success(call.reference, value),
					Err(err) => RemoteResponse::error(call.reference, err.to_string()),
				};
				self.send_response(&call, response).await;
			}
		}
	}

	async fn send_response(&self, call: &RemoteCall, response: RemoteResponse) {
		let Some(mediator) = self.mediator.upgrade() else {
			tracing::warn!(
				reference = %call.reference,
				"service stopped before the response could be sent"
			);
			return;
		};
		if let Err(err) = mediator.pack_and_send_response(&response).await {
			tracing::warn!(
				reference = %call.reference,
				command = %call.command,
				error = %err,
				"failed to send response"
			);
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use async_trait::async_trait;
	use tokio::sync::mpsc;

	use super::*;
	use crate::invoke::InvokeError;
	use crate::types::{CallRef, ResponseOutcome};
	use crate::{Error, Result};

	struct ChannelMediator {
		responses: mpsc::UnboundedSender<RemoteResponse>,
	}

	#[async_trait]
	impl ServiceMediator for ChannelMediator {
		async fn pack_and_send_call(&self, _call: &RemoteCall) -> Result<()> {
			unreachable!("a handler never sends calls")
		}

		async fn pack_and_send_response(&self, response: &RemoteResponse) -> Result<()> {
			self.responses
				.send(response.clone())
				.map_err(|_| Error::NoTransport)?;
			Ok(())
		}
	}

	/// Echoes the first argument; `fail` errors, `slow` sleeps first.
	struct EchoInvoker;

	#[async_trait]
	impl CommandInvoker for EchoInvoker {
		async fn invoke(&self, command: &str, args: &[Vec<u8>]) -> Result<Vec<u8>, InvokeError> {
			match command {
				"echo" => Ok(args.first().cloned().unwrap_or_default()),
				"slow" => {
					tokio::time::sleep(Duration::from_millis(20)).await;
					Ok(vec![])
				}
				"fail" => Err(InvokeError::command(std::io::Error::other("boom"))),
				other => Err(InvokeError::UnknownCommand(other.to_owned())),
			}
		}
	}

	fn handler(
		options: HandlerOptions,
	) -> (
		Arc<CallHandler>,
		Arc<ChannelMediator>,
		mpsc::UnboundedReceiver<RemoteResponse>,
	) {
		let (tx, rx) = mpsc::unbounded_channel();
		let mediator = Arc::new(ChannelMediator { responses: tx });
		let weak = Arc::downgrade(&mediator) as Weak<dyn ServiceMediator>;
		let handler = Arc::new(CallHandler::new(weak, Arc::new(EchoInvoker), options));
		(handler, mediator, rx)
	}

	#[tokio::test]
	async fn awaited_call_produces_a_success_response() {
		let (handler, _mediator, mut rx) = handler(HandlerOptions::default());
		let reference = CallRef::fresh();
		handler
			.handle_received_call(RemoteCall::request(reference, "echo", vec![vec![3, 4]]))
			.await;
		let response = rx.recv().await.unwrap();
		assert_eq!(response.reference, reference);
		assert_eq!(response.outcome, ResponseOutcome::Success(vec![3, 4]));
	}

	#[tokio::test]
	async fn failed_invocation_produces_an_error_response() {
		let (handler, _mediator, mut rx) = handler(HandlerOptions::default());
		let reference = CallRef::fresh();
		handler
			.handle_received_call(RemoteCall::request(reference, "fail", vec![]))
			.await;
		let response = rx.recv().await.unwrap();
		assert_eq!(response.outcome, ResponseOutcome::Error("boom".into()));
	}

	#[tokio::test]
	async fn unknown_command_reports_its_name() {
		let (handler, _mediator, mut rx) = handler(HandlerOptions::default());
		handler
			.handle_received_call(RemoteCall::request(CallRef::fresh(), "nope", vec![]))
			.await;
		let response = rx.recv().await.unwrap();
		assert_eq!(
			response.outcome,
			ResponseOutcome::Error("unknown command: nope".into())
		);
	}

	#[tokio::test]
	async fn fire_and_forget_failure_sends_nothing() {
		let (handler, _mediator, mut rx) = handler(HandlerOptions {
			handle_asynchronously: false,
		});
		handler
			.handle_received_call(RemoteCall::one_way("fail", vec![]))
			.await;
		assert!(rx.try_recv().is_err());
	}

	#[tokio::test]
	async fn synchronous_mode_completes_before_returning() {
		let (handler, _mediator, mut rx) = handler(HandlerOptions {
			handle_asynchronously: false,
		});
		handler
			.handle_received_call(RemoteCall::request(CallRef::fresh(), "slow", vec![]))
			.await;
		// The response must already be buffered once the handler returns.
		assert!(rx.try_recv().is_ok());
	}

	#[tokio::test]
	async fn asynchronous_mode_returns_before_the_call_completes() {
		let (handler, _mediator, mut rx) = handler(HandlerOptions::default());
		handler
			.handle_received_call(RemoteCall::request(CallRef::fresh(), "slow", vec![]))
			.await;
		assert!(rx.try_recv().is_err());
		assert!(rx.recv().await.is_some());
	}
}
