//! Outgoing call dispatch and response correlation.

use std::collections::HashMap;
use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::awaiter::{ResponseAwaiter, ResponseSignal};
use crate::service::ServiceMediator;
use crate::types::{CallRef, RemoteCall, RemoteResponse, ResponseOutcome};
use crate::{Error, Result};

/// Configuration for a [`CallDispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherOptions {
	/// How long a request waits for its response before timing out.
	pub request_timeout: Duration,
}

impl DispatcherOptions {
	/// The default request timeout of 30 seconds.
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}

impl Default for DispatcherOptions {
	fn default() -> Self {
		Self {
			request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
		}
	}
}

/// Issues outgoing calls and correlates inbound responses to their waiters.
///
/// Every awaited request registers a [`ResponseSignal`] under a fresh
/// [`CallRef`] before its call leaves the process, so a response can never
/// outrun its registration. Entries are removed on every exit path:
/// response, timeout, or send failure.
pub struct CallDispatcher {
	mediator: Weak<dyn ServiceMediator>,
	pending: Mutex<HashMap<CallRef, ResponseSignal>>,
	request_timeout: Duration,
	runtime: Option<Handle>,
}

impl CallDispatcher {
	/// Creates a dispatcher routing sends through `mediator`.
	///
	/// If called inside a tokio runtime, its handle is captured so that
	/// [`request_blocking`](Self::request_blocking) works from foreign
	/// threads.
	#[must_use]
	pub fn new(mediator: Weak<dyn ServiceMediator>, options: DispatcherOptions) -> Self {
		Self {
			mediator,
			pending: Mutex::new(HashMap::new()),
			request_timeout: options.request_timeout,
			runtime: Handle::try_current().ok(),
		}
	}

	fn mediator(&self) -> Result<std::sync::Arc<dyn ServiceMediator>> {
		self.mediator.upgrade().ok_or(Error::ServiceStopped)
	}

	/// Sends a fire-and-forget call.
	///
	/// Completion of the send says nothing about remote execution; no
	/// response will ever arrive.
	pub async fn call(&self, command: impl Into<String>, args: Vec<Vec<u8>>) -> Result<()> {
		let call = RemoteCall::one_way(command, args);
		self.mediator()?.pack_and_send_call(&call).await
	}

	/// Sends an awaited request and waits for its response.
	///
	/// The timeout clock starts once the call has been handed to the
	/// transport; time spent sending is not counted against it.
	///
	/// # Errors
	///
	/// [`Error::RequestTimeout`] if no response arrives in time, or
	/// [`Error::RequestInvoke`] if the remote invocation failed.
	pub async fn request(
		&self,
		command: impl Into<String>,
		args: Vec<Vec<u8>>,
	) -> Result<Vec<u8>> {
		let call = RemoteCall::request(CallRef::fresh(), command, args);
		tracing::debug!(reference = %call.reference, command = %call.command, "sending request");

		let (awaiter, signal) = ResponseAwaiter::new(self.request_timeout);
		self.pending.lock().insert(call.reference, signal);
		let guard = PendingGuard {
			pending: &self.pending,
			reference: call.reference,
		};

		self.mediator()?.pack_and_send_call(&call).await?;

		let response = awaiter.wait().await;
		drop(guard);

		match response {
			Some(RemoteResponse {
				outcome: ResponseOutcome::Success(value),
				..
			}) => Ok(value),
			Some(RemoteResponse {
				outcome: ResponseOutcome::Error(message),
				..
			}) => Err(Error::RequestInvoke { message, call }),
			None => {
				tracing::warn!(
					reference = %call.reference,
					command = %call.command,
					timeout = ?self.request_timeout,
					"request timed out"
				);
				Err(Error::RequestTimeout { call })
			}
		}
	}

	/// Sends an awaited request from synchronous code, blocking until its
	/// response arrives or times out.
	///
	/// Inside a multi-threaded runtime the worker thread is released while
	/// blocked; from a foreign thread the runtime handle captured at
	/// construction drives the request. A current-thread runtime cannot host
	/// a blocking wait, so calls from one fail rather than deadlock.
	///
	/// # Errors
	///
	/// [`Error::RuntimeUnavailable`] if no runtime handle is reachable or
	/// the surrounding runtime cannot be blocked on, plus the errors of
	/// [`request`](Self::request).
	pub fn request_blocking(
		&self,
		command: impl Into<String>,
		args: Vec<Vec<u8>>,
	) -> Result<Vec<u8>> {
		let command = command.into();
		if let Ok(handle) = Handle::try_current() {
			if handle.runtime_flavor() != RuntimeFlavor::MultiThread {
				return Err(Error::RuntimeUnavailable);
			}
			return tokio::task::block_in_place(|| handle.block_on(self.request(command, args)));
		}
		match &self.runtime {
			Some(handle) => handle.block_on(self.request(command, args)),
			None => Err(Error::RuntimeUnavailable),
		}
	}

	/// Routes an inbound response to the waiter registered under its
	/// reference.
	///
	/// Responses with no registered waiter (late, duplicate, or unsolicited)
	/// are dropped.
	pub fn handle_received_response(&self, response: RemoteResponse) {
		let signal = self.pending.lock().remove(&response.reference);
		match signal {
			Some(signal) => signal.signal(response),
			None => {
				tracing::debug!(
					reference = %response.reference,
					"dropping response with no pending request"
				);
			}
		}
	}

	#[cfg(test)]
	fn pending_len(&self) -> usize {
		self.pending.lock().len()
	}
}

/// Removes a pending entry on drop so no exit path leaks it.
struct PendingGuard<'a> {
	pending: &'a Mutex<HashMap<CallRef, ResponseSignal>>,
	reference: CallRef,
}

impl Drop for PendingGuard<'_> {
	fn drop(&mut self) {
		self.pending.lock().remove(&self.reference);
	}
}
