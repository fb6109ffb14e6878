//! Single-shot, timeout-bounded wait for one correlated response.

use std::time::Duration;

use tokio::sync::oneshot;

use crate::types::RemoteResponse;

/// Waits for the response to a single awaited call.
///
/// Created together with its [`ResponseSignal`]; the signal side delivers at
/// most one response, and the first of signal or timeout wins.
#[derive(Debug)]
pub struct ResponseAwaiter {
	rx: oneshot::Receiver<RemoteResponse>,
	timeout: Duration,
}

/// Delivery side of a [`ResponseAwaiter`].
///
/// Consumed on use, so a response can be delivered at most once.
#[derive(Debug)]
pub struct ResponseSignal {
	tx: oneshot::Sender<RemoteResponse>,
}

impl ResponseAwaiter {
	/// Creates an awaiter/signal pair bounded by `timeout`.
	#[must_use]
	pub fn new(timeout: Duration) -> (Self, ResponseSignal) {
		let (tx, rx) = oneshot::channel();
		(Self { rx, timeout }, ResponseSignal { tx })
	}

	/// Waits for the response.
	///
	/// Returns `None` if the timeout elapses first or the signal side is
	/// dropped without delivering.
	pub async fn wait(self) -> Option<RemoteResponse> {
		match tokio::time::timeout(self.timeout, self.rx).await {
			Ok(Ok(response)) => Some(response),
			Ok(Err(_)) | Err(_) => None,
		}
	}
}

impl ResponseSignal {
	/// Delivers `response` to the waiting side.
	///
	/// A no-op if the awaiter has already given up.
	pub fn signal(self, response: RemoteResponse) {
		let _ = self.tx.send(response);
	}
}
