//! Byte-channel contract supplied by the application.

use async_trait::async_trait;

/// One-way byte sink towards the remote endpoint.
///
/// The core hands a fully framed message to [`Transport::send`]; delivery of
/// inbound bytes is the application's job, feeding them back through
/// [`RemoteService::handle_received_bytes`](crate::RemoteService::handle_received_bytes).
#[async_trait]
pub trait Transport: Send + Sync {
	/// Sends one framed message to the remote endpoint.
	async fn send(&self, bytes: Vec<u8>) -> std::io::Result<()>;
}
