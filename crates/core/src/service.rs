//! The service: composition root and traffic mediator.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::dispatch::{CallDispatcher, DispatcherOptions};
use crate::envelope::{BinaryEnvelopeCodec, Envelope, EnvelopeCodec, Intent};
use crate::handler::{CallHandler, HandlerOptions};
use crate::invoke::CommandInvoker;
use crate::marshal::Marshaller;
use crate::packer::MessagePacker;
use crate::transport::Transport;
use crate::types::{RemoteCall, RemoteResponse};
use crate::{Error, Result};

/// Internal seam through which the dispatcher and handler send traffic.
///
/// Held weakly by both components so dropping the service tears the cycle
/// down; sends after teardown fail with [`Error::ServiceStopped`].
#[async_trait]
pub trait ServiceMediator: Send + Sync {
	/// Packs `call` and sends it over the attached transport.
	async fn pack_and_send_call(&self, call: &RemoteCall) -> Result<()>;

	/// Packs `response` and sends it over the attached transport.
	async fn pack_and_send_response(&self, response: &RemoteResponse) -> Result<()>;
}

/// Configuration for a [`RemoteService`].
///
/// At least one of the dispatcher and handler roles must be enabled.
pub struct ServiceOptions {
	marshaller: Arc<dyn Marshaller>,
	codec: Arc<dyn EnvelopeCodec>,
	dispatcher: Option<DispatcherOptions>,
	handler: Option<(Arc<dyn CommandInvoker>, HandlerOptions)>,
}

impl ServiceOptions {
	/// Starts options over `marshaller` with the default binary envelope
	/// codec and neither role enabled.
	#[must_use]
	pub fn new(marshaller: Arc<dyn Marshaller>) -> Self {
		Self {
			marshaller,
			codec: Arc::new(BinaryEnvelopeCodec::new()),
			dispatcher: None,
			handler: None,
		}
	}

	/// Replaces the envelope codec.
	#[must_use]
	pub fn envelope_codec(mut self, codec: Arc<dyn EnvelopeCodec>) -> Self {
		self.codec = codec;
		self
	}

	/// Enables outgoing call dispatching.
	#[must_use]
	pub fn with_dispatcher(mut self, options: DispatcherOptions) -> Self {
		self.dispatcher = Some(options);
		self
	}

	/// Enables inbound call handling through `invoker`.
	#[must_use]
	pub fn with_handler(mut self, invoker: Arc<dyn CommandInvoker>, options: HandlerOptions) -> Self {
		self.handler = Some((invoker, options));
		self
	}
}

/// Two-way remote call endpoint over an application-supplied transport.
///
/// Owns the packer, dispatcher and handler, mediates their sends, and routes
/// inbound bytes to the right component. Built with either or both roles;
/// traffic for an absent role is dropped.
pub struct RemoteService {
	packer: MessagePacker,
	transport: RwLock<Option<Arc<dyn Transport>>>,
	dispatcher: Option<CallDispatcher>,
	handler: Option<Arc<CallHandler>>,
}

impl RemoteService {
	/// Builds a service from `options`.
	///
	/// # Errors
	///
	/// [`Error::Unconfigured`] if neither role is enabled.
	pub fn new(options: ServiceOptions) -> Result<Arc<Self>> {
		if options.dispatcher.is_none() && options.handler.is_none() {
			return Err(Error::Unconfigured);
		}
		Ok(Arc::new_cyclic(|weak: &Weak<Self>| {
			let mediator: Weak<dyn ServiceMediator> = weak.clone();
			let dispatcher = options
				.dispatcher
				.map(|opts| CallDispatcher::new(mediator.clone(), opts));
			let handler = options.handler.map(|(invoker, opts)| {
				Arc::new(CallHandler::new(mediator.clone(), invoker, opts))
			});
			Self {
				packer: MessagePacker::new(options.marshaller, options.codec),
				transport: RwLock::new(None),
				dispatcher,
				handler,
			}
		}))
	}

	/// Attaches (or replaces) the transport used for outgoing sends.
	pub fn set_transport(&self, transport: Arc<dyn Transport>) {
		*self.transport.write() = Some(transport);
	}

	/// Detaches the transport; subsequent sends fail with
	/// [`Error::NoTransport`].
	pub fn clear_transport(&self) {
		*self.transport.write() = None;
	}

	fn transport(&self) -> Result<Arc<dyn Transport>> {
		self.transport.read().clone().ok_or(Error::NoTransport)
	}

	fn dispatcher(&self) -> Result<&CallDispatcher> {
		self.dispatcher.as_ref().ok_or(Error::NoDispatcher)
	}

	/// Sends a fire-and-forget call to the remote endpoint.
	pub async fn call(&self, command: impl Into<String>, args: Vec<Vec<u8>>) -> Result<()> {
		self.dispatcher()?.call(command, args).await
	}

	/// Sends an awaited request and waits for the remote result value.
	pub async fn request(
		&self,
		command: impl Into<String>,
		args: Vec<Vec<u8>>,
	) -> Result<Vec<u8>> {
		self.dispatcher()?.request(command, args).await
	}

	/// Blocking form of [`request`](Self::request) for synchronous callers.
	pub fn request_blocking(
		&self,
		command: impl Into<String>,
		args: Vec<Vec<u8>>,
	) -> Result<Vec<u8>> {
		self.dispatcher()?.request_blocking(command, args)
	}

	/// Feeds one framed message received from the transport into the
	/// service.
	///
	/// # Errors
	///
	/// [`Error::Protocol`] or [`Error::Marshal`] if the bytes do not decode.
	pub async fn handle_received_bytes(self: &Arc<Self>, bytes: &[u8]) -> Result<()> {
		let envelope = self.packer.unwrap_envelope(bytes)?;
		self.handle_received_envelope(envelope).await
	}

	/// Routes a decoded envelope to the dispatcher or handler.
	///
	/// Traffic for a role this service was built without is dropped.
	pub async fn handle_received_envelope(self: &Arc<Self>, envelope: Envelope) -> Result<()> {
		match envelope.intent {
			Intent::Call => match &self.handler {
				Some(handler) => {
					let call = self.packer.unpack_call(&envelope)?;
					handler.handle_received_call(call).await;
				}
				None => tracing::debug!("dropping inbound call: no handler configured"),
			},
			Intent::Response => match &self.dispatcher {
				Some(dispatcher) => {
					let response = self.packer.unpack_response(&envelope)?;
					dispatcher.handle_received_response(response);
				}
				None => tracing::debug!("dropping inbound response: no dispatcher configured"),
			},
		}
		Ok(())
	}
}

#[async_trait]
impl ServiceMediator for RemoteService {
	async fn pack_and_send_call(&self, call: &RemoteCall) -> Result<()> {
		let bytes = self.packer.pack_call(call)?;
		let transport = self.transport()?;
		Ok(transport.send(bytes).await?)
	}

	async fn pack_and_send_response(&self, response: &RemoteResponse) -> Result<()> {
		let bytes = self.packer.pack_response(response)?;
		let transport = self.transport()?;
		Ok(transport.send(bytes).await?)
	}
}
