//! Transport primitives for API requests.
//!
//! The module exposes [`HttpTransport`], which opens reusable [`TransportSession`] handles, so
//! downstream crates can plug in custom HTTP stacks without touching the dispatcher. A session
//! is the unit the [`SessionManager`](crate::session::SessionManager) recycles: it reports
//! whether it is still open and executes fully resolved requests until closed. The default
//! implementation wraps [`ReqwestClient`] behind the `reqwest` feature.

mod request;

pub use request::*;

// std
#[cfg(feature = "reqwest")] use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by transport operations.
pub type TransportFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Factory for transport sessions.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back a client shared
/// across tasks.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Session handle produced by this transport.
	type Session: TransportSession;

	/// Opens a fresh session.
	fn open_session(&self) -> TransportFuture<'_, Self::Session>;
}

/// Reusable network context (connection pool, cookies, TLS state) with an explicit lifetime.
pub trait TransportSession
where
	Self: 'static + Send + Sync,
{
	/// Returns `false` once the session has been closed by either side.
	fn is_open(&self) -> bool;

	/// Releases the session. Calling it more than once must be harmless.
	fn close(&self);

	/// Executes a request and returns the raw status and body.
	///
	/// Non-2xx responses are successful executions; only failures to obtain a response at all
	/// are errors.
	fn execute<'a>(
		&'a self,
		request: &'a PreparedRequest,
	) -> TransportFuture<'a, TransportResponse>;
}

/// Default transport that opens one [`ReqwestClient`] per session.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
	timeout: Option<Duration>,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Creates a transport whose sessions apply `timeout` to every request.
	pub fn with_timeout(timeout: Option<Duration>) -> Self {
		Self { timeout }
	}

	fn build_client(&self) -> Result<ReqwestClient, ReqwestError> {
		let mut builder = ReqwestClient::builder();

		if let Some(timeout) = self.timeout {
			builder = builder.timeout(timeout);
		}

		builder.build()
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	type Session = ReqwestSession;

	fn open_session(&self) -> TransportFuture<'_, Self::Session> {
		let built = self.build_client();

		Box::pin(async move {
			let client = built.map_err(TransportError::session_open)?;

			Ok(ReqwestSession::new(client))
		})
	}
}

/// Session backed by a dedicated [`ReqwestClient`] connection pool.
///
/// Closing marks the session unusable for new requests; the pool itself is released once the
/// last in-flight request drops its handle.
#[cfg(feature = "reqwest")]
#[derive(Debug)]
pub struct ReqwestSession {
	client: ReqwestClient,
	open: AtomicBool,
}
#[cfg(feature = "reqwest")]
impl ReqwestSession {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn new(client: ReqwestClient) -> Self {
		Self { client, open: AtomicBool::new(true) }
	}
}
#[cfg(feature = "reqwest")]
impl TransportSession for ReqwestSession {
	fn is_open(&self) -> bool {
		self.open.load(Ordering::Acquire)
	}

	fn close(&self) {
		self.open.store(false, Ordering::Release);
	}

	fn execute<'a>(
		&'a self,
		request: &'a PreparedRequest,
	) -> TransportFuture<'a, TransportResponse> {
		Box::pin(async move {
			let method = match request.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
			};
			let mut builder =
				self.client.request(method, request.url.clone()).query(&request.params);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = &request.body {
				builder = builder.json(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(TransportResponse { status, body })
		})
	}
}
