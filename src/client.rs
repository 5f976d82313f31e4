//! Rate-limited request dispatcher.

mod metrics;

pub use metrics::ClientMetrics;

// self
use crate::{
	_prelude::*,
	cancel::CancelSignal,
	config::{ClientConfig, RATE_LIMIT_POLL_INTERVAL, SESSION_TTL},
	error::TransportError,
	http::{ApiRequest, HttpTransport, TransportResponse, TransportSession},
	limiter::RateLimiter,
	obs::{self, FetchKind, FetchOutcome, FetchSpan},
	paginate::Paginator,
	session::SessionManager,
	validate::{ResponseValidator, Schema, Validation},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Decoded response body together with the HTTP status it arrived with.
///
/// The status is informational; classification relies on the body's shape alone.
#[derive(Clone, Debug, PartialEq)]
pub struct RawPayload {
	/// HTTP status code.
	pub status: u16,
	/// Generic JSON body.
	pub body: Value,
}

/// Sends API requests through one token bucket and one recyclable session.
///
/// Share the client (for example behind an [`Arc`]) to let concurrent tasks draw from the same
/// rate limit. Triggering the client's [`CancelSignal`] aborts waiting and in-flight requests;
/// a cancelled client keeps returning [`Error::Cancelled`].
pub struct ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Shared counters for dispatch and classification outcomes.
	pub metrics: Arc<ClientMetrics>,
	config: ClientConfig,
	limiter: RateLimiter,
	sessions: SessionManager<T>,
	validator: ResponseValidator,
	cancel: CancelSignal,
}
impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client that opens its sessions from the caller-provided transport.
	pub fn with_transport(config: ClientConfig, transport: impl Into<Arc<T>>) -> Self {
		Self {
			metrics: Default::default(),
			limiter: RateLimiter::new(config.rate_limit, RATE_LIMIT_POLL_INTERVAL),
			sessions: SessionManager::new(transport, SESSION_TTL),
			validator: Default::default(),
			cancel: Default::default(),
			config,
		}
	}

	/// Replaces the cancellation signal, e.g. to share one signal across several clients.
	pub fn with_cancel_signal(mut self, cancel: CancelSignal) -> Self {
		self.cancel = cancel;

		self
	}

	/// Replaces the validator, e.g. to retain a different number of diagnostics.
	pub fn with_validator(mut self, validator: ResponseValidator) -> Self {
		self.validator = validator;

		self
	}

	/// Client configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Cancellation signal observed by every operation of this client.
	pub fn cancel_signal(&self) -> &CancelSignal {
		&self.cancel
	}

	/// Rate limiter gating every request.
	pub fn limiter(&self) -> &RateLimiter {
		&self.limiter
	}

	/// Session manager backing every request.
	pub fn sessions(&self) -> &SessionManager<T> {
		&self.sessions
	}

	/// Validator used by [`ApiClient::classify`].
	pub fn validator(&self) -> &ResponseValidator {
		&self.validator
	}

	/// Starts a paginated fetch driven by this client.
	pub fn paginator(&self) -> Paginator<'_, T> {
		Paginator::new(self)
	}

	/// Sends one request and returns its decoded body.
	///
	/// Waits for a rate-limit token, then executes the request on the current session and decodes
	/// the body as generic JSON. HTTP status codes are not interpreted. Transport failures close the
	/// session and surface as [`Error::Dispatch`].
	pub async fn send(&self, request: &ApiRequest) -> Result<RawPayload> {
		let span = FetchSpan::new(FetchKind::Dispatch, "send");

		obs::record_fetch_outcome(FetchKind::Dispatch, FetchOutcome::Attempt);

		let result = span.instrument(self.dispatch(request)).await;

		obs::record_fetch_outcome(FetchKind::Dispatch, FetchOutcome::of(&result));

		result
	}

	/// Sends one request and classifies its payload against `schema`.
	pub async fn fetch<S>(&self, request: &ApiRequest, schema: &S) -> Result<Validation<S::Output>>
	where
		S: ?Sized + Schema,
	{
		let raw = self.send(request).await?;

		Ok(self.classify(&raw, schema))
	}

	/// Classifies `raw` and updates the soft-failure counters.
	pub fn classify<S>(&self, raw: &RawPayload, schema: &S) -> Validation<S::Output>
	where
		S: ?Sized + Schema,
	{
		let outcome = self.validator.classify(raw, schema);

		match &outcome {
			Validation::ApiError(_) => self.metrics.record_api_error(),
			Validation::Mismatch(_) => self.metrics.record_mismatch(),
			Validation::Valid(_) => {},
		}

		outcome
	}

	/// Closes the current session; the next request opens a fresh one.
	pub async fn close(&self) {
		self.sessions.close().await;
	}

	async fn dispatch(&self, request: &ApiRequest) -> Result<RawPayload> {
		if self.cancel.is_cancelled() {
			return Err(Error::Cancelled);
		}

		let prepared = request.prepare(&self.config)?;
		let waited = self.limiter.acquire(&self.cancel).await?;

		self.metrics.record_throttled(waited);

		let session = match self.sessions.get_session().await {
			Ok(session) => session,
			Err(source) => return Err(self.fail(request, source).await),
		};

		self.metrics.record_request();
		tracing::debug!(method = %prepared.method, url = %prepared.url, "Dispatching request.");

		let response = tokio::select! {
			response = session.execute(&prepared) => response,
			_ = self.cancel.cancelled() => {
				self.sessions.close().await;

				return Err(Error::Cancelled);
			},
		};

		match response.and_then(decode_body) {
			Ok(payload) => Ok(payload),
			Err(source) => Err(self.fail(request, source).await),
		}
	}

	async fn fail(&self, request: &ApiRequest, source: TransportError) -> Error {
		tracing::error!(endpoint = %request.endpoint, error = %source, "Transport failure.");
		self.metrics.record_failure();
		self.sessions.close().await;

		Error::Dispatch { endpoint: request.endpoint.clone(), page: None, source }
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client backed by the default reqwest transport.
	///
	/// The configured request timeout, if any, applies to every session the client opens.
	pub fn new(config: ClientConfig) -> Self {
		let transport = ReqwestTransport::with_timeout(config.request_timeout);

		Self::with_transport(config, transport)
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("rate_limit", &self.config.rate_limit)
			.field("sessions", &self.sessions)
			.field("cancelled", &self.cancel.is_cancelled())
			.finish()
	}
}

fn decode_body(response: TransportResponse) -> Result<RawPayload, TransportError> {
	let TransportResponse { status, body } = response;
	let body = serde_json::from_slice(&body)
		.map_err(|source| TransportError::MalformedBody { status, source })?;

	Ok(RawPayload { status, body })
}
