//! Client-level error types.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Soft failures (API error envelopes, schema mismatches) never surface here; they are
/// reported through [`Validation`](crate::validate::Validation) instead.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure while dispatching a request.
	#[error("Request to `{endpoint}`{} failed.", page_suffix(.page))]
	Dispatch {
		/// Endpoint path relative to the configured base URL.
		endpoint: String,
		/// Page number, when the request belonged to a paginated fetch.
		page: Option<u32>,
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
	/// The client's cancellation signal fired before the operation completed.
	#[error("Operation was cancelled.")]
	Cancelled,
}
impl Error {
	/// Attaches a page number to dispatch failures; other variants pass through untouched.
	pub fn with_page(self, page: u32) -> Self {
		match self {
			Self::Dispatch { endpoint, source, .. } =>
				Self::Dispatch { endpoint, page: Some(page), source },
			other => other,
		}
	}

	/// Returns the transport failure behind a dispatch error.
	pub fn transport(&self) -> Option<&TransportError> {
		match self {
			Self::Dispatch { source, .. } => Some(source),
			_ => None,
		}
	}
}

fn page_suffix(page: &Option<u32>) -> String {
	page.map(|page| format!(" (page {page})")).unwrap_or_default()
}

/// Configuration and validation failures raised while building clients and requests.
#[derive(Debug, PartialEq, ThisError)]
pub enum ConfigError {
	/// Base URL must use HTTP or HTTPS.
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot carry a query string or fragment.
	#[error("Base URL must not contain a query or fragment: {url}.")]
	BaseUrlNotABase {
		/// Base URL that failed validation.
		url: String,
	},
	/// Token bucket capacity must allow at least one request.
	#[error("Rate limit capacity must be positive.")]
	ZeroCapacity,
	/// Fill rate must be a finite, non-negative number of tokens per second.
	#[error("Rate limit fill rate must be finite and non-negative, got {fill_rate}.")]
	InvalidFillRate {
		/// Offending fill rate.
		fill_rate: f64,
	},
	/// Header names must be non-empty and free of whitespace or control characters.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
	},
	/// Endpoint cannot be joined onto the base URL.
	#[error("Endpoint `{endpoint}` cannot be joined onto the base URL.")]
	InvalidEndpoint {
		/// Offending endpoint path.
		endpoint: String,
	},
}

/// Transport-level failures (network, IO, undecodable bodies).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// A fresh session could not be opened.
	#[error("Failed to open a transport session.")]
	SessionOpen {
		/// Transport-specific builder failure.
		#[source]
		source: BoxError,
	},
	/// Response body is not valid JSON.
	#[error("API returned a body that is not valid JSON (HTTP {status}).")]
	MalformedBody {
		/// HTTP status code of the response.
		status: u16,
		/// JSON parsing failure.
		#[source]
		source: serde_json::Error,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific session construction error.
	pub fn session_open(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::SessionOpen { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
