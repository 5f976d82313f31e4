//! Client configuration value objects shared by the dispatcher and paginator.
//!
//! A single [`ClientConfig`] describes one API target (base URL, rate budget, default
//! headers). API-specific variants are expressed as preset constructors in [`presets`] rather
//! than as distinct client types.

/// Builder API for assembling client configurations.
pub mod builder;
/// Ready-made configurations for known API targets.
pub mod presets;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Maximum age of a transport session before it is recycled.
pub const SESSION_TTL: Duration = Duration::from_secs(600);
/// Number of pages requested concurrently per pagination batch.
pub const BATCH_SIZE: u32 = 3;
/// Interval between rate-limit polls while the bucket is empty.
pub const RATE_LIMIT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Token bucket parameters: burst size and steady-state refill rate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateLimit {
	/// Maximum number of tokens the bucket holds (requests allowed in a burst).
	pub capacity: u32,
	/// Tokens added per second.
	pub fill_rate: f64,
}
impl RateLimit {
	/// Creates a new rate limit from a burst capacity and a per-second fill rate.
	pub const fn new(capacity: u32, fill_rate: f64) -> Self {
		Self { capacity, fill_rate }
	}

	/// Validates the bucket parameters.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.capacity == 0 {
			return Err(ConfigError::ZeroCapacity);
		}
		if !self.fill_rate.is_finite() || self.fill_rate < 0. {
			return Err(ConfigError::InvalidFillRate { fill_rate: self.fill_rate });
		}

		Ok(())
	}
}
impl Default for RateLimit {
	fn default() -> Self {
		// 30 requests per burst, one token regained per minute.
		Self::new(30, 1. / 60.)
	}
}

/// Immutable client configuration consumed by [`ApiClient`](crate::client::ApiClient).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Base URL every endpoint is joined onto.
	pub base_url: Url,
	/// Shared rate budget for every outbound request.
	pub rate_limit: RateLimit,
	/// Headers attached to every request (unique keys).
	pub headers: BTreeMap<String, String>,
	/// Optional per-request timeout applied by the default transport.
	#[serde(default, with = "optional_secs")]
	pub request_timeout: Option<Duration>,
}
impl ClientConfig {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Resolves `endpoint` against the base URL as `{base_url}/{endpoint}`.
	///
	/// Leading slashes on the endpoint and trailing slashes on the base are collapsed so the
	/// joined path always has exactly one separator.
	pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let path = endpoint.trim_start_matches('/');

		Url::parse(&format!("{base}/{path}"))
			.map_err(|_| ConfigError::InvalidEndpoint { endpoint: endpoint.to_owned() })
	}
}

mod optional_secs {
	// self
	use crate::_prelude::*;

	pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		value.map(|duration| duration.as_secs_f64()).serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let secs = Option::<f64>::deserialize(deserializer)?;

		secs.map(|secs| Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom))
			.transpose()
	}
}
