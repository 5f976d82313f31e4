// self
use crate::{
	_prelude::*,
	config::{ClientConfig, RateLimit},
	error::ConfigError,
};

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Base URL every endpoint is joined onto.
	pub base_url: Url,
	/// Rate budget; defaults to [`RateLimit::default`].
	pub rate_limit: RateLimit,
	/// Headers attached to every request.
	pub headers: BTreeMap<String, String>,
	/// Optional per-request timeout.
	pub request_timeout: Option<Duration>,
}
impl ClientConfigBuilder {
	/// Creates a new builder seeded with the provided base URL.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			rate_limit: RateLimit::default(),
			headers: BTreeMap::new(),
			request_timeout: None,
		}
	}

	/// Overrides the rate budget.
	pub fn rate_limit(mut self, rate_limit: RateLimit) -> Self {
		self.rate_limit = rate_limit;

		self
	}

	/// Adds (or replaces) a default header; names are stored lowercase.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(normalize_header_name(name), value.into());

		self
	}

	/// Adds multiple default headers; later entries replace earlier ones with the same name.
	pub fn headers<I, K, V>(mut self, headers: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		for (name, value) in headers {
			self.headers.insert(normalize_header_name(name), value.into());
		}

		self
	}

	/// Sets the per-request timeout applied by the default transport.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			rate_limit: self.rate_limit,
			headers: self.headers,
			request_timeout: self.request_timeout,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the configuration.
	fn validate(&self) -> Result<(), ConfigError> {
		validate_base_url(&self.base_url)?;
		self.rate_limit.validate()?;

		for name in self.headers.keys() {
			validate_header_name(name)?;
		}

		Ok(())
	}
}

fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::UnsupportedScheme { url: url.to_string() });
	}
	if url.cannot_be_a_base() || url.query().is_some() || url.fragment().is_some() {
		return Err(ConfigError::BaseUrlNotABase { url: url.to_string() });
	}

	Ok(())
}

/// Header names compare case-insensitively, so they are keyed by their lowercase form.
pub(crate) fn normalize_header_name(name: impl Into<String>) -> String {
	let mut name = name.into();

	name.make_ascii_lowercase();

	name
}

pub(crate) fn validate_header_name(name: &str) -> Result<(), ConfigError> {
	if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c.is_control() || c == ':') {
		Err(ConfigError::InvalidHeaderName { name: name.to_owned() })
	} else {
		Ok(())
	}
}
