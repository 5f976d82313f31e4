// self
use crate::{
	_prelude::*,
	config::{
		ClientConfig,
		builder::{normalize_header_name, validate_header_name},
	},
	error::ConfigError,
};

/// HTTP methods supported by the dispatcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	#[default]
	/// `GET` request.
	Get,
	/// `POST` request.
	Post,
}
impl Method {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Description of one API call relative to the client's base URL.
///
/// Query parameters keep their insertion order. Header names are unique regardless of case, and
/// request headers override client defaults with the same name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
	/// Endpoint path joined onto the base URL.
	pub endpoint: String,
	/// HTTP method.
	pub method: Method,
	/// Ordered query parameters.
	pub params: Vec<(String, String)>,
	/// Request-specific headers.
	pub headers: BTreeMap<String, String>,
	/// Optional JSON body sent with the request.
	pub body: Option<Value>,
}
impl ApiRequest {
	/// Creates a request for `endpoint` using `method`.
	pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
		Self { endpoint: endpoint.into(), method, ..Default::default() }
	}

	/// Creates a `GET` request for `endpoint`.
	pub fn get(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Get, endpoint)
	}

	/// Creates a `POST` request for `endpoint`.
	pub fn post(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Post, endpoint)
	}

	/// Appends a query parameter.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((key.into(), value.into()));

		self
	}

	/// Sets a query parameter, replacing any existing values for the same key in place.
	pub fn set_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		let key = key.into();
		let value = value.into();

		match self.params.iter().position(|(existing, _)| *existing == key) {
			Some(idx) => {
				self.params[idx].1 = value;

				let mut seen = false;

				self.params.retain(|(existing, _)| {
					if *existing != key {
						return true;
					}

					let keep = !seen;

					seen = true;

					keep
				});
			},
			None => self.params.push((key, value)),
		}

		self
	}

	/// Adds (or replaces) a request header; names are stored lowercase.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(normalize_header_name(name), value.into());

		self
	}

	/// Attaches a JSON body.
	pub fn with_json_body(mut self, body: Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Resolves the request against a client configuration.
	pub fn prepare(&self, config: &ClientConfig) -> Result<PreparedRequest, ConfigError> {
		let url = config.endpoint_url(&self.endpoint)?;
		let mut headers = config
			.headers
			.iter()
			.map(|(name, value)| (normalize_header_name(name.as_str()), value.clone()))
			.collect::<BTreeMap<_, _>>();

		for (name, value) in &self.headers {
			validate_header_name(name)?;
			headers.insert(normalize_header_name(name.as_str()), value.clone());
		}

		Ok(PreparedRequest {
			method: self.method,
			url,
			headers,
			params: self.params.clone(),
			body: self.body.clone(),
		})
	}
}

/// Fully resolved request handed to a [`TransportSession`](crate::http::TransportSession).
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL without the query string.
	pub url: Url,
	/// Merged client and request headers.
	pub headers: BTreeMap<String, String>,
	/// Ordered query parameters.
	pub params: Vec<(String, String)>,
	/// Optional JSON body.
	pub body: Option<Value>,
}
impl PreparedRequest {
	/// Returns the value of the first query parameter named `key`.
	pub fn param(&self, key: &str) -> Option<&str> {
		self.params.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
	}
}

/// Status and raw body returned by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Undecoded response body.
	pub body: Vec<u8>,
}
impl TransportResponse {
	/// Creates a response from a status code and body bytes.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Serializes `value` as the response body.
	pub fn json(status: u16, value: &Value) -> Self {
		Self::new(status, value.to_string())
	}
}
