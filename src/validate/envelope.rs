// self
use crate::{
	_prelude::*,
	validate::{DecodeError, JsonSchema, Schema},
};

/// One entry of an API error envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorItem {
	/// Provider status string (often the HTTP status code as text).
	pub status: String,
	/// Human-readable error title.
	pub title: String,
}

/// Structured API-level error body: `{ "errors": [ { "status", "title" }, ... ] }`.
///
/// Any payload with this shape is an API error regardless of the HTTP status it arrived with,
/// and regardless of any other fields it carries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
	/// Reported errors.
	pub errors: Vec<ApiErrorItem>,
}
impl ErrorEnvelope {
	/// Decodes `raw` as an error envelope.
	pub fn decode(raw: &Value) -> Result<Self, DecodeError> {
		JsonSchema::<Self>::new().decode(raw)
	}

	/// Joins every `status: title` pair for log lines.
	pub fn summary(&self) -> String {
		self.errors
			.iter()
			.map(|item| format!("{}: {}", item.status, item.title))
			.collect::<Vec<_>>()
			.join("; ")
	}
}
