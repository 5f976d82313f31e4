// std
use std::marker::PhantomData;
// self
use crate::_prelude::*;

/// Reason a payload failed to decode against a target shape.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Payload does not match `{target}` at `{path}`: {message}.")]
pub struct DecodeError {
	/// Name of the target type.
	pub target: &'static str,
	/// Dotted JSON path of the offending value (`.` for the root).
	pub path: String,
	/// Underlying decoder message.
	pub message: String,
}

/// Pluggable "decode into a typed value or fail" capability for one target shape.
pub trait Schema
where
	Self: Send + Sync,
{
	/// Typed value produced by a successful decode.
	type Output;

	/// Decodes `raw` or explains why it does not fit.
	fn decode(&self, raw: &Value) -> Result<Self::Output, DecodeError>;
}

/// [`Schema`] backed by a `serde` [`Deserialize`] implementation.
///
/// Failures carry the JSON path reported by `serde_path_to_error`.
pub struct JsonSchema<T>(PhantomData<fn() -> T>);
impl<T> JsonSchema<T> {
	/// Creates the schema.
	pub const fn new() -> Self {
		Self(PhantomData)
	}
}
impl<T> Default for JsonSchema<T> {
	fn default() -> Self {
		Self::new()
	}
}
impl<T> Clone for JsonSchema<T> {
	fn clone(&self) -> Self {
		Self::new()
	}
}
impl<T> Copy for JsonSchema<T> {}
impl<T> Debug for JsonSchema<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "JsonSchema<{}>", std::any::type_name::<T>())
	}
}
impl<T> Schema for JsonSchema<T>
where
	T: DeserializeOwned,
{
	type Output = T;

	fn decode(&self, raw: &Value) -> Result<T, DecodeError> {
		serde_path_to_error::deserialize(raw).map_err(|err| DecodeError {
			target: std::any::type_name::<T>(),
			path: err.path().to_string(),
			message: err.inner().to_string(),
		})
	}
}

/// Shapes that carry a page worth of items.
pub trait PageItems {
	/// Item type accumulated across pages.
	type Item;

	/// Consumes the page, yielding its items in order.
	fn into_items(self) -> Vec<Self::Item>;
}
impl<T> PageItems for Vec<T> {
	type Item = T;

	fn into_items(self) -> Vec<T> {
		self
	}
}

/// Common paginated body shape: `{ "data": [ ... ] }`; other top-level fields are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPage<T> {
	/// Items on this page.
	pub data: Vec<T>,
}
impl<T> PageItems for DataPage<T> {
	type Item = T;

	fn into_items(self) -> Vec<T> {
		self.data
	}
}
