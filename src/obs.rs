//! Observability helpers for dispatch and pagination.
//!
//! Every [`ApiClient::send`](crate::client::ApiClient::send) and
//! [`Paginator::fetch_all`](crate::paginate::Paginator::fetch_all) call runs inside a span named
//! `paged_harvest.fetch` with the `kind` and `stage` fields. Pagination additionally records the
//! last consumed page number in the span's `page` field.
//!
//! # Feature Flags
//!
//! - Enable `metrics` to increment the `paged_harvest_fetch_total` counter for every
//!   attempt/success/failure, labeled by `kind` + `outcome`.
//! - The same feature counts every consumed page in `paged_harvest_page_total`, labeled by
//!   `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchKind {
	/// Single rate-limited request.
	Dispatch,
	/// Batched multi-page fetch.
	Paginate,
}
impl FetchKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchKind::Dispatch => "dispatch",
			FetchKind::Paginate => "paginate",
		}
	}
}
impl Display for FetchKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FetchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchOutcome::Attempt => "attempt",
			FetchOutcome::Success => "success",
			FetchOutcome::Failure => "failure",
		}
	}

	/// Maps a result onto [`FetchOutcome::Success`] or [`FetchOutcome::Failure`].
	pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		if result.is_ok() { FetchOutcome::Success } else { FetchOutcome::Failure }
	}
}
impl Display for FetchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// How a single consumed page ended during pagination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageOutcome {
	/// Page carried at least one item.
	Data,
	/// Page decoded but carried no items; pagination stops here.
	Empty,
	/// Page was an error envelope and got skipped.
	ApiError,
	/// Page had an unexpected shape and got skipped.
	Mismatch,
}
impl PageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			PageOutcome::Data => "data",
			PageOutcome::Empty => "empty",
			PageOutcome::ApiError => "api_error",
			PageOutcome::Mismatch => "mismatch",
		}
	}
}
impl Display for PageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
