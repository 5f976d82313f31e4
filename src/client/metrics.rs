// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for dispatch and classification outcomes.
///
/// Session lifecycle counts live on [`SessionStats`](crate::session::SessionStats).
#[derive(Debug, Default)]
pub struct ClientMetrics {
	requests: AtomicU64,
	failures: AtomicU64,
	throttled_polls: AtomicU64,
	api_errors: AtomicU64,
	mismatches: AtomicU64,
}
impl ClientMetrics {
	/// Returns the number of requests handed to a transport session.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Returns the number of requests that ended in a transport failure.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	/// Returns the number of rate-limit polls that found the bucket empty.
	pub fn throttled_polls(&self) -> u64 {
		self.throttled_polls.load(Ordering::Relaxed)
	}

	/// Returns the number of payloads classified as API error envelopes.
	pub fn api_errors(&self) -> u64 {
		self.api_errors.load(Ordering::Relaxed)
	}

	/// Returns the number of payloads that matched neither the envelope nor the target shape.
	pub fn mismatches(&self) -> u64 {
		self.mismatches.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_throttled(&self, polls: u32) {
		self.throttled_polls.fetch_add(polls.into(), Ordering::Relaxed);
	}

	pub(crate) fn record_api_error(&self) {
		self.api_errors.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_mismatch(&self) {
		self.mismatches.fetch_add(1, Ordering::Relaxed);
	}
}
