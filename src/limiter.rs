//! Token-bucket rate limiting shared by every outbound request of a client.
//!
//! [`TokenBucket`] is the pure accounting structure; [`RateLimiter`] wraps it behind a
//! synchronous lock and adds the polling wait loop used as backpressure. The check-and-deduct
//! step never spans an `.await`, so concurrent requests in a batch cannot observe a negative
//! balance.

mod bucket;

pub use bucket::TokenBucket;

// self
use crate::{_prelude::*, cancel::CancelSignal, config::RateLimit};

/// Shared gate that suspends callers until the bucket yields a token.
#[derive(Debug)]
pub struct RateLimiter {
	bucket: Mutex<TokenBucket>,
	poll_interval: Duration,
}
impl RateLimiter {
	/// Creates a full limiter that polls every `poll_interval` while exhausted.
	pub fn new(limit: RateLimit, poll_interval: Duration) -> Self {
		Self { bucket: Mutex::new(TokenBucket::new(limit)), poll_interval }
	}

	/// Attempts to take `n` tokens without waiting.
	pub fn try_consume(&self, n: u32) -> bool {
		self.bucket.lock().try_consume(n)
	}

	/// Current balance after refreshing the bucket.
	pub fn available(&self) -> f64 {
		self.bucket.lock().tokens_at(Instant::now())
	}

	/// Waits until one token is consumed, polling at the fixed interval.
	///
	/// Returns how many polls were spent waiting (zero when a token was immediately
	/// available). Exhaustion is backpressure, not failure; only a fired `cancel` signal ends the
	/// wait early with [`Error::Cancelled`].
	pub async fn acquire(&self, cancel: &CancelSignal) -> Result<u32> {
		let mut waited = 0;

		loop {
			if cancel.is_cancelled() {
				return Err(Error::Cancelled);
			}
			if self.try_consume(1) {
				return Ok(waited);
			}

			waited += 1;

			tracing::debug!(
				waited,
				interval_ms = self.poll_interval.as_millis() as u64,
				"Rate limit exhausted; waiting before polling the bucket again."
			);

			tokio::select! {
				_ = tokio::time::sleep(self.poll_interval) => {},
				_ = cancel.cancelled() => return Err(Error::Cancelled),
			}
		}
	}
}
