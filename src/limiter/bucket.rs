// self
use crate::{_prelude::*, config::RateLimit};

/// Refillable token budget bounding burst size and steady-state request rate.
///
/// Every observation refreshes the bucket: tokens grow by `fill_rate * elapsed` up to
/// `capacity`, and the refill timestamp moves to the observation instant whether or not a
/// consumption succeeds.
#[derive(Clone, Debug)]
pub struct TokenBucket {
	capacity: u32,
	tokens: f64,
	fill_rate: f64,
	last_refill: Instant,
}
impl TokenBucket {
	/// Creates a full bucket whose refill clock starts now.
	pub fn new(limit: RateLimit) -> Self {
		Self::starting_at(limit, Instant::now())
	}

	/// Creates a full bucket whose refill clock starts at `now`.
	pub fn starting_at(limit: RateLimit, now: Instant) -> Self {
		let fill_rate = if limit.fill_rate.is_finite() { limit.fill_rate.max(0.) } else { 0. };

		Self {
			capacity: limit.capacity,
			tokens: f64::from(limit.capacity),
			fill_rate,
			last_refill: now,
		}
	}

	/// Maximum number of tokens the bucket holds.
	pub fn capacity(&self) -> u32 {
		self.capacity
	}

	/// Tokens added per second.
	pub fn fill_rate(&self) -> f64 {
		self.fill_rate
	}

	/// Consumes `n` tokens using the current instant.
	pub fn try_consume(&mut self, n: u32) -> bool {
		self.try_consume_at(n, Instant::now())
	}

	/// Consumes `n` tokens as observed at `now`.
	///
	/// Returns `true` and deducts exactly `n` tokens when `n` does not exceed the refreshed
	/// balance; otherwise leaves the balance untouched and returns `false`.
	pub fn try_consume_at(&mut self, n: u32, now: Instant) -> bool {
		let available = self.tokens_at(now);
		let wanted = f64::from(n);

		if wanted <= available {
			self.tokens = available - wanted;

			true
		} else {
			false
		}
	}

	/// Refreshes the bucket as observed at `now` and returns the resulting balance.
	pub fn tokens_at(&mut self, now: Instant) -> f64 {
		let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();

		self.tokens = (self.tokens + self.fill_rate * elapsed).min(f64::from(self.capacity));
		self.last_refill = now;

		self.tokens
	}
}
