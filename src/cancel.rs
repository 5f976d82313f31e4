//! Cooperative cancellation for waiting and in-flight requests.

// crates.io
use tokio::sync::watch;
// self
use crate::_prelude::*;

/// One-shot cancellation signal; every clone observes the same state.
///
/// Once triggered the signal stays triggered, so a cancelled client refuses further work.
#[derive(Clone, Debug)]
pub struct CancelSignal {
	sender: Arc<watch::Sender<bool>>,
}
impl CancelSignal {
	/// Creates a signal that has not fired yet.
	pub fn new() -> Self {
		let (sender, _) = watch::channel(false);

		Self { sender: Arc::new(sender) }
	}

	/// Fires the signal, waking every pending [`cancelled`](Self::cancelled) future.
	pub fn cancel(&self) {
		self.sender.send_replace(true);
	}

	/// Returns whether the signal has fired.
	pub fn is_cancelled(&self) -> bool {
		*self.sender.borrow()
	}

	/// Resolves once the signal fires; resolves immediately if it already has.
	pub async fn cancelled(&self) {
		let mut receiver = self.sender.subscribe();

		// The sender lives in `self`, so the channel cannot close while we wait.
		let _ = receiver.wait_for(|fired| *fired).await;
	}
}
impl Default for CancelSignal {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn clones_share_state() {
		let signal = CancelSignal::new();
		let observer = signal.clone();

		assert!(!observer.is_cancelled());

		signal.cancel();

		assert!(observer.is_cancelled());
		tokio::time::timeout(Duration::from_secs(1), observer.cancelled())
			.await
			.expect("Fired signals should resolve immediately.");
	}

	#[tokio::test(start_paused = true)]
	async fn pending_waiters_wake_on_cancel() {
		let signal = CancelSignal::new();
		let waiter = {
			let signal = signal.clone();

			tokio::spawn(async move { signal.cancelled().await })
		};

		tokio::time::sleep(Duration::from_millis(10)).await;
		assert!(!waiter.is_finished());

		signal.cancel();
		waiter.await.expect("Waiter task should complete after cancellation.");
	}
}
