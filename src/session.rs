//! Recyclable transport session owned by a client.
//!
//! [`SessionManager::get_session`] is the single acquisition point. The staleness check and the
//! swap to a replacement handle happen while one async lock is held, so concurrent requests that
//! observe a stale session never open more than one new handle.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	error::TransportError,
	http::{HttpTransport, TransportSession},
};

/// Lifecycle counters for a [`SessionManager`].
#[derive(Debug, Default)]
pub struct SessionStats {
	opened: AtomicU64,
	closed: AtomicU64,
}
impl SessionStats {
	/// Number of sessions opened so far.
	pub fn opened(&self) -> u64 {
		self.opened.load(Ordering::Relaxed)
	}

	/// Number of sessions closed so far.
	pub fn closed(&self) -> u64 {
		self.closed.load(Ordering::Relaxed)
	}
}

struct SessionSlot<S> {
	handle: Arc<S>,
	created_at: Instant,
}

/// Owns one reusable session handle and recycles it once closed or older than the TTL.
pub struct SessionManager<T>
where
	T: ?Sized + HttpTransport,
{
	transport: Arc<T>,
	ttl: Duration,
	slot: AsyncMutex<Option<SessionSlot<T::Session>>>,
	stats: SessionStats,
}
impl<T> SessionManager<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a manager that opens sessions from `transport` and recycles them after `ttl`.
	pub fn new(transport: impl Into<Arc<T>>, ttl: Duration) -> Self {
		Self {
			transport: transport.into(),
			ttl,
			slot: AsyncMutex::new(None),
			stats: Default::default(),
		}
	}

	/// Session lifecycle counters.
	pub fn stats(&self) -> &SessionStats {
		&self.stats
	}

	/// Returns the current session, replacing it first when it is missing or unusable.
	pub async fn get_session(&self) -> Result<Arc<T::Session>, TransportError> {
		let mut slot = self.slot.lock().await;
		let now = Instant::now();

		if let Some(current) = slot.as_ref() {
			let age = now.saturating_duration_since(current.created_at);

			if current.handle.is_open() && age <= self.ttl {
				return Ok(current.handle.clone());
			}

			tracing::debug!(
				age_secs = age.as_secs(),
				open = current.handle.is_open(),
				"Recycling transport session."
			);
		}

		if let Some(stale) = slot.take() {
			self.release(&stale.handle);
		}

		let handle = Arc::new(self.transport.open_session().await?);

		self.stats.opened.fetch_add(1, Ordering::Relaxed);
		*slot = Some(SessionSlot { handle: handle.clone(), created_at: Instant::now() });

		Ok(handle)
	}

	/// Closes the current session, if any.
	pub async fn close(&self) {
		if let Some(current) = self.slot.lock().await.take() {
			self.release(&current.handle);
		}
	}

	// Handles that already report closed are dropped without a second close.
	fn release(&self, handle: &T::Session) {
		if handle.is_open() {
			handle.close();
			self.stats.closed.fetch_add(1, Ordering::Relaxed);
		}
	}
}
impl<T> Debug for SessionManager<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionManager")
			.field("ttl", &self.ttl)
			.field("opened", &self.stats.opened())
			.field("closed", &self.stats.closed())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::AtomicBool;
	// self
	use super::*;
	use crate::http::{PreparedRequest, TransportFuture, TransportResponse};

	#[derive(Debug, Default)]
	struct CountingSession {
		open: AtomicBool,
		closes: AtomicU64,
	}
	impl TransportSession for CountingSession {
		fn is_open(&self) -> bool {
			self.open.load(Ordering::SeqCst)
		}

		fn close(&self) {
			self.open.store(false, Ordering::SeqCst);
			self.closes.fetch_add(1, Ordering::SeqCst);
		}

		fn execute<'a>(
			&'a self,
			_request: &'a PreparedRequest,
		) -> TransportFuture<'a, TransportResponse> {
			Box::pin(async { Ok(TransportResponse::new(200, "{}")) })
		}
	}

	#[derive(Debug, Default)]
	struct CountingTransport {
		opened: AtomicU64,
	}
	impl HttpTransport for CountingTransport {
		type Session = CountingSession;

		fn open_session(&self) -> TransportFuture<'_, Self::Session> {
			self.opened.fetch_add(1, Ordering::SeqCst);

			Box::pin(async {
				tokio::task::yield_now().await;

				Ok(CountingSession { open: AtomicBool::new(true), closes: AtomicU64::new(0) })
			})
		}
	}

	fn manager() -> SessionManager<CountingTransport> {
		SessionManager::new(CountingTransport::default(), Duration::from_secs(600))
	}

	#[tokio::test(start_paused = true)]
	async fn reuses_handle_within_ttl() {
		let manager = manager();
		let first = manager.get_session().await.expect("First session should open.");

		tokio::time::advance(Duration::from_secs(600)).await;

		let second = manager.get_session().await.expect("Session should be reused.");

		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(manager.stats().opened(), 1);
		assert_eq!(first.closes.load(Ordering::SeqCst), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn recycles_after_ttl_and_closes_old_handle_once() {
		let manager = manager();
		let first = manager.get_session().await.expect("First session should open.");

		tokio::time::advance(Duration::from_secs(601)).await;

		let second = manager.get_session().await.expect("Stale session should be replaced.");
		let third = manager.get_session().await.expect("Fresh session should be reused.");

		assert!(!Arc::ptr_eq(&first, &second));
		assert!(Arc::ptr_eq(&second, &third));
		assert!(!first.is_open());
		assert_eq!(first.closes.load(Ordering::SeqCst), 1);
		assert_eq!(manager.stats().opened(), 2);
		assert_eq!(manager.stats().closed(), 1);
	}

	#[tokio::test]
	async fn recycles_handle_reported_closed() {
		let manager = manager();
		let first = manager.get_session().await.expect("First session should open.");

		first.close();

		let second = manager.get_session().await.expect("Closed session should be replaced.");

		assert!(!Arc::ptr_eq(&first, &second));
		assert!(second.is_open());
		assert_eq!(first.closes.load(Ordering::SeqCst), 1);
		assert_eq!(manager.stats().closed(), 0);
		assert_eq!(manager.stats().opened(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_acquisition_opens_one_replacement() {
		let manager = manager();
		let first = manager.get_session().await.expect("First session should open.");

		tokio::time::advance(Duration::from_secs(700)).await;

		let (a, b, c) =
			tokio::join!(manager.get_session(), manager.get_session(), manager.get_session());
		let a = a.expect("Concurrent acquisition should succeed.");
		let b = b.expect("Concurrent acquisition should succeed.");
		let c = c.expect("Concurrent acquisition should succeed.");

		assert!(Arc::ptr_eq(&a, &b));
		assert!(Arc::ptr_eq(&b, &c));
		assert_eq!(manager.transport.opened.load(Ordering::SeqCst), 2);
		assert_eq!(first.closes.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn close_is_noop_without_session() {
		let manager = manager();

		manager.close().await;
		assert_eq!(manager.stats().closed(), 0);

		let session = manager.get_session().await.expect("Session should open.");

		manager.close().await;
		manager.close().await;

		assert!(!session.is_open());
		assert_eq!(manager.stats().closed(), 1);
	}
}
