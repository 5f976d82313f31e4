//! Demonstrates plugging an in-memory transport into [`ApiClient::with_transport`].
//!
//! 1. Implement [`HttpTransport`] to open sessions and [`TransportSession`] to answer requests.
//! 2. Pass the transport to [`ApiClient::with_transport`] with a tight rate limit.
//! 3. Paginate; the client waits on the token bucket instead of failing once the burst is spent.

// std
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
// crates.io
use color_eyre::Result;
use serde_json::json;
use url::Url;
// self
use paged_harvest::{
	client::ApiClient,
	config::{ClientConfig, RateLimit},
	error::TransportError,
	http::{
		ApiRequest, HttpTransport, PreparedRequest, TransportFuture, TransportResponse,
		TransportSession,
	},
	validate::JsonSchema,
};

const LAST_PAGE: u32 = 7;

#[derive(Default)]
struct SyntheticTransport {
	sessions: AtomicU32,
}
impl HttpTransport for SyntheticTransport {
	type Session = SyntheticSession;

	fn open_session(&self) -> TransportFuture<'_, Self::Session> {
		let id = self.sessions.fetch_add(1, Ordering::Relaxed) + 1;

		Box::pin(async move { Ok(SyntheticSession { id, open: AtomicBool::new(true) }) })
	}
}

struct SyntheticSession {
	id: u32,
	open: AtomicBool,
}
impl TransportSession for SyntheticSession {
	fn is_open(&self) -> bool {
		self.open.load(Ordering::Acquire)
	}

	fn close(&self) {
		self.open.store(false, Ordering::Release);
	}

	fn execute<'a>(
		&'a self,
		request: &'a PreparedRequest,
	) -> TransportFuture<'a, TransportResponse> {
		Box::pin(async move {
			let page = request
				.param("page")
				.and_then(|page| page.parse::<u32>().ok())
				.ok_or_else(|| {
					TransportError::Io(std::io::Error::new(
						std::io::ErrorKind::InvalidInput,
						"missing page parameter",
					))
				})?;
			let rows = if page > LAST_PAGE {
				Vec::new()
			} else {
				(0..2).map(|row| json!(format!("session{}-page{page}-row{row}", self.id))).collect()
			};

			Ok(TransportResponse::json(200, &json!(rows)))
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = ClientConfig::builder(Url::parse("https://synthetic.invalid/api")?)
		.rate_limit(RateLimit::new(5, 2.))
		.build()?;
	let client: ApiClient<SyntheticTransport> =
		ApiClient::with_transport(config, SyntheticTransport::default());
	let rows = client
		.paginator()
		.fetch_all(&ApiRequest::get("rows"), &JsonSchema::<Vec<String>>::new())
		.await?;

	for row in &rows {
		println!("{row}");
	}

	println!(
		"Fetched {} rows with {} requests after {} throttled polls.",
		rows.len(),
		client.metrics.requests(),
		client.metrics.throttled_polls()
	);

	Ok(())
}
