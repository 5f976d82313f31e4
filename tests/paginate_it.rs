// std
use std::{
	collections::BTreeMap,
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	time::Duration,
};
// crates.io
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;
// self
use paged_harvest::{
	client::ApiClient,
	config::{ClientConfig, RateLimit},
	error::{Error, TransportError},
	http::{
		ApiRequest, HttpTransport, PreparedRequest, TransportFuture, TransportResponse,
		TransportSession,
	},
	validate::{DataPage, JsonSchema},
};

#[derive(Clone, Debug)]
enum Reply {
	Json(u16, Value),
	Refused,
	Stall,
}

#[derive(Debug, Default)]
struct Script {
	replies: BTreeMap<u32, (Duration, Reply)>,
	fallback_data: bool,
	requested: Mutex<Vec<u32>>,
}
impl Script {
	fn data(mut self, page: u32, delay_ms: u64) -> Self {
		self.replies.insert(page, (Duration::from_millis(delay_ms), Reply::Json(200, pools(page))));

		self
	}

	fn empty(mut self, page: u32, delay_ms: u64) -> Self {
		let reply = Reply::Json(200, json!({ "data": [] }));

		self.replies.insert(page, (Duration::from_millis(delay_ms), reply));

		self
	}

	fn reply(mut self, page: u32, reply: Reply) -> Self {
		self.replies.insert(page, (Duration::ZERO, reply));

		self
	}

	fn reply_for(&self, page: u32) -> (Duration, Reply) {
		self.replies.get(&page).cloned().unwrap_or_else(|| {
			let body = if self.fallback_data { pools(page) } else { json!({ "data": [] }) };

			(Duration::ZERO, Reply::Json(200, body))
		})
	}

	fn requested(&self) -> Vec<u32> {
		let mut pages = self.requested.lock().clone();

		pages.sort_unstable();

		pages
	}
}

struct ScriptedSession {
	script: Arc<Script>,
	open: AtomicBool,
}
impl TransportSession for ScriptedSession {
	fn is_open(&self) -> bool {
		self.open.load(Ordering::SeqCst)
	}

	fn close(&self) {
		self.open.store(false, Ordering::SeqCst);
	}

	fn execute<'a>(
		&'a self,
		request: &'a PreparedRequest,
	) -> TransportFuture<'a, TransportResponse> {
		Box::pin(async move {
			let page = request
				.param("page")
				.and_then(|page| page.parse().ok())
				.expect("Paginated requests should carry a numeric page parameter.");

			self.script.requested.lock().push(page);

			let (delay, reply) = self.script.reply_for(page);

			tokio::time::sleep(delay).await;

			match reply {
				Reply::Json(status, body) => Ok(TransportResponse::json(status, &body)),
				Reply::Refused => Err(TransportError::Io(std::io::Error::new(
					std::io::ErrorKind::ConnectionRefused,
					"connection refused",
				))),
				Reply::Stall => std::future::pending().await,
			}
		})
	}
}

struct ScriptedTransport {
	script: Arc<Script>,
}
impl HttpTransport for ScriptedTransport {
	type Session = ScriptedSession;

	fn open_session(&self) -> TransportFuture<'_, Self::Session> {
		let session = ScriptedSession { script: self.script.clone(), open: AtomicBool::new(true) };

		Box::pin(async move { Ok(session) })
	}
}

#[derive(Debug, PartialEq, Deserialize)]
struct Pool {
	id: String,
}

fn pools(page: u32) -> Value {
	json!({ "data": [{ "id": format!("p{page}a") }, { "id": format!("p{page}b") }] })
}

fn client(script: Script) -> (ApiClient<ScriptedTransport>, Arc<Script>) {
	let script = Arc::new(script);
	let config = ClientConfig::builder(
		Url::parse("https://api.example.com/api/v3/").expect("Base URL fixture should parse."),
	)
	.rate_limit(RateLimit::new(100, 100.))
	.build()
	.expect("Client configuration fixture should be valid.");

	(ApiClient::with_transport(config, ScriptedTransport { script: script.clone() }), script)
}

fn ids(pools: &[Pool]) -> Vec<&str> {
	pools.iter().map(|pool| pool.id.as_str()).collect()
}

fn schema() -> JsonSchema<DataPage<Pool>> {
	JsonSchema::new()
}

#[tokio::test(start_paused = true)]
async fn collects_pages_in_order_until_the_empty_page() {
	// Earlier pages of each batch answer last.
	let (client, script) = client(
		Script::default()
			.data(1, 300)
			.data(2, 200)
			.data(3, 100)
			.data(4, 300)
			.data(5, 100)
			.empty(6, 0),
	);
	let pools = client
		.paginator()
		.fetch_all(&ApiRequest::get("networks/eth/pools"), &schema())
		.await
		.expect("Pagination should succeed.");

	assert_eq!(
		ids(&pools),
		["p1a", "p1b", "p2a", "p2b", "p3a", "p3b", "p4a", "p4b", "p5a", "p5b"]
	);
	assert_eq!(script.requested(), [1, 2, 3, 4, 5, 6]);
}

#[tokio::test(start_paused = true)]
async fn mismatched_page_is_skipped_and_pagination_continues() {
	let (client, script) = client(
		Script::default()
			.data(1, 0)
			.reply(2, Reply::Json(200, json!({ "unexpected": true })))
			.data(3, 0)
			.data(4, 0)
			.empty(5, 10),
	);
	let pools = client
		.paginator()
		.fetch_all(&ApiRequest::get("pools"), &schema())
		.await
		.expect("Pagination should succeed.");

	assert_eq!(ids(&pools), ["p1a", "p1b", "p3a", "p3b", "p4a", "p4b"]);
	assert_eq!(script.requested(), [1, 2, 3, 4, 5, 6]);
	assert_eq!(client.metrics.mismatches(), 1);

	let diagnostics = client.validator().recent_diagnostics();

	assert_eq!(diagnostics.len(), 1);
	assert_eq!(diagnostics[0].payload, json!({ "unexpected": true }));
}

#[tokio::test]
async fn trailing_api_error_is_requested_again_in_the_next_batch() {
	let envelope = json!({ "errors": [{ "status": "429", "title": "Too many requests" }] });
	let (client, script) = client(
		Script::default().data(1, 0).data(2, 0).reply(3, Reply::Json(429, envelope)).data(4, 0),
	);
	let pools = client
		.paginator()
		.fetch_all(&ApiRequest::get("pools"), &schema())
		.await
		.expect("Pagination should succeed.");

	assert_eq!(ids(&pools), ["p1a", "p1b", "p2a", "p2b", "p4a", "p4b"]);
	assert_eq!(script.requested(), [1, 2, 3, 3, 4, 5]);
	assert_eq!(client.metrics.api_errors(), 2);
}

#[tokio::test(start_paused = true)]
async fn empty_first_page_yields_nothing() {
	// The slow empty page lets the rest of its batch go out first.
	let (client, script) = client(Script::default().empty(1, 10));
	let pools = client
		.paginator()
		.fetch_all(&ApiRequest::get("pools"), &schema())
		.await
		.expect("Pagination should succeed.");

	assert!(pools.is_empty());
	assert_eq!(script.requested(), [1, 2, 3]);
}

#[tokio::test]
async fn batch_without_data_stops_pagination() {
	let envelope = json!({ "errors": [{ "status": "500", "title": "Upstream down" }] });
	let (client, script) = client(Script {
		fallback_data: true,
		..Script::default()
			.reply(1, Reply::Json(500, envelope.clone()))
			.reply(2, Reply::Json(500, envelope.clone()))
			.reply(3, Reply::Json(500, envelope))
	});
	let pools = client
		.paginator()
		.fetch_all(&ApiRequest::get("pools"), &schema())
		.await
		.expect("Soft failures should not fail pagination.");

	assert!(pools.is_empty());
	assert_eq!(script.requested(), [1, 2, 3]);
}

#[tokio::test]
async fn page_cap_bounds_requests() {
	let (client, script) = client(Script { fallback_data: true, ..Default::default() });
	let pools = client
		.paginator()
		.with_max_pages(4)
		.fetch_all(&ApiRequest::get("pools"), &schema())
		.await
		.expect("Pagination should succeed.");

	assert_eq!(pools.len(), 8);
	assert_eq!(script.requested(), [1, 2, 3, 4]);
}

#[tokio::test]
async fn transport_failure_aborts_with_page_context() {
	let (client, _) = client(Script::default().data(1, 0).reply(2, Reply::Refused).data(3, 0));
	let err = client
		.paginator()
		.fetch_all(&ApiRequest::get("pools"), &schema())
		.await
		.expect_err("Transport failures should abort pagination.");

	match err {
		Error::Dispatch { endpoint, page, source } => {
			assert_eq!(endpoint, "pools");
			assert_eq!(page, Some(2));
			assert!(matches!(source, TransportError::Io(_)));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	assert_eq!(client.sessions().stats().closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_does_not_wait_for_stalled_pages() {
	let (client, _) =
		client(Script::default().reply(1, Reply::Refused).reply(2, Reply::Stall).data(3, 0));
	let outcome = tokio::time::timeout(
		Duration::from_secs(3_600),
		client.paginator().fetch_all(&ApiRequest::get("pools"), &schema()),
	)
	.await
	.expect("A failed first page should end pagination without waiting on page 2.");

	match outcome {
		Err(Error::Dispatch { page, source: TransportError::Io(_), .. }) =>
			assert_eq!(page, Some(1)),
		other => panic!("Unexpected outcome: {other:?}."),
	}

	assert_eq!(client.sessions().stats().closed(), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_page_does_not_wait_for_stalled_pages() {
	let (client, _) = client(Script::default().empty(1, 0).reply(2, Reply::Stall));
	let pools = tokio::time::timeout(
		Duration::from_secs(3_600),
		client.paginator().fetch_all(&ApiRequest::get("pools"), &schema()),
	)
	.await
	.expect("An empty first page should end pagination without waiting on page 2.")
	.expect("Pagination should succeed.");

	assert!(pools.is_empty());
	assert!(!client.cancel_signal().is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_fetching_further_pages() {
	let (client, script) = client(Script::default().data(1, 0).reply(2, Reply::Stall).data(3, 0));
	let client = Arc::new(client);
	let task = tokio::spawn({
		let client = client.clone();

		async move { client.paginator().fetch_all(&ApiRequest::get("pools"), &schema()).await }
	});

	tokio::time::sleep(Duration::from_millis(50)).await;
	client.cancel_signal().cancel();

	let result = task.await.expect("Pagination task should not panic.");

	assert!(matches!(result, Err(Error::Cancelled)));
	assert_eq!(script.requested(), [1, 2, 3]);
	assert_eq!(client.sessions().stats().closed(), 1);
}
