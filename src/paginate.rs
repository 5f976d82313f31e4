//! Batched page fetching on top of [`ApiClient`].
//!
//! Pages are requested [`BATCH_SIZE`] at a time and consumed in ascending page order regardless
//! of completion order. The cursor only moves past pages that produced data, so a soft failure
//! at the tail of a batch is requested again at the head of the next one. A valid empty page
//! ends the fetch; a batch without any data page ends it as well. Pages behind an empty page or a
//! transport failure are abandoned without waiting for their responses.

// crates.io
use futures::stream::{FuturesOrdered, StreamExt};
// self
use crate::{
	_prelude::*,
	client::ApiClient,
	config::BATCH_SIZE,
	http::{ApiRequest, HttpTransport},
	obs::{self, FetchKind, FetchOutcome, FetchSpan, PageOutcome},
	validate::{PageItems, Schema, Validation},
};

type Items<S> = Vec<<<S as Schema>::Output as PageItems>::Item>;

/// Query parameter carrying the page number unless overridden.
pub const DEFAULT_PAGE_PARAM: &str = "page";

/// Drives a multi-page fetch through one client.
pub struct Paginator<'a, T>
where
	T: ?Sized + HttpTransport,
{
	client: &'a ApiClient<T>,
	page_param: String,
	max_pages: Option<u32>,
}
impl<'a, T> Paginator<'a, T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a paginator that numbers pages through [`DEFAULT_PAGE_PARAM`].
	pub fn new(client: &'a ApiClient<T>) -> Self {
		Self { client, page_param: DEFAULT_PAGE_PARAM.into(), max_pages: None }
	}

	/// Uses `name` as the page-number query parameter.
	pub fn with_page_param(mut self, name: impl Into<String>) -> Self {
		self.page_param = name.into();

		self
	}

	/// Never requests pages numbered above `max_pages`.
	pub fn with_max_pages(mut self, max_pages: u32) -> Self {
		self.max_pages = Some(max_pages);

		self
	}

	/// Fetches pages `1, 2, ...` of `base` and returns every item in page order.
	///
	/// API error envelopes and shape mismatches skip their page. A transport failure aborts the
	/// whole fetch with [`Error::Dispatch`] tagged with the failing page; cancellation aborts it
	/// with [`Error::Cancelled`].
	pub async fn fetch_all<S>(&self, base: &ApiRequest, schema: &S) -> Result<Items<S>>
	where
		S: Schema,
		S::Output: PageItems,
	{
		let span = FetchSpan::new(FetchKind::Paginate, "fetch_all");

		obs::record_fetch_outcome(FetchKind::Paginate, FetchOutcome::Attempt);

		let result = span.instrument(self.run(base, schema, &span)).await;

		obs::record_fetch_outcome(FetchKind::Paginate, FetchOutcome::of(&result));

		result
	}

	async fn run<S>(&self, base: &ApiRequest, schema: &S, span: &FetchSpan) -> Result<Items<S>>
	where
		S: Schema,
		S::Output: PageItems,
	{
		let mut items = Vec::new();
		let mut cursor = 1;

		loop {
			if self.client.cancel_signal().is_cancelled() {
				return Err(Error::Cancelled);
			}

			let last = match self.max_pages {
				Some(max) => (cursor + BATCH_SIZE - 1).min(max),
				None => cursor + BATCH_SIZE - 1,
			};

			if cursor > last {
				tracing::debug!(cursor, "Page cap reached.");

				break;
			}

			let batch = (cursor..=last)
				.map(|page| (page, base.clone().set_param(&self.page_param, page.to_string())))
				.collect::<Vec<_>>();
			// Dropping the stream cancels requests still in flight.
			let mut sends = batch
				.iter()
				.map(|(page, request)| async move { (*page, self.client.send(request).await) })
				.collect::<FuturesOrdered<_>>();
			let mut progressed = false;

			while let Some((page, outcome)) = sends.next().await {
				let raw = outcome.map_err(|err| err.with_page(page))?;

				span.record_page(page);

				match self.client.classify(&raw, schema) {
					Validation::Valid(value) => {
						let page_items = value.into_items();

						if page_items.is_empty() {
							obs::record_page_outcome(PageOutcome::Empty);
							tracing::debug!(page, total = items.len(), "Reached an empty page.");

							return Ok(items);
						}

						obs::record_page_outcome(PageOutcome::Data);
						tracing::debug!(page, count = page_items.len(), "Collected page.");
						items.extend(page_items);

						cursor = page + 1;
						progressed = true;
					},
					Validation::ApiError(_) => {
						obs::record_page_outcome(PageOutcome::ApiError);
						tracing::warn!(page, "Skipping page with an API error.");
					},
					Validation::Mismatch(_) => {
						obs::record_page_outcome(PageOutcome::Mismatch);
						tracing::warn!(page, "Skipping page with an unexpected shape.");
					},
				}
			}

			if !progressed {
				tracing::warn!(cursor, "Batch produced no data; stopping.");

				break;
			}
		}

		Ok(items)
	}
}
impl<T> Debug for Paginator<'_, T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Paginator")
			.field("page_param", &self.page_param)
			.field("max_pages", &self.max_pages)
			.finish()
	}
}
