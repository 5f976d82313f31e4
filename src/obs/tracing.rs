// crates.io
use tracing::{Instrument, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::FetchKind};

/// Span wrapper used by dispatch and pagination.
#[derive(Clone, Debug)]
pub struct FetchSpan {
	span: tracing::Span,
}
impl FetchSpan {
	/// Creates a new span tagged with the provided fetch kind + stage.
	pub fn new(kind: FetchKind, stage: &'static str) -> Self {
		let span = tracing::info_span!(
			"paged_harvest.fetch",
			kind = kind.as_str(),
			stage,
			page = tracing::field::Empty
		);

		Self { span }
	}

	/// Records the page number most recently consumed by a paginated fetch.
	pub fn record_page(&self, page: u32) {
		self.span.record("page", page);
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}
