// self
use crate::obs::{FetchKind, FetchOutcome, PageOutcome};

/// Records a fetch outcome via the global metrics recorder (when enabled).
pub fn record_fetch_outcome(kind: FetchKind, outcome: FetchOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"paged_harvest_fetch_total",
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts one consumed page via the global metrics recorder (when enabled).
pub fn record_page_outcome(outcome: PageOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("paged_harvest_page_total", "outcome" => outcome.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
