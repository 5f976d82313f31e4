//! Rate-limited, session-recycling pagination runtime for JSON REST APIs.
//!
//! An [`ApiClient`](client::ApiClient) gates every request through a token bucket and reuses one
//! transport session until it goes stale. Its validator tells API error envelopes apart from
//! shape mismatches. [`Paginator`](paginate::Paginator) drives
//! batched page fetches on top of it.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod limiter;
pub mod obs;
pub mod paginate;
pub mod session;
pub mod validate;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// self
	use crate::config::{ClientConfig, RateLimit};
	#[cfg(feature = "reqwest")]
	use crate::{client::ApiClient, http::ReqwestTransport};

	/// Client type alias used by reqwest-backed tests.
	#[cfg(feature = "reqwest")]
	pub type ReqwestTestClient = ApiClient<ReqwestTransport>;

	/// Rate limit generous enough that tests never hit the wait loop.
	pub const UNTHROTTLED: RateLimit = RateLimit { capacity: 1_000, fill_rate: 1_000. };

	/// Builds a [`ClientConfig`] pointing at `base_url` with an unthrottled rate limit.
	pub fn test_config(base_url: &str) -> ClientConfig {
		ClientConfig::builder(
			Url::parse(base_url).expect("Mock server base URL should parse successfully."),
		)
		.rate_limit(UNTHROTTLED)
		.build()
		.expect("Test client configuration should be valid.")
	}

	/// Constructs a reqwest-backed [`ApiClient`] against the provided mock server base URL.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_client(base_url: &str) -> ReqwestTestClient {
		ApiClient::new(test_config(base_url))
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use tokio::time::Instant;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use color_eyre as _;
#[cfg(all(test, not(feature = "reqwest")))] use httpmock as _;
