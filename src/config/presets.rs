//! Known API targets expressed as configuration values instead of client subclasses.

// self
use crate::{
	_prelude::*,
	config::{ClientConfig, RateLimit},
	error::ConfigError,
	http::ApiRequest,
};

/// Base URL of the authenticated market-data API.
pub const PRO_API_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";
/// Header carrying the market-data API key.
pub const PRO_API_KEY_HEADER: &str = "x-cg-pro-api-key";
/// Base URL of the public on-chain terminal API.
pub const TERMINAL_BASE_URL: &str = "https://app.geckoterminal.com/api/p1";
/// Related resources requested alongside each pool.
pub const POOL_INCLUDE: &str = "dex,dex.network,dex.network.network_metric,tokens";
/// Browser user agent the terminal API expects.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                                      AppleWebKit/537.36 (KHTML, like Gecko) \
                                      Chrome/123.0.0.0 Safari/537.36";

/// Authenticated market-data API using the provided key and rate budget.
pub fn pro_api(
	api_key: impl Into<String>,
	rate_limit: RateLimit,
) -> Result<ClientConfig, ConfigError> {
	ClientConfig::builder(parse_base(PRO_API_BASE_URL)?)
		.rate_limit(rate_limit)
		.header(PRO_API_KEY_HEADER, api_key)
		.build()
}

/// Public on-chain terminal API with the provided rate budget.
pub fn terminal(rate_limit: RateLimit) -> Result<ClientConfig, ConfigError> {
	ClientConfig::builder(parse_base(TERMINAL_BASE_URL)?).rate_limit(rate_limit).build()
}

/// Base request for walking every liquidity pool listed on `network`.
///
/// Page numbers are appended by the paginator.
pub fn pool_universe(network: &str) -> ApiRequest {
	ApiRequest::get(format!("{network}/pools"))
		.with_param("include", POOL_INCLUDE)
		.with_param("include_network_metrics", "true")
		.with_header("User-Agent", BROWSER_USER_AGENT)
}

fn parse_base(url: &str) -> Result<Url, ConfigError> {
	Url::parse(url).map_err(|_| ConfigError::UnsupportedScheme { url: url.to_owned() })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::Method;

	#[test]
	fn pro_api_attaches_key_header() {
		let config =
			pro_api("demo-key", RateLimit::default()).expect("Pro API preset should be valid.");

		assert_eq!(config.headers.get(PRO_API_KEY_HEADER).map(String::as_str), Some("demo-key"));
		assert_eq!(
			config.endpoint_url("coins/list").expect("Endpoint should join.").as_str(),
			"https://pro-api.coingecko.com/api/v3/coins/list"
		);
	}

	#[test]
	fn terminal_has_no_default_headers() {
		let config =
			terminal(RateLimit::new(30, 1. / 60.)).expect("Terminal preset should be valid.");

		assert!(config.headers.is_empty());
		assert_eq!(config.rate_limit.capacity, 30);
	}

	#[test]
	fn pool_universe_carries_include_params() {
		let request = pool_universe("solana");

		assert_eq!(request.endpoint, "solana/pools");
		assert_eq!(request.method, Method::Get);
		assert_eq!(
			request.params,
			vec![
				("include".to_owned(), POOL_INCLUDE.to_owned()),
				("include_network_metrics".to_owned(), "true".to_owned()),
			]
		);
		assert!(request.headers.contains_key("user-agent"));
	}
}
