//! Walks every pool of a network through the terminal preset, served by a local mock API.
//!
//! Page 2 answers with an error envelope and page 4 is empty, so the run collects pages 1 and 3
//! and stops at page 4 without looking at the rest of that batch.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde::Deserialize;
use serde_json::json;
use url::Url;
// self
use paged_harvest::{
	client::ApiClient,
	config::{ClientConfig, RateLimit, presets},
	validate::{DataPage, JsonSchema},
};

#[derive(Debug, Deserialize)]
struct Pool {
	id: String,
	attributes: PoolAttributes,
}

#[derive(Debug, Deserialize)]
struct PoolAttributes {
	name: String,
	reserve_in_usd: String,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	for (page, body) in [
		(1, json!({ "data": [pool("eth_0x01", "WETH / USDC", "1200000.5")] })),
		(2, json!({ "errors": [{ "status": "503", "title": "Service unavailable" }] })),
		(3, json!({ "data": [pool("eth_0x03", "PEPE / WETH", "81000.0")] })),
		(4, json!({ "data": [] })),
	] {
		server
			.mock_async(|when, then| {
				when.method(GET)
					.path("/api/p1/eth/pools")
					.query_param("page", page.to_string())
					.header("User-Agent", presets::BROWSER_USER_AGENT);
				then.status(200).json_body(body);
			})
			.await;
	}

	// Same shape as `presets::terminal`, pointed at the mock server.
	let config = ClientConfig::builder(Url::parse(&server.url("/api/p1"))?)
		.rate_limit(RateLimit::default())
		.build()?;
	let client = ApiClient::new(config);
	let pools = client
		.paginator()
		.fetch_all(&presets::pool_universe("eth"), &JsonSchema::<DataPage<Pool>>::new())
		.await?;

	for pool in &pools {
		let PoolAttributes { name, reserve_in_usd } = &pool.attributes;

		println!("{} {name} reserve=${reserve_in_usd}.", pool.id);
	}

	println!(
		"Collected {} pools; {} API errors; {} tokens left.",
		pools.len(),
		client.metrics.api_errors(),
		client.limiter().available().floor()
	);

	client.close().await;

	Ok(())
}

fn pool(id: &str, name: &str, reserve: &str) -> serde_json::Value {
	json!({ "id": id, "type": "pool", "attributes": { "name": name, "reserve_in_usd": reserve } })
}
