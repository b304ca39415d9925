/// Common utilities for integration tests
use ethereum_balance_client::{BalanceService, Config, ProviderFactory};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const NODE_KEY: &str = "node-test-key";
pub const MARKET_KEY: &str = "cmc-test-key";

/// Configuration pointing both providers at local mock servers
pub fn test_config(node: &MockServer, market: &MockServer) -> Config {
    let mut config = Config::new(
        format!("{}/v3", node.uri()),
        market.uri(),
        Some(NODE_KEY.to_string()),
        Some(MARKET_KEY.to_string()),
    );
    config.http_timeout_seconds = 2;
    config
}

/// Build the production service stack from configuration
pub fn create_service(config: &Config) -> BalanceService {
    let (balance_provider, rate_provider) =
        ProviderFactory::create_providers(config).expect("providers should build");
    BalanceService::new(balance_provider, rate_provider).with_strategy(config.fetch_strategy())
}

pub fn balance_request(address: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": "eth_getBalance",
        "params": [address, "latest"],
        "id": 1
    })
}

/// Expect exactly `times` balance requests for `address`, answered with `body`
pub async fn mount_balance(server: &MockServer, address: &str, body: Value, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/v3/{}", NODE_KEY)))
        .and(body_json(balance_request(address)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Expect exactly `times` quote requests for base/quote, answered with `body`
pub async fn mount_quote(server: &MockServer, base: &str, quote: &str, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path("/v1/cryptocurrency/quotes/latest"))
        .and(header("X-CMC_PRO_API_KEY", MARKET_KEY))
        .and(query_param("symbol", base))
        .and(query_param("convert", quote))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}
