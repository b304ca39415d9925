/// Provider module - abstracts the two upstream APIs
/// Clean interface for dependency injection and testing
pub mod jsonrpc;
mod market;
mod node;

pub use market::{extract_price, CoinMarketCapRateProvider, API_KEY_HEADER, QUOTES_PATH};
pub use node::JsonRpcBalanceProvider;

use crate::error::FetchError;
use crate::types::{BalanceQuery, ConversionRate, RawBalance};
use crate::Config;
use async_trait::async_trait;
use mockall::automock;
use std::sync::Arc;
use std::time::Duration;

/// Name of the node credential, as read from the environment
pub const NODE_API_KEY: &str = "INFURA_API_KEY";

/// Name of the market-data credential, as read from the environment
pub const MARKET_DATA_API_KEY: &str = "CMC_PRO_API_KEY";

/// On-chain balance lookup
#[automock]
#[async_trait]
pub trait BalanceProvider: Send + Sync {
    /// Balance of `query.address` at the latest block, in wei
    async fn fetch_raw_balance(&self, query: &BalanceQuery) -> Result<RawBalance, FetchError>;
}

/// Market price lookup
#[automock]
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Price of one `base_symbol` in `quote_symbol`
    async fn fetch_conversion_rate(
        &self,
        base_symbol: &str,
        quote_symbol: &str,
    ) -> Result<ConversionRate, FetchError>;
}

/// Returns the credential if it is present and non-blank
pub(crate) fn require_credential<'a>(
    credential: Option<&'a str>,
    name: &str,
) -> Result<&'a str, FetchError> {
    match credential {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(FetchError::credential_missing(name)),
    }
}

/// Provider factory for dependency injection
pub struct ProviderFactory;

impl ProviderFactory {
    /// One pooled HTTP client shared by both providers
    pub fn http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))
    }

    pub fn create_balance_provider(
        config: &Config,
        client: reqwest::Client,
    ) -> Arc<dyn BalanceProvider> {
        Arc::new(JsonRpcBalanceProvider::new(
            client,
            config.node_rpc_url.clone(),
            config.node_api_key().map(str::to_string),
        ))
    }

    pub fn create_rate_provider(config: &Config, client: reqwest::Client) -> Arc<dyn RateProvider> {
        Arc::new(CoinMarketCapRateProvider::new(
            client,
            config.market_data_url.clone(),
            config.market_data_api_key().map(str::to_string),
        ))
    }

    /// Create both production providers from configuration
    pub fn create_providers(
        config: &Config,
    ) -> anyhow::Result<(Arc<dyn BalanceProvider>, Arc<dyn RateProvider>)> {
        let client = Self::http_client(config.http_timeout_seconds)?;
        Ok((
            Self::create_balance_provider(config, client.clone()),
            Self::create_rate_provider(config, client),
        ))
    }

    /// Create mock providers for testing
    #[cfg(test)]
    pub fn create_mock_providers() -> (MockBalanceProvider, MockRateProvider) {
        (MockBalanceProvider::new(), MockRateProvider::new())
    }
}
