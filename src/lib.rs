/// Ethereum balance conversion client
/// Fetches an account balance and a market rate, and values one in terms of the other
use std::fmt;

pub mod error;
pub mod providers;
pub mod services;
pub mod types;
pub mod validation;

// Re-export key types for public API
pub use error::FetchError;
pub use providers::{BalanceProvider, ProviderFactory, RateProvider};
pub use services::{BalanceService, BalanceServiceTrait, FetchStrategy};
pub use types::{BalanceQuery, ConversionRate, ConvertedBalance, RawBalance, ScaledBalance};

use validation::Validator;

pub const DEFAULT_NODE_RPC_URL: &str = "https://mainnet.infura.io/v3";
pub const DEFAULT_MARKET_DATA_URL: &str = "https://pro-api.coinmarketcap.com";
pub const DEFAULT_BASE_SYMBOL: &str = "ETH";
pub const DEFAULT_QUOTE_SYMBOL: &str = "USDT";

/// Library configuration
#[derive(Clone)]
pub struct Config {
    pub node_rpc_url: String,
    pub market_data_url: String,
    node_api_key: Option<String>,        // Private to prevent accidental exposure
    market_data_api_key: Option<String>, // Private to prevent accidental exposure
    pub base_symbol: String,
    pub quote_symbol: String,
    pub log_level: String,
    pub http_timeout_seconds: u64,
    pub refresh_interval_seconds: u64,
    pub concurrent_fetch: bool,
}

// Custom Debug implementation that redacts sensitive information
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(key: &Option<String>) -> &'static str {
            if key.is_some() {
                "[REDACTED]"
            } else {
                "[MISSING]"
            }
        }

        f.debug_struct("Config")
            .field("node_rpc_url", &self.node_rpc_url)
            .field("market_data_url", &self.market_data_url)
            .field("node_api_key", &redact(&self.node_api_key))
            .field("market_data_api_key", &redact(&self.market_data_api_key))
            .field("base_symbol", &self.base_symbol)
            .field("quote_symbol", &self.quote_symbol)
            .field("log_level", &self.log_level)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .field("refresh_interval_seconds", &self.refresh_interval_seconds)
            .field("concurrent_fetch", &self.concurrent_fetch)
            .finish()
    }
}

impl Config {
    /// Create a new Config instance (for testing)
    pub fn new(
        node_rpc_url: String,
        market_data_url: String,
        node_api_key: Option<String>,
        market_data_api_key: Option<String>,
    ) -> Self {
        Self {
            node_rpc_url,
            market_data_url,
            node_api_key,
            market_data_api_key,
            base_symbol: DEFAULT_BASE_SYMBOL.to_string(),
            quote_symbol: DEFAULT_QUOTE_SYMBOL.to_string(),
            log_level: "info".to_string(),
            http_timeout_seconds: 15,
            refresh_interval_seconds: 5,
            concurrent_fetch: false,
        }
    }

    /// Node credential, if configured
    pub fn node_api_key(&self) -> Option<&str> {
        self.node_api_key.as_deref()
    }

    /// Market-data credential, if configured
    pub fn market_data_api_key(&self) -> Option<&str> {
        self.market_data_api_key.as_deref()
    }

    pub fn fetch_strategy(&self) -> FetchStrategy {
        if self.concurrent_fetch {
            FetchStrategy::Concurrent
        } else {
            FetchStrategy::Sequential
        }
    }

    /// Create configuration from environment variables
    ///
    /// Credentials are optional here: a missing key surfaces as
    /// `FetchError::CredentialMissing` on the affected call instead.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let node_rpc_url =
            std::env::var("NODE_RPC_URL").unwrap_or_else(|_| DEFAULT_NODE_RPC_URL.to_string());
        let market_data_url = std::env::var("MARKET_DATA_URL")
            .unwrap_or_else(|_| DEFAULT_MARKET_DATA_URL.to_string());

        let node_api_key = non_empty_env(providers::NODE_API_KEY);
        let market_data_api_key = non_empty_env(providers::MARKET_DATA_API_KEY);

        let base_symbol =
            std::env::var("BASE_SYMBOL").unwrap_or_else(|_| DEFAULT_BASE_SYMBOL.to_string());
        let quote_symbol =
            std::env::var("QUOTE_SYMBOL").unwrap_or_else(|_| DEFAULT_QUOTE_SYMBOL.to_string());

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let http_timeout_seconds = match std::env::var("HTTP_TIMEOUT_SECONDS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("Invalid HTTP_TIMEOUT_SECONDS value"))?,
            Err(_) => 15,
        };

        let refresh_interval_seconds = match std::env::var("REFRESH_INTERVAL_SECONDS") {
            Ok(v) => v
                .parse::<u64>()
                .map_err(|_| anyhow::anyhow!("Invalid REFRESH_INTERVAL_SECONDS value"))?,
            Err(_) => 5,
        };

        let concurrent_fetch = std::env::var("FETCH_CONCURRENTLY")
            .ok()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            node_rpc_url,
            market_data_url,
            node_api_key,
            market_data_api_key,
            base_symbol,
            quote_symbol,
            log_level,
            http_timeout_seconds,
            refresh_interval_seconds,
            concurrent_fetch,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        Validator::validate_endpoint_url("NODE_RPC_URL", &self.node_rpc_url)?;
        Validator::validate_endpoint_url("MARKET_DATA_URL", &self.market_data_url)?;
        Validator::validate_symbol("BASE_SYMBOL", &self.base_symbol)?;
        Validator::validate_symbol("QUOTE_SYMBOL", &self.quote_symbol)?;

        if self.http_timeout_seconds == 0 || self.http_timeout_seconds > 300 {
            return Err(anyhow::anyhow!(
                "HTTP timeout must be between 1 and 300 seconds"
            ));
        }

        if self.refresh_interval_seconds == 0 || self.refresh_interval_seconds > 3600 {
            return Err(anyhow::anyhow!(
                "REFRESH_INTERVAL_SECONDS must be between 1 and 3600"
            ));
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
