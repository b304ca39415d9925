/// Balance conversion service
/// Single Responsibility: compose one balance fetch and one rate fetch into a converted value
use crate::error::FetchError;
use crate::providers::{BalanceProvider, RateProvider};
use crate::types::{BalanceQuery, ConvertedBalance};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// How the two legs of a conversion are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// Rate is requested only after the balance resolves
    #[default]
    Sequential,
    /// Both legs in flight at once; the first failure wins
    Concurrent,
}

#[async_trait]
pub trait BalanceServiceTrait: Send + Sync {
    async fn get_converted_balance(
        &self,
        query: &BalanceQuery,
        base_symbol: &str,
        quote_symbol: &str,
    ) -> Result<ConvertedBalance, FetchError>;
}

pub struct BalanceService {
    pub balance_provider: Arc<dyn BalanceProvider>,
    pub rate_provider: Arc<dyn RateProvider>,
    strategy: FetchStrategy,
}

impl BalanceService {
    pub fn new(
        balance_provider: Arc<dyn BalanceProvider>,
        rate_provider: Arc<dyn RateProvider>,
    ) -> Self {
        Self {
            balance_provider,
            rate_provider,
            strategy: FetchStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }
}

#[async_trait]
impl BalanceServiceTrait for BalanceService {
    #[instrument(skip(self, query), fields(address = %query.address, strategy = ?self.strategy))]
    async fn get_converted_balance(
        &self,
        query: &BalanceQuery,
        base_symbol: &str,
        quote_symbol: &str,
    ) -> Result<ConvertedBalance, FetchError> {
        let outcome = match self.strategy {
            FetchStrategy::Sequential => {
                async {
                    let raw = self.balance_provider.fetch_raw_balance(query).await?;
                    let rate = self
                        .rate_provider
                        .fetch_conversion_rate(base_symbol, quote_symbol)
                        .await?;
                    Ok::<_, FetchError>((raw, rate))
                }
                .await
            }
            FetchStrategy::Concurrent => futures::try_join!(
                self.balance_provider.fetch_raw_balance(query),
                self.rate_provider
                    .fetch_conversion_rate(base_symbol, quote_symbol)
            ),
        };

        let (raw, rate) = outcome.map_err(|e| {
            warn!(error = %e, "Balance conversion unavailable");
            e
        })?;

        let converted =
            ConvertedBalance::compose(query, base_symbol, quote_symbol, raw.to_scaled(), rate);
        debug!(
            balance = %converted.balance,
            rate = %converted.rate,
            value = %converted.value,
            "Balance converted"
        );
        Ok(converted)
    }
}
