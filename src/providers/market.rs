/// CoinMarketCap quotes provider
use super::{require_credential, RateProvider, MARKET_DATA_API_KEY};
use crate::error::FetchError;
use crate::types::ConversionRate;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, instrument, warn};

pub const QUOTES_PATH: &str = "/v1/cryptocurrency/quotes/latest";

/// The credential travels in this header, never in the query string
pub const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

pub struct CoinMarketCapRateProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinMarketCapRateProvider {
    pub fn new(client: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn quotes_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), QUOTES_PATH)
    }
}

#[async_trait]
impl RateProvider for CoinMarketCapRateProvider {
    #[instrument(skip(self), fields(provider = "coinmarketcap"))]
    async fn fetch_conversion_rate(
        &self,
        base_symbol: &str,
        quote_symbol: &str,
    ) -> Result<ConversionRate, FetchError> {
        let api_key = require_credential(self.api_key.as_deref(), MARKET_DATA_API_KEY)?;
        debug!("Requesting conversion rate");

        let response = self
            .client
            .get(self.quotes_url())
            .header(API_KEY_HEADER, api_key)
            .header(ACCEPT, "application/json")
            .query(&[("symbol", base_symbol), ("convert", quote_symbol)])
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;
        let json: Option<Value> = serde_json::from_slice(&body).ok();

        if !status.is_success() {
            let detail = json
                .as_ref()
                .and_then(|v| v.pointer("/status/error_message"))
                .and_then(Value::as_str)
                .unwrap_or("no error message");
            warn!(%status, detail, "Quote request rejected");
            return Err(FetchError::transport(format!(
                "Quote endpoint returned HTTP {}: {}",
                status, detail
            )));
        }

        let json = json.ok_or_else(|| FetchError::decode("Quote response is not valid JSON"))?;
        let rate = extract_price(&json, base_symbol, quote_symbol)?;

        debug!(%rate, "Conversion rate decoded");
        Ok(rate)
    }
}

/// Walk `data.<base>.quote.<quote>.price`. Every level must be an object holding the next key.
pub fn extract_price(
    body: &Value,
    base_symbol: &str,
    quote_symbol: &str,
) -> Result<ConversionRate, FetchError> {
    let path = ["data", base_symbol, "quote", quote_symbol, "price"];

    let mut current = body;
    for (depth, key) in path.iter().enumerate() {
        current = current
            .as_object()
            .and_then(|object| object.get(*key))
            .ok_or_else(|| {
                FetchError::decode(format!(
                    "Quote response has no {}",
                    path[..=depth].join(".")
                ))
            })?;
    }

    match current {
        Value::Number(price) => ConversionRate::from_json_number(price),
        other => Err(FetchError::decode(format!(
            "Quote price is not a number: {}",
            other
        ))),
    }
}
