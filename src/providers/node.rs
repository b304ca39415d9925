/// JSON-RPC node provider (Infura-style `<base>/<api key>` endpoint)
use super::jsonrpc::{JsonRpcRequest, JsonRpcResponse};
use super::{require_credential, BalanceProvider, NODE_API_KEY};
use crate::error::FetchError;
use crate::types::{BalanceQuery, RawBalance};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Fetches `eth_getBalance` from a node whose URL embeds the access key
pub struct JsonRpcBalanceProvider {
    client: reqwest::Client,
    rpc_url: String,
    api_key: Option<String>,
}

impl JsonRpcBalanceProvider {
    pub fn new(client: reqwest::Client, rpc_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            rpc_url,
            api_key,
        }
    }

    /// Full endpoint including the credential. Never log this.
    fn endpoint(&self) -> Result<String, FetchError> {
        let key = require_credential(self.api_key.as_deref(), NODE_API_KEY)?;
        Ok(format!("{}/{}", self.rpc_url.trim_end_matches('/'), key))
    }

    /// Endpoint safe for logs
    pub fn redacted_endpoint(&self) -> String {
        format!("{}/[REDACTED]", self.rpc_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl BalanceProvider for JsonRpcBalanceProvider {
    #[instrument(skip(self, query), fields(provider = "json_rpc", address = %query.address))]
    async fn fetch_raw_balance(&self, query: &BalanceQuery) -> Result<RawBalance, FetchError> {
        let endpoint = self.endpoint()?;
        let request = JsonRpcRequest::get_balance(&query.address);
        debug!(endpoint = %self.redacted_endpoint(), "Requesting balance");

        let response = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Node rejected balance request");
            return Err(FetchError::transport(format!(
                "Node returned HTTP {}",
                status
            )));
        }

        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;
        let hex = JsonRpcResponse::from_slice(&body)?.into_string_result()?;
        let balance = RawBalance::from_hex(&hex)?;

        debug!(wei = %balance, "Balance decoded");
        Ok(balance)
    }
}
