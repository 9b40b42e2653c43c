use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use afen_core::{MarketConfig, MarketError, validate_url};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// JSON-RPC error code for a method the node does not implement.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Errors from a JSON-RPC round trip.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),
}

impl From<RpcError> for MarketError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::InvalidUrl(url) => MarketError::Config(format!("invalid RPC URL: {url}")),
            RpcError::Rpc { .. } => MarketError::ContractCall(err.to_string()),
            other => MarketError::Network(other.to_string()),
        }
    }
}

/// Configuration for a single RPC endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl RpcConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// The desktop wallet endpoint from the client config.
    pub fn from_market(config: &MarketConfig) -> Self {
        Self {
            url: config.rpc_url.clone(),
            timeout_secs: config.request_timeout_secs,
        }
    }

    /// The WalletConnect bridge endpoint, if one is configured.
    pub fn mobile_from_market(config: &MarketConfig) -> Option<Self> {
        config.mobile_rpc_url.as_ref().map(|url| Self {
            url: url.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Minimal JSON-RPC 2.0 client over HTTP.
pub struct RpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        if !validate_url(&config.url) {
            return Err(RpcError::InvalidUrl(config.url.clone()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Ok(Self {
            client,
            url: config.url.clone(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue `method` with `params` and decode the `result` member into `T`.
    ///
    /// A response with neither `result` nor `error` decodes as JSON `null`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        debug!(id, method, url = %self.url, "JSON-RPC request");

        let resp = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::Http { status, body });
        }

        let envelope: RpcResponse = resp
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        if let Some(err) = envelope.error {
            return Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        let result = envelope.result.unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }
}
