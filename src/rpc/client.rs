//! RPC Client
//!
//! Thin HTTP client for the node's `broadcast_tx_commit` and `abci_query`
//! endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use tracing::debug;
use url::Url;

use super::response::{check_submit, extract_value};
use super::{ClientConfig, RpcError, RpcResult};
use crate::encoder::Transaction;
use crate::error::{BenchError, BenchResult};

/// Content type sent with every submission
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Acknowledgement of a committed transaction
#[derive(Debug, Clone)]
pub struct Ack {
    /// HTTP status of the response
    pub status: u16,
    /// Raw response body
    pub body: Bytes,
}

/// Anything transactions can be pushed through.
///
/// Dispatchers are generic over this so they can be driven against a live
/// node or an in-process stand-in.
#[async_trait]
pub trait TxEndpoint: Send + Sync + 'static {
    /// Submit one transaction and wait for its commit acknowledgement
    async fn submit(&self, tx: &Transaction) -> RpcResult<Ack>;

    /// Read the raw value stored under `key`
    async fn query(&self, key: &str) -> RpcResult<Bytes>;
}

/// HTTP client for a single node
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base: Url,
    config: Arc<ClientConfig>,
}

impl RpcClient {
    /// Create a new client for the given `host:port`
    pub fn new(addr: impl Into<String>) -> BenchResult<Self> {
        Self::with_config(ClientConfig::new(addr))
    }

    /// Create a new client with the given configuration
    pub fn with_config(config: ClientConfig) -> BenchResult<Self> {
        let base = Url::parse(&config.base_url())
            .map_err(|e| BenchError::Config(format!("Invalid RPC address '{}': {}", config.addr, e)))?;
        if base.host_str().is_none() {
            return Err(BenchError::Config(format!("RPC address '{}' has no host", config.addr)));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).unwrap_or_else(|_| HeaderValue::from_static("kvbench")),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| BenchError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base,
            config: Arc::new(config),
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL of a `broadcast_tx_commit` call for `tx`
    pub fn submit_url(&self, tx: &Transaction) -> Url {
        let mut url = self.endpoint("broadcast_tx_commit");
        url.set_query(Some(&format!("tx={}", tx.hex_param())));
        url
    }

    /// URL of an `abci_query` call for `key`
    pub fn query_url(&self, key: &str) -> Url {
        let mut url = self.endpoint("abci_query");
        url.set_query(Some(&format!("data=\"{}\"", key)));
        url
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(path);
        url
    }

    fn transport_error(&self, err: reqwest::Error) -> RpcError {
        RpcError::from_reqwest(err, self.config.timeout)
    }
}

#[async_trait]
impl TxEndpoint for RpcClient {
    async fn submit(&self, tx: &Transaction) -> RpcResult<Ack> {
        let url = self.submit_url(tx);
        debug!(bytes = tx.len(), "Submitting transaction");

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        check_submit(status, &body)?;
        Ok(Ack { status, body })
    }

    async fn query(&self, key: &str) -> RpcResult<Bytes> {
        let url = self.query_url(key);
        debug!(key, "Querying state");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        extract_value(&body)
    }
}
