//! Common test utilities for integration tests
//!
//! Provides a mocked node, in-memory endpoints and payload helpers.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use parking_lot::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kvbench::rpc::{Ack, ClientConfig, RpcError, RpcResult};
use kvbench::{RpcClient, Transaction, TxEndpoint};

/// A `broadcast_tx_commit` response for an accepted transaction
pub const COMMIT_OK: &str = r#"{"jsonrpc":"2.0","id":-1,"result":{"check_tx":{"code":0,"data":null,"log":""},"deliver_tx":{"code":0,"log":""},"hash":"9F86D081884C7D65","height":"42"}}"#;

/// A `broadcast_tx_commit` response for a rejected transaction
pub const COMMIT_REJECTED: &str = "{\"jsonrpc\":\"2.0\",\"id\":-1,\n\"result\":{\"check_tx\":{\"code\":1,\"log\":\"tx already exists in cache\"}}}";

/// A node stand-in backed by wiremock
pub struct MockNode {
    pub server: MockServer,
}

impl MockNode {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// `host:port` of the mock
    pub fn addr(&self) -> String {
        self.server.address().to_string()
    }

    /// Client pointed at the mock with the given timeout
    pub fn client(&self, timeout: Duration) -> RpcClient {
        RpcClient::with_config(ClientConfig::new(self.addr()).timeout(timeout)).unwrap()
    }

    /// Answer every submission with `body`
    pub async fn respond_to_submits(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path("/broadcast_tx_commit"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Accept every submission
    pub async fn accept_all(&self) {
        self.respond_to_submits(200, COMMIT_OK).await;
    }

    /// Reject every submission
    pub async fn reject_all(&self) {
        self.respond_to_submits(200, COMMIT_REJECTED).await;
    }

    /// Serve `value` for queries of `key`
    pub async fn serve_value(&self, key: &str, value: &[u8]) {
        Mock::given(method("GET"))
            .and(path("/abci_query"))
            .and(query_param("data", format!("\"{}\"", key)))
            .respond_with(ResponseTemplate::new(200).set_body_string(query_body(key, value)))
            .mount(&self.server)
            .await;
    }

    /// Decoded payloads of every submission received so far
    pub async fn submitted_payloads(&self) -> Vec<Vec<u8>> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == "/broadcast_tx_commit")
            .filter_map(|r| {
                r.url
                    .query_pairs()
                    .find(|(k, _)| k == "tx")
                    .map(|(_, v)| v.into_owned())
            })
            .map(|tx| hex::decode(tx.trim_start_matches("0x")).unwrap())
            .collect()
    }
}

/// An `abci_query` response carrying `value`
pub fn query_body(key: &str, value: &[u8]) -> String {
    format!(
        r#"{{"jsonrpc":"2.0","id":-1,"result":{{"response":{{"code":0,"log":"exists","index":"0","key":"{}","value":"{}","height":"42"}}}}}}"#,
        STANDARD.encode(key),
        STANDARD.encode(value)
    )
}

/// Little-endian concatenation of `counters`
pub fn counters_value(counters: impl IntoIterator<Item = u64>) -> Vec<u8> {
    counters.into_iter().flat_map(|c| c.to_le_bytes()).collect()
}

/// In-memory node whose writes append to the existing value
#[derive(Default)]
pub struct AppendingStore {
    values: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
    log: Mutex<Vec<Vec<u8>>>,
}

impl AppendingStore {
    /// Every payload in the order it was submitted
    pub fn log(&self) -> Vec<Vec<u8>> {
        self.log.lock().clone()
    }
}

#[async_trait]
impl TxEndpoint for AppendingStore {
    async fn submit(&self, tx: &Transaction) -> RpcResult<Ack> {
        let payload = tx.as_bytes();
        self.log.lock().push(payload.to_vec());

        let key = tx.key().to_vec();
        let value = payload.get(key.len() + 1..).unwrap_or_default().to_vec();
        self.values.lock().entry(key).or_default().extend_from_slice(&value);

        Ok(Ack {
            status: 200,
            body: Bytes::from_static(COMMIT_OK.as_bytes()),
        })
    }

    async fn query(&self, key: &str) -> RpcResult<Bytes> {
        self.values
            .lock()
            .get(key.as_bytes())
            .map(|v| Bytes::from(v.clone()))
            .ok_or_else(|| RpcError::Query("no value".to_string()))
    }
}

/// Endpoint whose submissions each take `delay`, recording how many overlap
pub struct SlowNode {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    completed: AtomicU64,
}

impl SlowNode {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            completed: AtomicU64::new(0),
        }
    }

    /// Most submissions ever pending at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TxEndpoint for SlowNode {
    async fn submit(&self, _tx: &Transaction) -> RpcResult<Ack> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(Ack {
            status: 200,
            body: Bytes::from_static(COMMIT_OK.as_bytes()),
        })
    }

    async fn query(&self, _key: &str) -> RpcResult<Bytes> {
        Err(RpcError::Query("no value".to_string()))
    }
}

/// Plain-text log output captured from the current thread's subscriber
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route INFO and above here until the guard is dropped
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Captured lines containing `needle`
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock())
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
