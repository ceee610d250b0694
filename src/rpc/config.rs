//! RPC Client Configuration

use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// `host:port` of the node's RPC listener
    pub addr: String,

    /// Per-request timeout, covering connect, send and body read
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            addr: crate::DEFAULT_ADDR.to_string(),
            timeout: crate::DEFAULT_TIMEOUT,
            connect_timeout: Duration::from_secs(5),
            pool_max_idle_per_host: 64,
            user_agent: format!("kvbench/{}", crate::VERSION),
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration for the given address
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle pool size
    pub fn pool_max_idle_per_host(mut self, size: usize) -> Self {
        self.pool_max_idle_per_host = size;
        self
    }

    /// Base URL derived from the address
    pub fn base_url(&self) -> String {
        let addr = self.addr.trim_end_matches('/');
        if addr.starts_with("http://") || addr.starts_with("https://") {
            addr.to_string()
        } else {
            format!("http://{}", addr)
        }
    }
}
