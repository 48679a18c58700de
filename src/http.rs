use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::error::{FetchError, FetchResult};

pub const ACCEPT_JSON: &str = "application/json";
pub const ACCEPT_IMAGE: &str = "image/*";

/// Status and payload of a completed GET. Status is not interpreted here.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

/// The network seam. Production uses [`ReqwestTransport`]; tests swap in fakes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url, accept: &str) -> FetchResult<RawResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url, accept: &str) -> FetchResult<RawResponse> {
        let resp = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await.map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(RawResponse { status, body })
    }
}

/// Shared fetch client. Cheap to clone; clones share the transport and the in-flight limit.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    limiter: Arc<Semaphore>,
    slow_warn: Duration,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>, max_in_flight: usize) -> Self {
        Self {
            transport,
            limiter: Arc::new(Semaphore::new(max_in_flight.max(1))),
            slow_warn: Duration::from_secs(5),
        }
    }

    pub fn from_config(config: &Config) -> FetchResult<Self> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::new(Arc::new(transport), config.max_in_flight).with_slow_warn(config.slow_request_warn()))
    }

    pub fn with_slow_warn(mut self, slow_warn: Duration) -> Self {
        self.slow_warn = slow_warn;
        self
    }

    /// GET `url` and decode the body as JSON.
    pub async fn fetch_json(&self, url: &str) -> FetchResult<Value> {
        let body = self.get(url, ACCEPT_JSON).await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::malformed(e.to_string()))
    }

    /// GET `url` and return the raw payload.
    pub async fn fetch_bytes(&self, url: &str) -> FetchResult<Bytes> {
        self.get(url, ACCEPT_IMAGE).await
    }

    async fn get(&self, url: &str, accept: &str) -> FetchResult<Bytes> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| FetchError::Transport("request limiter closed".into()))?;
        let start = Instant::now();
        let resp = self.transport.get(&parsed, accept).await;
        self.warn_if_slow(start, url);
        let resp = resp?;

        debug!(url, status = resp.status, bytes = resp.body.len(), "GET");
        if !(200..=299).contains(&resp.status) {
            return Err(FetchError::BadStatus(resp.status));
        }
        if resp.body.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(resp.body)
    }

    fn warn_if_slow(&self, start: Instant, url: &str) {
        let elapsed = start.elapsed();
        if elapsed > self.slow_warn {
            warn!(url, ?elapsed, "slow request");
        }
    }
}
