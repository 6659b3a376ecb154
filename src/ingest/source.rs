// src/ingest/source.rs
//! Document sources: bounded HTTP for production, in-memory fixtures for tests.

use async_trait::async_trait;
use metrics::counter;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::config::HttpLimits;
use crate::ingest::types::DocumentSource;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("{url} exceeds the {limit} byte response limit")]
    TooLarge { url: String, limit: usize },

    #[error("{url} is not a well-formed feed: {message}")]
    MalformedFeed { url: String, message: String },

    #[error("no fixture registered for {0}")]
    MissingFixture(String),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// reqwest-backed source with a per-request timeout and a hard body cap.
#[derive(Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpSource {
    pub fn new(limits: &HttpLimits) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(limits.timeout_secs))
            .user_agent(concat!("quake-relay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            max_body_bytes: limits.max_body_bytes,
        })
    }
}

impl HttpSource {
    async fn fetch_bounded(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let http_err = |source: reqwest::Error| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let mut resp = self.client.get(url).send().await.map_err(http_err)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let too_large = || FetchError::TooLarge {
            url: url.to_string(),
            limit: self.max_body_bytes,
        };
        if resp
            .content_length()
            .is_some_and(|len| len > self.max_body_bytes as u64)
        {
            return Err(too_large());
        }

        // Content-Length may be absent or wrong; enforce the cap while streaming.
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(http_err)? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetch_bounded(url).await.inspect_err(|e| {
            tracing::warn!(error = %e, url, "fetch failed");
            counter!("quake_fetch_errors_total").increment(1);
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// In-memory source keyed by full URL.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    docs: HashMap<String, Vec<u8>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style registration of one document.
    pub fn with(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.docs.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl DocumentSource for FixtureSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.docs
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::MissingFixture(url.to_string()))
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
