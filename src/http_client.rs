use crate::errors::{AirdropError, Result};
use crate::metrics;
use async_trait::async_trait;
use log::debug;
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use std::time::Duration;

/// Raw response of a GET against the airdrop data repository.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub etag: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            etag: None,
            body: body.into(),
        }
    }

    pub fn not_modified() -> Self {
        Self {
            status: StatusCode::NOT_MODIFIED.as_u16(),
            etag: None,
            body: Vec::new(),
        }
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn is_not_modified(&self) -> bool {
        self.status == StatusCode::NOT_MODIFIED.as_u16()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| AirdropError::Remote(format!("response is not valid UTF-8: {}", e)))
    }
}

/// Remote GET seam. Everything the pipeline downloads goes through it.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url`, sending `If-None-Match: <etag>` when an ETag is given.
    ///
    /// Only transport failures are errors; any HTTP status is returned as is.
    async fn get(&self, url: &str, etag: Option<&str>) -> Result<HttpResponse>;
}

pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AirdropError::Remote(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str, etag: Option<&str>) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        if let Some(etag) = etag {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AirdropError::Remote(format!("GET {} failed: {}", url, e)))?;
        metrics::increment_remote_fetch("http");

        let status = response.status().as_u16();
        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| AirdropError::Remote(format!("reading {} failed: {}", url, e)))?
            .to_vec();

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(HttpResponse { status, etag, body })
    }
}
