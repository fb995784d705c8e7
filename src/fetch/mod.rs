//! HTTP fetching for the upstream league provider.
//!
//! Issues authenticated GET requests and decodes JSON bodies. When an
//! archive directory is configured every fetched body is also written to
//! disk for re-processing.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Content too large: {size} bytes (max {max_size})")]
    ContentTooLarge { size: usize, max_size: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session cookies for private leagues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub swid: String,
    pub espn_s2: String,
}

impl Credentials {
    fn cookie_header(&self) -> String {
        format!("swid={}; espn_s2={}", self.swid, self.espn_s2)
    }
}

/// Result of a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Original URL that was fetched
    pub url: Url,

    pub body: Vec<u8>,

    pub content_type: Option<String>,

    pub fetched_at: DateTime<Utc>,

    /// Where the body was archived, if archiving is enabled
    pub archive_path: Option<PathBuf>,
}

/// Metadata stored alongside an archived body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub url: String,
    pub fetched_at: DateTime<Utc>,
    pub content_type: Option<String>,
    pub content_length: usize,
}

/// Configuration for the HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Cookies sent with every request
    pub credentials: Option<Credentials>,

    /// Directory for raw payload copies (None = no archive)
    pub archive_dir: Option<PathBuf>,

    /// Maximum body size to accept (default 50MB)
    pub max_content_size: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("ffb-ledger/{}", env!("CARGO_PKG_VERSION")),
            credentials: None,
            archive_dir: None,
            max_content_size: 50 * 1024 * 1024,
        }
    }
}

/// HTTP fetcher.
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Fetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(Self::default_headers(&config)?)
            .build()?;

        Ok(Self { client, config })
    }

    fn default_headers(config: &FetcherConfig) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("ffb-ledger")),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(credentials) = &config.credentials {
            let mut cookie = HeaderValue::from_str(&credentials.cookie_header())
                .map_err(|e| FetchError::InvalidHeader(format!("cookie: {}", e)))?;
            cookie.set_sensitive(true);
            headers.insert(COOKIE, cookie);
        }
        Ok(headers)
    }

    /// Fetch a URL and decode its body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let result = self.fetch(url).await?;
        Ok(serde_json::from_slice(&result.body)?)
    }

    /// Fetch a URL from the network, archiving the body when configured.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.bytes().await?.to_vec();

        if body.len() > self.config.max_content_size {
            return Err(FetchError::ContentTooLarge {
                size: body.len(),
                max_size: self.config.max_content_size,
            });
        }

        let fetched_at = Utc::now();
        let archive_path = match &self.config.archive_dir {
            Some(dir) => Some(
                Self::archive(dir, url, &body, content_type.clone(), fetched_at).await?,
            ),
            None => None,
        };

        Ok(FetchResult {
            url: url.clone(),
            body,
            content_type,
            fetched_at,
            archive_path,
        })
    }

    /// Write a body and its metadata under the archive directory.
    async fn archive(
        dir: &Path,
        url: &Url,
        body: &[u8],
        content_type: Option<String>,
        fetched_at: DateTime<Utc>,
    ) -> Result<PathBuf, FetchError> {
        fs::create_dir_all(dir).await?;

        let body_path = Self::archive_path_for_url(dir, url);
        let mut file = fs::File::create(&body_path).await?;
        file.write_all(body).await?;
        file.flush().await?;

        let meta = ArchiveMetadata {
            url: url.to_string(),
            fetched_at,
            content_type,
            content_length: body.len(),
        };
        let meta_path = dir.join(format!("{}.meta.json", Self::url_hash(url)));
        fs::write(&meta_path, serde_json::to_string_pretty(&meta)?).await?;

        debug!("Archived {} to {}", url, body_path.display());
        Ok(body_path)
    }

    /// Archive location for a URL's body.
    pub fn archive_path_for_url(dir: &Path, url: &Url) -> PathBuf {
        dir.join(format!("{}.json", Self::url_hash(url)))
    }

    /// Hash a URL to a short string.
    fn url_hash(url: &Url) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..8])
    }
}
