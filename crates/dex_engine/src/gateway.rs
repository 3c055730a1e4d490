use std::time::Duration;

use dex_logging::dex_debug;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use url::Url;

use crate::{FetchError, QueryKey, ResourceKind};

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 4 * 1024 * 1024,
            user_agent: concat!("dex/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid api base url {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Read access to the remote catalog. Implementations hold no cache state.
#[async_trait::async_trait]
pub trait Gateway: Send + Sync {
    async fn get(&self, key: &QueryKey) -> Result<serde_json::Value, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    settings: GatewaySettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayError> {
        let base = Url::parse(settings.base_url.trim_end_matches('/')).map_err(|err| {
            GatewayError::InvalidBaseUrl {
                url: settings.base_url.clone(),
                message: err.to_string(),
            }
        })?;
        if base.cannot_be_a_base() {
            return Err(GatewayError::InvalidBaseUrl {
                url: settings.base_url.clone(),
                message: "url cannot carry path segments".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    /// Builds the upstream URL for a query key.
    pub fn url_for(&self, key: &QueryKey) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(key.kind().endpoint());
            if key.kind() != ResourceKind::CreatureList {
                segments.push(key.id());
            }
        }
        if let Some(window) = key.window() {
            url.query_pairs_mut()
                .append_pair("limit", &window.limit.to_string())
                .append_pair("offset", &window.offset.to_string());
        }
        url
    }
}

#[async_trait::async_trait]
impl Gateway for ReqwestGateway {
    async fn get(&self, key: &QueryKey) -> Result<serde_json::Value, FetchError> {
        let url = self.url_for(key);
        dex_debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, self.settings.user_agent.as_str())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                classify_status(status),
                format!("{key}: {status}"),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(too_large(key, self.settings.max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(too_large(key, self.settings.max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::malformed(format!("{key}: invalid json: {err}")))
    }
}

/// Maps a non-success status to a failure class.
pub fn classify_status(status: StatusCode) -> dex_core::FailureKind {
    use dex_core::FailureKind;

    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        FailureKind::Transient
    } else {
        FailureKind::NotFound
    }
}

fn too_large(key: &QueryKey, max_bytes: u64, actual: u64) -> FetchError {
    FetchError::malformed(format!(
        "{key}: response too large (max {max_bytes}, actual {actual})"
    ))
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_decode() {
        return FetchError::malformed(err.to_string());
    }
    FetchError::transient(err.to_string())
}
