use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use prism_config::fetch::FetchConfig;
use tracing::{debug, instrument};

use crate::error::{PrismError, Result};

pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Bytes retrieved from the network together with their media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBlob {
    pub bytes: Vec<u8>,
    /// Lowercased MIME essence (no parameters), `None` when the response had none
    pub mime: Option<String>,
}

impl FetchedBlob {
    pub fn new(bytes: Vec<u8>, mime: Option<&str>) -> Self {
        Self {
            bytes,
            mime: mime.and_then(mime_essence),
        }
    }

    pub fn mime_or_default(&self) -> &str {
        self.mime.as_deref().unwrap_or(DEFAULT_MIME)
    }

    pub fn data_uri(&self) -> String {
        data_uri(self.mime_or_default(), &self.bytes)
    }
}

/// `data:<mime>;base64,<payload>`
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", general_purpose::STANDARD.encode(bytes))
}

/// `image/SVG+xml; charset=utf-8` -> `image/svg+xml`
pub fn mime_essence(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
    (!essence.is_empty()).then_some(essence)
}

/// Network access provided by the host
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`PrismError::Fetch`] when the request fails or the response is not a success
    async fn fetch(&self, url: &str) -> Result<FetchedBlob>;
}

/// [`Fetcher`] over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(cfg: &FetchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(cfg.user_agent.clone());
        if let Some(timeout_ms) = cfg.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        Ok(Self {
            client: builder
                .build()
                .map_err(|e| PrismError::Config(format!("Failed building http client: {e}")))?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedBlob> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response.bytes().await?;

        debug!(
            bytes = bytes.len(),
            content_type = content_type.as_deref().unwrap_or_default(),
            "Fetched"
        );

        Ok(FetchedBlob::new(bytes.to_vec(), content_type.as_deref()))
    }
}
