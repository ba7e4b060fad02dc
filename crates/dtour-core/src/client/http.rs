//! HTTP implementation of the execution backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::ExecutionBackend;
use super::types::{
    ExecutionRequest, ExecutionResponse, FormatRequest, FormatResponse, GistRequest, GistResponse,
    ShortenRequest, ShortenResponse, SourceResponse,
};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};

/// Default base URL of the tour API
const DEFAULT_API_BASE: &str = "https://tour.dlang.org";

/// Default base URL of the gist API
const DEFAULT_GIST_API: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("dtour/", env!("CARGO_PKG_VERSION"));

/// Execution service client over HTTP
#[derive(Clone)]
pub struct HttpBackend {
    http_client: HttpClient,
    api_base: String,
    gist_api: String,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("api_base", &self.api_base)
            .field("gist_api", &self.gist_api)
            .finish()
    }
}

/// Builder for creating an HttpBackend
#[derive(Default)]
pub struct HttpBackendBuilder {
    api_base: Option<String>,
    gist_api: Option<String>,
    timeout_secs: Option<u64>,
}

impl HttpBackendBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tour API base URL
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = Some(url.into());
        self
    }

    /// Set the gist API base URL
    pub fn gist_api(mut self, url: impl Into<String>) -> Self {
        self.gist_api = Some(url.into());
        self
    }

    /// Set the request timeout; 0 means none
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Take endpoints and timeout from configuration
    pub fn service_config(self, config: &ServiceConfig) -> Self {
        self.api_base(config.resolved_api_base())
            .gist_api(config.gist_api.clone())
            .timeout_secs(config.timeout_secs)
    }

    pub fn build(self) -> Result<HttpBackend> {
        let mut builder = HttpClient::builder().user_agent(USER_AGENT);
        if let Some(secs) = self.timeout_secs.filter(|s| *s > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(Error::NetworkError)?;

        let normalize = |url: Option<String>, default: &str| {
            url.unwrap_or_else(|| default.to_string())
                .trim_end_matches('/')
                .to_string()
        };

        Ok(HttpBackend {
            http_client,
            api_base: normalize(self.api_base, DEFAULT_API_BASE),
            gist_api: normalize(self.gist_api, DEFAULT_GIST_API),
        })
    }
}

impl HttpBackend {
    /// Create a backend for the given configuration
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        HttpBackendBuilder::new().service_config(config).build()
    }

    pub fn builder() -> HttpBackendBuilder {
        HttpBackendBuilder::new()
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.api_base, path)
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(url = %url, "Sending POST request");
        let response = self
            .http_client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::NetworkError)?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Execution service returned an error");
            return Err(Error::ServerError {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl ExecutionBackend for HttpBackend {
    async fn fetch_source(&self, language: &str, chapter_id: &str, section: &str) -> Result<String> {
        let url = self.api_url(&format!("source/{}/{}/{}", language, chapter_id, section));
        debug!(url = %url, "Fetching page source");
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(Error::NetworkError)?;
        let source: SourceResponse = Self::decode(response).await?;
        Ok(source.source_code)
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse> {
        self.post_json(&self.api_url("run"), request).await
    }

    async fn format(&self, source: &str) -> Result<String> {
        let request = FormatRequest {
            source: source.to_string(),
        };
        let response: FormatResponse = self.post_json(&self.api_url("format"), &request).await?;
        Ok(response.source)
    }

    async fn shorten(&self, request: &ShortenRequest) -> Result<String> {
        let response: ShortenResponse = self.post_json(&self.api_url("shorten"), request).await?;
        Ok(response.url)
    }

    async fn create_gist(&self, request: &GistRequest) -> Result<GistResponse> {
        let url = format!("{}/gists", self.gist_api);
        self.post_json(&url, request).await
    }
}
