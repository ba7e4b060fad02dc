//! Remote execution client
//!
//! The controller talks to the execution service only through the
//! [`ExecutionBackend`] trait, so tests can script responses and their
//! ordering without a network.

pub mod http;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use http::{HttpBackend, HttpBackendBuilder};
pub use types::{
    ExecutionRequest, ExecutionResponse, GIST_FILE_NAME, GistRequest, GistResponse, Purpose,
    ShortenRequest, WireDiagnostic,
};

/// Execution service operations
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Fetch the default snippet of a tour page
    async fn fetch_source(&self, language: &str, chapter_id: &str, section: &str) -> Result<String>;

    /// Compile and run a snippet
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse>;

    /// Format a snippet
    async fn format(&self, source: &str) -> Result<String>;

    /// Produce a short link for a snippet
    async fn shorten(&self, request: &ShortenRequest) -> Result<String>;

    /// Publish a snippet as a gist
    async fn create_gist(&self, request: &GistRequest) -> Result<GistResponse>;
}
