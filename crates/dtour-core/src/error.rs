//! Error types for dtour

use thiserror::Error;

/// Result type alias using dtour's Error
pub type Result<T> = std::result::Result<T, Error>;

/// dtour error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (E001-E099)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to decode snippet: {0}")]
    DecodeError(String),

    // Network errors (E100-E199)
    #[error("Network error: {0}. Check that the execution service is reachable.")]
    NetworkError(#[from] reqwest::Error),

    #[error("Server error ({status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("Unexpected response from execution service: {0}")]
    InvalidResponse(String),

    // Variant errors (E200-E299)
    #[error("{compiler} doesn't support {variant} output")]
    UnsupportedVariant { compiler: String, variant: String },

    #[error("Unsupported package header: {0}")]
    UnsupportedHeader(String),

    // Storage errors (E300-E399)
    #[error("Storage error: {0}")]
    StorageError(String),

    // Config errors (E400-E499)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Host errors (E500-E599)
    #[error("No share link available. Run `dtour share` to create one.")]
    NoShareLink,

    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("Navigation failed: {0}")]
    NavigationError(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "E001",
            Self::DecodeError(_) => "E002",
            Self::NetworkError(_) => "E100",
            Self::ServerError { .. } => "E101",
            Self::InvalidResponse(_) => "E102",
            Self::UnsupportedVariant { .. } => "E200",
            Self::UnsupportedHeader(_) => "E201",
            Self::StorageError(_) => "E300",
            Self::ConfigError(_) => "E400",
            Self::NoShareLink => "E500",
            Self::ClipboardError(_) => "E501",
            Self::NavigationError(_) => "E502",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NetworkError(_) => Some("dtour config get service.api_base".to_string()),
            Self::UnsupportedVariant { .. } => Some("dtour --compiler ldc ...".to_string()),
            Self::NoShareLink => Some("dtour share <file>".to_string()),
            Self::ConfigError(_) => Some("dtour config list".to_string()),
            _ => None,
        }
    }

    /// Whether this error came from talking to a remote service
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::ServerError { .. } | Self::InvalidResponse(_)
        )
    }

    /// Message shown after the `Server error: ` prefix in the output area
    ///
    /// Server failures show the response body alone; an empty body leaves
    /// the message empty.
    pub fn server_message(&self) -> String {
        match self {
            Self::ServerError { body, .. } => body.trim().to_string(),
            Self::NetworkError(e) => e.to_string(),
            Self::InvalidResponse(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
