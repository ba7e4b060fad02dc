//! Request and response types of the execution service

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::diagnostics::{Diagnostic, DiagnosticSet, Severity};

/// File name used for the snippet inside a gist
pub const GIST_FILE_NAME: &str = "main.d";

/// Why a request is sent; alters arguments and response handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Run,
    Asm,
    Ir,
    Ast,
    Format,
    Shorten,
    Gist,
}

impl Purpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Asm => "asm",
            Self::Ir => "ir",
            Self::Ast => "ast",
            Self::Format => "format",
            Self::Shorten => "shorten",
            Self::Gist => "gist",
        }
    }

    /// Run-family requests update output and diagnostics
    pub fn is_run_family(&self) -> bool {
        matches!(self, Self::Run | Self::Asm | Self::Ir | Self::Ast)
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Body of a run request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub source: String,
    pub compiler: String,
    pub args: String,
    pub color: bool,
    #[serde(skip)]
    pub purpose: Option<Purpose>,
}

impl ExecutionRequest {
    pub fn new(source: impl Into<String>, compiler: impl Into<String>, args: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiler: compiler.into(),
            args: args.into(),
            color: true,
            purpose: Some(Purpose::Run),
        }
    }

    pub fn with_purpose(mut self, purpose: Purpose) -> Self {
        self.purpose = Some(purpose);
        self
    }
}

/// Diagnostic as sent on the wire; severity comes from the list it is in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDiagnostic {
    pub line: u32,
    pub message: String,
}

/// Response of a run request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub warnings: Vec<WireDiagnostic>,
    #[serde(default)]
    pub errors: Vec<WireDiagnostic>,
}

impl ExecutionResponse {
    /// Diagnostics with severities attached
    pub fn diagnostics(&self) -> DiagnosticSet {
        let convert = |list: &[WireDiagnostic], severity: Severity| {
            list.iter()
                .map(|d| Diagnostic {
                    line: d.line,
                    message: d.message.clone(),
                    severity,
                })
                .collect()
        };
        DiagnosticSet::new(
            convert(&self.errors, Severity::Error),
            convert(&self.warnings, Severity::Warning),
        )
    }
}

/// Response of the page source endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResponse {
    pub source_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatRequest {
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatResponse {
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenRequest {
    pub source: String,
    pub compiler: String,
    pub args: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistFile {
    pub content: String,
}

/// Body of a gist creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistRequest {
    pub description: String,
    pub public: bool,
    pub files: BTreeMap<String, GistFile>,
}

impl GistRequest {
    /// Public gist holding the snippet as a single file
    pub fn for_source(source: impl Into<String>) -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            GIST_FILE_NAME.to_string(),
            GistFile {
                content: source.into(),
            },
        );
        Self {
            description: "Shared from the D language tour".to_string(),
            public: true,
            files,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistResponse {
    pub id: String,
    pub html_url: String,
}
