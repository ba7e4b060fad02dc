//! What the output area and editor gutter currently show

use serde::Serialize;

use crate::diagnostics::{Annotation, DiagnosticSet};
use crate::render::RenderedOutput;
use crate::share::ShareLink;

/// Message shown while a run-family request is in flight
pub const WAITING_MESSAGE: &str = "... Waiting for remote service ...";

/// Output, diagnostics and share state of the current page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub output: RenderedOutput,
    /// Unrendered text of the last successful response
    pub raw_output: String,
    pub show_output: bool,
    pub diagnostics: DiagnosticSet,
    pub lint_enabled: bool,
    pub share_link: Option<ShareLink>,
}

impl ViewState {
    pub fn annotations(&self, buffer: &str) -> Vec<Annotation> {
        self.diagnostics.annotations(buffer)
    }
}

/// How an action ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The result was applied to the view or session
    Applied,
    /// The request failed; the failure is shown in the output area
    Failed,
    /// A newer request superseded this one; its result was dropped
    Discarded,
    /// The compiler cannot produce this variant; nothing was sent
    Unsupported,
    /// Nothing to do (no session loaded, empty input)
    Skipped,
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
