//! Diagnostics mapper
//!
//! Adapts the flat `{line, message}` lists of an execution response into
//! whole-line annotations an editor widget can draw. Lines are 1-based on the
//! wire and 0-based in annotations.
//!
//! Annotations are computed against whatever buffer the caller passes in. If
//! the user edited the snippet after the response arrived, a diagnostic may
//! highlight a line that no longer matches its origin; the output stays
//! well-formed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A line-addressed message from the execution service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line number
    pub line: u32,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn error(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(line: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    /// 0-based line index in the editor
    pub fn line_index(&self) -> usize {
        self.line.saturating_sub(1) as usize
    }
}

/// Editor annotation spanning one whole line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub message: String,
    pub from_line: usize,
    pub from_col: usize,
    pub to_line: usize,
    pub to_col: usize,
    pub severity: Severity,
}

/// Map errors then warnings to annotations
///
/// `line_length_of` receives a 0-based line index and returns that line's
/// length in the current buffer.
pub fn to_annotations<F>(
    errors: &[Diagnostic],
    warnings: &[Diagnostic],
    line_length_of: F,
) -> Vec<Annotation>
where
    F: Fn(usize) -> usize,
{
    let annotate = |d: &Diagnostic, severity: Severity| {
        let line = d.line_index();
        Annotation {
            message: d.message.clone(),
            from_line: line,
            from_col: 0,
            to_line: line,
            to_col: line_length_of(line),
            severity,
        }
    };

    errors
        .iter()
        .map(|d| annotate(d, Severity::Error))
        .chain(warnings.iter().map(|d| annotate(d, Severity::Warning)))
        .collect()
}

/// Length in characters of a 0-based line; lines past the end have length 0
pub fn line_length(buffer: &str, line: usize) -> usize {
    buffer
        .lines()
        .nth(line)
        .map(|l| l.chars().count())
        .unwrap_or(0)
}

/// Diagnostics of the most recent execution response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticSet {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl DiagnosticSet {
    pub fn new(errors: Vec<Diagnostic>, warnings: Vec<Diagnostic>) -> Self {
        Self { errors, warnings }
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.errors.clear();
        self.warnings.clear();
    }

    /// Whether the editor's lint gutter should be shown
    pub fn lint_enabled(&self) -> bool {
        !self.is_empty()
    }

    /// Annotations against the given buffer
    pub fn annotations(&self, buffer: &str) -> Vec<Annotation> {
        to_annotations(&self.errors, &self.warnings, |line| line_length(buffer, line))
    }
}
