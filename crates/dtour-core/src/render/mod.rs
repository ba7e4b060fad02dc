//! Output renderer
//!
//! Turns raw backend output into something safe to display. Which transform
//! applies depends on the arguments of the request that produced the output:
//!
//! - disassembly, IR or AST flags: syntax-highlighted markup
//! - a `-D…` documentation flag: an HTML document for an isolated frame
//! - otherwise: ANSI color escapes converted to inline-styled markup
//!
//! Failed requests render as plain text. [`TrustedHtml`] can only be built
//! inside this module, so backend text never reaches a markup sink without
//! passing through one of these transforms.

mod ansi;
mod highlight;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use ansi::ansi_to_html;
pub use highlight::highlight;

/// Flags whose output is assembly, LLVM IR or a lowered AST
pub const HIGHLIGHT_FLAGS: &[&str] = &["-asm", "-output-s", "-output-ll", "-vcg-ast"];

static MAX_WIDTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)max-width\s*:\s*[^;}\x22']*;?").expect("max-width pattern is valid")
});

/// Markup that was produced by one of the renderer's own transforms
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the output area should display a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum RenderedOutput {
    /// Literal text, never interpreted as markup
    Text(String),
    /// Inline markup fragment
    Markup(TrustedHtml),
    /// Complete HTML document, displayed in an isolated frame
    IsolatedDocument(TrustedHtml),
}

impl Default for RenderedOutput {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl RenderedOutput {
    /// Text or markup as a string, for hosts that print it verbatim
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Markup(html) | Self::IsolatedDocument(html) => html.as_str(),
        }
    }

    pub fn is_markup(&self) -> bool {
        !matches!(self, Self::Text(_))
    }
}

/// Transform chosen from the request arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    Highlighted,
    Document,
    Ansi,
}

/// Pick the transform for output produced with `args`
pub fn classify(args: &str) -> RenderMode {
    let flags: Vec<&str> = args.split_whitespace().collect();
    if flags.iter().any(|f| HIGHLIGHT_FLAGS.contains(f)) {
        RenderMode::Highlighted
    } else if flags.iter().any(|f| f.starts_with("-D")) {
        RenderMode::Document
    } else {
        RenderMode::Ansi
    }
}

/// Render successful output of a request made with `args`
pub fn render_output(output: &str, args: &str) -> RenderedOutput {
    match classify(args) {
        RenderMode::Highlighted => RenderedOutput::Markup(TrustedHtml::new(highlight(output))),
        RenderMode::Document => {
            RenderedOutput::IsolatedDocument(TrustedHtml::new(strip_max_width(output)))
        }
        RenderMode::Ansi => RenderedOutput::Markup(TrustedHtml::new(ansi_to_html(output))),
    }
}

/// Render a failed request
pub fn render_error(error: &Error) -> RenderedOutput {
    RenderedOutput::Text(format!("Server error: {}", error.server_message()))
}

/// Render a status message
pub fn render_message(message: impl Into<String>) -> RenderedOutput {
    RenderedOutput::Text(message.into())
}

/// Remove `max-width` declarations so a document fills its frame
pub fn strip_max_width(html: &str) -> String {
    MAX_WIDTH.replace_all(html, "").into_owned()
}

/// Escape text for inclusion in markup
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
