//! Session entity, navigation inputs and persistence keys

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Compiler used when nothing else was selected
pub const DEFAULT_COMPILER: &str = "dmd";

/// Prefix of keys derived from a tour page
const CONTEXT_KEY_PREFIX: &str = "sourcecode_";

/// Prefix of keys derived from an imported snippet
const IMPORT_KEY_PREFIX: &str = "run_import_";

/// One editable snippet and its execution settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Current editable text; `None` until a default has been loaded
    pub source_code: Option<String>,
    /// Baseline restored by reset
    pub reset_code: String,
    /// Slot under which edits are persisted
    pub persistence_key: String,
    /// Selected execution backend
    pub compiler: String,
    /// Extra flags passed to the backend
    pub args: String,
}

impl Session {
    /// Session that has not been loaded yet
    pub fn unloaded(compiler: impl Into<String>) -> Self {
        Self {
            source_code: None,
            reset_code: String::new(),
            persistence_key: String::new(),
            compiler: compiler.into(),
            args: String::new(),
        }
    }

    /// Whether a source is available for editing and execution
    pub fn is_loaded(&self) -> bool {
        self.source_code.is_some()
    }

    /// Current source, or the empty string when unloaded
    pub fn source(&self) -> &str {
        self.source_code.as_deref().unwrap_or("")
    }

    /// Whether the source differs from its baseline
    pub fn is_modified(&self) -> bool {
        self.source_code
            .as_deref()
            .is_some_and(|source| source != self.reset_code)
    }
}

/// Where the current page sits in the tour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationContext {
    pub language: String,
    /// Content repository, `<owner>/<name>`
    pub repo: String,
    pub chapter_id: String,
    pub section: String,
    /// Whether the page shows an editor at all
    pub has_source: bool,
    pub prev_page: Option<String>,
    pub next_page: Option<String>,
}

impl NavigationContext {
    /// Create a context for a page with an editor and no neighbours
    pub fn new(
        language: impl Into<String>,
        chapter_id: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            repo: String::new(),
            chapter_id: chapter_id.into(),
            section: section.into(),
            has_source: true,
            prev_page: None,
            next_page: None,
        }
    }

    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = repo.into();
        self
    }

    pub fn with_pages(mut self, prev: Option<String>, next: Option<String>) -> Self {
        self.prev_page = prev.filter(|p| !p.is_empty());
        self.next_page = next.filter(|p| !p.is_empty());
        self
    }

    pub fn with_source(mut self, has_source: bool) -> Self {
        self.has_source = has_source;
        self
    }

    /// Reject contexts with empty identifiers
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("language", &self.language),
            ("chapter id", &self.chapter_id),
            ("section", &self.section),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidInput(format!("{} must not be empty", name)));
            }
        }
        Ok(())
    }

    /// Persistence key shared by every session on this page
    pub fn persistence_key(&self) -> String {
        context_key(&self.language, &self.chapter_id, &self.section)
    }
}

/// Query parameters of the current navigation URL in import mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportParams {
    pub compiler: Option<String>,
    pub args: Option<String>,
    pub source: Option<String>,
    /// Host of the current page, scoping the embedded-default key
    pub host: String,
}

impl ImportParams {
    pub fn for_host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = Some(compiler.into());
        self
    }

    pub fn with_args(mut self, args: impl Into<String>) -> Self {
        self.args = Some(args.into());
        self
    }
}

/// 32-bit rolling hash over UTF-16 code units
///
/// Not cryptographic; two snippets with the same hash share a slot.
pub fn import_hash(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |hash, unit| {
        (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    })
}

/// Key for a tour page
pub fn context_key(language: &str, chapter_id: &str, section: &str) -> String {
    format!("{CONTEXT_KEY_PREFIX}{language}_{chapter_id}_{section}")
}

/// Key for a snippet imported through the `source` URL parameter
pub fn import_key(source: &str) -> String {
    format!("{IMPORT_KEY_PREFIX}{}", import_hash(source))
}

/// Key for the host's embedded default snippet
pub fn default_import_key(host: &str) -> String {
    format!("{IMPORT_KEY_PREFIX}default_{host}")
}

pub fn compiler_slot(key: &str) -> String {
    format!("{key}_compiler")
}

pub fn args_slot(key: &str) -> String {
    format!("{key}_args")
}
