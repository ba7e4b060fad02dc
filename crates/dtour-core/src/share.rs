//! Shareable links: standalone editor, gist replay and source edits

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// Short link produced by a share action; lives until the next navigation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    pub url: String,
}

impl ShareLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

fn parse(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| Error::InvalidInput(format!("Invalid URL '{}': {}", url, e)))
}

/// Append `pairs` with every value percent-encoded (spaces as `%20`)
fn with_query(mut url: Url, pairs: &[(&str, &str)]) -> String {
    let query = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    url.set_query(Some(&query));
    url.to_string()
}

/// Link opening the snippet in the standalone editor
///
/// Local development hosts link to `<origin>/editor` on the same origin;
/// everything else links to `standalone_origin`.
pub fn standalone_url(
    origin: &str,
    standalone_origin: &str,
    local_hosts: &[String],
    compiler: &str,
    args: &str,
    source: &str,
) -> Result<String> {
    let current = parse(origin)?;
    let is_local = current
        .host_str()
        .map(|host| local_hosts.iter().any(|h| h == host))
        .unwrap_or(false);

    let base = if is_local {
        parse(&format!("{}/editor", origin.trim_end_matches('/')))?
    } else {
        parse(standalone_origin)?
    };

    Ok(with_query(
        base,
        &[("compiler", compiler), ("args", args), ("source", source)],
    ))
}

/// Extract a gist id from a gist URL or a bare id
///
/// Returns `None` for empty input.
pub fn gist_id(input: &str) -> Option<String> {
    let mut id = input.trim();
    for prefix in ["https://gist.github.com/", "http://gist.github.com/"] {
        if let Some(rest) = id.strip_prefix(prefix) {
            id = rest;
        }
    }
    if let Some(rest) = id.strip_prefix("anonymous/") {
        id = rest;
    }
    let id = id.trim_matches('/');
    let id = id.rsplit('/').next().unwrap_or(id);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// In-app route replaying a gist with the current settings
pub fn gist_route(origin: &str, id: &str, compiler: &str, args: &str) -> Result<String> {
    let base = parse(&format!("{}/gist/{}", origin.trim_end_matches('/'), id))?;
    Ok(with_query(base, &[("compiler", compiler), ("args", args)]))
}

/// Share link for a freshly created gist
pub fn gist_share_url(origin: &str, id: &str, compiler: &str, args: &str) -> Result<String> {
    let base = parse(&format!("{}/gist", origin.trim_end_matches('/')))?;
    Ok(with_query(
        base,
        &[("id", id), ("compiler", compiler), ("args", args)],
    ))
}

/// Link to edit a tour page's markdown source
pub fn github_edit_url(repo: &str, language: &str, chapter_id: &str, section: &str) -> String {
    format!(
        "https://github.com/{}/edit/master/public/content/{}/{}/{}.md",
        repo, language, chapter_id, section
    )
}
