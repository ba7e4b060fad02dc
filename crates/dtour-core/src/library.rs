//! Dub package header editing
//!
//! Single-file D programs declare their dub dependencies in an embedded
//! comment block:
//!
//! ```text
//! /+dub.sdl:
//! dependency "mir" version="~>1.1.1"
//! +/
//! ```

use crate::error::{Error, Result};

const SDL_MARKER: &str = "dub.sdl:";
const JSON_MARKER: &str = "dub.json:";
const SDL_HEADER: &str = "/+dub.sdl:\n+/\n";

/// Add a dependency line to the snippet's `dub.sdl` header
///
/// A header is prepended when the source has none. Sources that only carry
/// a `dub.json` header are rejected.
pub fn add_dependency(source: &str, name: &str, version: &str) -> Result<String> {
    let name = name.trim();
    let version = version.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Library name must not be empty".to_string()));
    }
    if version.is_empty() {
        return Err(Error::InvalidInput("Library version must not be empty".to_string()));
    }

    let source = if source.contains(SDL_MARKER) {
        source.to_string()
    } else if source.contains(JSON_MARKER) {
        return Err(Error::UnsupportedHeader(
            "dub.json headers cannot be edited, convert the header to dub.sdl".to_string(),
        ));
    } else {
        format!("{}{}", SDL_HEADER, source)
    };

    let line = format!("\ndependency \"{}\" version=\"~>{}\"", name, version);
    let Some(pos) = source.find(SDL_MARKER) else {
        return Err(Error::UnsupportedHeader("missing dub.sdl header".to_string()));
    };
    let at = pos + SDL_MARKER.len();

    let mut edited = String::with_capacity(source.len() + line.len());
    edited.push_str(&source[..at]);
    edited.push_str(&line);
    edited.push_str(&source[at..]);
    Ok(edited)
}
