//! Mapping between note identifiers and local markdown files
//!
//! A note identifier such as `/projects/webapp` lives locally at
//! `projects/webapp.md` (relative to the sync root). Conflict copies live next
//! to it as `projects/webapp.conflict.md` and are never uploaded.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Component, Path};

/// Extension of synchronized files.
pub const NOTE_EXTENSION: &str = ".md";

/// Suffix of conflict copies written by pull.
pub const CONFLICT_SUFFIX: &str = ".conflict.md";

/// Auto-generated directory listing maintained by the remote side.
pub const DIRECTORY_LISTING: &str = "/note_directory";

lazy_static! {
    /// Legacy layout that embedded the owning agent id as a path segment.
    static ref LEGACY_OWNER_SEGMENT: Regex =
        Regex::new(r"/\[?agent-[a-f0-9-]+\]?/").expect("static regex");
}

/// Why an identifier is excluded from sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Does not start with `/`.
    NotAPath,
    /// Has an empty or dot-prefixed segment (`..` included), a trailing `/`
    /// or a backslash, so it has no file of its own below the sync root.
    NonCanonical,
    /// The reserved directory listing.
    DirectoryListing,
    /// Embeds a legacy owner id segment.
    LegacyOwnerSegment,
}

/// `/projects/webapp` -> `projects/webapp.md`
pub fn to_local_path(identifier: &str) -> String {
    let stripped = identifier.strip_prefix('/').unwrap_or(identifier);
    format!("{}{}", stripped, NOTE_EXTENSION)
}

/// `projects/webapp.md` -> `/projects/webapp`
///
/// Accepts platform separators and normalises them to `/`.
pub fn to_identifier(relative_path: &str) -> String {
    let normalized = relative_path.replace('\\', "/");
    let stem = normalized
        .strip_suffix(NOTE_EXTENSION)
        .filter(|s| !s.is_empty())
        .unwrap_or(&normalized);
    format!("/{}", stem)
}

/// Identifier for a file below the sync root.
pub fn identifier_for(root: &Path, file: &Path) -> Option<String> {
    let rel = file.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(to_identifier(&parts.join("/")))
}

/// `/projects/webapp` -> `projects/webapp.conflict.md`
pub fn conflict_path(identifier: &str) -> String {
    let stripped = identifier.strip_prefix('/').unwrap_or(identifier);
    format!("{}{}", stripped, CONFLICT_SUFFIX)
}

/// Whether a file name is a conflict copy.
pub fn is_conflict_file(filename: &str) -> bool {
    filename.len() > CONFLICT_SUFFIX.len() && filename.ends_with(CONFLICT_SUFFIX)
}

/// Reason an identifier is excluded from sync, if any.
pub fn skip_reason(identifier: &str) -> Option<SkipReason> {
    if !identifier.starts_with('/') {
        Some(SkipReason::NotAPath)
    } else if !is_canonical(identifier) {
        Some(SkipReason::NonCanonical)
    } else if identifier == DIRECTORY_LISTING {
        Some(SkipReason::DirectoryListing)
    } else if LEGACY_OWNER_SEGMENT.is_match(identifier) {
        Some(SkipReason::LegacyOwnerSegment)
    } else {
        None
    }
}

/// Every segment after the leading `/` is a plain, visible name.
fn is_canonical(identifier: &str) -> bool {
    identifier[1..].split('/').all(|segment| {
        !segment.is_empty() && !segment.starts_with('.') && !segment.contains('\\')
    })
}

pub fn is_excluded(identifier: &str) -> bool {
    skip_reason(identifier).is_some()
}

/// Ownership tag used both as the list filter and as the description of
/// created notes.
pub fn owner_tag(agent_id: &str) -> String {
    format!("owner:{}", agent_id)
}
