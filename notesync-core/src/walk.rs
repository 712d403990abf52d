//! Local tree traversal
//!
//! [`walk`] hands every entry below the root to a visitor that decides
//! whether to descend. [`scan_local`] applies the sync rules on top of it:
//! hidden directories and files are ignored, only `.md` files count, and
//! conflict copies and excluded identifiers are reported as skipped.

use crate::error::{Result, SyncError};
use crate::paths::{identifier_for, is_conflict_file, skip_reason, NOTE_EXTENSION};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Visitor instruction for [`walk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Keep going (descend if this is a directory).
    Continue,
    /// Do not descend into this directory. Ignored for files.
    Prune,
}

/// Visit every entry below `root` in file name order, root excluded.
pub fn walk<F>(root: &Path, mut visit: F) -> Result<()>
where
    F: FnMut(&Path, bool) -> Result<Walk>,
{
    let mut entries = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = entries.next() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
            SyncError::io(path, source)
        })?;
        let is_dir = entry.file_type().is_dir();
        if visit(entry.path(), is_dir)? == Walk::Prune && is_dir {
            entries.skip_current_dir();
        }
    }
    Ok(())
}

/// A synchronizable file found locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub identifier: String,
    pub path: PathBuf,
}

/// Result of scanning a sync root.
#[derive(Debug, Default)]
pub struct LocalScan {
    /// Eligible files in traversal order.
    pub files: Vec<LocalFile>,
    /// Conflict copies (as relative paths) and excluded identifiers.
    pub skipped: Vec<String>,
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Collect the markdown files under `root` that take part in sync.
pub fn scan_local(root: &Path) -> Result<LocalScan> {
    let mut scan = LocalScan::default();

    walk(root, |path, is_dir| {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if is_dir {
            return Ok(if is_hidden(name) { Walk::Prune } else { Walk::Continue });
        }
        if !name.ends_with(NOTE_EXTENSION) || is_hidden(name) {
            return Ok(Walk::Continue);
        }

        if is_conflict_file(name) {
            let rel = path.strip_prefix(root).unwrap_or(path);
            scan.skipped.push(rel.to_string_lossy().replace('\\', "/"));
            return Ok(Walk::Continue);
        }

        let Some(identifier) = identifier_for(root, path) else {
            tracing::warn!(path = %path.display(), "skipping file with non UTF-8 path");
            return Ok(Walk::Continue);
        };
        if let Some(reason) = skip_reason(&identifier) {
            tracing::debug!(%identifier, ?reason, "skipping local file");
            scan.skipped.push(identifier);
            return Ok(Walk::Continue);
        }

        scan.files.push(LocalFile {
            identifier,
            path: path.to_path_buf(),
        });
        Ok(Walk::Continue)
    })?;

    Ok(scan)
}
