//! Error taxonomy for note synchronization
//!
//! Every variant is fatal to the pass that produced it. Conflicts and skipped
//! identifiers are results, not errors.

use std::path::PathBuf;

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that abort a pull, push, status or init
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("not a note-sync directory (no {} found). Run 'note-sync init' first", .path.display())]
    NotInitialized { path: PathBuf },

    #[error("directory already initialized. Delete {} to reinitialize", .path.display())]
    AlreadyInitialized { path: PathBuf },

    #[error("failed to parse state file {}: {source}", .path.display())]
    MalformedState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error came from the remote side.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Transport(_))
    }
}
