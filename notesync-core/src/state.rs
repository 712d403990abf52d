//! Sync snapshot persisted at the root of a synchronized directory.
//!
//! The snapshot remembers, per note identifier, the fingerprints of both
//! sides at the last point they were reconciled. Comparing those against the
//! current local and remote content is what tells "changed since last sync"
//! apart from "has always been different".
//!
//! The snapshot is loaded once per pass, mutated in memory by the reconciler
//! and written back as a whole only after the pass succeeded.

use crate::error::{Result, SyncError};
use crate::paths::owner_tag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File name of the snapshot inside the sync root.
pub const STATE_FILE_NAME: &str = ".note-sync.json";

/// Remote used when none was given at init time.
pub const DEFAULT_BASE_URL: &str = "https://api.letta.com";

/// Last reconciled state of a single note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Fingerprint of the local file when last reconciled.
    pub local_hash: String,
    /// Fingerprint of the remote note when last reconciled.
    pub remote_hash: String,
    pub synced_at: DateTime<Utc>,
    /// Id of the linked remote note.
    #[serde(rename = "block_id", default, skip_serializing_if = "String::is_empty")]
    pub remote_id: String,
}

impl SyncRecord {
    pub fn local_changed(&self, local_hash: &str) -> bool {
        self.local_hash != local_hash
    }

    pub fn remote_changed(&self, remote_hash: &str) -> bool {
        self.remote_hash != remote_hash
    }

    /// Both sides moved away from this record independently.
    pub fn diverged(&self, local_hash: &str, remote_hash: &str) -> bool {
        self.local_changed(local_hash) && self.remote_changed(remote_hash)
    }
}

/// Conflict test shared by pull and push. Without a record there is no
/// common ancestor, so nothing counts as a conflict.
pub fn diverged(record: Option<&SyncRecord>, local_hash: &str, remote_hash: &str) -> bool {
    record.is_some_and(|r| r.diverged(local_hash, remote_hash))
}

/// Whole snapshot for one sync root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Agent owning the synchronized notes.
    pub agent_id: String,
    /// Base URL of the remote API.
    #[serde(rename = "letta_base_url")]
    pub base_url: String,
    /// Identifier -> last reconciled state.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub files: BTreeMap<String, SyncRecord>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, SyncRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

impl SyncState {
    /// Create an empty snapshot.
    pub fn new(agent_id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            base_url: base_url.into(),
            files: BTreeMap::new(),
        }
    }

    /// Path of the snapshot file for a sync root.
    pub fn state_file_path(root: &Path) -> PathBuf {
        root.join(STATE_FILE_NAME)
    }

    /// Whether `root` already holds a snapshot.
    pub fn exists(root: &Path) -> bool {
        Self::state_file_path(root).exists()
    }

    /// Load the snapshot of a sync root.
    pub fn load(root: &Path) -> Result<Self> {
        let state_path = Self::state_file_path(root);
        let data = match fs::read_to_string(&state_path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SyncError::NotInitialized { path: state_path });
            }
            Err(e) => return Err(SyncError::io(state_path, e)),
        };
        serde_json::from_str(&data).map_err(|source| SyncError::MalformedState {
            path: state_path,
            source,
        })
    }

    /// Write the whole snapshot, replacing any previous one.
    pub fn save(&self, root: &Path) -> Result<()> {
        let state_path = Self::state_file_path(root);
        if let Some(parent) = state_path.parent() {
            fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }
        let tmp_path = state_path.with_extension("tmp");
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&tmp_path, &data).map_err(|e| SyncError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &state_path).map_err(|e| SyncError::io(&state_path, e))?;
        Ok(())
    }

    /// Create and persist an empty snapshot. Refuses to overwrite one.
    pub fn init(root: &Path, agent_id: &str, base_url: Option<&str>) -> Result<Self> {
        if Self::exists(root) {
            return Err(SyncError::AlreadyInitialized {
                path: Self::state_file_path(root),
            });
        }
        fs::create_dir_all(root).map_err(|e| SyncError::io(root, e))?;

        let base_url = base_url
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_BASE_URL);
        let state = Self::new(agent_id, base_url.trim_end_matches('/'));
        state.save(root)?;
        Ok(state)
    }

    /// Ownership tag of this snapshot's agent.
    pub fn owner_tag(&self) -> String {
        owner_tag(&self.agent_id)
    }

    pub fn record(&self, identifier: &str) -> Option<&SyncRecord> {
        self.files.get(identifier)
    }

    /// Record that both sides were just brought in line.
    pub fn record_synced(
        &mut self,
        identifier: &str,
        local_hash: &str,
        remote_hash: &str,
        remote_id: &str,
    ) {
        self.files.insert(
            identifier.to_string(),
            SyncRecord {
                local_hash: local_hash.to_string(),
                remote_hash: remote_hash.to_string(),
                synced_at: Utc::now(),
                remote_id: remote_id.to_string(),
            },
        );
    }

    /// Record that both sides were found identical.
    ///
    /// A record that already says exactly this keeps its timestamp, so
    /// repeated passes over unchanged notes leave the snapshot untouched.
    /// Returns whether the record changed.
    pub fn refresh(&mut self, identifier: &str, hash: &str, remote_id: &str) -> bool {
        let current = self.files.get(identifier).is_some_and(|r| {
            r.local_hash == hash && r.remote_hash == hash && r.remote_id == remote_id
        });
        if current {
            return false;
        }
        self.record_synced(identifier, hash, hash, remote_id);
        true
    }
}
