//! Classified results of a reconciliation pass.

use serde::Serialize;

/// Outcome of a pull or push, one list per classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub conflicts: Vec<String>,
    pub unchanged: Vec<String>,
    pub skipped: Vec<String>,
}

impl SyncReport {
    /// Nothing was created, updated or left in conflict.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.conflicts.is_empty()
    }
}

/// Where a single note stands between the last sync and now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoteState {
    Untracked,
    Synced,
    LocalModified,
    RemoteModified,
    Conflicted,
}

/// Read-only three-way diff of a sync root against the remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub modified_locally: Vec<String>,
    pub modified_remotely: Vec<String>,
    pub conflicts: Vec<String>,
    pub untracked_local: Vec<String>,
    pub untracked_remote: Vec<String>,
    pub synced: Vec<String>,
}

impl StatusReport {
    /// Anything that a pull or push would act on.
    pub fn has_changes(&self) -> bool {
        !(self.modified_locally.is_empty()
            && self.modified_remotely.is_empty()
            && self.conflicts.is_empty()
            && self.untracked_local.is_empty()
            && self.untracked_remote.is_empty())
    }

    /// State of one identifier, `None` if neither side knows it.
    pub fn note_state(&self, identifier: &str) -> Option<NoteState> {
        let has = |list: &[String]| list.iter().any(|p| p == identifier);
        if has(&self.synced) {
            Some(NoteState::Synced)
        } else if has(&self.modified_locally) {
            Some(NoteState::LocalModified)
        } else if has(&self.modified_remotely) {
            Some(NoteState::RemoteModified)
        } else if has(&self.conflicts) {
            Some(NoteState::Conflicted)
        } else if has(&self.untracked_local) || has(&self.untracked_remote) {
            Some(NoteState::Untracked)
        } else {
            None
        }
    }
}
