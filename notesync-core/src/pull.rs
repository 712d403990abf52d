//! Remote to local reconciliation.

use crate::error::{Result, SyncError};
use crate::hash::fingerprint;
use crate::paths::{conflict_path, to_local_path};
use crate::remote::{partition_remote, ListNotesQuery, NoteStore};
use crate::report::SyncReport;
use crate::state::{diverged, SyncState};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options for [`pull`].
#[derive(Debug, Clone)]
pub struct PullOptions {
    /// Sync root.
    pub root: PathBuf,
    /// Overwrite local changes even when both sides changed.
    pub force: bool,
}

/// Download the agent's notes into the sync root.
///
/// Mutates `state` in place; the caller saves it once this returns `Ok`.
/// Any listing or filesystem failure aborts the whole pass.
pub async fn pull<S>(store: &S, state: &mut SyncState, opts: &PullOptions) -> Result<SyncReport>
where
    S: NoteStore + ?Sized,
{
    let notes = store
        .list_notes(&ListNotesQuery::owned_by(state.owner_tag()))
        .await?;
    let listing = partition_remote(notes);

    let mut report = SyncReport {
        skipped: listing.skipped,
        ..Default::default()
    };

    for (identifier, note) in &listing.eligible {
        let local_path = opts.root.join(to_local_path(identifier));
        let remote_hash = fingerprint(&note.value);

        let Some(local_content) = read_if_exists(&local_path)? else {
            write_note(&local_path, &note.value)?;
            debug!(%identifier, "created");
            report.created.push(identifier.clone());
            state.record_synced(identifier, &remote_hash, &remote_hash, &note.id);
            continue;
        };

        let local_hash = fingerprint(&local_content);
        if local_hash == remote_hash {
            state.refresh(identifier, &remote_hash, &note.id);
            report.unchanged.push(identifier.clone());
            continue;
        }

        if diverged(state.record(identifier), &local_hash, &remote_hash) {
            if !opts.force {
                let conflict_file = opts.root.join(conflict_path(identifier));
                write_note(&conflict_file, &note.value)?;
                warn!(%identifier, path = %conflict_file.display(), "both sides changed, wrote conflict file");
                report.conflicts.push(identifier.clone());
                continue;
            }
            warn!(%identifier, "both sides changed, overwriting local copy");
        }

        write_note(&local_path, &note.value)?;
        debug!(%identifier, "updated");
        report.updated.push(identifier.clone());
        state.record_synced(identifier, &remote_hash, &remote_hash, &note.id);
    }

    info!(
        created = report.created.len(),
        updated = report.updated.len(),
        conflicts = report.conflicts.len(),
        unchanged = report.unchanged.len(),
        skipped = report.skipped.len(),
        "pull complete"
    );
    Ok(report)
}

fn read_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SyncError::io(path, e)),
    }
}

/// Write a note file, creating parent directories as needed.
fn write_note(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| SyncError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryNoteStore;
    use tempfile::TempDir;

    const OWNER: &str = "owner:agent-1";

    fn setup() -> (TempDir, SyncState, PullOptions) {
        let tmp = TempDir::new().unwrap();
        let state = SyncState::new("agent-1", "http://localhost");
        let opts = PullOptions {
            root: tmp.path().to_path_buf(),
            force: false,
        };
        (tmp, state, opts)
    }

    #[tokio::test]
    async fn test_pull_creates_nested_files() {
        let (tmp, mut state, opts) = setup();
        let store = MemoryNoteStore::new();
        let id = store.insert("/projects/webapp", "# Webapp", OWNER).await;
        store.insert("/elsewhere", "not mine", "owner:agent-2").await;

        let report = pull(&store, &mut state, &opts).await.unwrap();
        assert_eq!(report.created, vec!["/projects/webapp"]);

        let content = fs::read_to_string(tmp.path().join("projects/webapp.md")).unwrap();
        assert_eq!(content, "# Webapp");
        assert!(!tmp.path().join("elsewhere.md").exists());

        let record = state.record("/projects/webapp").unwrap();
        assert_eq!(record.remote_id, id);
        assert_eq!(record.local_hash, record.remote_hash);
    }

    #[tokio::test]
    async fn test_pull_unchanged_fills_missing_record() {
        let (tmp, mut state, opts) = setup();
        let store = MemoryNoteStore::new();
        store.insert("/todo", "same", OWNER).await;
        fs::write(tmp.path().join("todo.md"), "same").unwrap();

        let report = pull(&store, &mut state, &opts).await.unwrap();
        assert_eq!(report.unchanged, vec!["/todo"]);
        assert!(state.record("/todo").is_some());
    }

    #[tokio::test]
    async fn test_pull_untracked_difference_overwrites() {
        let (tmp, mut state, opts) = setup();
        let store = MemoryNoteStore::new();
        store.insert("/todo", "remote", OWNER).await;
        fs::write(tmp.path().join("todo.md"), "local").unwrap();

        let report = pull(&store, &mut state, &opts).await.unwrap();
        assert_eq!(report.updated, vec!["/todo"]);
        assert_eq!(fs::read_to_string(tmp.path().join("todo.md")).unwrap(), "remote");
    }

    #[tokio::test]
    async fn test_pull_force_overrides_conflict() {
        let (tmp, mut state, opts) = setup();
        let store = MemoryNoteStore::new();
        store.insert("/todo", "v1", OWNER).await;
        pull(&store, &mut state, &opts).await.unwrap();

        fs::write(tmp.path().join("todo.md"), "local edit").unwrap();
        store.set_value("/todo", "remote edit").await;

        let forced = PullOptions { force: true, ..opts };
        let report = pull(&store, &mut state, &forced).await.unwrap();
        assert_eq!(report.updated, vec!["/todo"]);
        assert!(report.conflicts.is_empty());
        assert_eq!(
            fs::read_to_string(tmp.path().join("todo.md")).unwrap(),
            "remote edit"
        );
        assert!(!tmp.path().join("todo.conflict.md").exists());
    }

    #[tokio::test]
    async fn test_pull_never_writes_outside_root() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        let mut state = SyncState::new("agent-1", "http://localhost");
        let opts = PullOptions {
            root: root.clone(),
            force: false,
        };

        let absolute = format!("/{}/abs", outer.path().display());
        let store = MemoryNoteStore::new();
        store.insert("/../escaped", "x", OWNER).await;
        store.insert(&absolute, "x", OWNER).await;
        store.insert("/.plan", "x", OWNER).await;
        store.insert("/a//b", "x", OWNER).await;
        store.insert("/todo", "x", OWNER).await;

        let report = pull(&store, &mut state, &opts).await.unwrap();
        assert_eq!(report.created, vec!["/todo"]);
        assert_eq!(report.skipped.len(), 4);
        assert!(report.skipped.contains(&absolute));

        assert!(!outer.path().join("escaped.md").exists());
        assert!(!outer.path().join("abs.md").exists());
        assert!(!root.join(".plan.md").exists());
        assert!(!root.join("a").exists());
        assert_eq!(state.files.keys().collect::<Vec<_>>(), vec!["/todo"]);
    }

    #[tokio::test]
    async fn test_pull_write_failure_is_fatal() {
        let (tmp, mut state, opts) = setup();
        let store = MemoryNoteStore::new();
        store.insert("/blocked/todo", "x", OWNER).await;
        // A regular file where a directory is needed.
        fs::write(tmp.path().join("blocked"), "not a dir").unwrap();

        let err = pull(&store, &mut state, &opts).await.unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }
}
