//! Read-only three-way diff between the sync root, the remote and the
//! snapshot. Never mutates anything, so it is safe to run at any time.

use crate::error::{Result, SyncError};
use crate::hash::fingerprint;
use crate::remote::{partition_remote, ListNotesQuery, NoteStore};
use crate::report::StatusReport;
use crate::state::SyncState;
use crate::walk::scan_local;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Compare every eligible note on both sides against the snapshot.
pub async fn status<S>(store: &S, state: &SyncState, root: &Path) -> Result<StatusReport>
where
    S: NoteStore + ?Sized,
{
    let remote = partition_remote(
        store
            .list_notes(&ListNotesQuery::owned_by(state.owner_tag()))
            .await?,
    )
    .eligible;
    let scan = scan_local(root)?;

    let mut report = StatusReport::default();
    let mut seen = HashSet::new();

    for file in scan.files {
        let identifier = file.identifier;
        seen.insert(identifier.clone());

        let Some(note) = remote.get(&identifier) else {
            report.untracked_local.push(identifier);
            continue;
        };

        let content = fs::read_to_string(&file.path).map_err(|e| SyncError::io(&file.path, e))?;
        let local_hash = fingerprint(&content);
        let remote_hash = fingerprint(&note.value);

        let Some(record) = state.record(&identifier) else {
            if local_hash == remote_hash {
                report.synced.push(identifier);
            } else {
                report.conflicts.push(identifier);
            }
            continue;
        };

        match (
            record.local_changed(&local_hash),
            record.remote_changed(&remote_hash),
        ) {
            (true, true) => report.conflicts.push(identifier),
            (true, false) => report.modified_locally.push(identifier),
            (false, true) => report.modified_remotely.push(identifier),
            (false, false) => report.synced.push(identifier),
        }
    }

    report.untracked_remote = remote
        .into_keys()
        .filter(|identifier| !seen.contains(identifier))
        .collect();

    tracing::debug!(
        synced = report.synced.len(),
        has_changes = report.has_changes(),
        "status computed"
    );
    Ok(report)
}
