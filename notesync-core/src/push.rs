//! Local to remote reconciliation.

use crate::error::{Result, SyncError};
use crate::hash::fingerprint;
use crate::remote::{
    partition_remote, CreateNoteRequest, ListNotesQuery, NoteStore, UpdateNoteRequest,
};
use crate::report::SyncReport;
use crate::state::{diverged, SyncState};
use crate::walk::scan_local;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Options for [`push`].
#[derive(Debug, Clone)]
pub struct PushOptions {
    /// Sync root.
    pub root: PathBuf,
    /// Overwrite remote changes even when both sides changed.
    pub force: bool,
}

/// Upload the sync root's markdown files to the agent's notes.
///
/// The remote listing is fetched once per pass. Mutates `state` in place;
/// the caller saves it once this returns `Ok`.
pub async fn push<S>(store: &S, state: &mut SyncState, opts: &PushOptions) -> Result<SyncReport>
where
    S: NoteStore + ?Sized,
{
    let scan = scan_local(&opts.root)?;
    let owner = state.owner_tag();
    let mut remote = partition_remote(
        store
            .list_notes(&ListNotesQuery::owned_by(owner.clone()))
            .await?,
    )
    .eligible;

    let mut report = SyncReport {
        skipped: scan.skipped,
        ..Default::default()
    };

    for file in scan.files {
        let identifier = file.identifier;
        let content = fs::read_to_string(&file.path).map_err(|e| SyncError::io(&file.path, e))?;
        let local_hash = fingerprint(&content);

        let Some(note) = remote.remove(&identifier) else {
            let created = store
                .create_note(&CreateNoteRequest {
                    label: identifier.clone(),
                    value: content,
                    description: owner.clone(),
                })
                .await?;
            debug!(%identifier, id = %created.id, "created remote note");
            state.record_synced(&identifier, &local_hash, &local_hash, &created.id);
            report.created.push(identifier);
            continue;
        };

        let remote_hash = fingerprint(&note.value);
        if local_hash == remote_hash {
            state.refresh(&identifier, &local_hash, &note.id);
            report.unchanged.push(identifier);
            continue;
        }

        if diverged(state.record(&identifier), &local_hash, &remote_hash) {
            if !opts.force {
                warn!(%identifier, "both sides changed, not pushing");
                report.conflicts.push(identifier);
                continue;
            }
            warn!(%identifier, "both sides changed, overwriting remote note");
        }

        store
            .update_note(&note.id, &UpdateNoteRequest { value: content })
            .await?;
        debug!(%identifier, id = %note.id, "updated remote note");
        state.record_synced(&identifier, &local_hash, &local_hash, &note.id);
        report.updated.push(identifier);
    }

    info!(
        created = report.created.len(),
        updated = report.updated.len(),
        conflicts = report.conflicts.len(),
        unchanged = report.unchanged.len(),
        skipped = report.skipped.len(),
        "push complete"
    );
    Ok(report)
}
