//! Remote note store capability.
//!
//! The reconcilers only talk to the remote side through [`NoteStore`]. Each
//! endpoint has its own request type so optional and required fields are
//! spelled out instead of passed around as loose maps.

use crate::error::Result;
use crate::paths::skip_reason;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A note record as stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable id assigned by the remote on creation.
    pub id: String,
    /// Note identifier, e.g. `/projects/webapp`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub label: String,
    /// Content.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: String,
    /// Ownership tag (`owner:<agent id>`).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// An agent notes can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Filter for listing notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListNotesQuery {
    /// Substring the note description must contain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_search: Option<String>,
    /// Exact label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ListNotesQuery {
    /// All notes carrying an ownership tag.
    pub fn owned_by(owner_tag: impl Into<String>) -> Self {
        Self {
            description_search: Some(owner_tag.into()),
            label: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateNoteRequest {
    pub label: String,
    pub value: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateNoteRequest {
    pub value: String,
}

/// Filter for listing agents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListAgentsQuery {
    /// Free-text match on the agent name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_text: Option<String>,
}

/// Remote note store interface
///
/// Implementations report non-success responses as `SyncError::Api` and
/// connectivity or decoding failures as `SyncError::Transport`.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// List notes matching a filter
    async fn list_notes(&self, query: &ListNotesQuery) -> Result<Vec<Note>>;

    /// Create a note (the remote assigns its id)
    async fn create_note(&self, request: &CreateNoteRequest) -> Result<Note>;

    /// Replace the content of a note
    async fn update_note(&self, id: &str, request: &UpdateNoteRequest) -> Result<Note>;

    /// Delete a note
    async fn delete_note(&self, id: &str) -> Result<()>;

    /// List agents
    async fn list_agents(&self, query: &ListAgentsQuery) -> Result<Vec<Agent>>;
}

/// Remote notes split into those eligible for sync and the skipped labels.
#[derive(Debug, Default)]
pub struct RemoteListing {
    /// Identifier -> note, for identifiers that pass the skip rules.
    pub eligible: BTreeMap<String, Note>,
    /// Labels excluded by the skip rules, in listing order.
    pub skipped: Vec<String>,
}

/// Apply the skip rules to a remote listing. On duplicate labels the first
/// note listed wins.
pub fn partition_remote(notes: Vec<Note>) -> RemoteListing {
    let mut listing = RemoteListing::default();
    for note in notes {
        if let Some(reason) = skip_reason(&note.label) {
            tracing::debug!(label = %note.label, ?reason, "skipping remote note");
            listing.skipped.push(note.label);
            continue;
        }
        if listing.eligible.contains_key(&note.label) {
            tracing::warn!(label = %note.label, id = %note.id, "duplicate remote label ignored");
            continue;
        }
        listing.eligible.insert(note.label.clone(), note);
    }
    listing
}
