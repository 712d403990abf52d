//! In-memory note store
//!
//! Behaves like the remote API closely enough to drive the reconcilers
//! without a network: ids are assigned on create, `description_search` is a
//! substring match and `label` an exact one.

use crate::error::{Result, SyncError};
use crate::remote::{
    Agent, CreateNoteRequest, ListAgentsQuery, ListNotesQuery, Note, NoteStore,
    UpdateNoteRequest,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-memory note store
#[derive(Clone, Default)]
pub struct MemoryNoteStore {
    notes: Arc<RwLock<Vec<Note>>>,
    agents: Arc<RwLock<Vec<Agent>>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a note directly, bypassing failure injection. Returns its id.
    pub async fn insert(&self, label: &str, value: &str, description: &str) -> String {
        let note = Note {
            id: format!("block-{}", uuid::Uuid::new_v4()),
            label: label.to_string(),
            value: value.to_string(),
            description: description.to_string(),
        };
        let id = note.id.clone();
        self.notes.write().await.push(note);
        id
    }

    /// Overwrite a note's content directly, as another client would.
    pub async fn set_value(&self, label: &str, value: &str) -> bool {
        let mut notes = self.notes.write().await;
        match notes.iter_mut().find(|n| n.label == label) {
            Some(note) => {
                note.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// First note with the given label.
    pub async fn get_by_label(&self, label: &str) -> Option<Note> {
        self.notes
            .read()
            .await
            .iter()
            .find(|n| n.label == label)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notes.read().await.is_empty()
    }

    pub async fn add_agent(&self, id: &str, name: &str) {
        self.agents.write().await.push(Agent {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            created_at: None,
        });
    }

    /// Make every create, update and delete fail with a 500.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every note listing fail with a 500.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SyncError::Api {
                status: 500,
                body: "write rejected".to_string(),
            });
        }
        Ok(())
    }
}

fn not_found(id: &str) -> SyncError {
    SyncError::Api {
        status: 404,
        body: format!("block {} not found", id),
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list_notes(&self, query: &ListNotesQuery) -> Result<Vec<Note>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(SyncError::Api {
                status: 500,
                body: "listing unavailable".to_string(),
            });
        }
        let notes = self.notes.read().await;
        Ok(notes
            .iter()
            .filter(|n| {
                query
                    .description_search
                    .as_deref()
                    .is_none_or(|s| n.description.contains(s))
            })
            .filter(|n| query.label.as_deref().is_none_or(|l| n.label == l))
            .cloned()
            .collect())
    }

    async fn create_note(&self, request: &CreateNoteRequest) -> Result<Note> {
        self.check_writable()?;
        let id = self
            .insert(&request.label, &request.value, &request.description)
            .await;
        Ok(Note {
            id,
            label: request.label.clone(),
            value: request.value.clone(),
            description: request.description.clone(),
        })
    }

    async fn update_note(&self, id: &str, request: &UpdateNoteRequest) -> Result<Note> {
        self.check_writable()?;
        let mut notes = self.notes.write().await;
        let note = notes.iter_mut().find(|n| n.id == id).ok_or_else(|| not_found(id))?;
        note.value = request.value.clone();
        Ok(note.clone())
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        self.check_writable()?;
        let mut notes = self.notes.write().await;
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn list_agents(&self, query: &ListAgentsQuery) -> Result<Vec<Agent>> {
        let agents = self.agents.read().await;
        let needle = query.query_text.as_deref().map(str::to_lowercase);
        Ok(agents
            .iter()
            .filter(|a| {
                needle
                    .as_deref()
                    .is_none_or(|n| a.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect())
    }
}
