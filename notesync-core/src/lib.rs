//! note-sync core library
//!
//! Keeps a local tree of markdown files and an agent's remote notes
//! consistent in both directions:
//! - Path translation between note identifiers and local files
//! - Content fingerprints for change detection
//! - Sync snapshot persisted per directory
//! - Pull, push and status reconciliation against any [`NoteStore`]
//! - In-memory note store for tests and dry runs

pub mod error;
pub mod hash;
pub mod memory;
pub mod paths;
pub mod pull;
pub mod push;
pub mod remote;
pub mod report;
pub mod state;
pub mod status;
pub mod walk;

pub use error::{Result, SyncError};
pub use hash::fingerprint;
pub use memory::MemoryNoteStore;
pub use pull::{pull, PullOptions};
pub use push::{push, PushOptions};
pub use remote::{
    Agent, CreateNoteRequest, ListAgentsQuery, ListNotesQuery, Note, NoteStore,
    UpdateNoteRequest,
};
pub use report::{NoteState, StatusReport, SyncReport};
pub use state::{SyncRecord, SyncState, DEFAULT_BASE_URL, STATE_FILE_NAME};
pub use status::status;
