//! note-sync: bidirectional sync between an agent's notes and a folder of
//! markdown files.
//!
//! # Usage
//!
//! ```bash
//! # Initialize a sync directory for an agent
//! note-sync init agent-123 --dir ~/notes
//!
//! # Download notes, upload local edits
//! note-sync pull --dir ~/notes
//! note-sync push --dir ~/notes
//!
//! # Show what a pull or push would do
//! note-sync status --dir ~/notes
//!
//! # Find an agent id
//! note-sync agents --name research
//! ```
//!
//! Requires `LETTA_API_KEY` in the environment.

mod client;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::HttpNoteStore;
use config::ClientConfig;
use notesync_core::{
    paths::owner_tag, ListAgentsQuery, ListNotesQuery, NoteStore, PullOptions, PushOptions,
    SyncError, SyncState, STATE_FILE_NAME,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "note-sync")]
#[command(author = "note-sync Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Sync Letta notes with local markdown files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize a sync directory for an agent
    Init {
        /// Agent whose notes are synchronized
        agent_id: String,
        /// Directory to initialize
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// API base URL (default: $LETTA_BASE_URL or https://api.letta.com)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Download notes to local files
    Pull {
        /// Sync directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Overwrite local changes without conflict check
        #[arg(long)]
        force: bool,
    },

    /// Upload local files as notes
    Push {
        /// Sync directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        /// Overwrite remote changes without conflict check
        #[arg(long)]
        force: bool,
    },

    /// Show sync status
    Status {
        /// Sync directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// List available agents
    Agents {
        /// Search agents by name
        #[arg(long)]
        name: Option<String>,
        /// API base URL (default: $LETTA_BASE_URL or https://api.letta.com)
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, reports to stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("note_sync=info".parse()?)
                .add_directive("notesync_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            agent_id,
            dir,
            base_url,
        } => cmd_init(agent_id, dir, base_url).await,

        Commands::Pull { dir, force } => cmd_pull(dir, force).await,

        Commands::Push { dir, force } => cmd_push(dir, force).await,

        Commands::Status { dir } => cmd_status(dir).await,

        Commands::Agents { name, base_url } => cmd_agents(name, base_url).await,
    }
}

/// Load the snapshot and build a client for the remote it points at.
fn open(dir: &Path) -> Result<(SyncState, HttpNoteStore)> {
    let state = SyncState::load(dir)?;
    let config = ClientConfig::from_env(Some(&state.base_url))?;
    let client = HttpNoteStore::new(&config)?;
    Ok((state, client))
}

async fn cmd_init(agent_id: String, dir: PathBuf, base_url: Option<String>) -> Result<()> {
    if SyncState::exists(&dir) {
        return Err(SyncError::AlreadyInitialized {
            path: SyncState::state_file_path(&dir),
        }
        .into());
    }

    let config = ClientConfig::from_env(base_url.as_deref())?;
    let client = HttpNoteStore::new(&config)?;

    // Make sure the key works before writing anything
    client
        .list_notes(&ListNotesQuery::owned_by(owner_tag(&agent_id)))
        .await
        .context("failed to connect to Letta API")?;

    let state = SyncState::init(&dir, &agent_id, Some(client.base_url()))?;
    tracing::info!(agent = %state.agent_id, dir = %dir.display(), "initialized");

    println!("Initialized note-sync for agent {}", state.agent_id);
    println!("State file: {}", dir.join(STATE_FILE_NAME).display());
    println!("\nNext steps:");
    println!("  note-sync pull   # Download notes");
    println!("  note-sync push   # Upload local changes");
    println!("  note-sync status # Check sync status");
    Ok(())
}

async fn cmd_pull(dir: PathBuf, force: bool) -> Result<()> {
    let (mut state, client) = open(&dir)?;

    let opts = PullOptions {
        root: dir.clone(),
        force,
    };
    let report = notesync_core::pull(&client, &mut state, &opts).await?;

    state.save(&dir).context("failed to save state")?;

    output::print_pull(&report, &mut std::io::stdout())
}

async fn cmd_push(dir: PathBuf, force: bool) -> Result<()> {
    let (mut state, client) = open(&dir)?;

    let opts = PushOptions {
        root: dir.clone(),
        force,
    };
    let report = notesync_core::push(&client, &mut state, &opts).await?;

    state.save(&dir).context("failed to save state")?;

    output::print_push(&report, &mut std::io::stdout())
}

async fn cmd_status(dir: PathBuf) -> Result<()> {
    let (state, client) = open(&dir)?;
    let report = notesync_core::status(&client, &state, &dir).await?;
    output::print_status(&report, &mut std::io::stdout())
}

async fn cmd_agents(name: Option<String>, base_url: Option<String>) -> Result<()> {
    let config = ClientConfig::from_env(base_url.as_deref())?;
    let client = HttpNoteStore::new(&config)?;

    let agents = client
        .list_agents(&ListAgentsQuery {
            query_text: name.clone().filter(|n| !n.is_empty()),
        })
        .await
        .context("failed to list agents")?;

    output::print_agents(&agents, name.as_deref(), &mut std::io::stdout())
}
