//! patchbay CLI - apply and inspect patch batches against a local database
//!
//! Stands in for the HTTP transport: reads a JSON array of patches, runs
//! it through the sync engine on behalf of a user, and prints the batch
//! result.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use patchbay_core::db::{Database, SqliteNoteStore, SqliteTaskStore};
use patchbay_core::{BatchResult, Patch, PatchDispatcher, UserId};
use thiserror::Error;
use tracing::info;

#[derive(Parser)]
#[command(name = "patchbay")]
#[command(about = "Patch-based sync for offline-first notes and tasks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional path to local database file
    #[arg(long, value_name = "PATH")]
    db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and run migrations
    Init,
    /// Apply a patch batch from a JSON file ("-" reads stdin)
    Apply {
        /// Acting user (owner for creates, ownership check otherwise)
        #[arg(long)]
        user: UserId,
        /// Entity family the batch targets
        #[arg(long, value_enum)]
        item_type: ItemFamily,
        /// Apply every patch even when stale, as a reviewed overwrite
        #[arg(long)]
        force_tolerant: bool,
        /// Path to the batch file
        file: String,
    },
    /// List a user's entities
    List {
        /// Owner to list for
        #[arg(long)]
        user: UserId,
        /// Entity family to list
        #[arg(long, value_enum)]
        item_type: ItemFamily,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum ItemFamily {
    Note,
    Task,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Core(#[from] patchbay_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("patchbay=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Init => run_init(&db_path),
        Commands::Apply {
            user,
            item_type,
            force_tolerant,
            file,
        } => run_apply(user, item_type, force_tolerant, &file, &db_path),
        Commands::List {
            user,
            item_type,
            json,
        } => run_list(user, item_type, json, &db_path),
    }
}

/// Pick the database location: explicit flag, or the platform data dir
fn resolve_db_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("patchbay")
            .join("patchbay.db")
    })
}

fn open_database(db_path: &Path) -> Result<Database, CliError> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(Database::open(db_path)?)
}

fn run_init(db_path: &Path) -> Result<(), CliError> {
    open_database(db_path)?;
    println!("Database ready at {}", db_path.display());
    Ok(())
}

fn run_apply(
    user: UserId,
    item_type: ItemFamily,
    force_tolerant: bool,
    file: &str,
    db_path: &Path,
) -> Result<(), CliError> {
    let raw = if file == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(file)?
    };
    let mut patches: Vec<Patch> = serde_json::from_str(&raw)?;
    if force_tolerant {
        force_all(&mut patches);
    }

    let db = open_database(db_path)?;
    let result = apply_batch(&db, item_type, user, &patches);
    info!(
        success = result.success.len(),
        errors = result.errors.len(),
        conflicts = result.conflicts.len(),
        "batch processed"
    );

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Mark every patch in the batch as a reviewed overwrite, bypassing
/// staleness detection
fn force_all(patches: &mut [Patch]) {
    for patch in patches {
        patch.force = Some(true);
    }
}

fn apply_batch(
    db: &Database,
    item_type: ItemFamily,
    user: UserId,
    patches: &[Patch],
) -> BatchResult {
    match item_type {
        ItemFamily::Note => {
            PatchDispatcher::new(SqliteNoteStore::new(db.conn())).process(user, patches)
        }
        ItemFamily::Task => {
            PatchDispatcher::new(SqliteTaskStore::new(db.conn())).process(user, patches)
        }
    }
}

fn run_list(
    user: UserId,
    item_type: ItemFamily,
    json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let db = open_database(db_path)?;
    match item_type {
        ItemFamily::Note => {
            let notes = SqliteNoteStore::new(db.conn()).list_for_user(user)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else {
                for note in notes {
                    println!(
                        "{}  {}  {}",
                        note.id,
                        note.updated_at.format("%Y-%m-%d %H:%M"),
                        note.title.as_deref().unwrap_or("(untitled)")
                    );
                }
            }
        }
        ItemFamily::Task => {
            let tasks = SqliteTaskStore::new(db.conn()).list_for_user(user)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                for task in tasks {
                    let done = match task.completed {
                        Some(true) => "[x]",
                        _ => "[ ]",
                    };
                    println!(
                        "{}  {}  {} {}",
                        task.id,
                        task.updated_at.format("%Y-%m-%d %H:%M"),
                        done,
                        task.title
                    );
                }
            }
        }
    }
    Ok(())
}
