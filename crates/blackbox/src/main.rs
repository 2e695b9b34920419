//! Blackbox - browse the recorded history of source files.
//!
//! This is the main entry point for the blackbox CLI.

mod commands;
mod config;

use anyhow::Context;
use blackbox_history::HistoryStore;
use clap::{Parser, Subcommand};
use commands::*;
use config::Config;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "blackbox")]
#[command(author, version, about = "Browse and rebuild recorded source file histories", long_about = None)]
struct Cli {
    /// History database to use
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Additional config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List source files with recorded history
    Files {
        /// Print output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rebuild and print every version of a file
    Show {
        /// Source file name as recorded
        file: String,
        /// Only print this version (1-based)
        #[arg(short = 'n', long)]
        number: Option<usize>,
        /// Print output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rebuild every version of a file and write them to a directory
    Export {
        /// Source file name as recorded
        file: String,
        /// Output directory
        dir: PathBuf,
    },
    /// Record the current content of a file
    Record {
        /// Source file name to record under
        file: String,
        /// Path to read the content from
        path: PathBuf,
        /// Skip edits that change a single line
        #[arg(long)]
        skip_one_line_edits: bool,
    },
    /// Record that a file was renamed
    Rename {
        /// Previous file name
        old: String,
        /// New file name
        new: String,
    },
    /// Record that a file was deleted
    Delete {
        /// Source file name
        file: String,
    },
    /// Print the diff between two files
    Diff {
        /// Original file
        old: PathBuf,
        /// Modified file
        new: PathBuf,
        /// Use the compact format stored in history records
        #[arg(long)]
        compact: bool,
        /// Lines of context for unified diffs
        #[arg(short = 'U', long)]
        context: Option<usize>,
    },
    /// Show configuration
    Config,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    let (mut config, sources) = Config::load(Some(&cwd), cli.config.as_deref()).await?;
    if let Some(database) = &cli.database {
        config.database = Some(database.clone());
    }

    let log_file = init_logging(cli.verbose, config.log_level);
    debug!(sources = ?sources, "Loaded configuration");

    let result = run(cli.command, &config, &sources).await;

    if cli.verbose {
        if let Some(path) = log_file {
            eprintln!("Logs: {}", path.display());
        }
    }

    result
}

async fn run(command: Commands, config: &Config, sources: &[PathBuf]) -> anyhow::Result<()> {
    match command {
        Commands::Files { json } => handle_files(&open_store(config).await?, json),
        Commands::Show { file, number, json } => {
            handle_show(&open_store(config).await?, &file, number, json)
        }
        Commands::Export { file, dir } => {
            handle_export(&open_store(config).await?, &file, &dir).await
        }
        Commands::Record {
            file,
            path,
            skip_one_line_edits,
        } => {
            let include = config.include_one_line_edits() && !skip_one_line_edits;
            handle_record(&open_store(config).await?, include, &file, &path).await
        }
        Commands::Rename { old, new } => handle_rename(&open_store(config).await?, &old, &new),
        Commands::Delete { file } => handle_delete(&open_store(config).await?, &file),
        Commands::Diff {
            old,
            new,
            compact,
            context,
        } => {
            let context = context.unwrap_or_else(|| config.context_lines());
            handle_diff(&old, &new, compact, context).await
        }
        Commands::Config => show_config(config, sources),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Open the configured history database, creating its directory if needed.
async fn open_store(config: &Config) -> anyhow::Result<HistoryStore> {
    let path = config
        .database_path()
        .context("Could not determine a database location; pass --database")?;
    ensure_parent(&path).await?;
    HistoryStore::open(&path).with_context(|| format!("Failed to open {}", path.display()))
}

async fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

fn show_config(config: &Config, sources: &[PathBuf]) -> anyhow::Result<()> {
    if sources.is_empty() {
        println!("Config sources: (defaults)");
    } else {
        println!("Config sources:");
        for source in sources {
            println!("  {}", source.display());
        }
    }
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    if let Some(db) = config.database_path() {
        println!();
        println!("Database: {}", db.display());
    }
    Ok(())
}

fn print_version() {
    println!("blackbox {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Rebuilds every version of a source file from its recorded snapshots and diffs.");
}
