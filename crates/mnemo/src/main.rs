// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemo` operator CLI.

mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mnemo::{Mnemo, MnemoConfig, MnemoError};

/// Mnemo - file-backed memories and tasks with automatic relevance links.
#[derive(Parser, Debug)]
#[command(name = "mnemo", version, about, long_about = None)]
struct Cli {
    /// Configuration file to load instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage root, overriding `storage.root_dir`.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check the storage tree for corrupt and orphaned files.
    Health,
    /// Snapshot the tasks and memories trees.
    Backup {
        #[arg(long, default_value = "manual")]
        label: String,
    },
    /// Replace live data with a backup (a safety backup is taken first).
    Restore {
        /// Backup directory, as printed by `mnemo backups`.
        dir: PathBuf,
    },
    /// List backups, oldest first.
    Backups,
    /// Delete orphaned files after backing up.
    CleanupOrphans,
    /// Recompute every computed connection.
    Relink,
    /// Print the task tree with effective statuses.
    Tree {
        #[arg(long)]
        project: Option<String>,
    },
    /// Search tasks and memories.
    Search {
        query: String,
        #[arg(long)]
        project: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => mnemo_config::load_and_validate_path(path),
        None => mnemo_config::load_and_validate(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            mnemo_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    if let Some(root) = &cli.root {
        config.storage.root_dir = root.to_string_lossy().into_owned();
    }

    init_tracing(&config.logging.level);

    match run(cli.command, config, cli.plain).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// Runs one subcommand and returns the process exit code.
async fn run(command: Commands, config: MnemoConfig, plain: bool) -> Result<i32, MnemoError> {
    let mnemo = Mnemo::open(config).await?;
    let style = report::Style::detect(plain);

    match command {
        Commands::Health => {
            let health = mnemo.health_check().await?;
            report::print_health(&health, style);
            return Ok(report::health_exit_code(&health));
        }
        Commands::Backup { label } => {
            let handle = mnemo.backup(&label).await?;
            report::print_backup(&handle);
        }
        Commands::Restore { dir } => {
            let handle = mnemo.open_backup(dir).await?;
            let restored = mnemo.restore(&handle).await?;
            println!(
                "restored {} tasks and {} memories from {}",
                restored.restored.tasks,
                restored.restored.memories,
                handle.path.display()
            );
            println!("previous data saved to {}", restored.pre_restore.path.display());
        }
        Commands::Backups => {
            let backups = mnemo.list_backups().await?;
            if backups.is_empty() {
                println!("no backups in {}", mnemo.config().backup_dir().display());
            }
            for handle in &backups {
                report::print_backup(handle);
            }
        }
        Commands::CleanupOrphans => {
            let removed = mnemo.cleanup_orphans().await?;
            println!("removed {removed} orphan file(s)");
        }
        Commands::Relink => {
            let summary = mnemo.relink_all().await?;
            report::print_relink(&summary);
        }
        Commands::Tree { project } => {
            let tree = mnemo.task_tree(project.as_deref()).await?;
            report::print_tree(&tree, style);
        }
        Commands::Search { query, project } => {
            let tasks = mnemo.search_tasks(&query, project.as_deref()).await?;
            let memories = mnemo.search_memories(&query, project.as_deref()).await?;
            report::print_search(&tasks, &memories, style);
        }
    }
    Ok(0)
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mnemo={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["mnemo", "backup", "--label", "nightly"]).unwrap();
        assert!(matches!(cli.command, Commands::Backup { ref label } if label == "nightly"));

        let cli = Cli::try_parse_from(["mnemo", "--plain", "tree", "--project", "shop"]).unwrap();
        assert!(cli.plain);
        assert!(matches!(cli.command, Commands::Tree { project: Some(ref p) } if p == "shop"));

        let cli = Cli::try_parse_from(["mnemo", "cleanup-orphans"]).unwrap();
        assert!(matches!(cli.command, Commands::CleanupOrphans));
    }

    #[test]
    fn backup_label_defaults_to_manual() {
        let cli = Cli::try_parse_from(["mnemo", "backup"]).unwrap();
        assert!(matches!(cli.command, Commands::Backup { ref label } if label == "manual"));
    }

    #[test]
    fn restore_requires_a_directory() {
        assert!(Cli::try_parse_from(["mnemo", "restore"]).is_err());
    }
}
