// SPDX-FileCopyrightText: 2026 Snipvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snipvault - a local-first snippet and project vault.
//!
//! This is the binary entry point.

mod backup;
mod commands;
mod doctor;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use snipvault_config::model::SnipvaultConfig;
use snipvault_config::ConfigError;
use snipvault_core::{RecordKind, SnipvaultError};

use crate::commands::Vault;

/// Snipvault - a local-first snippet and project vault.
#[derive(Parser, Debug)]
#[command(name = "snipvault", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// List snippets, or projects with --projects.
    List {
        #[arg(long)]
        projects: bool,
        /// Only records carrying this tag (without the `#`).
        #[arg(long)]
        tag: Option<String>,
    },
    /// Print a record. Accepts an id or an @mention.
    Show { target: String },
    /// Search titles and languages.
    Search {
        term: String,
        #[arg(long)]
        projects: bool,
    },
    /// List every tag with its record count.
    Tags,
    /// Create a record. The body is read from stdin unless --code is given.
    New {
        title: String,
        #[arg(long)]
        project: bool,
        #[arg(long)]
        code: Option<String>,
    },
    /// Replace a record's body. Reads stdin unless --code is given.
    Edit {
        target: String,
        #[arg(long)]
        code: Option<String>,
    },
    /// Rename a record; the language follows the new extension.
    Rename { target: String, name: String },
    /// Delete a record.
    Delete { target: String },
    /// Import an export document.
    Import { path: PathBuf },
    /// Create a record from a file on disk.
    ImportFile {
        path: PathBuf,
        #[arg(long)]
        project: bool,
    },
    /// Write the whole library as JSON to stdout or --output.
    Export {
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Copy the database to PATH.
    Backup { path: String },
    /// Replace the database with the copy at PATH.
    Restore { path: String },
    /// Read and write settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Read and write the current theme.
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Run diagnostic checks.
    Doctor {
        /// Also run PRAGMA integrity_check.
        #[arg(long)]
        deep: bool,
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Get { key: String },
    Set { key: String, value: String },
    List,
}

#[derive(Subcommand, Debug)]
enum ThemeAction {
    Show,
    /// Colors are a JSON object.
    Set { name: String, colors: String },
}

fn kind(project: bool) -> RecordKind {
    if project {
        RecordKind::Project
    } else {
        RecordKind::Snippet
    }
}

fn body(code: Option<String>) -> Result<String, SnipvaultError> {
    match code {
        Some(code) => Ok(code),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| SnipvaultError::Storage {
                    source: Box::new(e),
                })?;
            Ok(buf)
        }
    }
}

fn read_file(path: &Path) -> Result<String, SnipvaultError> {
    std::fs::read_to_string(path).map_err(|e| SnipvaultError::Storage {
        source: Box::new(e),
    })
}

fn load_config(path: Option<&Path>) -> Result<SnipvaultConfig, Vec<ConfigError>> {
    match path {
        Some(path) => snipvault_config::load_and_validate_path(path),
        None => snipvault_config::load_and_validate(),
    }
}

/// `RUST_LOG` wins; otherwise `logging.level` applies to snipvault crates only.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("snipvault={level},warn")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            snipvault_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.logging.level);

    if let Err(e) = run(cli.command, &config).await {
        error!(error = %e, "command failed");
        eprintln!("snipvault: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &SnipvaultConfig) -> Result<(), SnipvaultError> {
    let db_path = &config.storage.database_path;
    // These work on the database file directly and must not hold it open.
    match command {
        Commands::Backup { path } => return backup::run_backup(db_path, &path),
        Commands::Restore { path } => return backup::run_restore(db_path, &path),
        Commands::Doctor { deep, plain } => return doctor::run_doctor(config, deep, plain).await,
        _ => {}
    }

    let vault = Vault::open(config).await?;
    let result = dispatch(&vault, command).await;
    vault.close().await?;
    print!("{}", result?);
    Ok(())
}

async fn dispatch(vault: &Vault, command: Commands) -> Result<String, SnipvaultError> {
    match command {
        Commands::List { projects, tag } => Ok(vault.list(kind(projects), tag.as_deref()).await),
        Commands::Show { target } => vault.show(&target).await,
        Commands::Search { term, projects } => Ok(vault.search(kind(projects), &term).await),
        Commands::Tags => Ok(vault.tags().await),
        Commands::New {
            title,
            project,
            code,
        } => vault.create(kind(project), &title, &body(code)?).await,
        Commands::Edit { target, code } => vault.edit(&target, &body(code)?).await,
        Commands::Rename { target, name } => vault.rename(&target, &name).await,
        Commands::Delete { target } => vault.delete(&target).await,
        Commands::Import { path } => vault.import_document(&read_file(&path)?).await,
        Commands::ImportFile { path, project } => vault.import_file(&path, kind(project)).await,
        Commands::Export { output } => {
            let json = vault.export().await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json).map_err(|e| SnipvaultError::Storage {
                        source: Box::new(e),
                    })?;
                    Ok(String::new())
                }
                None => Ok(format!("{json}\n")),
            }
        }
        Commands::Settings { action } => match action {
            SettingsAction::Get { key } => vault.get_setting(&key).await,
            SettingsAction::Set { key, value } => vault.set_setting(&key, &value).await,
            SettingsAction::List => vault.list_settings().await,
        },
        Commands::Theme { action } => match action {
            ThemeAction::Show => vault.get_theme().await,
            ThemeAction::Set { name, colors } => vault.set_theme(&name, &colors).await,
        },
        Commands::Backup { .. } | Commands::Restore { .. } | Commands::Doctor { .. } => {
            Err(SnipvaultError::Internal("handled before the vault opens".into()))
        }
    }
}
