// src/cli.rs
use crate::clock::Clock;
use crate::config::Config;
use crate::engine::SortKey;
use crate::error::{AppError, AppResult};
use crate::export;
use crate::models::{normalize_site, PasswordStore};
use crate::store::{self, SaveMode};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Simple JSON-backed password manager.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the JSON store file (default: store.json, or the configured default)
    #[clap(short, long, global = true, value_parser)]
    pub file: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new password store file
    Init {
        /// Replace an existing store file
        #[clap(long)]
        force: bool,
    },
    /// Add a new entry
    Add {
        /// Site key (will be normalized)
        site: String,
        /// Username for the site
        username: String,
        /// Password for the site
        password: String,
    },
    /// Retrieve an entry by site
    Get {
        /// Site key to fetch
        site: String,
    },
    /// Update username and/or password for a site
    Update {
        /// Site key to update
        site: String,
        /// New username
        #[clap(long)]
        username: Option<String>,
        /// New password
        #[clap(long)]
        password: Option<String>,
    },
    /// Delete an entry by site
    Delete {
        /// Site key to delete
        site: String,
    },
    /// List all entries
    List {
        /// Sort by 'site' or 'last_updated'
        #[clap(long, value_enum)]
        sort: Option<SortKey>,
    },
    /// Search in site and username (case-insensitive)
    Search {
        keyword: String,
    },
    /// Export entries as CSV
    Export {
        /// Output CSV file path
        #[clap(long)]
        out: PathBuf,
    },
    /// Show basic statistics
    Stats,
}

/// Runs one parsed command against the store and writes its report to `out`.
/// Only commands that change the store save it back.
pub fn handle_cli_command(cli: Cli, config: &Config, clock: &dyn Clock, out: &mut dyn Write) -> AppResult<()> {
    log::debug!("Handling CLI command: {:?}", cli.command);
    let file = cli.file.unwrap_or_else(|| config.default_store_file.clone());
    let save_mode = SaveMode::from_atomic_flag(config.atomic_save);

    match cli.command {
        Commands::Init { force } => {
            log::info!("Executing 'init' command for file: {:?}", file);
            store::init_store(&file, clock, force, save_mode)?;
            writeln!(out, "Created new password store at {}", file.display())?;
        }
        Commands::Add { site, username, password } => {
            let mut vault = store::load_store(&file)?;
            let key = vault.add(clock, &site, &username, &password)?;
            store::save_store(&vault, &file, save_mode)?;
            writeln!(out, "Added: {} ({})", key, username)?;
        }
        Commands::Get { site } => {
            let vault = store::load_store(&file)?;
            let key = normalize_site(&site);
            match vault.get(&site)? {
                Some(record) => {
                    writeln!(out, "site: {}", key)?;
                    writeln!(out, "username: {}", record.username)?;
                    writeln!(out, "password: {}", record.password)?;
                    writeln!(out, "last_updated: {}", record.last_updated)?;
                }
                None => writeln!(out, "No entry found for {}", key)?,
            }
        }
        Commands::Update { site, username, password } => {
            let mut vault = store::load_store(&file)?;
            let key = vault.update(clock, &site, username.as_deref(), password.as_deref())?;
            store::save_store(&vault, &file, save_mode)?;
            writeln!(out, "Updated: {}", key)?;
        }
        Commands::Delete { site } => {
            let mut vault = store::load_store(&file)?;
            let key = vault.delete(clock, &site)?;
            store::save_store(&vault, &file, save_mode)?;
            writeln!(out, "Deleted: {}", key)?;
        }
        Commands::List { sort } => {
            let vault = store::load_store(&file)?;
            let rows = vault.list(sort.unwrap_or(config.default_sort));
            if rows.is_empty() {
                writeln!(out, "(empty)")?;
            } else {
                let (site_w, user_w) = (config.list_site_width, config.list_username_width);
                writeln!(out, "{:<site_w$} {:<user_w$} {}", "SITE", "USERNAME", "LAST_UPDATED")?;
                for row in rows {
                    writeln!(out, "{:<site_w$} {:<user_w$} {}", row.site, row.username, row.last_updated)?;
                }
            }
        }
        Commands::Search { keyword } => {
            let vault = store::load_store(&file)?;
            let hits = vault.search(&keyword);
            if hits.is_empty() {
                writeln!(out, "(no results)")?;
            }
            for site in hits {
                writeln!(out, "{}", site)?;
            }
        }
        Commands::Export { out: out_path } => {
            let vault = store::load_store(&file)?;
            let written = export_to(&vault, &out_path)?;
            writeln!(out, "Exported {} entries to {}", written, out_path.display())?;
        }
        Commands::Stats => {
            let vault = store::load_store(&file)?;
            let stats = vault.stats();
            writeln!(out, "entries: {}", stats.count)?;
            writeln!(out, "oldest:  {}", stats.oldest.as_deref().unwrap_or("None"))?;
            writeln!(out, "newest:  {}", stats.newest.as_deref().unwrap_or("None"))?;
            writeln!(out, "avg password length: {:?}", stats.avg_password_length)?;
        }
    }
    Ok(())
}

fn export_to(vault: &PasswordStore, out_path: &Path) -> AppResult<usize> {
    export::export_csv_to_path(vault, out_path).map_err(|source| {
        log::warn!("Export to {:?} failed: {}", out_path, source);
        AppError::Export { path: out_path.to_path_buf(), source }
    })
}
