//! Subcommand implementations and the state they share.

pub mod catalog;
pub mod extract;
pub mod init;
pub mod kits;
pub mod stats;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use colored::Colorize;
use serde::Serialize;

use kitsync_core::{config, AppConfig};
use kitsync_extract::{read_lines_from_path, Diagnostic};
use kitsync_sync::SqliteStore;

/// Resolved global options.
#[derive(Debug)]
pub struct Context {
    pub home: PathBuf,
}

impl Context {
    pub fn new(home: Option<PathBuf>) -> Result<Self> {
        let home = match home {
            Some(home) => home,
            None => config::home().context("could not determine home directory")?,
        };
        Ok(Self { home })
    }

    pub fn config(&self) -> Result<AppConfig> {
        config::load_at(&self.home).with_context(|| {
            format!(
                "failed to load {}",
                config::config_path_at(&self.home).display()
            )
        })
    }

    pub fn open_store(&self, config: &AppConfig) -> Result<SqliteStore> {
        let path = config.database_path_at(&self.home);
        SqliteStore::open(&path)
            .with_context(|| format!("failed to open kit store at {}", path.display()))
    }
}

pub fn read_sheet(path: &Path) -> Result<Vec<String>> {
    read_lines_from_path(path).with_context(|| format!("failed to read '{}'", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize JSON")?
    );
    Ok(())
}

/// Warnings in yellow; informational diagnostics only when `verbose`.
pub fn print_diagnostics(diagnostics: &[Diagnostic], verbose: bool) {
    for diagnostic in diagnostics {
        if diagnostic.is_warning() {
            println!("  {} {diagnostic}", "⚠".yellow());
        } else if verbose {
            println!("  {}", diagnostic.to_string().bright_black());
        }
    }
}
