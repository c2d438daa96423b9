//! `kitsync preview <FILE>` and `kitsync sync <FILE>`.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use kitsync_core::SyncOptions;
use kitsync_sync::{
    pipeline::{self, SyncReport},
    SyncError, SyncMode, SyncPreview, SyncResult,
};

use super::{print_diagnostics, print_json, read_sheet, Context};

/// Arguments shared by `preview` and `sync`.
#[derive(Args, Debug)]
pub struct SheetArgs {
    /// Tab-delimited sheet export.
    pub file: PathBuf,

    /// Match on name and category and never delete, instead of the
    /// configured full sync.
    #[arg(long)]
    pub upsert: bool,

    /// Write each bucket in one batch; a write failure aborts the whole
    /// sync instead of skipping the kit. Ignored by `preview`.
    #[arg(long)]
    pub batch: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SheetArgs {
    pub fn run(self, ctx: &Context, mode: SyncMode) -> Result<()> {
        let mut config = ctx.config()?;
        if self.upsert {
            config.sync = SyncOptions::upsert();
        }
        let mode = match mode {
            SyncMode::Apply if self.batch => SyncMode::Batch,
            other => other,
        };
        let lines = read_sheet(&self.file)?;
        let mut store = ctx.open_store(&config)?;

        let outcome = match pipeline::run(&mut store, &lines, &config, mode) {
            Ok(outcome) => outcome,
            Err(SyncError::NoKitsFound) => {
                bail!("no valid kits found in '{}'", self.file.display())
            }
            Err(err) if err.is_conflict() => bail!("sync rejected, nothing was changed: {err}"),
            Err(err) => {
                tracing::error!("sync of {} failed: {err:?}", self.file.display());
                bail!("sync failed with an internal error; nothing was changed (rerun with -vv for details)")
            }
        };

        if self.json {
            return print_json(&outcome);
        }

        print_diagnostics(&outcome.extraction.diagnostics, false);
        let sheet = self.file.display().to_string();
        match &outcome.report {
            SyncReport::Preview(preview) => print_preview(&sheet, preview),
            SyncReport::Applied(result) => print_result(&sheet, result),
        }
        Ok(())
    }
}

fn print_preview(sheet: &str, preview: &SyncPreview) {
    let s = &preview.summary;
    println!(
        "[preview] '{sheet}': {} to create, {} to update, {} to delete",
        s.creates, s.updates, s.deletes
    );
    for name in &preview.to_create {
        println!("  {}  {name}", "+".green());
    }
    for name in &preview.to_update {
        println!("  {}  {name}", "~".yellow());
    }
    for name in &preview.to_delete {
        println!("  {}  {name}", "-".red());
    }
    for conflict in &preview.conflicts {
        println!("  {}  {conflict}", "!".red().bold());
    }
}

fn print_result(sheet: &str, result: &SyncResult) {
    let mark = if result.errors.is_empty() {
        "✓".green()
    } else {
        "⚠".yellow()
    };
    println!(
        "{mark} synced '{sheet}' ({} created, {} updated, {} deleted, {} failed)",
        result.created, result.updated, result.deleted, result.summary.failed
    );
    for name in &result.details.created_kits {
        println!("  {}  {name}", "+".green());
    }
    for name in &result.details.updated_kits {
        println!("  {}  {name}", "~".yellow());
    }
    for name in &result.details.deleted_kits {
        println!("  {}  {name}", "-".red());
    }
    for failure in &result.errors {
        println!("  {}  {}: {}", "✗".red(), failure.name, failure.error);
    }
}
