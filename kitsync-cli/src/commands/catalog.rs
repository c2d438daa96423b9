//! `kitsync catalog import <FILE>` and `kitsync catalog list`

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use kitsync_sync::{import_catalog, KitStore};

use super::{print_json, read_sheet, Context};

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Upsert products from a tab-delimited `CODE<TAB>NAME` export.
    Import(ImportArgs),

    /// List catalog products.
    List {
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    pub file: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "code")]
    code: String,
    #[tabled(rename = "name")]
    name: String,
}

pub fn run(cmd: CatalogCommand, ctx: &Context) -> Result<()> {
    match cmd {
        CatalogCommand::Import(args) => import(args, ctx),
        CatalogCommand::List { json } => list(json, ctx),
    }
}

fn import(args: ImportArgs, ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let lines = read_sheet(&args.file)?;
    let mut store = ctx.open_store(&config)?;
    let import = import_catalog(&mut store, &lines)
        .with_context(|| format!("catalog import of '{}' failed", args.file.display()))?;

    if args.json {
        return print_json(&import);
    }

    println!(
        "✓ imported '{}' ({} created, {} updated, {} failed)",
        args.file.display(),
        import.created,
        import.updated,
        import.summary.failed
    );
    for rejected in &import.errors {
        println!(
            "  {}  line {} {}: {}",
            "✗".red(),
            rejected.line,
            rejected.code,
            rejected.error
        );
    }
    Ok(())
}

fn list(json: bool, ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let store = ctx.open_store(&config)?;
    let products = store.list_products().context("failed to list products")?;

    if json {
        return print_json(&products);
    }
    if products.is_empty() {
        println!("No products. Run: kitsync catalog import <FILE>");
        return Ok(());
    }
    let rows: Vec<ProductRow> = products
        .into_iter()
        .map(|p| ProductRow {
            code: p.code,
            name: p.name,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
