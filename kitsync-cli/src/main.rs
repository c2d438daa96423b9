//! kitsync: extract treatment kits from sheet exports and sync them into a
//! local store.
//!
//! # Usage
//!
//! ```text
//! kitsync init
//! kitsync extract <FILE> [--json]
//! kitsync preview <FILE> [--upsert] [--json]
//! kitsync sync <FILE> [--upsert] [--json]
//! kitsync catalog import <FILE> [--json]
//! kitsync catalog list [--json]
//! kitsync kits list [--category CASA|CABINA] [--json]
//! kitsync kits show <ID|NAME> [--json]
//! kitsync kits remove <ID|NAME>
//! kitsync stats [--json]
//! ```
//!
//! Every command accepts `--home <DIR>` (or `KITSYNC_HOME`) and `-v`.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{
    catalog::CatalogCommand, extract::ExtractArgs, kits::KitsCommand, stats::StatsArgs,
    sync::SheetArgs, Context,
};
use kitsync_sync::SyncMode;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "kitsync",
    version,
    about = "Extract treatment kits from sheet exports and keep a kit store in sync",
    long_about = None,
)]
struct Cli {
    /// Directory holding `.kitsync/` (defaults to the user's home).
    #[arg(long, global = true, env = "KITSYNC_HOME", value_name = "DIR")]
    home: Option<PathBuf>,

    /// Log more (-v info, -vv debug). Overrides RUST_LOG.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default config and create the kit store.
    Init,

    /// Parse a sheet export and show the kits found, without touching the store.
    Extract(ExtractArgs),

    /// Show what `sync` would create, update and delete.
    Preview(SheetArgs),

    /// Make the store match the kits in a sheet export.
    Sync(SheetArgs),

    /// Manage the product catalog kits refer to.
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Inspect or remove stored kits.
    Kits {
        #[command(subcommand)]
        command: KitsCommand,
    },

    /// Show counts over stored kits.
    Stats(StatsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::new(cli.home)?;
    match cli.command {
        Commands::Init => commands::init::run(&ctx),
        Commands::Extract(args) => args.run(&ctx),
        Commands::Preview(args) => args.run(&ctx, SyncMode::Preview),
        Commands::Sync(args) => args.run(&ctx, SyncMode::Apply),
        Commands::Catalog { command } => commands::catalog::run(command, &ctx),
        Commands::Kits { command } => commands::kits::run(command, &ctx),
        Commands::Stats(args) => args.run(&ctx),
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
