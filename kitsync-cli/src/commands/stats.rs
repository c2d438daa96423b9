//! `kitsync stats`

use anyhow::{Context as _, Result};
use clap::Args;

use kitsync_sync::kit_stats;

use super::{print_json, Context};

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatsArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let config = ctx.config()?;
        let store = ctx.open_store(&config)?;
        let stats = kit_stats(&store).context("failed to compute statistics")?;

        if self.json {
            return print_json(&stats);
        }
        println!("{} kits", stats.total);
        for (category, count) in &stats.by_category {
            println!("  {:<13} {count}", category.as_str());
        }
        println!("  with image    {}", stats.with_images);
        println!("  with protocol {}", stats.with_protocols);
        Ok(())
    }
}
