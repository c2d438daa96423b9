//! `kitsync init`

use anyhow::{Context as _, Result};

use kitsync_core::config;

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let path = config::config_path_at(&ctx.home);
    let existed = path.exists();
    let config = config::init_at(&ctx.home)
        .with_context(|| format!("failed to initialize {}", path.display()))?;
    ctx.open_store(&config)?;

    if existed {
        println!("✓ Already initialized");
    } else {
        println!("✓ Initialized kitsync");
    }
    println!("  Config: {}", path.display());
    println!("  Store:  {}", config.database_path_at(&ctx.home).display());
    Ok(())
}
