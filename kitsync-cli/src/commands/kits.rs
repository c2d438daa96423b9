//! `kitsync kits list|show|remove`

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use kitsync_core::{Category, PersistedKit};
use kitsync_sync::KitStore;

use super::{print_json, Context};

#[derive(Subcommand, Debug)]
pub enum KitsCommand {
    /// List stored kits in sheet order.
    List(ListArgs),

    /// Show one kit by id or (case-insensitive) name.
    Show(ShowArgs),

    /// Delete one kit by id or (case-insensitive) name.
    Remove {
        term: String,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only kits of this category.
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub term: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::from_token(&s.trim().to_uppercase())
        .ok_or_else(|| format!("unknown category '{s}'; expected: CASA, CABINA"))
}

#[derive(Tabled)]
struct KitRow {
    #[tabled(rename = "#")]
    weight: u32,
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "products")]
    products: usize,
    #[tabled(rename = "updated")]
    updated: String,
}

pub fn run(cmd: KitsCommand, ctx: &Context) -> Result<()> {
    let config = ctx.config()?;
    let mut store = ctx.open_store(&config)?;
    match cmd {
        KitsCommand::List(args) => list(args, &store),
        KitsCommand::Show(args) => show(args, &store),
        KitsCommand::Remove { term } => remove(&term, &mut store),
    }
}

fn list(args: ListArgs, store: &impl KitStore) -> Result<()> {
    let mut kits = store.load_kits().context("failed to load kits")?;
    if let Some(category) = args.category {
        kits.retain(|k| k.category == category);
    }

    if args.json {
        return print_json(&kits);
    }
    if kits.is_empty() {
        println!("No kits stored.");
        return Ok(());
    }
    let rows: Vec<KitRow> = kits
        .into_iter()
        .map(|k| KitRow {
            weight: k.weight,
            category: k.category.to_string(),
            products: k.items.len(),
            updated: k.updated_at.format("%Y-%m-%d %H:%M").to_string(),
            name: k.name,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn show(args: ShowArgs, store: &impl KitStore) -> Result<()> {
    let Some(kit) = store.find_kit(&args.term).context("failed to look up kit")? else {
        bail!("no kit matches '{}'", args.term);
    };
    if args.json {
        return print_json(&kit);
    }
    print_kit(&kit);
    Ok(())
}

fn print_kit(kit: &PersistedKit) {
    println!("{} ({})", kit.name.bold(), kit.category);
    println!("  id:     {}", kit.id);
    println!("  weight: {}", kit.weight);
    if let Some(link) = &kit.image_link {
        println!("  image:  {link}");
    }

    println!("{}", "Products".bold());
    for item in &kit.items {
        println!(
            "  {:>3} x {}  {}",
            item.quantity,
            item.product.code,
            item.product.name.bright_black()
        );
    }
    if !kit.tips.is_empty() {
        println!("{}", "Tips".bold());
        for tip in &kit.tips {
            println!("  {tip}");
        }
    }
    for (label, steps) in [("Day", &kit.protocol.day), ("Night", &kit.protocol.night)] {
        if steps.is_empty() {
            continue;
        }
        println!("{}", label.bold());
        for (i, step) in steps.iter().enumerate() {
            println!("  {}. {step}", i + 1);
        }
    }
}

fn remove(term: &str, store: &mut impl KitStore) -> Result<()> {
    let Some(kit) = store.find_kit(term).context("failed to look up kit")? else {
        bail!("no kit matches '{term}'");
    };
    if store.remove_kit(&kit.id).context("failed to remove kit")? {
        println!("✓ Removed kit '{}'", kit.name);
    } else {
        println!("Kit '{}' was already gone", kit.name);
    }
    Ok(())
}
