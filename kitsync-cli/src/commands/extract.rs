//! `kitsync extract <FILE>`: parse only, never opens the store.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use kitsync_core::KitSummary;
use kitsync_extract::extract_keyed;

use super::{print_diagnostics, print_json, read_sheet, Context};

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Tab-delimited sheet export.
    pub file: PathBuf,

    /// Emit the full records and diagnostics as JSON.
    #[arg(long)]
    pub json: bool,
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
    #[tabled(rename = "tips")]
    tips: usize,
    #[tabled(rename = "protocol")]
    protocol: &'static str,
    #[tabled(rename = "image")]
    image: &'static str,
}

fn flag(on: bool) -> &'static str {
    if on {
        "yes"
    } else {
        "-"
    }
}

impl ExtractArgs {
    pub fn run(self, ctx: &Context) -> Result<()> {
        let config = ctx.config()?;
        let lines = read_sheet(&self.file)?;
        let extraction = extract_keyed(&lines, &config.layout, config.sync.key);

        if self.json {
            return print_json(&extraction);
        }

        println!(
            "{} kits in '{}'",
            extraction.records.len(),
            self.file.display()
        );
        print_diagnostics(&extraction.diagnostics, true);
        if extraction.records.is_empty() {
            return Ok(());
        }

        let rows: Vec<KitRow> = extraction
            .records
            .iter()
            .map(|record| {
                let KitSummary {
                    category,
                    name,
                    products_count,
                    tips_count,
                    has_protocol,
                    has_image,
                } = record.summary();
                KitRow {
                    weight: record.weight,
                    category: category.to_string(),
                    name,
                    products: products_count,
                    tips: tips_count,
                    protocol: flag(has_protocol),
                    image: flag(has_image),
                }
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
