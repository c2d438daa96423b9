//! Kit block extraction.
//!
//! Every field is located through [`SheetLayout`]; this module holds no
//! column offsets of its own.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use kitsync_core::{Category, KitRecord, ProductRef, ProtocolSteps, SheetLayout};

use crate::segment::KitBlock;
use crate::steps::parse_steps;

/// Why a block produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockRejection {
    #[error("block has no lines")]
    Empty,
    #[error("missing category")]
    MissingCategory,
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("missing kit name")]
    MissingName,
}

fn numbered_tip() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|\s)\d+\.(?:\s|$)").expect("static regex"))
}

/// Build a [`KitRecord`] from one block. `ordinal` is the block's 0-based
/// position among detected blocks; the record's weight is `ordinal + 1`.
pub fn extract_kit(
    block: &KitBlock<'_>,
    ordinal: usize,
    layout: &SheetLayout,
) -> Result<KitRecord, BlockRejection> {
    let cols = &layout.columns;
    let first = block.lines.first().ok_or(BlockRejection::Empty)?;
    let head: Vec<&str> = first.split('\t').collect();

    let category = field(&head, cols.category);
    if category.is_empty() {
        return Err(BlockRejection::MissingCategory);
    }
    let category = Category::from_token(category)
        .ok_or_else(|| BlockRejection::UnknownCategory(category.to_string()))?;
    let name = field(&head, cols.name);
    if name.is_empty() {
        return Err(BlockRejection::MissingName);
    }

    let rows: Vec<Vec<&str>> = block.lines.iter().map(|l| l.split('\t').collect()).collect();

    let mut products = Vec::new();
    let mut tips = Vec::new();
    let mut image_link = None;
    for row in &rows {
        if let Some(product) = product_ref(row, layout) {
            products.push(product);
        }

        let tip = field(row, cols.tip);
        if !tip.is_empty() && tip != layout.tip_header_token && numbered_tip().is_match(tip) {
            tips.push(tip.to_string());
        }

        let link = field(row, cols.image_link);
        if !link.is_empty() && link.starts_with(layout.image_prefix.as_str()) {
            image_link = Some(link.to_string());
        }
    }

    let protocol = protocol_steps(&block.lines, &rows, layout);

    Ok(KitRecord {
        category,
        name: name.to_string(),
        products,
        tips,
        protocol,
        image_link,
        weight: u32::try_from(ordinal + 1).unwrap_or(u32::MAX),
    })
}

fn product_ref(row: &[&str], layout: &SheetLayout) -> Option<ProductRef> {
    let code = field(row, layout.columns.product_code);
    let quantity = field(row, layout.columns.product_quantity);
    if code.is_empty() || quantity.is_empty() {
        return None;
    }
    if layout.product_header_tokens.iter().any(|t| t == code) {
        return None;
    }
    Some(ProductRef::new(code, parse_quantity(quantity)))
}

/// Leading decimal digits as a positive count; anything else means 1.
pub(crate) fn parse_quantity(raw: &str) -> u32 {
    let raw = raw.trim();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let digits_end = raw
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(raw.len(), |(i, _)| i);
    match raw[..digits_end].parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => 1,
    }
}

fn protocol_steps(lines: &[&str], rows: &[Vec<&str>], layout: &SheetLayout) -> ProtocolSteps {
    let day_start = lines
        .iter()
        .zip(rows)
        .position(|(line, row)| is_marker(line, row, &layout.day_markers, layout));
    let night_start = lines
        .iter()
        .zip(rows)
        .position(|(line, row)| is_marker(line, row, &layout.night_markers, layout));

    let mut protocol = ProtocolSteps::default();
    for (i, row) in rows.iter().enumerate() {
        let in_day = day_start.is_some_and(|d| i > d) && night_start.map_or(true, |n| i < n);
        let in_night = !in_day && night_start.is_some_and(|n| i > n);
        if !in_day && !in_night {
            continue;
        }

        let Some(cell) = row.get(layout.columns.protocol) else {
            continue;
        };
        if !cell.contains(layout.protocol_trigger.as_str()) {
            continue;
        }
        // Last matching line in the window wins.
        if in_day {
            protocol.day = parse_steps(cell);
        } else {
            protocol.night = parse_steps(cell);
        }
    }
    protocol
}

fn is_marker(line: &str, row: &[&str], markers: &[String], layout: &SheetLayout) -> bool {
    let protocol_cell = field(row, layout.columns.protocol);
    markers
        .iter()
        .any(|m| line.contains(&format!("\t{m}\t")) || protocol_cell == m)
}

fn field<'a>(row: &[&'a str], idx: usize) -> &'a str {
    row.get(idx).map_or("", |cell| cell.trim())
}
