//! Protocol step parsing.
//!
//! A protocol cell is free text written by hand: sometimes one numbered step
//! per line, sometimes all steps run together on one line, sometimes a single
//! sentence with no numbering at all.

use std::sync::OnceLock;

use regex::Regex;

fn has_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.").expect("static regex"))
}

fn numbered_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\.\s+(.+)$").expect("static regex"))
}

fn inline_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+\d+\.\s+").expect("static regex"))
}

/// Split one protocol cell into its ordered instructions.
///
/// Never returns an empty list for text that is non-empty once cleaned; the
/// cleaned text itself is the fallback single step.
pub fn parse_steps(text: &str) -> Vec<String> {
    let cleaned = clean(text);
    if cleaned.is_empty() {
        return Vec::new();
    }

    if !has_marker().is_match(cleaned) {
        return vec![cleaned.to_string()];
    }

    // A numbered line may still carry further inline markers.
    let by_line: Vec<String> = cleaned
        .lines()
        .filter_map(|line| numbered_line().captures(line))
        .filter_map(|caps| caps.get(2))
        .flat_map(|m| inline_marker().split(m.as_str()))
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(str::to_string)
        .collect();
    if !by_line.is_empty() {
        return by_line;
    }

    let inline: Vec<String> = inline_marker()
        .split(cleaned)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect();
    if inline.is_empty() {
        vec![cleaned.to_string()]
    } else {
        inline
    }
}

/// Trim whitespace and one pair of surrounding double quotes.
fn clean(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('"').unwrap_or(trimmed);
    trimmed.trim()
}
