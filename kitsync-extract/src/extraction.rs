//! Whole-sheet extraction: segmentation, per-block extraction, diagnostics.

use std::collections::HashSet;

use serde::Serialize;

use kitsync_core::{KitRecord, NaturalKey, SheetLayout};

use crate::block::extract_kit;
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::segment::segment;

/// Records extracted from a sheet, in sheet order, plus what was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Extraction {
    pub records: Vec<KitRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Extraction {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }
}

/// Extract every kit from an ordered sequence of tab-delimited lines.
///
/// Malformed blocks are dropped from `records` and reported in
/// `diagnostics`. Weights are dense 1-based positions over the surviving
/// records. Duplicates are flagged by name; see [`extract_keyed`].
pub fn extract<S: AsRef<str>>(lines: &[S], layout: &SheetLayout) -> Extraction {
    extract_keyed(lines, layout, NaturalKey::Name)
}

/// [`extract`], flagging duplicates under the natural key `key` that the
/// records will later be synced with.
pub fn extract_keyed<S: AsRef<str>>(
    lines: &[S],
    layout: &SheetLayout,
    key: NaturalKey,
) -> Extraction {
    let segmentation = segment(lines, layout);
    let mut diagnostics = Vec::new();

    if segmentation.header_skipped {
        diagnostics.push(Diagnostic::new(1, DiagnosticKind::HeaderSkipped));
    }
    if segmentation.leading_lines > 0 {
        let first = usize::from(segmentation.header_skipped) + 1;
        diagnostics.push(Diagnostic::new(
            first,
            DiagnosticKind::LinesBeforeFirstKit {
                count: segmentation.leading_lines,
            },
        ));
    }

    let mut records = Vec::with_capacity(segmentation.blocks.len());
    let mut seen = HashSet::new();
    for (ordinal, block) in segmentation.blocks.iter().enumerate() {
        match extract_kit(block, ordinal, layout) {
            Ok(record) => {
                let k = key.key_of(record.category, &record.name);
                if !seen.insert(k.clone()) {
                    diagnostics.push(Diagnostic::new(
                        block.first_line,
                        DiagnosticKind::DuplicateKit { key: k.to_string() },
                    ));
                }
                records.push(record);
            }
            Err(rejection) => diagnostics.push(Diagnostic::new(
                block.first_line,
                DiagnosticKind::MalformedBlock {
                    reason: rejection.to_string(),
                },
            )),
        }
    }

    for (idx, record) in records.iter_mut().enumerate() {
        record.weight = u32::try_from(idx + 1).unwrap_or(u32::MAX);
    }

    Extraction {
        records,
        diagnostics,
    }
}

/// [`extract`] without diagnostics.
pub fn extract_records<S: AsRef<str>>(lines: &[S], layout: &SheetLayout) -> Vec<KitRecord> {
    extract(lines, layout).records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_block_is_reported_and_weights_stay_dense() {
        let lines = [
            "TIPO\tNOMBRE",
            "CASA\tKit A",
            "CABINA\t",
            "\t\tP9\t1",
            "CASA\tKit C",
        ];
        let out = extract(&lines, &SheetLayout::default());
        let names: Vec<_> = out.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Kit A", "Kit C"]);
        assert_eq!(
            out.records.iter().map(|r| r.weight).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(
            out.diagnostics,
            vec![
                Diagnostic::new(1, DiagnosticKind::HeaderSkipped),
                Diagnostic::new(
                    3,
                    DiagnosticKind::MalformedBlock {
                        reason: "missing kit name".to_string()
                    }
                ),
            ]
        );
        assert_eq!(out.warnings().count(), 1);
    }

    #[test]
    fn duplicate_names_are_kept_and_flagged() {
        let lines = ["CASA\tKit A", "CABINA\tKit A"];
        let out = extract(&lines, &SheetLayout::default());
        assert_eq!(out.records.len(), 2);
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::new(
                2,
                DiagnosticKind::DuplicateKit {
                    key: "Kit A".to_string()
                }
            )]
        );
    }

    #[test]
    fn duplicates_follow_the_natural_key() {
        let lines = ["CASA\tKit A", "CABINA\tKit A", "CABINA\tKit A"];
        let out = extract_keyed(&lines, &SheetLayout::default(), NaturalKey::NameAndCategory);
        assert_eq!(out.records.len(), 3);
        assert_eq!(
            out.diagnostics,
            vec![Diagnostic::new(
                3,
                DiagnosticKind::DuplicateKit {
                    key: "Kit A (CABINA)".to_string()
                }
            )]
        );
    }

    #[test]
    fn leading_lines_reported_after_header() {
        let lines = ["TIPO\tNOMBRE", "stray", "stray", "CASA\tKit"];
        let out = extract(&lines, &SheetLayout::default());
        assert_eq!(
            out.diagnostics[1],
            Diagnostic::new(2, DiagnosticKind::LinesBeforeFirstKit { count: 2 })
        );
    }
}
