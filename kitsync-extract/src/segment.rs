//! Sheet segmentation into per-kit blocks.
//!
//! A block starts at every line whose category cell is a kit sentinel
//! (`CASA` / `CABINA`) and runs up to, not including, the next sentinel or
//! the end of the input. There is no schema row to rely on: the only header
//! handling is dropping a first line that carries the header tokens.

use kitsync_core::{Category, SheetLayout};

/// The lines belonging to one kit, in sheet order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitBlock<'a> {
    /// 1-based position of the sentinel line in the input sequence.
    pub first_line: usize,
    pub lines: Vec<&'a str>,
}

/// Result of [`segment`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segmentation<'a> {
    pub blocks: Vec<KitBlock<'a>>,
    pub header_skipped: bool,
    /// Non-header lines before the first sentinel; these are discarded.
    pub leading_lines: usize,
}

/// Split `lines` into kit blocks.
pub fn segment<'a, S: AsRef<str>>(lines: &'a [S], layout: &SheetLayout) -> Segmentation<'a> {
    let header_skipped = lines
        .first()
        .is_some_and(|line| is_header(line.as_ref(), layout));
    let offset = usize::from(header_skipped);

    let mut blocks: Vec<KitBlock<'a>> = Vec::new();
    let mut leading_lines = 0;
    for (idx, line) in lines.iter().enumerate().skip(offset) {
        let line = line.as_ref();
        if is_sentinel(line, layout) {
            blocks.push(KitBlock {
                first_line: idx + 1,
                lines: vec![line],
            });
        } else if let Some(current) = blocks.last_mut() {
            current.lines.push(line);
        } else {
            leading_lines += 1;
        }
    }

    Segmentation {
        blocks,
        header_skipped,
        leading_lines,
    }
}

/// A line is a header iff it contains every configured header token.
pub fn is_header(line: &str, layout: &SheetLayout) -> bool {
    !layout.header_tokens.is_empty()
        && layout
            .header_tokens
            .iter()
            .all(|token| line.contains(token.as_str()))
}

/// A line starts a kit iff its category cell, trimmed, is a category token.
pub fn is_sentinel(line: &str, layout: &SheetLayout) -> bool {
    line.split('\t')
        .nth(layout.columns.category)
        .and_then(|cell| Category::from_token(cell.trim()))
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> SheetLayout {
        SheetLayout::default()
    }

    #[test]
    fn header_dropped_only_when_both_tokens_present() {
        let lines = ["TIPO\tNOMBRE\tCODIGO", "CASA\tKit A"];
        let seg = segment(&lines, &layout());
        assert!(seg.header_skipped);
        assert_eq!(seg.blocks.len(), 1);
        assert_eq!(seg.blocks[0].first_line, 2);

        let lines = ["TIPO\tCODIGO", "CASA\tKit A"];
        let seg = segment(&lines, &layout());
        assert!(!seg.header_skipped);
        assert_eq!(seg.leading_lines, 1);
    }

    #[test]
    fn blocks_span_until_next_sentinel() {
        let lines = [
            "notes",
            "CASA\tKit A",
            "\t\tP1\t1",
            " CABINA \tKit B",
            "\t\tP2\t1",
            "\t\tP3\t1",
        ];
        let seg = segment(&lines, &layout());
        assert_eq!(seg.leading_lines, 1);
        assert_eq!(seg.blocks.len(), 2);
        assert_eq!(seg.blocks[0].lines, vec!["CASA\tKit A", "\t\tP1\t1"]);
        assert_eq!(seg.blocks[1].first_line, 4);
        assert_eq!(seg.blocks[1].lines.len(), 3);
    }

    #[test]
    fn sentinel_must_be_exact_token_in_first_field() {
        let lines = ["CASAS\tx", "casa\tx", "\tCASA", "CABINA"];
        let seg = segment(&lines, &layout());
        assert_eq!(seg.blocks.len(), 1);
        assert_eq!(seg.blocks[0].first_line, 4);
        assert_eq!(seg.leading_lines, 3);
    }

    #[test]
    fn empty_input() {
        let lines: [&str; 0] = [];
        let seg = segment(&lines, &layout());
        assert_eq!(seg, Segmentation::default());
    }
}
