//! Reading a tab-delimited sheet export into lines.
//!
//! Spreadsheet exports quote cells that contain newlines, so a naive split on
//! `\n` would tear a multi-line protocol cell apart. Records are tokenized
//! with a quote-aware tab reader and re-joined, leaving embedded newlines
//! inside their cell. A tab inside a quoted cell becomes a space so the
//! re-joined line keeps the record's field boundaries.

use std::path::Path;

use crate::error::{io_err, ExtractError};

/// Split a tab-delimited export into one line per sheet row.
///
/// Quoted cells are unquoted; rows that are blank once trimmed are dropped.
pub fn read_lines(text: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record
            .iter()
            .map(|field| field.replace('\t', " "))
            .collect::<Vec<_>>()
            .join("\t");
        if line.trim().is_empty() {
            continue;
        }
        lines.push(line);
    }
    Ok(lines)
}

/// [`read_lines`] over the contents of a file.
pub fn read_lines_from_path(path: &Path) -> Result<Vec<String>, ExtractError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    read_lines(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rows_keep_their_cells() {
        let lines = read_lines("CASA\tKit A\tP1\t2\n\t\tP2\t1\n").unwrap();
        assert_eq!(lines, vec!["CASA\tKit A\tP1\t2", "\t\tP2\t1"]);
    }

    #[test]
    fn quoted_multiline_cell_stays_in_one_line() {
        let text = "CASA\tKit\n\t\t\t\t\t\t\"1. Cleanse\n2. Tone\"\t\n";
        let lines = read_lines(text).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "\t\t\t\t\t\t1. Cleanse\n2. Tone\t");
    }

    #[test]
    fn tab_inside_quoted_cell_keeps_columns() {
        let lines = read_lines("CASA\tKit\t\"P\t1\"\t2\n").unwrap();
        assert_eq!(lines, vec!["CASA\tKit\tP 1\t2"]);
    }

    #[test]
    fn blank_rows_dropped() {
        let lines = read_lines("CASA\tKit\n\t\t\t\n   \r\nCABINA\tOther\r\n").unwrap();
        assert_eq!(lines, vec!["CASA\tKit", "CABINA\tOther"]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_lines_from_path(Path::new("/definitely/not/here.tsv")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.tsv"), "got: {err}");
    }
}
