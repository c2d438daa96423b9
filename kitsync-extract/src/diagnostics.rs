//! Structured extraction diagnostics.
//!
//! Extraction is pure; instead of logging it reports what it skipped or
//! found suspicious, and the caller decides how to surface it.

use std::fmt;

use serde::Serialize;

/// What an extraction run noticed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// The first line was recognized as a column header and ignored.
    HeaderSkipped,
    /// Lines preceding the first kit sentinel were ignored.
    LinesBeforeFirstKit { count: usize },
    /// A kit block was dropped because it could not yield a record.
    MalformedBlock { reason: String },
    /// Two extracted kits share a natural key.
    DuplicateKit { key: String },
}

/// A diagnostic anchored at a 1-based position in the input line sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(line: usize, kind: DiagnosticKind) -> Self {
        Self { line, kind }
    }

    /// `true` for diagnostics that mean sheet content was lost or ambiguous.
    pub fn is_warning(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::MalformedBlock { .. } | DiagnosticKind::DuplicateKit { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::HeaderSkipped => write!(f, "line {}: header row skipped", self.line),
            DiagnosticKind::LinesBeforeFirstKit { count } => write!(
                f,
                "line {}: {count} line(s) before the first kit ignored",
                self.line
            ),
            DiagnosticKind::MalformedBlock { reason } => {
                write!(f, "line {}: kit block dropped: {reason}", self.line)
            }
            DiagnosticKind::DuplicateKit { key } => {
                write!(f, "line {}: kit '{key}' appears more than once", self.line)
            }
        }
    }
}
