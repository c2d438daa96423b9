//! # kitsync-extract
//!
//! Turns a tab-delimited sheet export into [`KitRecord`]s.
//!
//! Data flow: [`sheet::read_lines`] → [`segment::segment`] →
//! [`block::extract_kit`] (which uses [`steps::parse_steps`]) → [`Extraction`].
//! Everything past line reading is pure: problems are returned as
//! [`Diagnostic`]s rather than logged.
//!
//! [`KitRecord`]: kitsync_core::KitRecord

pub mod block;
pub mod diagnostics;
pub mod error;
pub mod extraction;
pub mod segment;
pub mod sheet;
pub mod steps;

pub use block::{extract_kit, BlockRejection};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::ExtractError;
pub use extraction::{extract, extract_keyed, extract_records, Extraction};
pub use segment::{segment, KitBlock, Segmentation};
pub use sheet::{read_lines, read_lines_from_path};
pub use steps::parse_steps;
