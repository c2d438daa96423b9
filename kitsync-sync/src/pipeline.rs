//! Shared sheet-to-store entrypoint used by the CLI.

use serde::Serialize;

use kitsync_core::AppConfig;
use kitsync_extract::{extract_keyed, Extraction};

use crate::error::SyncError;
use crate::executor::{sync_kits, sync_kits_batch, SyncResult};
use crate::planner::{plan, SyncPreview};
use crate::store::KitStore;

/// Whether a pipeline run writes to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Preview,
    /// Per-kit savepoints; any single kit may fail on its own.
    Apply,
    /// One batch write per bucket; a write failure aborts the whole sync.
    Batch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SyncReport {
    Preview(SyncPreview),
    Applied(SyncResult),
}

/// Everything a pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSyncOutcome {
    pub extraction: Extraction,
    pub report: SyncReport,
}

/// Extract kits from `lines` and preview or apply them against `store`.
///
/// A sheet that yields no kits is refused with [`SyncError::NoKitsFound`]
/// rather than planned, since a full sync of nothing deletes every kit.
pub fn run<S, L>(
    store: &mut S,
    lines: &[L],
    config: &AppConfig,
    mode: SyncMode,
) -> Result<SheetSyncOutcome, SyncError>
where
    S: KitStore,
    L: AsRef<str>,
{
    let extraction = extract_keyed(lines, &config.layout, config.sync.key);
    for warning in extraction.warnings() {
        tracing::warn!("{warning}");
    }
    if extraction.records.is_empty() {
        return Err(SyncError::NoKitsFound);
    }
    tracing::info!("extracted {} kits", extraction.records.len());

    let report = match mode {
        SyncMode::Preview => {
            let persisted = store.load_kits()?;
            SyncReport::Preview(plan(&extraction.records, &persisted, &config.sync).preview())
        }
        SyncMode::Apply => {
            SyncReport::Applied(sync_kits(store, &extraction.records, &config.sync)?)
        }
        SyncMode::Batch => {
            SyncReport::Applied(sync_kits_batch(store, &extraction.records, &config.sync)?)
        }
    };
    Ok(SheetSyncOutcome { extraction, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteStore;

    const SHEET: [&str; 3] = ["TIPO\tNOMBRE", "CASA\tKit A", "CABINA\tKit B"];

    #[test]
    fn preview_does_not_write() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let outcome = run(&mut store, &SHEET, &AppConfig::default(), SyncMode::Preview).unwrap();
        match outcome.report {
            SyncReport::Preview(preview) => assert_eq!(preview.to_create, vec!["Kit A", "Kit B"]),
            other => panic!("expected preview, got {other:?}"),
        }
        assert!(store.load_kits().unwrap().is_empty());
    }

    #[test]
    fn apply_writes_and_keeps_diagnostics() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let outcome = run(&mut store, &SHEET, &AppConfig::default(), SyncMode::Apply).unwrap();
        assert_eq!(outcome.extraction.diagnostics.len(), 1);
        match outcome.report {
            SyncReport::Applied(result) => assert_eq!(result.created, 2),
            other => panic!("expected applied, got {other:?}"),
        }
        assert_eq!(store.load_kits().unwrap().len(), 2);
    }

    #[test]
    fn batch_mode_writes_like_apply() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let outcome = run(&mut store, &SHEET, &AppConfig::default(), SyncMode::Batch).unwrap();
        match outcome.report {
            SyncReport::Applied(result) => {
                assert_eq!(result.details.created_kits, vec!["Kit A", "Kit B"])
            }
            other => panic!("expected applied, got {other:?}"),
        }
        assert_eq!(store.load_kits().unwrap().len(), 2);
    }

    #[test]
    fn empty_sheet_is_refused() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let err = run(&mut store, &["TIPO\tNOMBRE"], &AppConfig::default(), SyncMode::Apply)
            .unwrap_err();
        assert!(matches!(err, SyncError::NoKitsFound));
    }
}
