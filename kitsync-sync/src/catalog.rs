//! Product catalog import.
//!
//! Rows are `CODE\tNAME`. Codes are normalized to upper case, so a kit's
//! product reference matches only the normalized code.

use std::sync::PoisonError;

use serde::Serialize;

use crate::error::{StoreError, SyncError};
use crate::executor::SyncSummary;
use crate::store::{KitStore, KitTransaction, Upserted};

const HEADER_CODE: &str = "CODIGO";

/// A catalog row that was not imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    /// 1-based row number in the input.
    pub line: usize,
    pub code: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CatalogImport {
    pub created: usize,
    pub updated: usize,
    pub errors: Vec<RejectedRow>,
    pub summary: SyncSummary,
}

/// Upsert every catalog row in one transaction.
///
/// A header row (code cell `CODIGO`) and blank rows are skipped; rows with an
/// empty code or name are reported and skipped. A constraint conflict on
/// one row does not stop the others.
pub fn import_catalog<S, L>(store: &mut S, lines: &[L]) -> Result<CatalogImport, SyncError>
where
    S: KitStore,
    L: AsRef<str>,
{
    let _guard = crate::executor::SYNC_LOCK
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let mut tx = store.begin()?;
    match import_rows(&mut tx, lines) {
        Ok(import) => {
            tx.commit()?;
            tracing::info!(
                "catalog import committed: {} created, {} updated, {} errors",
                import.created,
                import.updated,
                import.errors.len()
            );
            Ok(import)
        }
        Err(err) => {
            tracing::error!("catalog import aborted, rolling back: {err}");
            if let Err(rollback_err) = tx.rollback() {
                tracing::error!("rollback failed: {rollback_err}");
            }
            Err(err.into())
        }
    }
}

fn import_rows<T, L>(tx: &mut T, lines: &[L]) -> Result<CatalogImport, StoreError>
where
    T: KitTransaction,
    L: AsRef<str>,
{
    let mut import = CatalogImport::default();
    let mut total = 0;

    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let mut cells = line.split('\t').map(str::trim);
        let code = cells.next().unwrap_or_default().to_uppercase();
        let name = cells.next().unwrap_or_default();
        if code == HEADER_CODE {
            continue;
        }
        total += 1;

        let reject = |error: &str| RejectedRow {
            line: idx + 1,
            code: code.clone(),
            error: error.to_string(),
        };
        if code.is_empty() {
            import.errors.push(reject("missing product code"));
            continue;
        }
        if name.is_empty() {
            import.errors.push(reject("missing product name"));
            continue;
        }

        tx.savepoint()?;
        match tx.upsert_product(&code, name) {
            Ok(Upserted::Created) => {
                tx.release()?;
                tracing::info!("created product: {code}");
                import.created += 1;
            }
            Ok(Upserted::Updated) => {
                tx.release()?;
                tracing::info!("updated product: {code}");
                import.updated += 1;
            }
            Err(err) if err.is_recoverable() => {
                tx.rollback_to_savepoint()?;
                tracing::warn!("error processing product {code}: {err}");
                import.errors.push(reject(&err.to_string()));
            }
            Err(err) => return Err(err),
        }
    }

    import.summary = SyncSummary {
        total,
        successful: import.created + import.updated,
        failed: import.errors.len(),
    };
    Ok(import)
}
