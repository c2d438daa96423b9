//! Transactional plan execution.
//!
//! A sync runs inside one store transaction. Each kit is applied inside its
//! own savepoint: a recoverable failure (unknown product code, constraint
//! conflict, vanished row) rolls back just that kit and is recorded in
//! [`SyncResult::errors`]. Any other failure rolls back the whole
//! transaction and is returned as [`SyncError`].
//!
//! [`sync_kits_batch`] trades that per-kit isolation for one batch write
//! per bucket: unknown product codes are still reported per kit, but any
//! write failure aborts the whole sync.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use kitsync_core::{KitId, KitItem, KitRecord, SyncOptions};

use crate::error::{StoreError, SyncError};
use crate::planner::{plan, SyncPlan};
use crate::store::{KitStore, KitTransaction, KitWrite};

/// Serializes syncs within the process; the store's write transaction
/// serializes them across processes.
pub(crate) static SYNC_LOCK: Mutex<()> = Mutex::new(());

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// A kit that could not be applied, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub name: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDetails {
    pub created_kits: Vec<String>,
    pub updated_kits: Vec<String>,
    pub deleted_kits: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SyncSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Outcome of a committed sync.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SyncResult {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub errors: Vec<FailedItem>,
    pub details: SyncDetails,
    pub summary: SyncSummary,
}

/// Accumulates per-item outcomes while a plan executes.
#[derive(Debug, Default)]
pub struct ResultBuilder {
    details: SyncDetails,
    errors: Vec<FailedItem>,
}

impl ResultBuilder {
    pub fn created(&mut self, name: &str) {
        self.details.created_kits.push(name.to_string());
    }

    pub fn updated(&mut self, name: &str) {
        self.details.updated_kits.push(name.to_string());
    }

    pub fn deleted(&mut self, name: &str) {
        self.details.deleted_kits.push(name.to_string());
    }

    pub fn failed(&mut self, name: &str, error: impl Into<String>) {
        self.errors.push(FailedItem {
            name: name.to_string(),
            error: error.into(),
        });
    }

    /// `total` is the number of items the run was asked to process.
    pub fn finish(self, total: usize) -> SyncResult {
        let created = self.details.created_kits.len();
        let updated = self.details.updated_kits.len();
        let deleted = self.details.deleted_kits.len();
        SyncResult {
            created,
            updated,
            deleted,
            summary: SyncSummary {
                total,
                successful: created + updated + deleted,
                failed: self.errors.len(),
            },
            errors: self.errors,
            details: self.details,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-item isolation
// ---------------------------------------------------------------------------

enum ItemFailure {
    UnknownProduct(String),
    Store(StoreError),
}

impl From<StoreError> for ItemFailure {
    fn from(err: StoreError) -> Self {
        ItemFailure::Store(err)
    }
}

impl ItemFailure {
    /// The message to record for a recoverable failure, or the fatal error.
    fn recover(self) -> Result<String, StoreError> {
        match self {
            ItemFailure::UnknownProduct(code) => Ok(format!("Product not found {code}")),
            ItemFailure::Store(err) if err.is_recoverable() => Ok(err.to_string()),
            ItemFailure::Store(err) => Err(err),
        }
    }
}

/// Run `op` inside a savepoint. `Ok(None)` on success, `Ok(Some(message))`
/// after a recoverable failure was rolled back, `Err` for a fatal one.
fn isolated<T, F>(tx: &mut T, op: F) -> Result<Option<String>, StoreError>
where
    T: KitTransaction,
    F: FnOnce(&mut T) -> Result<(), ItemFailure>,
{
    tx.savepoint()?;
    match op(tx) {
        Ok(()) => {
            tx.release()?;
            Ok(None)
        }
        Err(failure) => {
            let message = failure.recover()?;
            tx.rollback_to_savepoint()?;
            Ok(Some(message))
        }
    }
}

/// Resolve every product code of `record`, or fail on the first unknown one.
fn resolve_items<T: KitTransaction>(
    tx: &mut T,
    record: &KitRecord,
) -> Result<Vec<KitItem>, ItemFailure> {
    let mut items = Vec::with_capacity(record.products.len());
    for product_ref in &record.products {
        let product = tx
            .find_product_by_code(&product_ref.code)?
            .ok_or_else(|| ItemFailure::UnknownProduct(product_ref.code.clone()))?;
        items.push(KitItem {
            product,
            quantity: product_ref.quantity,
        });
    }
    Ok(items)
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Apply `plan` through an open transaction. The caller commits or rolls
/// back; an `Err` means the transaction must not be committed.
pub fn execute_plan<T: KitTransaction>(
    tx: &mut T,
    plan: &SyncPlan,
) -> Result<SyncResult, StoreError> {
    let mut result = ResultBuilder::default();

    for conflict in &plan.conflicts {
        tracing::warn!("skipping kit {}: {}", conflict.name, conflict.reason);
        result.failed(&conflict.name, conflict.reason.clone());
    }

    for update in &plan.to_update {
        let record = &update.record;
        let outcome = isolated(tx, |tx| {
            // Resolve first so a bad code never leaves the kit half-rewritten.
            let items = resolve_items(tx, record)?;
            tx.save_kit(&update.existing, record, &items)?;
            Ok(())
        })?;
        match outcome {
            None => {
                tracing::info!("updated kit: {}", record.name);
                result.updated(&record.name);
            }
            Some(message) => {
                tracing::warn!("error processing kit {}: {message}", record.name);
                result.failed(&record.name, message);
            }
        }
    }

    for record in &plan.to_create {
        let outcome = isolated(tx, |tx| {
            let items = resolve_items(tx, record)?;
            tx.create_kit(record, &items)?;
            Ok(())
        })?;
        match outcome {
            None => {
                tracing::info!("created kit: {}", record.name);
                result.created(&record.name);
            }
            Some(message) => {
                tracing::warn!("error processing kit {}: {message}", record.name);
                result.failed(&record.name, message);
            }
        }
    }

    for kit in &plan.to_delete {
        let outcome = isolated(tx, |tx| {
            tx.remove_kit(&kit.id)?;
            Ok(())
        })?;
        match outcome {
            None => {
                tracing::info!("deleted kit: {}", kit.name);
                result.deleted(&kit.name);
            }
            Some(message) => {
                tracing::warn!("error deleting kit {}: {message}", kit.name);
                result.failed(&kit.name, format!("Delete error: {message}"));
            }
        }
    }

    Ok(result.finish(plan.incoming + plan.to_delete.len()))
}

/// Resolve `record`'s items for a batch write. An unknown code is recorded
/// against the kit and yields `Ok(None)`.
fn resolved<T: KitTransaction>(
    tx: &mut T,
    record: &KitRecord,
    result: &mut ResultBuilder,
) -> Result<Option<Vec<KitItem>>, StoreError> {
    match resolve_items(tx, record) {
        Ok(items) => Ok(Some(items)),
        Err(failure) => {
            let message = failure.recover()?;
            tracing::warn!("error processing kit {}: {message}", record.name);
            result.failed(&record.name, message);
            Ok(None)
        }
    }
}

/// Apply `plan` with one batch write per bucket.
///
/// Items are resolved before anything is written, so kits with unknown
/// product codes are simply left out. Every write error is fatal.
pub fn execute_plan_batch<T: KitTransaction>(
    tx: &mut T,
    plan: &SyncPlan,
) -> Result<SyncResult, StoreError> {
    let mut result = ResultBuilder::default();

    for conflict in &plan.conflicts {
        tracing::warn!("skipping kit {}: {}", conflict.name, conflict.reason);
        result.failed(&conflict.name, conflict.reason.clone());
    }

    let mut updates = Vec::with_capacity(plan.to_update.len());
    for update in &plan.to_update {
        if let Some(items) = resolved(tx, &update.record, &mut result)? {
            let write = KitWrite {
                record: &update.record,
                items,
            };
            updates.push((update.existing.clone(), write));
        }
    }
    let mut creates = Vec::with_capacity(plan.to_create.len());
    for record in &plan.to_create {
        if let Some(items) = resolved(tx, record, &mut result)? {
            creates.push(KitWrite { record, items });
        }
    }

    tx.save_kits(&updates)?;
    for (_, kit) in &updates {
        result.updated(&kit.record.name);
    }
    tracing::info!("updated {} kits", updates.len());

    tx.create_kits(&creates)?;
    for kit in &creates {
        result.created(&kit.record.name);
    }
    tracing::info!("created {} kits", creates.len());

    let ids: Vec<KitId> = plan.to_delete.iter().map(|kit| kit.id.clone()).collect();
    let removed = tx.remove_kits(&ids)?;
    if removed != ids.len() {
        return Err(StoreError::NotFound(format!(
            "{} of {} kits vanished before deletion",
            ids.len() - removed,
            ids.len()
        )));
    }
    for kit in &plan.to_delete {
        result.deleted(&kit.name);
    }
    tracing::info!("deleted {} kits", removed);

    Ok(result.finish(plan.incoming + plan.to_delete.len()))
}

/// Commit on success, roll back on a fatal error.
fn conclude<T: KitTransaction>(
    tx: T,
    outcome: Result<SyncResult, StoreError>,
) -> Result<SyncResult, SyncError> {
    match outcome {
        Ok(result) => {
            tx.commit()?;
            tracing::info!(
                "sync committed: {} created, {} updated, {} deleted, {} failed",
                result.created,
                result.updated,
                result.deleted,
                result.summary.failed
            );
            Ok(result)
        }
        Err(err) => {
            tracing::error!("sync aborted, rolling back: {err}");
            if let Err(rollback_err) = tx.rollback() {
                tracing::error!("rollback failed: {rollback_err}");
            }
            Err(SyncError::Store(err))
        }
    }
}

/// Execute a pre-computed plan in one transaction.
///
/// The plan should have been computed against the store's current state;
/// prefer [`sync_kits`], which plans inside the transaction.
pub fn run_sync<S: KitStore>(store: &mut S, plan: &SyncPlan) -> Result<SyncResult, SyncError> {
    // A poisoned lock guards no data; the store transaction is what matters.
    let _guard = SYNC_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let mut tx = store.begin()?;
    let outcome = execute_plan(&mut tx, plan);
    conclude(tx, outcome)
}

/// Load, plan and execute in one transaction, so the plan can never be
/// computed against stale state.
pub fn sync_kits<S: KitStore>(
    store: &mut S,
    incoming: &[KitRecord],
    options: &SyncOptions,
) -> Result<SyncResult, SyncError> {
    let _guard = SYNC_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let mut tx = store.begin()?;
    let outcome = tx.load_kits().and_then(|persisted| {
        let plan = plan(incoming, &persisted, options);
        execute_plan(&mut tx, &plan)
    });
    conclude(tx, outcome)
}

/// [`sync_kits`] with batch writes instead of per-kit savepoints.
pub fn sync_kits_batch<S: KitStore>(
    store: &mut S,
    incoming: &[KitRecord],
    options: &SyncOptions,
) -> Result<SyncResult, SyncError> {
    let _guard = SYNC_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    let mut tx = store.begin()?;
    let outcome = tx.load_kits().and_then(|persisted| {
        let plan = plan(incoming, &persisted, options);
        execute_plan_batch(&mut tx, &plan)
    });
    conclude(tx, outcome)
}
