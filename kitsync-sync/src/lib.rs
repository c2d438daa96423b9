//! # kitsync-sync
//!
//! Reconciles extracted kits with a persistent store.
//!
//! [`plan`] partitions incoming records into create/update/delete buckets;
//! [`sync_kits`] applies that partition inside one transaction, isolating
//! per-kit failures. [`SqliteStore`] is the bundled [`KitStore`].

pub mod catalog;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod planner;
pub mod sqlite;
pub mod stats;
pub mod store;

pub use catalog::{import_catalog, CatalogImport, RejectedRow};
pub use error::{StoreError, SyncError};
pub use executor::{
    execute_plan, execute_plan_batch, run_sync, sync_kits, sync_kits_batch, FailedItem,
    ResultBuilder, SyncDetails, SyncResult, SyncSummary,
};
pub use pipeline::{SheetSyncOutcome, SyncMode, SyncReport};
pub use planner::{plan, preview, PlanConflict, PlannedUpdate, PreviewSummary, SyncPlan, SyncPreview};
pub use sqlite::{SqliteStore, SqliteTx};
pub use stats::{kit_stats, KitStats};
pub use store::{KitStore, KitTransaction, KitWrite, Upserted};
