//! kitsync core library: domain types, sheet layout, configuration and errors.
//!
//! - [`types`]: kit records, persisted kits, products
//! - [`config`]: [`SheetLayout`], [`SyncOptions`], YAML config load / save / init
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, ColumnLayout, KitKey, NaturalKey, SheetLayout, SyncOptions};
pub use error::ConfigError;
pub use types::{
    Category, KitId, KitItem, KitRecord, KitSummary, PersistedKit, Product, ProductId,
    ProductRef, ProtocolSteps,
};
