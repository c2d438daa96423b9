//! Persistence boundary.
//!
//! [`KitStore`] is the long-lived handle; [`KitTransaction`] is the unit of
//! work a sync runs in. Everything a sync mutates goes through a single
//! transaction so a fatal error leaves the store exactly as it was.

use kitsync_core::{KitId, KitItem, KitRecord, PersistedKit, Product};

use crate::error::StoreError;

/// Whether a catalog upsert inserted a new product or touched an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created,
    Updated,
}

/// A kit and its resolved items, ready to be written in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KitWrite<'a> {
    pub record: &'a KitRecord,
    pub items: Vec<KitItem>,
}

/// A durable store of kits and catalog products.
pub trait KitStore {
    type Tx<'a>: KitTransaction
    where
        Self: 'a;

    /// Open a write transaction. Writers are serialized: a second writer
    /// waits (or fails) until the first commits or rolls back.
    fn begin(&mut self) -> Result<Self::Tx<'_>, StoreError>;

    /// Every persisted kit with its items, ordered by weight then name.
    fn load_kits(&self) -> Result<Vec<PersistedKit>, StoreError>;

    /// Look a kit up by id, or by case-insensitive name.
    fn find_kit(&self, term: &str) -> Result<Option<PersistedKit>, StoreError>;

    /// Delete one kit and its items. `Ok(false)` when no such kit exists.
    fn remove_kit(&mut self, id: &KitId) -> Result<bool, StoreError>;

    /// The product catalog, ordered by code.
    fn list_products(&self) -> Result<Vec<Product>, StoreError>;
}

/// Operations available inside a write transaction.
pub trait KitTransaction {
    fn load_kits(&mut self) -> Result<Vec<PersistedKit>, StoreError>;

    /// Exact code lookup.
    fn find_product_by_code(&mut self, code: &str) -> Result<Option<Product>, StoreError>;

    /// Insert a new kit with the given items; returns its fresh identity.
    fn create_kit(&mut self, kit: &KitRecord, items: &[KitItem]) -> Result<KitId, StoreError>;

    /// Overwrite every scalar field of kit `id` from `kit` and replace its
    /// items wholesale.
    fn save_kit(&mut self, id: &KitId, kit: &KitRecord, items: &[KitItem])
        -> Result<(), StoreError>;

    fn remove_kit(&mut self, id: &KitId) -> Result<(), StoreError>;

    /// Insert every kit in `kits`, returning their identities in order. The
    /// first failure aborts the batch.
    fn create_kits(&mut self, kits: &[KitWrite<'_>]) -> Result<Vec<KitId>, StoreError> {
        kits.iter()
            .map(|kit| self.create_kit(kit.record, &kit.items))
            .collect()
    }

    /// [`save_kit`](Self::save_kit) for every `(id, kit)` pair.
    fn save_kits(&mut self, kits: &[(KitId, KitWrite<'_>)]) -> Result<(), StoreError> {
        for (id, kit) in kits {
            self.save_kit(id, kit.record, &kit.items)?;
        }
        Ok(())
    }

    /// Delete every kit in `ids`; returns how many rows went away.
    fn remove_kits(&mut self, ids: &[KitId]) -> Result<usize, StoreError> {
        for id in ids {
            self.remove_kit(id)?;
        }
        Ok(ids.len())
    }

    /// Insert the product, or rename the existing one with the same code.
    fn upsert_product(&mut self, code: &str, name: &str) -> Result<Upserted, StoreError>;

    /// Mark a point the transaction can later return to.
    fn savepoint(&mut self) -> Result<(), StoreError>;
    /// Keep everything done since the last [`savepoint`](Self::savepoint).
    fn release(&mut self) -> Result<(), StoreError>;
    /// Discard everything done since the last [`savepoint`](Self::savepoint).
    fn rollback_to_savepoint(&mut self) -> Result<(), StoreError>;

    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;

    fn rollback(self) -> Result<(), StoreError>
    where
        Self: Sized;
}
