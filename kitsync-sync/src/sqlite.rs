//! SQLite-backed [`KitStore`].
//!
//! Three tables: `products` (unique `code`), `kits`, and `kit_products`
//! (owned by a kit, removed with it through `ON DELETE CASCADE`). Tips and
//! protocol are stored as JSON text. Timestamps are RFC 3339 text.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

use kitsync_core::{
    Category, KitId, KitItem, KitRecord, PersistedKit, Product, ProductId, ProtocolSteps,
};

use crate::error::{io_err, StoreError};
use crate::store::{KitStore, KitTransaction, KitWrite, Upserted};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const SAVEPOINT: &str = "kitsync_item";

const INSERT_KIT: &str = "INSERT INTO kits
        (id, category, name, tips, protocol, image_link, weight, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)";
const UPDATE_KIT: &str = "UPDATE kits
     SET category = ?2, name = ?3, tips = ?4, protocol = ?5,
         image_link = ?6, weight = ?7, updated_at = ?8
     WHERE id = ?1";
const DELETE_KIT: &str = "DELETE FROM kits WHERE id = ?1";
const INSERT_ITEM: &str =
    "INSERT INTO kit_products (kit_id, product_id, quantity) VALUES (?1, ?2, ?3)";
const CLEAR_ITEMS: &str = "DELETE FROM kit_products WHERE kit_id = ?1";

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const SCHEMA_V1: &str = r#"
CREATE TABLE products (
    id         TEXT PRIMARY KEY,
    code       TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE kits (
    id         TEXT PRIMARY KEY,
    category   TEXT NOT NULL CHECK (category IN ('CASA', 'CABINA')),
    name       TEXT NOT NULL,
    tips       TEXT NOT NULL DEFAULT '[]',
    protocol   TEXT NOT NULL DEFAULT '{"dia":[],"noche":[]}',
    image_link TEXT,
    weight     INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX idx_kits_name ON kits (name);
CREATE TABLE kit_products (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    kit_id     TEXT NOT NULL REFERENCES kits (id) ON DELETE CASCADE,
    product_id TEXT NOT NULL REFERENCES products (id),
    quantity   INTEGER NOT NULL CHECK (quantity > 0)
);
CREATE INDEX idx_kit_products_kit ON kit_products (kit_id);
"#;

/// `(version, description, sql)`, applied in order, each at most once.
const MIGRATIONS: &[(i64, &str, &str)] = &[(1, "products, kits and kit items", SCHEMA_V1)];

fn migrate(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_versions (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL,
            description TEXT NOT NULL
        )",
        [],
    )?;

    for (version, description, sql) in MIGRATIONS {
        let applied: i64 = conn.query_row(
            "SELECT COUNT(*) FROM schema_versions WHERE version = ?1",
            params![version],
            |row| row.get(0),
        )?;
        if applied > 0 {
            continue;
        }
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute(
            "INSERT INTO schema_versions (version, applied_at, description) VALUES (?1, ?2, ?3)",
            params![version, Utc::now().to_rfc3339(), description],
        )?;
        tx.commit()?;
        tracing::info!("applied schema migration {version}: {description}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// A kit store in one SQLite database file.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and bring its schema
    /// up to date. The parent directory is created if missing.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let conn = Connection::open(path)?;
        // Before any pragma, so a locked file is waited on rather than refused.
        conn.busy_timeout(BUSY_TIMEOUT)?;

        // journal_mode is per connection and reports the mode actually set.
        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        if !journal_mode.eq_ignore_ascii_case("wal") {
            tracing::warn!(
                "could not enable WAL on {}; journal mode is {journal_mode}",
                path.display()
            );
        }
        tracing::debug!("opened kit store at {}", path.display());
        Self::configure(conn)
    }

    /// A private, throwaway store.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;
        migrate(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KitStore for SqliteStore {
    type Tx<'a> = SqliteTx<'a>;

    fn begin(&mut self) -> Result<SqliteTx<'_>, StoreError> {
        // IMMEDIATE takes the write lock up front, so two writers never
        // interleave between their reads and their writes.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteTx { tx })
    }

    fn load_kits(&self) -> Result<Vec<PersistedKit>, StoreError> {
        load_kits(&self.conn)
    }

    fn find_kit(&self, term: &str) -> Result<Option<PersistedKit>, StoreError> {
        let term = term.trim();
        let mut kits = load_kits(&self.conn)?;
        let position = if Uuid::parse_str(term).is_ok() {
            kits.iter().position(|k| k.id.0 == term)
        } else {
            let wanted = term.to_uppercase();
            kits.iter().position(|k| k.name.to_uppercase() == wanted)
        };
        Ok(position.map(|p| kits.swap_remove(p)))
    }

    fn remove_kit(&mut self, id: &KitId) -> Result<bool, StoreError> {
        let removed = self.conn.execute(DELETE_KIT, params![id.0])?;
        Ok(removed > 0)
    }

    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, code, name FROM products ORDER BY code")?;
        let products = stmt
            .query_map([], product_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(products)
    }
}

// ---------------------------------------------------------------------------
// SqliteTx
// ---------------------------------------------------------------------------

/// A write transaction on a [`SqliteStore`]. Dropping it without
/// [`commit`](KitTransaction::commit) rolls back.
#[derive(Debug)]
pub struct SqliteTx<'conn> {
    tx: Transaction<'conn>,
}

impl KitTransaction for SqliteTx<'_> {
    fn load_kits(&mut self) -> Result<Vec<PersistedKit>, StoreError> {
        load_kits(&self.tx)
    }

    fn find_product_by_code(&mut self, code: &str) -> Result<Option<Product>, StoreError> {
        let product = self
            .tx
            .query_row(
                "SELECT id, code, name FROM products WHERE code = ?1",
                params![code],
                product_row,
            )
            .optional()?;
        Ok(product)
    }

    fn create_kit(&mut self, kit: &KitRecord, items: &[KitItem]) -> Result<KitId, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        self.tx.execute(
            INSERT_KIT,
            params![
                id,
                kit.category.as_str(),
                kit.name,
                serde_json::to_string(&kit.tips)?,
                serde_json::to_string(&kit.protocol)?,
                kit.image_link,
                kit.weight,
                now,
            ],
        )?;
        insert_items(&self.tx, &id, items)?;
        Ok(KitId(id))
    }

    fn save_kit(
        &mut self,
        id: &KitId,
        kit: &KitRecord,
        items: &[KitItem],
    ) -> Result<(), StoreError> {
        let updated = self.tx.execute(
            UPDATE_KIT,
            params![
                id.0,
                kit.category.as_str(),
                kit.name,
                serde_json::to_string(&kit.tips)?,
                serde_json::to_string(&kit.protocol)?,
                kit.image_link,
                kit.weight,
                Utc::now().to_rfc3339(),
            ],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("kit {id}")));
        }
        self.tx.execute(CLEAR_ITEMS, params![id.0])?;
        insert_items(&self.tx, &id.0, items)
    }

    fn remove_kit(&mut self, id: &KitId) -> Result<(), StoreError> {
        let removed = self.tx.execute(DELETE_KIT, params![id.0])?;
        if removed == 0 {
            return Err(StoreError::NotFound(format!("kit {id}")));
        }
        Ok(())
    }

    fn create_kits(&mut self, kits: &[KitWrite<'_>]) -> Result<Vec<KitId>, StoreError> {
        let now = Utc::now().to_rfc3339();
        let mut insert_kit = self.tx.prepare(INSERT_KIT)?;
        let mut insert_item = self.tx.prepare(INSERT_ITEM)?;

        let mut ids = Vec::with_capacity(kits.len());
        for kit in kits {
            let id = Uuid::new_v4().to_string();
            let record = kit.record;
            insert_kit.execute(params![
                id,
                record.category.as_str(),
                record.name,
                serde_json::to_string(&record.tips)?,
                serde_json::to_string(&record.protocol)?,
                record.image_link,
                record.weight,
                now,
            ])?;
            for item in &kit.items {
                insert_item.execute(params![id, item.product.id.0, item.quantity])?;
            }
            ids.push(KitId(id));
        }
        Ok(ids)
    }

    fn save_kits(&mut self, kits: &[(KitId, KitWrite<'_>)]) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let mut update_kit = self.tx.prepare(UPDATE_KIT)?;
        let mut clear_items = self.tx.prepare(CLEAR_ITEMS)?;
        let mut insert_item = self.tx.prepare(INSERT_ITEM)?;

        for (id, kit) in kits {
            let record = kit.record;
            let updated = update_kit.execute(params![
                id.0,
                record.category.as_str(),
                record.name,
                serde_json::to_string(&record.tips)?,
                serde_json::to_string(&record.protocol)?,
                record.image_link,
                record.weight,
                now,
            ])?;
            if updated == 0 {
                return Err(StoreError::NotFound(format!("kit {id}")));
            }
            clear_items.execute(params![id.0])?;
            for item in &kit.items {
                insert_item.execute(params![id.0, item.product.id.0, item.quantity])?;
            }
        }
        Ok(())
    }

    fn remove_kits(&mut self, ids: &[KitId]) -> Result<usize, StoreError> {
        let mut delete_kit = self.tx.prepare(DELETE_KIT)?;
        let mut removed = 0;
        for id in ids {
            removed += delete_kit.execute(params![id.0])?;
        }
        Ok(removed)
    }

    fn upsert_product(&mut self, code: &str, name: &str) -> Result<Upserted, StoreError> {
        let now = Utc::now().to_rfc3339();
        let renamed = self.tx.execute(
            "UPDATE products SET name = ?2, updated_at = ?3 WHERE code = ?1",
            params![code, name, now],
        )?;
        if renamed > 0 {
            return Ok(Upserted::Updated);
        }
        self.tx.execute(
            "INSERT INTO products (id, code, name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![Uuid::new_v4().to_string(), code, name, now],
        )?;
        Ok(Upserted::Created)
    }

    fn savepoint(&mut self) -> Result<(), StoreError> {
        self.tx.execute_batch(&format!("SAVEPOINT {SAVEPOINT}"))?;
        Ok(())
    }

    fn release(&mut self) -> Result<(), StoreError> {
        self.tx.execute_batch(&format!("RELEASE {SAVEPOINT}"))?;
        Ok(())
    }

    fn rollback_to_savepoint(&mut self) -> Result<(), StoreError> {
        // ROLLBACK TO keeps the savepoint open; release it afterwards.
        self.tx
            .execute_batch(&format!("ROLLBACK TO {SAVEPOINT}; RELEASE {SAVEPOINT}"))?;
        Ok(())
    }

    fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

struct KitRow {
    id: String,
    category: String,
    name: String,
    tips: String,
    protocol: String,
    image_link: Option<String>,
    weight: u32,
    created_at: String,
    updated_at: String,
}

fn kit_row(row: &Row<'_>) -> rusqlite::Result<KitRow> {
    Ok(KitRow {
        id: row.get(0)?,
        category: row.get(1)?,
        name: row.get(2)?,
        tips: row.get(3)?,
        protocol: row.get(4)?,
        image_link: row.get(5)?,
        weight: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn product_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: ProductId(row.get(0)?),
        code: row.get(1)?,
        name: row.get(2)?,
    })
}

fn corrupt(message: String) -> StoreError {
    StoreError::Corrupt {
        table: "kits",
        message,
    }
}

fn parse_timestamp(id: &str, raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(format!("kit {id}: bad timestamp '{raw}': {e}")))
}

fn decode_kit(row: KitRow, items: Vec<KitItem>) -> Result<PersistedKit, StoreError> {
    let category = Category::from_token(&row.category)
        .ok_or_else(|| corrupt(format!("kit {}: unknown category '{}'", row.id, row.category)))?;
    let tips: Vec<String> = serde_json::from_str(&row.tips)
        .map_err(|e| corrupt(format!("kit {}: tips: {e}", row.id)))?;
    let protocol: ProtocolSteps = serde_json::from_str(&row.protocol)
        .map_err(|e| corrupt(format!("kit {}: protocol: {e}", row.id)))?;
    let created_at = parse_timestamp(&row.id, &row.created_at)?;
    let updated_at = parse_timestamp(&row.id, &row.updated_at)?;

    Ok(PersistedKit {
        id: KitId(row.id),
        category,
        name: row.name,
        tips,
        protocol,
        image_link: row.image_link,
        weight: row.weight,
        items,
        created_at,
        updated_at,
    })
}

fn load_items(conn: &Connection) -> Result<HashMap<String, Vec<KitItem>>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT kp.kit_id, p.id, p.code, p.name, kp.quantity
         FROM kit_products kp
         JOIN products p ON p.id = kp.product_id
         ORDER BY kp.id",
    )?;
    let rows = stmt.query_map([], |row| {
        let kit_id: String = row.get(0)?;
        let item = KitItem {
            product: Product {
                id: ProductId(row.get(1)?),
                code: row.get(2)?,
                name: row.get(3)?,
            },
            quantity: row.get(4)?,
        };
        Ok((kit_id, item))
    })?;

    let mut by_kit: HashMap<String, Vec<KitItem>> = HashMap::new();
    for row in rows {
        let (kit_id, item) = row?;
        by_kit.entry(kit_id).or_default().push(item);
    }
    Ok(by_kit)
}

fn load_kits(conn: &Connection) -> Result<Vec<PersistedKit>, StoreError> {
    let mut items = load_items(conn)?;
    let mut stmt = conn.prepare(
        "SELECT id, category, name, tips, protocol, image_link, weight, created_at, updated_at
         FROM kits
         ORDER BY weight, name, created_at",
    )?;
    let rows = stmt
        .query_map([], kit_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|row| {
            let kit_items = items.remove(&row.id).unwrap_or_default();
            decode_kit(row, kit_items)
        })
        .collect()
}

fn insert_items(conn: &Connection, kit_id: &str, items: &[KitItem]) -> Result<(), StoreError> {
    let mut stmt = conn.prepare_cached(INSERT_ITEM)?;
    for item in items {
        stmt.execute(params![kit_id, item.product.id.0, item.quantity])?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use kitsync_core::ProductRef;

    fn record(name: &str) -> KitRecord {
        KitRecord {
            category: Category::Casa,
            name: name.to_string(),
            products: vec![ProductRef::new("P1", 2)],
            tips: vec!["1. Drink water".to_string()],
            protocol: ProtocolSteps {
                day: vec!["Cleanse".to_string()],
                night: vec![],
            },
            image_link: Some("https://img/a.png".to_string()),
            weight: 1,
        }
    }

    fn seeded() -> (SqliteStore, Product) {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let mut tx = store.begin().unwrap();
        tx.upsert_product("P1", "Cleanser").unwrap();
        let product = tx.find_product_by_code("P1").unwrap().unwrap();
        tx.commit().unwrap();
        (store, product)
    }

    #[test]
    fn create_then_load_roundtrips_fields() {
        let (mut store, product) = seeded();
        let mut tx = store.begin().unwrap();
        let id = tx
            .create_kit(&record("Kit A"), &[KitItem { product: product.clone(), quantity: 2 }])
            .unwrap();
        tx.commit().unwrap();

        let kits = store.load_kits().unwrap();
        assert_eq!(kits.len(), 1);
        let kit = &kits[0];
        assert_eq!(kit.id, id);
        assert_eq!(kit.name, "Kit A");
        assert_eq!(kit.tips, vec!["1. Drink water"]);
        assert_eq!(kit.protocol.day, vec!["Cleanse"]);
        assert_eq!(kit.image_link.as_deref(), Some("https://img/a.png"));
        assert_eq!(kit.items, vec![KitItem { product, quantity: 2 }]);
    }

    #[test]
    fn save_replaces_items_and_scalars() {
        let (mut store, product) = seeded();
        let mut tx = store.begin().unwrap();
        let item = KitItem { product, quantity: 1 };
        let id = tx.create_kit(&record("Kit A"), &[item.clone()]).unwrap();

        let mut changed = record("Kit A");
        changed.image_link = None;
        changed.tips.clear();
        changed.weight = 7;
        tx.save_kit(&id, &changed, &[]).unwrap();
        tx.commit().unwrap();

        let kit = store.find_kit("kit a").unwrap().unwrap();
        assert!(kit.items.is_empty());
        assert!(kit.tips.is_empty());
        assert_eq!(kit.image_link, None);
        assert_eq!(kit.weight, 7);
    }

    #[test]
    fn save_of_missing_kit_is_not_found() {
        let (mut store, _) = seeded();
        let mut tx = store.begin().unwrap();
        let err = tx
            .save_kit(&KitId::from("missing"), &record("X"), &[])
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn dropped_transaction_rolls_back() {
        let (mut store, _) = seeded();
        {
            let mut tx = store.begin().unwrap();
            tx.create_kit(&record("Kit A"), &[]).unwrap();
        }
        assert!(store.load_kits().unwrap().is_empty());
    }

    #[test]
    fn savepoint_rollback_discards_only_the_item() {
        let (mut store, _) = seeded();
        let mut tx = store.begin().unwrap();
        tx.create_kit(&record("Kept"), &[]).unwrap();
        tx.savepoint().unwrap();
        tx.create_kit(&record("Discarded"), &[]).unwrap();
        tx.rollback_to_savepoint().unwrap();
        tx.commit().unwrap();

        let names: Vec<_> = store
            .load_kits()
            .unwrap()
            .into_iter()
            .map(|k| k.name)
            .collect();
        assert_eq!(names, vec!["Kept"]);
    }

    #[test]
    fn removing_kit_cascades_items() {
        let (mut store, product) = seeded();
        let mut tx = store.begin().unwrap();
        let id = tx
            .create_kit(&record("Kit A"), &[KitItem { product, quantity: 1 }])
            .unwrap();
        tx.commit().unwrap();

        assert!(store.remove_kit(&id).unwrap());
        assert!(!store.remove_kit(&id).unwrap());
        let remaining: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM kit_products", [], |r| r.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn find_kit_by_id_or_name() {
        let (mut store, _) = seeded();
        let mut tx = store.begin().unwrap();
        let id = tx.create_kit(&record("Hydra Kit"), &[]).unwrap();
        tx.commit().unwrap();

        assert_eq!(store.find_kit(&id.0).unwrap().unwrap().name, "Hydra Kit");
        assert_eq!(store.find_kit("HYDRA KIT").unwrap().unwrap().id, id);
        assert!(store.find_kit("nope").unwrap().is_none());
    }

    #[test]
    fn upsert_product_renames_existing_code() {
        let (mut store, _) = seeded();
        let mut tx = store.begin().unwrap();
        assert_eq!(tx.upsert_product("P1", "Gentle Cleanser").unwrap(), Upserted::Updated);
        assert_eq!(tx.upsert_product("P2", "Toner").unwrap(), Upserted::Created);
        tx.commit().unwrap();

        let products = store.list_products().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Gentle Cleanser");
    }

    #[test]
    fn file_store_reopens_with_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("kits.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            let mut tx = store.begin().unwrap();
            tx.create_kit(&record("Kit A"), &[]).unwrap();
            tx.commit().unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.load_kits().unwrap().len(), 1);
    }

    #[test]
    fn batch_writes_create_save_and_remove() {
        let (mut store, product) = seeded();
        let a = record("Kit A");
        let b = record("Kit B");
        let item = KitItem { product, quantity: 3 };

        let mut tx = store.begin().unwrap();
        let ids = tx
            .create_kits(&[
                KitWrite { record: &a, items: vec![item.clone()] },
                KitWrite { record: &b, items: vec![] },
            ])
            .unwrap();
        assert_eq!(ids.len(), 2);

        let mut renamed = record("Kit A");
        renamed.weight = 9;
        tx.save_kits(&[(ids[0].clone(), KitWrite { record: &renamed, items: vec![] })])
            .unwrap();
        assert_eq!(tx.remove_kits(&[ids[1].clone(), KitId::from("missing")]).unwrap(), 1);
        tx.commit().unwrap();

        let kits = store.load_kits().unwrap();
        assert_eq!(kits.len(), 1);
        assert_eq!(kits[0].id, ids[0]);
        assert_eq!(kits[0].weight, 9);
        assert!(kits[0].items.is_empty());
    }

    #[test]
    fn batch_save_of_missing_kit_is_not_found() {
        let (mut store, _) = seeded();
        let kit = record("X");
        let mut tx = store.begin().unwrap();
        let err = tx
            .save_kits(&[(KitId::from("missing"), KitWrite { record: &kit, items: vec![] })])
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn open_waits_for_a_writer_holding_the_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kits.db");
        let holder = Connection::open(&path).unwrap();
        holder
            .execute_batch("CREATE TABLE scratch (x INTEGER); BEGIN EXCLUSIVE; INSERT INTO scratch VALUES (1);")
            .unwrap();
        let release = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(200));
            holder.execute_batch("COMMIT").unwrap();
        });

        let store = SqliteStore::open(&path).expect("open waits out the lock");
        release.join().unwrap();
        assert!(store.load_kits().unwrap().is_empty());
    }
}
