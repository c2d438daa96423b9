//! Reconciliation planning.
//!
//! [`plan`] is pure: it compares the incoming records against the persisted
//! kits by natural key and sorts every key into exactly one of create,
//! update or delete. Nothing is read or written here.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use kitsync_core::{KitId, KitKey, KitRecord, NaturalKey, PersistedKit, SyncOptions};

/// An incoming record matched to the persisted kit it will overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedUpdate {
    pub record: KitRecord,
    pub existing: KitId,
}

/// A record left out of every bucket because its key was ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanConflict {
    pub name: String,
    pub reason: String,
}

/// The partition computed by [`plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPlan {
    pub key: NaturalKey,
    pub to_create: Vec<KitRecord>,
    pub to_update: Vec<PlannedUpdate>,
    pub to_delete: Vec<PersistedKit>,
    pub conflicts: Vec<PlanConflict>,
    /// Number of incoming records the plan was computed from.
    pub incoming: usize,
}

/// Partition `incoming` against `persisted`.
///
/// Incoming order is preserved within `to_create` and `to_update`;
/// `to_delete` follows the persisted order. With `options.prune == false`
/// nothing is ever scheduled for deletion.
pub fn plan(incoming: &[KitRecord], persisted: &[PersistedKit], options: &SyncOptions) -> SyncPlan {
    let key = options.key;
    let mut conflicts = Vec::new();

    let mut by_key: HashMap<KitKey, &PersistedKit> = HashMap::new();
    let mut shadowed: Vec<(KitKey, &PersistedKit)> = Vec::new();
    for kit in persisted {
        let k = key.key_of(kit.category, &kit.name);
        if by_key.contains_key(&k) {
            shadowed.push((k, kit));
        } else {
            by_key.insert(k, kit);
        }
    }

    let mut seen: HashSet<KitKey> = HashSet::new();
    let mut to_create = Vec::new();
    let mut to_update = Vec::new();
    for record in incoming {
        let k = key.key_of(record.category, &record.name);
        if !seen.insert(k.clone()) {
            conflicts.push(PlanConflict {
                name: record.name.clone(),
                reason: format!("duplicate kit '{k}' in sheet (kit #{})", record.weight),
            });
            continue;
        }
        match by_key.get(&k) {
            Some(existing) => to_update.push(PlannedUpdate {
                record: record.clone(),
                existing: existing.id.clone(),
            }),
            None => to_create.push(record.clone()),
        }
    }

    // A shadowed duplicate is only ambiguous when its key is being synced;
    // otherwise every copy is simply absent from the sheet.
    let mut shadowed_ids: HashSet<&KitId> = HashSet::new();
    for (k, kit) in &shadowed {
        if seen.contains(k) {
            shadowed_ids.insert(&kit.id);
            conflicts.push(PlanConflict {
                name: kit.name.clone(),
                reason: format!("kit '{k}' is stored more than once (id {})", kit.id),
            });
        }
    }

    let to_delete = if options.prune {
        persisted
            .iter()
            .filter(|kit| !seen.contains(&key.key_of(kit.category, &kit.name)))
            .filter(|kit| !shadowed_ids.contains(&kit.id))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    SyncPlan {
        key,
        to_create,
        to_update,
        to_delete,
        conflicts,
        incoming: incoming.len(),
    }
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// Counts shown with a [`SyncPreview`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewSummary {
    pub total: usize,
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
}

/// Names per bucket: what a sync would do, without doing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPreview {
    pub to_create: Vec<String>,
    pub to_update: Vec<String>,
    pub to_delete: Vec<String>,
    pub conflicts: Vec<String>,
    pub summary: PreviewSummary,
}

impl SyncPlan {
    pub fn preview(&self) -> SyncPreview {
        let to_create: Vec<String> = self.to_create.iter().map(|r| r.name.clone()).collect();
        let to_update: Vec<String> = self.to_update.iter().map(|u| u.record.name.clone()).collect();
        let to_delete: Vec<String> = self.to_delete.iter().map(|k| k.name.clone()).collect();
        let summary = PreviewSummary {
            total: to_create.len() + to_update.len() + to_delete.len(),
            creates: to_create.len(),
            updates: to_update.len(),
            deletes: to_delete.len(),
        };
        SyncPreview {
            to_create,
            to_update,
            to_delete,
            conflicts: self
                .conflicts
                .iter()
                .map(|c| format!("{}: {}", c.name, c.reason))
                .collect(),
            summary,
        }
    }
}

/// [`plan`] followed by [`SyncPlan::preview`].
pub fn preview(
    incoming: &[KitRecord],
    persisted: &[PersistedKit],
    options: &SyncOptions,
) -> SyncPreview {
    plan(incoming, persisted, options).preview()
}
