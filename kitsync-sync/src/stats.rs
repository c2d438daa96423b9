//! Aggregate counts over persisted kits.

use std::collections::BTreeMap;

use serde::Serialize;

use kitsync_core::{Category, PersistedKit};

use crate::error::StoreError;
use crate::store::KitStore;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KitStats {
    #[serde(rename = "totalKits")]
    pub total: usize,
    /// Every category appears, with zero when it has no kits.
    pub by_category: BTreeMap<Category, usize>,
    pub with_images: usize,
    pub with_protocols: usize,
}

impl KitStats {
    pub fn from_kits(kits: &[PersistedKit]) -> Self {
        let mut by_category: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|c| (*c, 0)).collect();
        for kit in kits {
            *by_category.entry(kit.category).or_default() += 1;
        }
        Self {
            total: kits.len(),
            by_category,
            with_images: kits.iter().filter(|k| k.image_link.is_some()).count(),
            with_protocols: kits.iter().filter(|k| !k.protocol.is_empty()).count(),
        }
    }
}

pub fn kit_stats<S: KitStore>(store: &S) -> Result<KitStats, StoreError> {
    Ok(KitStats::from_kits(&store.load_kits()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kitsync_core::{KitId, ProtocolSteps};

    fn kit(category: Category, image: bool, day: &[&str]) -> PersistedKit {
        PersistedKit {
            id: KitId::from("id"),
            category,
            name: "Kit".to_string(),
            tips: vec![],
            protocol: ProtocolSteps {
                day: day.iter().map(|s| s.to_string()).collect(),
                night: vec![],
            },
            image_link: image.then(|| "https://img".to_string()),
            weight: 1,
            items: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn counts_by_category_and_features() {
        let stats = KitStats::from_kits(&[
            kit(Category::Casa, true, &["Step"]),
            kit(Category::Casa, false, &[]),
        ]);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_category[&Category::Casa], 2);
        assert_eq!(stats.by_category[&Category::Cabina], 0);
        assert_eq!(stats.with_images, 1);
        assert_eq!(stats.with_protocols, 1);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalKits"], 2);
        assert_eq!(json["byCategory"]["CASA"], 2);
    }
}
