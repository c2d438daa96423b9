//! Domain types for kit extraction and synchronization.
//!
//! [`KitRecord`] is the stateless output of a sheet extraction run;
//! [`PersistedKit`] is the same kit after the store has assigned it an
//! identity. Both serialize with camelCase field names.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque durable identity of a persisted kit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KitId(pub String);

impl fmt::Display for KitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for KitId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for KitId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque durable identity of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Where a kit is applied: at home or in the treatment cabin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "CASA")]
    Casa,
    #[serde(rename = "CABINA")]
    Cabina,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Casa, Category::Cabina];

    /// Sheet token for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Casa => "CASA",
            Category::Cabina => "CABINA",
        }
    }

    /// Exact (already trimmed) token match; anything else is not a category.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "CASA" => Some(Category::Casa),
            "CABINA" => Some(Category::Cabina),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Extraction output
// ---------------------------------------------------------------------------

/// A product referenced by code from a kit, with the quantity to include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub code: String,
    pub quantity: u32,
}

impl ProductRef {
    pub fn new(code: impl Into<String>, quantity: u32) -> Self {
        Self {
            code: code.into(),
            quantity,
        }
    }
}

/// Day and night application steps. Either list may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProtocolSteps {
    #[serde(rename = "dia", default)]
    pub day: Vec<String>,
    #[serde(rename = "noche", default)]
    pub night: Vec<String>,
}

impl ProtocolSteps {
    pub fn is_empty(&self) -> bool {
        self.day.is_empty() && self.night.is_empty()
    }
}

/// A kit as extracted from one sheet block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitRecord {
    pub category: Category,
    pub name: String,
    #[serde(default)]
    pub products: Vec<ProductRef>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub protocol: ProtocolSteps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
    /// Dense 1-based position in the extracted sequence.
    pub weight: u32,
}

impl KitRecord {
    pub fn summary(&self) -> KitSummary {
        KitSummary {
            category: self.category,
            name: self.name.clone(),
            products_count: self.products.len(),
            tips_count: self.tips.len(),
            has_protocol: !self.protocol.is_empty(),
            has_image: self.image_link.is_some(),
        }
    }
}

/// Short audit view of an extracted kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KitSummary {
    pub category: Category,
    pub name: String,
    pub products_count: usize,
    pub tips_count: usize,
    pub has_protocol: bool,
    pub has_image: bool,
}

// ---------------------------------------------------------------------------
// Persisted state
// ---------------------------------------------------------------------------

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    pub name: String,
}

/// A persisted product-quantity association owned by a kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitItem {
    pub product: Product,
    pub quantity: u32,
}

/// A kit as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedKit {
    pub id: KitId,
    pub category: Category,
    pub name: String,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub protocol: ProtocolSteps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_link: Option<String>,
    pub weight: u32,
    #[serde(default)]
    pub items: Vec<KitItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
