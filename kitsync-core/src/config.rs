//! Sheet layout and application configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.kitsync/
//!   config.yaml   (mode 0600, written by `init`)
//!   kits.db       (default database location)
//! ```
//!
//! # API pattern
//!
//! Every filesystem function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Category;

pub const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_DATABASE: &str = "kits.db";

// ---------------------------------------------------------------------------
// 1. Sheet layout
// ---------------------------------------------------------------------------

/// Zero-based tab-field positions of each column role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub category: usize,
    pub name: usize,
    pub product_code: usize,
    pub product_quantity: usize,
    pub tip: usize,
    pub protocol: usize,
    pub image_link: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            category: 0,
            name: 1,
            product_code: 2,
            product_quantity: 3,
            tip: 5,
            protocol: 6,
            image_link: 7,
        }
    }
}

/// Column positions and marker tokens the extractor reads a sheet with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    pub columns: ColumnLayout,
    /// A first line containing every one of these tokens is a header.
    pub header_tokens: Vec<String>,
    /// Code-cell values that label the product table instead of naming a product.
    pub product_header_tokens: Vec<String>,
    pub tip_header_token: String,
    pub day_markers: Vec<String>,
    pub night_markers: Vec<String>,
    /// A protocol cell must contain this to be parsed as steps.
    pub protocol_trigger: String,
    pub image_prefix: String,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            columns: ColumnLayout::default(),
            header_tokens: strings(&["TIPO", "NOMBRE"]),
            product_header_tokens: strings(&["CODIGO", "PRODUCTOS"]),
            tip_header_token: "TIPS".to_string(),
            day_markers: strings(&["DÍA", "DIA"]),
            night_markers: strings(&["NOCHE"]),
            protocol_trigger: "1.".to_string(),
            image_prefix: "http".to_string(),
        }
    }
}

impl SheetLayout {
    /// Reject layouts where two roles share a column, a marker list is
    /// empty, or the protocol trigger is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.columns;
        let roles = [
            ("category", c.category),
            ("name", c.name),
            ("product_code", c.product_code),
            ("product_quantity", c.product_quantity),
            ("tip", c.tip),
            ("protocol", c.protocol),
            ("image_link", c.image_link),
        ];
        let mut seen = HashSet::new();
        for (role, idx) in roles {
            if !seen.insert(idx) {
                return Err(ConfigError::InvalidLayout(format!(
                    "column {idx} assigned twice (at '{role}')"
                )));
            }
        }
        if self.day_markers.is_empty() || self.night_markers.is_empty() {
            return Err(ConfigError::InvalidLayout(
                "day and night marker lists must not be empty".to_string(),
            ));
        }
        if self.protocol_trigger.is_empty() {
            return Err(ConfigError::InvalidLayout(
                "protocol_trigger must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn strings(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| (*t).to_string()).collect()
}

// ---------------------------------------------------------------------------
// 2. Natural key and sync options
// ---------------------------------------------------------------------------

/// Business identity used to match incoming kits against persisted ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NaturalKey {
    /// Case-sensitive exact name.
    #[default]
    Name,
    /// Case-sensitive exact name within a category.
    NameAndCategory,
}

impl NaturalKey {
    pub fn key_of(&self, category: Category, name: &str) -> KitKey {
        KitKey {
            name: name.to_string(),
            category: match self {
                NaturalKey::Name => None,
                NaturalKey::NameAndCategory => Some(category),
            },
        }
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NaturalKey::Name => write!(f, "name"),
            NaturalKey::NameAndCategory => write!(f, "name-and-category"),
        }
    }
}

/// A natural key value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KitKey {
    pub name: String,
    pub category: Option<Category>,
}

impl fmt::Display for KitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            Some(category) => write!(f, "{} ({category})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// How a sync plan is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    pub key: NaturalKey,
    /// Delete persisted kits absent from the sheet. `false` is upsert-only.
    pub prune: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            key: NaturalKey::Name,
            prune: true,
        }
    }
}

impl SyncOptions {
    /// Upsert-only planning keyed by name and category.
    pub fn upsert() -> Self {
        Self {
            key: NaturalKey::NameAndCategory,
            prune: false,
        }
    }
}

// ---------------------------------------------------------------------------
// 3. Application config
// ---------------------------------------------------------------------------

/// Root of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: u32,
    /// Relative paths resolve against `<home>/.kitsync/`.
    pub database: PathBuf,
    pub layout: SheetLayout,
    pub sync: SyncOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            database: PathBuf::from(DEFAULT_DATABASE),
            layout: SheetLayout::default(),
            sync: SyncOptions::default(),
        }
    }
}

impl AppConfig {
    /// Absolute database path for this config under `home`.
    pub fn database_path_at(&self, home: &Path) -> PathBuf {
        if self.database.is_absolute() {
            self.database.clone()
        } else {
            config_dir_at(home).join(&self.database)
        }
    }
}

// ---------------------------------------------------------------------------
// 4. Paths
// ---------------------------------------------------------------------------

/// `<home>/.kitsync/` (pure, no I/O).
pub fn config_dir_at(home: &Path) -> PathBuf {
    home.join(".kitsync")
}

/// `<home>/.kitsync/config.yaml` (pure, no I/O).
pub fn config_path_at(home: &Path) -> PathBuf {
    config_dir_at(home).join("config.yaml")
}

// ---------------------------------------------------------------------------
// 5. Load / save / init
// ---------------------------------------------------------------------------

/// Load `config.yaml`, falling back to defaults when the file is absent.
///
/// Returns `ConfigError::Parse` (with path) for malformed YAML and
/// `ConfigError::InvalidLayout` for a layout that fails validation.
pub fn load_at(home: &Path) -> Result<AppConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    let config: AppConfig =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?;
    config.layout.validate()?;
    Ok(config)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<AppConfig, ConfigError> {
    load_at(&home()?)
}

/// Atomically save `config.yaml`.
///
/// Write flow: serialize → `config.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    config.layout.validate()?;
    let dir = config_dir_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    let path = config_path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &AppConfig) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

/// Write a default `config.yaml` under `home`.
///
/// Idempotent: if the file already exists, loads and returns it unchanged.
pub fn init_at(home: &Path) -> Result<AppConfig, ConfigError> {
    if config_path_at(home).exists() {
        return load_at(home);
    }
    let config = AppConfig::default();
    save_at(home, &config)?;
    Ok(config)
}

/// `init_at` convenience wrapper.
pub fn init() -> Result<AppConfig, ConfigError> {
    init_at(&home()?)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// The user's home directory.
pub fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_valid() {
        SheetLayout::default().validate().expect("valid");
    }

    #[test]
    fn overlapping_columns_rejected() {
        let mut layout = SheetLayout::default();
        layout.columns.tip = layout.columns.protocol;
        let err = layout.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLayout(_)), "got: {err}");
    }

    #[test]
    fn natural_key_modes() {
        let by_name = NaturalKey::Name.key_of(Category::Casa, "Kit A");
        let by_both = NaturalKey::NameAndCategory.key_of(Category::Casa, "Kit A");
        assert_eq!(by_name.category, None);
        assert_eq!(by_both.category, Some(Category::Casa));
        assert_eq!(by_both.to_string(), "Kit A (CASA)");
        assert_ne!(
            NaturalKey::NameAndCategory.key_of(Category::Cabina, "Kit A"),
            by_both
        );
    }

    #[test]
    fn relative_database_resolves_under_config_dir() {
        let home = Path::new("/home/someone");
        let cfg = AppConfig::default();
        assert_eq!(
            cfg.database_path_at(home),
            PathBuf::from("/home/someone/.kitsync/kits.db")
        );
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: AppConfig = serde_yaml::from_str("sync:\n  key: name-and-category\n").unwrap();
        assert_eq!(cfg.sync.key, NaturalKey::NameAndCategory);
        assert!(cfg.sync.prune);
        assert_eq!(cfg.layout, SheetLayout::default());
    }
}
