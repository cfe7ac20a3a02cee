//! Engine configuration
//!
//! Values come from a TOML document, then `FOLIO_*` environment variables
//! (optionally seeded from a `.env` file) override them:
//!
//! ```toml
//! database_path = "folio.db"
//! asset_root = "assets"
//! log_profile = "production"
//!
//! [cache]
//! page_routes = 1000
//! custom_entity_routes = 100
//! image_assets = 500
//! ```
//!
//! A cache capacity of zero disables that cache.

use std::path::{Path, PathBuf};

use folio_core::errors::{ExError, ExErrorKind};
use folio_core::logging_facility::{self, Profile};
use folio_store::errors::Result;
use serde::Deserialize;

pub const ENV_DATABASE_PATH: &str = "FOLIO_DATABASE_PATH";
pub const ENV_ASSET_ROOT: &str = "FOLIO_ASSET_ROOT";
pub const ENV_LOG_PROFILE: &str = "FOLIO_LOG_PROFILE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub page_routes: usize,
    pub custom_entity_routes: usize,
    pub image_assets: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            page_routes: 1000,
            custom_entity_routes: 100,
            image_assets: 500,
        }
    }
}

impl CacheConfig {
    /// Every cache passes reads straight through
    pub fn disabled() -> Self {
        Self {
            page_routes: 0,
            custom_entity_routes: 0,
            image_assets: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub database_path: PathBuf,
    pub asset_root: PathBuf,
    pub log_profile: Profile,
    pub cache: CacheConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("folio.db"),
            asset_root: PathBuf::from("assets"),
            log_profile: Profile::default(),
            cache: CacheConfig::default(),
        }
    }
}

fn config_error(message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Configuration).with_message(message)
}

impl EngineConfig {
    /// Parse a TOML document; omitted keys keep their defaults
    ///
    /// # Errors
    /// `Configuration` when the document is malformed or has unknown keys.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("invalid config: {}", e)))
    }

    /// Read a TOML file, then apply environment overrides
    ///
    /// # Errors
    /// `Configuration` when the file cannot be read or parsed, or an
    /// override holds an invalid value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!("cannot read config {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Defaults plus environment, after loading `.env` when one exists
    ///
    /// # Errors
    /// `Configuration` when an override holds an invalid value.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from `lookup`, which maps a variable name to its value
    ///
    /// # Errors
    /// `Configuration` when the log profile is not recognised.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|v| !v.is_empty()) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(root) = lookup(ENV_ASSET_ROOT).filter(|v| !v.is_empty()) {
            self.asset_root = PathBuf::from(root);
        }
        if let Some(profile) = lookup(ENV_LOG_PROFILE).filter(|v| !v.is_empty()) {
            self.log_profile = profile
                .parse()
                .map_err(|e: String| config_error(e).with_property(ENV_LOG_PROFILE))?;
        }
        Ok(())
    }

    /// Install the global subscriber for the configured profile
    pub fn init_logging(&self) {
        logging_facility::init(self.log_profile);
    }
}
