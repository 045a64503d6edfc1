//! Construction pipeline for acceptance test configurations.
//!
//! A raw document goes through two explicit phases: legacy-format
//! normalization, then a closed-schema walk that reports every violation at
//! once. Only a document that survives both is decoded into the typed model.

mod migration;
mod schema;


use crate::error::ValidationErrors;
use crate::{Config, ConfigError};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Options controlling how a raw document is accepted.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Rewrite legacy flat `tests` documents into the current shape instead
    /// of rejecting them during schema validation.
    pub allow_legacy_config: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            allow_legacy_config: true,
        }
    }
}

impl Config {
    /// Load a config from a YAML or JSON file on disk.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!(
            "loading acceptance test config from path: {}",
            path.as_ref().display()
        );
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a config from YAML or JSON contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!(
            "loading acceptance test config from raw contents (len={})",
            contents.len()
        );
        let value: Value = serde_yaml::from_str(contents)?;
        Self::from_value(value)
    }

    /// Validate a raw document with the default options.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        Self::from_value_with_options(value, &LoadOptions::default())
    }

    /// Validate a raw document, normalizing legacy documents when allowed.
    pub fn from_value_with_options(
        value: Value,
        options: &LoadOptions,
    ) -> Result<Self, ConfigError> {
        let (mut normalized, migrated) = migration::normalize(value, options.allow_legacy_config)?;
        if migrated {
            debug!("legacy document rewritten to the current shape");
        }
        drop_null_entries(&mut normalized);
        let errors = schema::validate_document(&normalized);
        if !errors.is_empty() {
            return Err(ConfigError::Validation(ValidationErrors(errors)));
        }
        let config: Config = serde_json::from_value(normalized)?;
        Ok(config)
    }
}

/// Treat mapping keys explicitly set to null as absent, so declared defaults
/// apply to them. Array elements are left alone and fail schema validation.
fn drop_null_entries(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, entry| !entry.is_null());
            for entry in map.values_mut() {
                drop_null_entries(entry);
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                drop_null_entries(entry);
            }
        }
        _ => {}
    }
}
