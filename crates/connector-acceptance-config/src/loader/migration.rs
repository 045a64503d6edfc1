//! Legacy flat `tests` document migration.

use crate::{Config, ConfigError};
use log::warn;
use serde_json::{Map, Value};

/// Top-level key carrying the legacy flat test lists.
pub(super) const LEGACY_TESTS_KEY: &str = "tests";
/// Top-level key carrying the current per-category wrappers.
pub(super) const ACCEPTANCE_TESTS_KEY: &str = "acceptance_tests";

impl Config {
    /// Check whether a raw document uses the legacy flat `tests` shape.
    pub fn is_legacy(document: &Value) -> bool {
        document
            .as_object()
            .is_some_and(|map| map.contains_key(LEGACY_TESTS_KEY))
    }

    /// Rewrite a legacy document into the current nested shape.
    ///
    /// Pure structural transform: `tests.<category>: [..]` becomes
    /// `acceptance_tests.<category>.tests: [..]`, every other top-level key
    /// is carried over unchanged, and field contents are not validated. Only
    /// meaningful for documents where [`Config::is_legacy`] holds.
    pub fn migrate_legacy_to_current(document: &Value) -> Value {
        let Some(map) = document.as_object() else {
            return document.clone();
        };
        let mut migrated = Map::new();
        for (key, value) in map {
            if key == LEGACY_TESTS_KEY {
                migrated.insert(ACCEPTANCE_TESTS_KEY.to_string(), wrap_legacy_tests(value));
            } else {
                migrated.insert(key.clone(), value.clone());
            }
        }
        Value::Object(migrated)
    }
}

/// Wrap each legacy category list as `{ "tests": <list> }`.
///
/// A non-mapping payload is moved untouched so the schema walk reports it at
/// `acceptance_tests` instead of this transform guessing at intent.
fn wrap_legacy_tests(value: &Value) -> Value {
    let Some(categories) = value.as_object() else {
        return value.clone();
    };
    let mut wrapped = Map::new();
    for (category, tests) in categories {
        let mut entry = Map::new();
        entry.insert(LEGACY_TESTS_KEY.to_string(), tests.clone());
        wrapped.insert(category.clone(), Value::Object(entry));
    }
    Value::Object(wrapped)
}

/// Apply legacy detection and migration ahead of schema validation.
///
/// Returns the document to validate plus whether a migration happened. When
/// the toggle is off, legacy documents pass through unchanged and fail the
/// schema walk on the unknown `tests` key.
pub(super) fn normalize(
    document: Value,
    allow_legacy_config: bool,
) -> Result<(Value, bool), ConfigError> {
    if !allow_legacy_config || !Config::is_legacy(&document) {
        return Ok((document, false));
    }
    let has_current_key = document
        .as_object()
        .is_some_and(|map| map.contains_key(ACCEPTANCE_TESTS_KEY));
    if has_current_key {
        return Err(ConfigError::Invalid(format!(
            "document mixes the legacy `{LEGACY_TESTS_KEY}` section with \
             `{ACCEPTANCE_TESTS_KEY}`; remove one of the two"
        )));
    }
    warn!("the acceptance test config is in a legacy format; please migrate to the latest format");
    Ok((Config::migrate_legacy_to_current(&document), true))
}
