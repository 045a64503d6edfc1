//! Configuration schema and validation for the connector acceptance test harness.
//!
//! This crate owns the acceptance test config schema, its cross-field
//! validation rules, and the legacy-to-current document migration. The test
//! runner consumes the validated [`Config`] it produces.

mod error;
mod fields;
mod loader;
mod model;

/// Public error types returned by config loading and validation APIs.
pub use error::{ConfigError, FieldError, ValidationErrors};
/// Semantic-version grammar shared by version-valued fields.
pub use fields::is_semver;
/// Options controlling legacy document acceptance.
pub use loader::LoadOptions;
/// Configuration schema models.
pub use model::*;
