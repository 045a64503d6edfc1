//! Shared field primitives reused across test categories.
//!
//! Every category embeds the same path defaults and version grammar so that
//! hand-written configs behave identically regardless of which section a
//! field appears in.

use regex::Regex;
use std::sync::OnceLock;

/// Version grammar accepted by connector version fields:
/// `major[.minor[.patch[-prerelease]]]`, numeric parts without leading zeros.
const SEMVER_PATTERN: &str =
    r"^(0|[1-9]\d*)(?:\.(0|[1-9]\d*)(?:\.(0|[1-9]\d*))?(?:-[\w][\w.\-_]*)?)?$";

/// Literal accepted by `previous_connector_version` in place of a concrete
/// version, meaning "the most recently published connector".
pub(crate) const LATEST_VERSION: &str = "latest";

fn semver_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SEMVER_PATTERN).expect("semver pattern"))
}

/// Check a version string against the semantic-version grammar.
pub fn is_semver(value: &str) -> bool {
    semver_regex().is_match(value)
}

/// Default location of the connector config used by every category.
pub(crate) fn default_config_path() -> String {
    "secrets/config.json".to_string()
}

/// Default location of the expected connector spec.
pub(crate) fn default_spec_path() -> String {
    "secrets/spec.json".to_string()
}

/// Default previous connector version for backward compatibility tests.
pub(crate) fn default_previous_connector_version() -> String {
    LATEST_VERSION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accept the documented grammar at every arity.
    #[test]
    fn semver_grammar_accepts_valid_versions() {
        for version in ["0", "10", "0.1", "1.2", "1.2.3", "1.2.3-rc1", "1.2-beta.0"] {
            assert!(is_semver(version), "expected {version} to be accepted");
        }
    }

    /// Reject prefixes, leading zeros, and free-form strings.
    #[test]
    fn semver_grammar_rejects_invalid_versions() {
        for version in ["v1.2", "1.02", "01", "1.2.3.4", "latest", "", "1.2.3 "] {
            assert!(!is_semver(version), "expected {version} to be rejected");
        }
    }
}
