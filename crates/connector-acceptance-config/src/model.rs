//! Configuration schema for the connector acceptance test harness.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Root acceptance test configuration for one connector.
///
/// Built once from a raw document via the loader entry points and immutable
/// afterwards; an invalid document never produces a partially-valid value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Docker image under test, for example `airbyte/source-hubspot:dev`.
    pub connector_image: String,
    /// Per-category test configuration.
    pub acceptance_tests: AcceptanceTestConfigurations,
    /// Base path for resolving relative paths declared elsewhere.
    #[serde(default)]
    pub base_path: Option<String>,
    /// Strictness policy consumed by the test runner to decide which
    /// categories are mandatory.
    #[serde(default)]
    pub test_strictness_level: TestStrictnessLevel,
}

/// Strictness level of the test suite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestStrictnessLevel {
    High,
    #[default]
    Low,
}

/// One optional wrapper per test category.
///
/// An absent category is not configured at all, which is distinct from a
/// category that is present but bypassed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AcceptanceTestConfigurations {
    #[serde(default)]
    pub spec: Option<TestConfig<SpecTestConfig>>,
    #[serde(default)]
    pub connection: Option<TestConfig<ConnectionTestConfig>>,
    #[serde(default)]
    pub discovery: Option<TestConfig<DiscoveryTestConfig>>,
    #[serde(default)]
    pub basic_read: Option<TestConfig<BasicReadTestConfig>>,
    #[serde(default)]
    pub full_refresh: Option<TestConfig<FullRefreshConfig>>,
    #[serde(default)]
    pub incremental: Option<TestConfig<IncrementalConfig>>,
}

/// Wrapper holding either a bypass justification or the enumerated tests for
/// one category, never both at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct TestConfig<T> {
    /// Operator justification for skipping the category.
    #[serde(default)]
    pub bypass_reason: Option<String>,
    /// Enumerated per-category test configurations.
    #[serde(default)]
    pub tests: Option<Vec<T>>,
}

impl<T> Default for TestConfig<T> {
    fn default() -> Self {
        Self {
            bypass_reason: None,
            tests: None,
        }
    }
}

/// Backward compatibility test settings shared by spec and discovery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackwardCompatibilityTestsConfig {
    /// Previous connector version to compare against, `latest` or a semver.
    #[serde(default = "crate::fields::default_previous_connector_version")]
    pub previous_connector_version: String,
    /// Disable backward compatibility tests for a specific connector version.
    #[serde(default)]
    pub disable_for_version: Option<String>,
}

impl Default for BackwardCompatibilityTestsConfig {
    fn default() -> Self {
        Self {
            previous_connector_version: crate::fields::default_previous_connector_version(),
            disable_for_version: None,
        }
    }
}

/// Settings for one spec test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecTestConfig {
    /// Path to the JSON spec expected to be output by the connector.
    #[serde(default = "crate::fields::default_spec_path")]
    pub spec_path: String,
    /// Path to a valid connector configuration.
    #[serde(default = "crate::fields::default_config_path")]
    pub config_path: String,
    /// Test execution timeout in seconds; unset means the harness default.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub backward_compatibility_tests_config: BackwardCompatibilityTestsConfig,
}

/// Expected outcome of a connection check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Succeed,
    Failed,
    Exception,
}

/// Settings for one connection test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionTestConfig {
    #[serde(default = "crate::fields::default_config_path")]
    pub config_path: String,
    /// Whether the connection check should succeed with the provided config.
    #[serde(default)]
    pub status: ConnectionStatus,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

/// Settings for one discovery test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryTestConfig {
    #[serde(default = "crate::fields::default_config_path")]
    pub config_path: String,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub backward_compatibility_tests_config: BackwardCompatibilityTestsConfig,
}

/// Comparison policy for records read during basic read tests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpectedRecordsConfig {
    /// File with the expected records.
    pub path: PathBuf,
    /// Allow actual records to carry fields beyond the expected schema.
    #[serde(default)]
    pub extra_fields: bool,
    /// Require records in the exact declared order.
    #[serde(default)]
    pub exact_order: bool,
    /// Allow extra records beyond those declared as expected.
    #[serde(default = "default_extra_records")]
    pub extra_records: bool,
}

fn default_extra_records() -> bool {
    true
}

/// Settings for one basic read test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicReadTestConfig {
    #[serde(default = "crate::fields::default_config_path")]
    pub config_path: String,
    #[serde(default)]
    pub configured_catalog_path: Option<String>,
    /// Streams exempt from the every-stream-has-records check.
    #[serde(default)]
    pub empty_streams: BTreeSet<String>,
    /// Expected records from the read.
    #[serde(default)]
    pub expect_records: Option<ExpectedRecordsConfig>,
    /// Ensure records match the schema of the corresponding stream.
    #[serde(default = "default_validate_schema")]
    pub validate_schema: bool,
    /// Require every field in every stream to contain at least one data point.
    #[serde(default)]
    pub validate_data_points: bool,
    /// Ensure a trace message is emitted when the connector crashes.
    #[serde(default = "default_expect_trace_message_on_failure")]
    pub expect_trace_message_on_failure: bool,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

fn default_validate_schema() -> bool {
    true
}

fn default_expect_trace_message_on_failure() -> bool {
    true
}

/// Settings for one full refresh test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullRefreshConfig {
    #[serde(default = "crate::fields::default_config_path")]
    pub config_path: String,
    #[serde(default)]
    pub configured_catalog_path: Option<String>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Per stream, field paths ignored in the sequential reads comparison.
    #[serde(default)]
    pub ignored_fields: Option<BTreeMap<String, Vec<String>>>,
}

/// Settings for one incremental sync test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalConfig {
    #[serde(default = "crate::fields::default_config_path")]
    pub config_path: String,
    #[serde(default)]
    pub configured_catalog_path: Option<String>,
    /// Per stream, the path of its cursor field in output state messages.
    #[serde(default)]
    pub cursor_paths: Option<BTreeMap<String, Vec<String>>>,
    /// Path to a state file with cursor values in the far future.
    #[serde(default)]
    pub future_state_path: Option<String>,
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Allow records with a cursor value this many days before the state cursor.
    #[serde(default)]
    pub threshold_days: u64,
    /// Skip the more granular incremental sync checks.
    #[serde(default)]
    pub skip_comprehensive_incremental_tests: bool,
}
