//! Closed-schema validation for acceptance test config documents.
//!
//! Walks the raw JSON value once and records every violation into an
//! [`ErrorSink`], so an invalid document yields one comprehensive report
//! instead of stopping at the first offending field.

use crate::error::FieldError;
use crate::fields::{LATEST_VERSION, is_semver};
use serde_json::{Map, Value};

/// Collector for field violations found during one pass.
#[derive(Debug, Default)]
struct ErrorSink {
    errors: Vec<FieldError>,
}

impl ErrorSink {
    fn record(&mut self, path: &str, message: &str) {
        let path = if path.is_empty() { "root" } else { path };
        self.errors.push(FieldError {
            path: path.to_string(),
            message: message.to_string(),
        });
    }
}

/// Validate a full document against the current schema.
pub(super) fn validate_document(value: &Value) -> Vec<FieldError> {
    let mut sink = ErrorSink::default();
    let Some(map) = expect_object(value, "", &mut sink) else {
        return sink.errors;
    };
    let allowed = [
        "connector_image",
        "acceptance_tests",
        "base_path",
        "test_strictness_level",
    ];
    ensure_allowed_keys(map, &allowed, "", &mut sink);

    match map.get("connector_image") {
        Some(value) => expect_string(value, "connector_image", &mut sink),
        None => sink.record("connector_image", "missing required field"),
    }
    if let Some(value) = map.get("base_path") {
        expect_string(value, "base_path", &mut sink);
    }
    if let Some(value) = map.get("test_strictness_level") {
        validate_strictness_level(value, "test_strictness_level", &mut sink);
    }
    match map.get("acceptance_tests") {
        Some(value) => validate_acceptance_tests(value, "acceptance_tests", &mut sink),
        None => sink.record("acceptance_tests", "missing required field"),
    }

    sink.errors
}

/// Validate strictness level values.
fn validate_strictness_level(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(level) = value.as_str() else {
        sink.record(path, "expected string");
        return;
    };
    if !matches!(level, "high" | "low") {
        sink.record(path, "invalid strictness level");
    }
}

/// Validate the per-category wrapper mapping.
fn validate_acceptance_tests(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(map) = expect_object(value, path, sink) else {
        return;
    };
    let categories: [(&str, fn(&Value, &str, &mut ErrorSink)); 6] = [
        ("spec", validate_spec_test),
        ("connection", validate_connection_test),
        ("discovery", validate_discovery_test),
        ("basic_read", validate_basic_read_test),
        ("full_refresh", validate_full_refresh_test),
        ("incremental", validate_incremental_test),
    ];
    let allowed = categories.map(|(name, _)| name);
    ensure_allowed_keys(map, &allowed, path, sink);
    for (name, validate_entry) in categories {
        if let Some(value) = map.get(name) {
            validate_test_wrapper(value, &join_path(path, name), validate_entry, sink);
        }
    }
}

/// Validate one category wrapper: bypass reason, enumerated tests, and their
/// mutual exclusion. Entry errors are recorded before the exclusivity check.
fn validate_test_wrapper(
    value: &Value,
    path: &str,
    validate_entry: fn(&Value, &str, &mut ErrorSink),
    sink: &mut ErrorSink,
) {
    let Some(map) = expect_object(value, path, sink) else {
        return;
    };
    ensure_allowed_keys(map, &["bypass_reason", "tests"], path, sink);

    if let Some(value) = map.get("bypass_reason") {
        expect_string(value, &join_path(path, "bypass_reason"), sink);
    }
    let mut has_tests = false;
    if let Some(value) = map.get("tests") {
        let tests_path = join_path(path, "tests");
        if let Some(entries) = expect_array(value, &tests_path, sink) {
            has_tests = !entries.is_empty();
            for (idx, entry) in entries.iter().enumerate() {
                validate_entry(entry, &format!("{tests_path}[{idx}]"), sink);
            }
        }
    }
    let has_bypass = map.get("bypass_reason").and_then(Value::as_str).is_some();
    if has_tests && has_bypass {
        sink.record(
            &join_path(path, "bypass_reason"),
            "bypass_reason cannot be set when tests are enumerated",
        );
    }
}

/// Validate one spec test entry.
fn validate_spec_test(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(map) = expect_object(value, path, sink) else {
        return;
    };
    let allowed = [
        "spec_path",
        "config_path",
        "timeout_seconds",
        "backward_compatibility_tests_config",
    ];
    ensure_allowed_keys(map, &allowed, path, sink);

    for key in ["spec_path", "config_path"] {
        if let Some(value) = map.get(key) {
            expect_string(value, &join_path(path, key), sink);
        }
    }
    if let Some(value) = map.get("timeout_seconds") {
        expect_non_negative_int(value, &join_path(path, "timeout_seconds"), sink);
    }
    if let Some(value) = map.get("backward_compatibility_tests_config") {
        validate_backward_compatibility(
            value,
            &join_path(path, "backward_compatibility_tests_config"),
            sink,
        );
    }
}

/// Validate backward compatibility settings shared by spec and discovery.
fn validate_backward_compatibility(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(map) = expect_object(value, path, sink) else {
        return;
    };
    ensure_allowed_keys(
        map,
        &["previous_connector_version", "disable_for_version"],
        path,
        sink,
    );

    if let Some(value) = map.get("previous_connector_version") {
        let field_path = join_path(path, "previous_connector_version");
        match value.as_str() {
            // `latest` stands in for a concrete version here only.
            Some(version) if version == LATEST_VERSION || is_semver(version) => {}
            Some(_) => sink.record(&field_path, "expected a semantic version"),
            None => sink.record(&field_path, "expected string"),
        }
    }
    if let Some(value) = map.get("disable_for_version") {
        let field_path = join_path(path, "disable_for_version");
        match value.as_str() {
            Some(version) if is_semver(version) => {}
            Some(_) => sink.record(&field_path, "expected a semantic version"),
            None => sink.record(&field_path, "expected string"),
        }
    }
}

/// Validate one connection test entry.
fn validate_connection_test(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(map) = expect_object(value, path, sink) else {
        return;
    };
    ensure_allowed_keys(map, &["config_path", "status", "timeout_seconds"], path, sink);

    if let Some(value) = map.get("config_path") {
        expect_string(value, &join_path(path, "config_path"), sink);
    }
    if let Some(value) = map.get("status") {
        let status_path = join_path(path, "status");
        match value.as_str() {
            Some("succeed" | "failed" | "exception") => {}
            Some(_) => sink.record(&status_path, "invalid connection status"),
            None => sink.record(&status_path, "expected string"),
        }
    }
    if let Some(value) = map.get("timeout_seconds") {
        expect_non_negative_int(value, &join_path(path, "timeout_seconds"), sink);
    }
}

/// Validate one discovery test entry.
fn validate_discovery_test(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(map) = expect_object(value, path, sink) else {
        return;
    };
    let allowed = [
        "config_path",
        "timeout_seconds",
        "backward_compatibility_tests_config",
    ];
    ensure_allowed_keys(map, &allowed, path, sink);

    if let Some(value) = map.get("config_path") {
        expect_string(value, &join_path(path, "config_path"), sink);
    }
    if let Some(value) = map.get("timeout_seconds") {
        expect_non_negative_int(value, &join_path(path, "timeout_seconds"), sink);
    }
    if let Some(value) = map.get("backward_compatibility_tests_config") {
        validate_backward_compatibility(
            value,
            &join_path(path, "backward_compatibility_tests_config"),
            sink,
        );
    }
}

/// Validate one basic read test entry.
fn validate_basic_read_test(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(map) = expect_object(value, path, sink) else {
        return;
    };
    let allowed = [
        "config_path",
        "configured_catalog_path",
        "empty_streams",
        "expect_records",
        "validate_schema",
        "validate_data_points",
        "expect_trace_message_on_failure",
        "timeout_seconds",
    ];
    ensure_allowed_keys(map, &allowed, path, sink);

    for key in ["config_path", "configured_catalog_path"] {
        if let Some(value) = map.get(key) {
            expect_string(value, &join_path(path, key), sink);
        }
    }
    if let Some(value) = map.get("empty_streams") {
        validate_string_array(value, &join_path(path, "empty_streams"), sink);
    }
    if let Some(value) = map.get("expect_records") {
        validate_expected_records(value, &join_path(path, "expect_records"), sink);
    }
    for key in [
        "validate_schema",
        "validate_data_points",
        "expect_trace_message_on_failure",
    ] {
        if let Some(value) = map.get(key) {
            expect_bool(value, &join_path(path, key), sink);
        }
    }
    if let Some(value) = map.get("timeout_seconds") {
        expect_non_negative_int(value, &join_path(path, "timeout_seconds"), sink);
    }
}

/// Validate the expected records comparison policy, including its pair of
/// cross-field rules. `exact_order` is checked before `extra_records`.
fn validate_expected_records(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(map) = expect_object(value, path, sink) else {
        return;
    };
    let allowed = ["path", "extra_fields", "exact_order", "extra_records"];
    ensure_allowed_keys(map, &allowed, path, sink);

    match map.get("path") {
        Some(value) => expect_string(value, &join_path(path, "path"), sink),
        None => sink.record(&join_path(path, "path"), "missing required field"),
    }
    for key in ["extra_fields", "exact_order", "extra_records"] {
        if let Some(value) = map.get(key) {
            expect_bool(value, &join_path(path, key), sink);
        }
    }

    let flag =
        |key: &str, default: bool| map.get(key).and_then(Value::as_bool).unwrap_or(default);
    let extra_fields = flag("extra_fields", false);
    if extra_fields && !flag("exact_order", false) {
        sink.record(
            &join_path(path, "exact_order"),
            "exact_order must be on if extra_fields enabled",
        );
    }
    if extra_fields && flag("extra_records", true) {
        sink.record(
            &join_path(path, "extra_records"),
            "extra_records must be off if extra_fields enabled",
        );
    }
}

/// Validate one full refresh test entry.
fn validate_full_refresh_test(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(map) = expect_object(value, path, sink) else {
        return;
    };
    let allowed = [
        "config_path",
        "configured_catalog_path",
        "timeout_seconds",
        "ignored_fields",
    ];
    ensure_allowed_keys(map, &allowed, path, sink);

    for key in ["config_path", "configured_catalog_path"] {
        if let Some(value) = map.get(key) {
            expect_string(value, &join_path(path, key), sink);
        }
    }
    if let Some(value) = map.get("timeout_seconds") {
        expect_non_negative_int(value, &join_path(path, "timeout_seconds"), sink);
    }
    if let Some(value) = map.get("ignored_fields") {
        validate_stream_field_paths(value, &join_path(path, "ignored_fields"), sink);
    }
}

/// Validate one incremental test entry.
fn validate_incremental_test(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(map) = expect_object(value, path, sink) else {
        return;
    };
    let allowed = [
        "config_path",
        "configured_catalog_path",
        "cursor_paths",
        "future_state_path",
        "timeout_seconds",
        "threshold_days",
        "skip_comprehensive_incremental_tests",
    ];
    ensure_allowed_keys(map, &allowed, path, sink);

    for key in ["config_path", "configured_catalog_path", "future_state_path"] {
        if let Some(value) = map.get(key) {
            expect_string(value, &join_path(path, key), sink);
        }
    }
    if let Some(value) = map.get("cursor_paths") {
        validate_stream_field_paths(value, &join_path(path, "cursor_paths"), sink);
    }
    for key in ["timeout_seconds", "threshold_days"] {
        if let Some(value) = map.get(key) {
            expect_non_negative_int(value, &join_path(path, key), sink);
        }
    }
    if let Some(value) = map.get("skip_comprehensive_incremental_tests") {
        expect_bool(
            value,
            &join_path(path, "skip_comprehensive_incremental_tests"),
            sink,
        );
    }
}

/// Validate a mapping of stream name to a list of field path components.
fn validate_stream_field_paths(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(map) = expect_object(value, path, sink) else {
        return;
    };
    for (stream, paths) in map {
        validate_string_array(paths, &join_path(path, stream), sink);
    }
}

/// Record a violation unless the value is an array of strings.
fn validate_string_array(value: &Value, path: &str, sink: &mut ErrorSink) {
    let Some(entries) = expect_array(value, path, sink) else {
        return;
    };
    for (idx, entry) in entries.iter().enumerate() {
        if entry.as_str().is_none() {
            sink.record(&format!("{path}[{idx}]"), "expected string");
        }
    }
}

/// Expect a JSON object, recording a violation otherwise.
fn expect_object<'a>(
    value: &'a Value,
    path: &str,
    sink: &mut ErrorSink,
) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        _ => {
            sink.record(path, "expected object");
            None
        }
    }
}

/// Expect a JSON array, recording a violation otherwise.
fn expect_array<'a>(value: &'a Value, path: &str, sink: &mut ErrorSink) -> Option<&'a Vec<Value>> {
    match value {
        Value::Array(entries) => Some(entries),
        _ => {
            sink.record(path, "expected array");
            None
        }
    }
}

/// Expect a JSON string, recording a violation otherwise.
fn expect_string(value: &Value, path: &str, sink: &mut ErrorSink) {
    if value.as_str().is_none() {
        sink.record(path, "expected string");
    }
}

/// Expect a JSON boolean, recording a violation otherwise.
fn expect_bool(value: &Value, path: &str, sink: &mut ErrorSink) {
    if !matches!(value, Value::Bool(_)) {
        sink.record(path, "expected bool");
    }
}

/// Expect a non-negative JSON integer, recording a violation otherwise.
fn expect_non_negative_int(value: &Value, path: &str, sink: &mut ErrorSink) {
    if !value.is_u64() {
        sink.record(path, "expected non-negative integer");
    }
}

/// Record a violation for every key outside the allow-list.
fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
    sink: &mut ErrorSink,
) {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            sink.record(&join_path(path, key), "unknown key");
        }
    }
}

/// Join nested paths for error messages.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
