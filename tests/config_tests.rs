//! Loading resolver settings from disk

use std::io::Write;

use endpoint_resolver::{ConfigError, ResolverSettings};
use tempfile::NamedTempFile;

fn write_settings(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_settings_file() {
    let file = write_settings(
        r#"{
            "matcher": {
                "similarity_threshold": 0.75,
                "base_url_weight": 1.0,
                "params_weight": 1.0
            },
            "volatile_key_patterns": ["(?i)^x-request-id$", "(?i)session"]
        }"#,
    );

    let settings = ResolverSettings::load_from_file(file.path()).unwrap();
    let resolver = settings.build_resolver().unwrap();

    assert!((resolver.config().similarity_threshold - 0.75).abs() < f64::EPSILON);
    assert!((resolver.config().base_url_weight - 0.5).abs() < 1e-9);
    assert!(resolver.rules().is_volatile("X-Request-Id"));
    assert!(!resolver.rules().is_volatile("utm_source"));
}

#[test]
fn test_custom_rules_change_resolution() {
    let file = write_settings(r#"{"volatile_key_patterns": ["^cb$"]}"#);
    let resolver = ResolverSettings::load_from_file(file.path())
        .unwrap()
        .build_resolver()
        .unwrap();

    let result = resolver.score(
        "https://a.example/x?id=1&cb=111",
        "https://a.example/x?id=1&cb=999",
    );
    assert!((result.detail.value_match - 1.0).abs() < 1e-9);
    assert!(result.is_match);

    // `sessionId` is no longer volatile, so differing values count against the match
    let result = resolver.score(
        "https://a.example/x?sessionId=1",
        "https://a.example/x?sessionId=2",
    );
    assert!(result.detail.value_match.abs() < 1e-9);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ResolverSettings::load_from_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError(_)));
}

#[test]
fn test_malformed_file() {
    let file = write_settings("{ \"matcher\": ");
    let err = ResolverSettings::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
    assert!(err.to_string().starts_with("Failed to parse settings"));
}

#[test]
fn test_invalid_pattern_in_file() {
    let file = write_settings(r#"{"volatile_key_patterns": ["(?i)session", "*bad"]}"#);
    let settings = ResolverSettings::load_from_file(file.path()).unwrap();
    let err = settings.build_resolver().unwrap_err();
    assert!(matches!(err, ConfigError::RuleError(_)));
}

#[test]
fn test_saved_settings_reload() {
    let mut settings = ResolverSettings::default();
    settings.matcher.similarity_threshold = 0.8;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resolver.json");
    std::fs::write(&path, settings.to_json().unwrap()).unwrap();

    let reloaded = ResolverSettings::load_from_file(&path).unwrap();
    assert_eq!(reloaded, settings);
}
