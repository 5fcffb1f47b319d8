/*!
 * Tests for configuration loading, saving and validation
 */

use anyhow::Result;
use std::time::Duration;
use tempfile::TempDir;

use doctrans::app_config::{Config, LogLevel};
use doctrans::translation::{ChunkLimits, RedistributionPolicy, UnitKind};

#[test]
fn test_save_and_load_withTempFile_shouldRoundTrip() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("doctrans.json");

    let mut config = Config::default();
    config.target_language = "fr".to_string();
    config.translation.unit = UnitKind::Paragraph;
    config.translation.redistribution = RedistributionPolicy::Proportional;
    config.log_level = LogLevel::Debug;
    config.save_to_file(&path)?;

    let loaded = Config::from_file(&path)?;

    assert_eq!(loaded, config);
    Ok(())
}

#[test]
fn test_from_file_withPartialJson_shouldApplyDefaults() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("partial.json");
    std::fs::write(
        &path,
        r#"{ "target_language": "de", "chunking": { "max_units_per_chunk": 10 }, "translation": { "unit": "paragraph" } }"#,
    )?;

    let config = Config::from_file(&path)?;

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "de");
    assert_eq!(config.chunking.chunked_limits(), ChunkLimits::new(Some(10), Some(4000)));
    assert_eq!(config.translation.unit, UnitKind::Paragraph);
    assert_eq!(config.translation.redistribution, RedistributionPolicy::FirstRun);
    assert_eq!(config.translation.request_timeout(), Some(Duration::from_secs(60)));
    Ok(())
}

#[test]
fn test_from_file_withMissingFile_shouldFail() {
    let dir = TempDir::new().unwrap();
    let result = Config::from_file(dir.path().join("absent.json"));
    assert!(result.is_err());
}

#[test]
fn test_from_json_str_withInvalidLanguage_shouldFail() {
    let result = Config::from_json_str(r#"{ "target_language": "zz" }"#);
    assert!(result.is_err());
}

#[test]
fn test_validate_withInvertedThresholds_shouldFail() {
    let mut config = Config::default();
    config.routing.caution_max_bytes = config.routing.whole_document_max_bytes - 1;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroConcurrency_shouldFail() {
    let mut config = Config::default();
    config.translation.concurrent_requests = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withEmptyDelimiters_shouldFail() {
    let mut config = Config::default();
    config.extraction.delimiters.clear();
    assert!(config.validate().is_err());
}
