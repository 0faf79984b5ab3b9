//! Tests for loading client configuration from disk

use content_core::{ClientConfig, DraftHandling, Error};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_valid_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("content.toml");
    fs::write(
        &path,
        r#"
project_id = "p1"
dataset = "production"
draft_handling = "preserve"
timeout_secs = 5
"#,
    )
    .unwrap();

    let config = ClientConfig::load(&path).unwrap();

    assert_eq!(config.dataset, "production");
    assert_eq!(config.draft_handling, DraftHandling::Preserve);
    assert_eq!(config.timeout_secs, 5);
}

#[test]
fn test_load_missing_file() {
    let temp = TempDir::new().unwrap();
    let err = ClientConfig::load(&temp.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config { .. }), "got {err:?}");
}

#[test]
fn test_load_malformed_toml() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("content.toml");
    fs::write(&path, "project_id = [unterminated").unwrap();

    let err = ClientConfig::load(&path).unwrap_err();
    assert!(matches!(err, Error::TomlParse(_)), "got {err:?}");
}

#[test]
fn test_load_rejects_unknown_draft_handling() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("content.toml");
    fs::write(
        &path,
        "project_id = \"p1\"\ndataset = \"production\"\ndraft_handling = \"sometimes\"\n",
    )
    .unwrap();

    assert!(ClientConfig::load(&path).is_err());
}
