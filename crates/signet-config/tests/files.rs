//! Loading configuration from files on disk.

use std::io::Write;

use signet_config::{ConfigError, ConfigLoader};
use signet_extract::HeaderValues;

fn write_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_toml_file() {
    let file = write_file(
        ".toml",
        r#"
            [docs]
            path = "/api/openapi.json"
            title = "Inventory"
            servers = ["https://inventory.example.com"]

            [extraction]
            header_values = "join"
            max_body_size = 4096

            [logging]
            level = "warn"
            json_format = false
        "#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.docs.path, "/api/openapi.json");
    assert_eq!(config.docs.title, "Inventory");
    assert_eq!(config.docs.version, "0.1.0");
    assert_eq!(config.extraction.header_values, HeaderValues::Join);
    assert_eq!(config.extraction.max_body_size, 4096);
    assert_eq!(config.logging.level, "warn");
    assert!(!config.logging.json_format);
}

#[test]
fn test_json_file() {
    let file = write_file(".json", r#"{"docs": {"enabled": false}}"#);
    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
    assert!(!config.docs.enabled);
}

#[test]
fn test_invalid_toml_file() {
    let file = write_file(".toml", "[docs\npath = ");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlError(_))));
}

#[test]
fn test_unsupported_extension() {
    let file = write_file(".yaml", "docs: {}");
    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn test_optional_file_present() {
    let file = write_file(".toml", "[logging]\nlevel = \"error\"");
    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(config.logging.level, "error");
}
