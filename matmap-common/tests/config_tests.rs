//! Integration tests for bootstrap configuration resolution
//!
//! Environment-mutating tests are marked #[serial] so they never race on
//! MATMAP_CONFIG or MATMAP_PLACES_API_KEY.

use matmap_common::config::{
    resolve_config_path, ConfigSource, TomlConfig, ENV_CONFIG_PATH, ENV_PLACES_API_KEY,
};
use matmap_common::{Error, KeywordTable, QueryComposer};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}

#[test]
#[serial]
fn test_cli_path_takes_priority_over_env() {
    env::set_var(ENV_CONFIG_PATH, "/tmp/matmap-from-env.toml");

    let source = resolve_config_path(Some(Path::new("/tmp/matmap-from-cli.toml")));
    assert_eq!(
        source,
        ConfigSource::Explicit("/tmp/matmap-from-cli.toml".into())
    );

    env::remove_var(ENV_CONFIG_PATH);
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    env::set_var(ENV_CONFIG_PATH, "/tmp/matmap-from-env.toml");

    let source = resolve_config_path(None);
    assert_eq!(
        source,
        ConfigSource::Explicit("/tmp/matmap-from-env.toml".into())
    );

    env::remove_var(ENV_CONFIG_PATH);
}

#[test]
#[serial]
fn test_explicit_missing_file_is_error() {
    env::remove_var(ENV_CONFIG_PATH);

    let result = TomlConfig::resolve(Some(Path::new("/nonexistent/matmap/config.toml")));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_resolve_loads_file_values() {
    env::remove_var(ENV_PLACES_API_KEY);

    let file = write_temp(
        r#"
        port = 6000

        [places]
        api_key = "toml-key"
        language = "en"

        [search]
        near_radius_m = 1500

        [logging]
        level = "debug"
        "#,
    );

    let config = TomlConfig::resolve(Some(file.path())).unwrap();
    assert_eq!(config.port, 6000);
    assert_eq!(config.places.usable_api_key(), Some("toml-key"));
    assert_eq!(config.places.language, "en");
    assert_eq!(config.search.near_radius_m, 1500);
    assert_eq!(config.logging.level, "debug");
}

#[test]
#[serial]
fn test_env_api_key_overrides_toml() {
    let file = write_temp("[places]\napi_key = \"toml-key\"\n");
    env::set_var(ENV_PLACES_API_KEY, "env-key");

    let config = TomlConfig::resolve(Some(file.path())).unwrap();
    assert_eq!(config.places.usable_api_key(), Some("env-key"));

    env::remove_var(ENV_PLACES_API_KEY);
}

#[test]
#[serial]
fn test_blank_env_api_key_ignored() {
    let file = write_temp("[places]\napi_key = \"toml-key\"\n");
    env::set_var(ENV_PLACES_API_KEY, "   ");

    let config = TomlConfig::resolve(Some(file.path())).unwrap();
    assert_eq!(config.places.usable_api_key(), Some("toml-key"));

    env::remove_var(ENV_PLACES_API_KEY);
}

#[test]
fn test_keyword_file_drives_composer() {
    let file = write_temp(
        r#"
        [[keyword]]
        token = "gukbap"
        category = "cuisine"
        phrases = ["국밥"]

        [[keyword]]
        token = "hot"
        category = "flavor"
        phrases = ["뜨끈한"]

        [[keyword]]
        token = "walk"
        category = "distance"
        reach = "near"
        "#,
    );

    let table = KeywordTable::load(file.path()).unwrap();
    let config = TomlConfig::from_toml_str("[search]\nnear_radius_m = 800\n").unwrap();
    let composer = QueryComposer::new(table, config.search.policy());

    let composed = composer.compose(&["walk", "hot", "gukbap"]);
    assert_eq!(composed.query, "국밥 뜨끈한 맛집");
    assert_eq!(composed.radius, 800);

    // Built-in tokens are gone once the table is replaced
    assert_eq!(composer.compose(&["korean"]).query, "맛집");
}
