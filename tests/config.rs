use pvm::config::{ConfigKey, ConfigStore, ProxyConfig, StoreError};
use pvm::{defaults, no_proxy};
use std::fs;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> ConfigStore {
    ConfigStore::open_at(dir.path().join(".pvm").join("config.json")).unwrap()
}

#[test]
fn test_missing_file_yields_defaults_without_creating_it() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    let config = store.get_config();
    assert_eq!(config.http, "http://127.0.0.1:20170");
    assert_eq!(config.https, "http://127.0.0.1:20170");
    assert_eq!(config.no_proxy, "");
    assert!(!store.get_config_path().exists());
}

#[test]
fn test_set_both_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    store.set_both("http://proxy.internal:3128").unwrap();

    let reopened = store_in(&dir);
    let config = reopened.get_config();
    assert_eq!(config.http, "http://proxy.internal:3128");
    assert_eq!(config.https, "http://proxy.internal:3128");
}

#[test]
fn test_single_field_setters_leave_other_fields_alone() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    store.set_http("http://a:1").unwrap();
    store.set_https("http://b:2").unwrap();

    let config = store_in(&dir).get_config();
    assert_eq!(config.http, "http://a:1");
    assert_eq!(config.https, "http://b:2");
    assert_eq!(config.no_proxy, "");
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    store.set_both("http://h:1").unwrap();
    store.set_no_proxy("example.com").unwrap();

    store.reset().unwrap();
    assert_eq!(store.get_config(), ProxyConfig::default());
    assert_eq!(store_in(&dir).get_config(), ProxyConfig::default());
}

#[test]
fn test_file_uses_camel_case_no_proxy_key() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    store.set_no_proxy("localhost,example.com").unwrap();

    let raw = fs::read_to_string(store.get_config_path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["noProxy"], "localhost,example.com");
    assert_eq!(json["http"], defaults::DEFAULT_PROXY_URL);
}

#[test]
fn test_unknown_keys_ignored_and_missing_keys_defaulted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{"http": "http://custom:8080", "theme": "dark", "noProxy": "x.com"}"#,
    )
    .unwrap();

    let config = ConfigStore::open_at(&path).unwrap().get_config();
    assert_eq!(config.http, "http://custom:8080");
    assert_eq!(config.https, defaults::DEFAULT_PROXY_URL);
    assert_eq!(config.no_proxy, "x.com");
}

#[test]
fn test_malformed_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let result = ConfigStore::open_at(&path);
    assert!(matches!(result, Err(StoreError::Load { .. })));
}

#[test]
fn test_write_failure_propagates_and_keeps_state() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let mut store = ConfigStore::open_at(blocker.join("config.json")).unwrap();
    let result = store.set_both("http://h:1");

    assert!(matches!(result, Err(StoreError::Io { .. })));
    assert_eq!(store.get_config(), ProxyConfig::default());
}

#[test]
fn test_config_key_names() {
    assert_eq!("http".parse::<ConfigKey>().unwrap(), ConfigKey::Http);
    assert_eq!("https".parse::<ConfigKey>().unwrap(), ConfigKey::Https);
    assert_eq!("both".parse::<ConfigKey>().unwrap(), ConfigKey::Both);
    assert_eq!("no-proxy".parse::<ConfigKey>().unwrap(), ConfigKey::NoProxy);
    assert_eq!("no_proxy".parse::<ConfigKey>().unwrap(), ConfigKey::NoProxy);

    let err = "ftp".parse::<ConfigKey>().unwrap_err();
    assert_eq!(err.to_string(), "Unknown config key: ftp");
}

#[test]
fn test_set_by_key_dispatches() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    store.set(ConfigKey::Both, "http://both:1").unwrap();
    store.set(ConfigKey::Https, "http://secure:2").unwrap();

    let config = store.get_config();
    assert_eq!(config.http, "http://both:1");
    assert_eq!(config.https, "http://secure:2");
}

#[test]
fn test_saved_no_proxy_list_parses_without_duplicates() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    store.set_no_proxy("a.com, b.com ,a.com").unwrap();

    let saved = store_in(&dir).get_config().no_proxy;
    assert_eq!(saved, "a.com, b.com ,a.com");
    assert_eq!(no_proxy::parse(&saved), vec!["a.com", "b.com"]);
}
