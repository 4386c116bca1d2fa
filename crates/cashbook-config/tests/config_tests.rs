use std::fs;

use cashbook_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_has_non_empty_fields() {
    let cfg = Config::default();

    assert!(!cfg.currency.is_empty());
    assert_eq!(cfg.currency_precision, 2);
    assert_eq!(cfg.backup_retention, 5);
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).expect("manager");
    assert_eq!(manager.load().unwrap(), Config::default());
    assert!(!manager.config_path().exists());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let mut cfg = Config::default();
    cfg.currency = "USD".to_string();
    cfg.last_opened_ledger = Some("household".into());

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded.currency, "USD");
    assert_eq!(loaded.last_opened_ledger.as_deref(), Some("household"));
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "currency": "EUR" }"#).unwrap();
    let loaded = ConfigManager::new(path).load().unwrap();
    assert_eq!(loaded.currency, "EUR");
    assert!(loaded.ui_color_enabled);
    assert_eq!(loaded.default_status, "pending");
}

#[test]
fn set_updates_one_key_and_rejects_unknown_ones() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path()).unwrap();

    let updated = manager.set("backup_retention", "3").unwrap();
    assert_eq!(updated.backup_retention, 3);
    assert_eq!(manager.load().unwrap().backup_retention, 3);

    let err = manager.set("colour", "on").unwrap_err();
    assert!(matches!(err, ConfigError::UnknownKey(ref key) if key == "colour"));
    assert_eq!(manager.load().unwrap().backup_retention, 3);
}

#[test]
fn malformed_file_is_a_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        ConfigManager::new(path).load(),
        Err(ConfigError::Serde(_))
    ));
}
