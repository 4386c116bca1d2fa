use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::ConfigError;

const APP_DIR_NAME: &str = ".cashbook";
const STATUS_VALUES: &[&str] = &["pending", "settled"];

/// Stores user-configurable shell preferences and metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_currency")]
    pub currency: String,
    #[serde(default = "Config::default_currency_precision")]
    pub currency_precision: u8,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Status applied to `add` when none is given.
    #[serde(default = "Config::default_status_value")]
    pub default_status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for ledgers. Defaults to `<home>/ledgers`.
    pub ledger_root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for backups. Defaults to `<home>/backups`.
    pub backup_root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_ledger: Option<String>,

    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: Self::default_currency(),
            currency_precision: Self::default_currency_precision(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            default_status: Self::default_status_value(),
            ledger_root: None,
            backup_root: None,
            last_opened_ledger: None,
            backup_retention: Self::default_backup_retention(),
        }
    }
}

impl Config {
    pub const KEYS: &'static [&'static str] = &[
        "currency",
        "currency_precision",
        "ui_color_enabled",
        "default_status",
        "ledger_root",
        "backup_root",
        "last_opened_ledger",
        "backup_retention",
    ];

    pub fn default_currency() -> String {
        "TRY".into()
    }

    pub fn default_currency_precision() -> u8 {
        2
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_status_value() -> String {
        "pending".into()
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn resolve_ledger_root(&self, home: &Path) -> PathBuf {
        self.ledger_root
            .clone()
            .unwrap_or_else(|| home.join("ledgers"))
    }

    pub fn resolve_backup_root(&self, home: &Path) -> PathBuf {
        self.backup_root
            .clone()
            .unwrap_or_else(|| home.join("backups"))
    }

    /// Current value of `key` as shown by `config show`.
    pub fn value_of(&self, key: &str) -> Result<String, ConfigError> {
        let path_or_default = |path: &Option<PathBuf>| {
            path.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(default)".into())
        };
        Ok(match key {
            "currency" => self.currency.clone(),
            "currency_precision" => self.currency_precision.to_string(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "default_status" => self.default_status.clone(),
            "ledger_root" => path_or_default(&self.ledger_root),
            "backup_root" => path_or_default(&self.backup_root),
            "last_opened_ledger" => self
                .last_opened_ledger
                .clone()
                .unwrap_or_else(|| "(none)".into()),
            "backup_retention" => self.backup_retention.to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        })
    }

    /// Parses `value` and stores it under `key`. Empty values, `none` and
    /// `default` clear the optional keys.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };
        let cleared = value.is_empty()
            || value.eq_ignore_ascii_case("none")
            || value.eq_ignore_ascii_case("default");

        match key {
            "currency" => {
                if value.is_empty() {
                    return Err(invalid("currency must not be empty"));
                }
                self.currency = value.to_uppercase();
            }
            "currency_precision" => {
                let precision: u8 = value
                    .parse()
                    .map_err(|_| invalid("expected a whole number"))?;
                if precision > 8 {
                    return Err(invalid("precision must be between 0 and 8"));
                }
                self.currency_precision = precision;
            }
            "ui_color_enabled" => {
                self.ui_color_enabled = parse_flag(value).ok_or_else(|| invalid("expected on/off"))?;
            }
            "default_status" => {
                let normalized = value.to_lowercase();
                if !STATUS_VALUES.contains(&normalized.as_str()) {
                    return Err(invalid("expected `pending` or `settled`"));
                }
                self.default_status = normalized;
            }
            "ledger_root" => self.ledger_root = (!cleared).then(|| PathBuf::from(value)),
            "backup_root" => self.backup_root = (!cleared).then(|| PathBuf::from(value)),
            "last_opened_ledger" => {
                self.last_opened_ledger = (!cleared).then(|| value.to_string())
            }
            "backup_retention" => {
                let retention: usize = value
                    .parse()
                    .map_err(|_| invalid("expected a whole number"))?;
                if retention == 0 {
                    return Err(invalid("retention must be at least 1"));
                }
                self.backup_retention = retention;
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

/// `~/.cashbook`, or `./.cashbook` when no home directory is known.
pub fn default_app_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}
