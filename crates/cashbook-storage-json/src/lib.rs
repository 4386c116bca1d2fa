use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use cashbook_core::{CoreError, LedgerStorage};
use cashbook_domain::Ledger;
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info};

const LEDGER_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Where ledgers and their backups live on disk.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub ledger_root: PathBuf,
    pub backup_root: PathBuf,
}

impl StoragePaths {
    /// `<base>/ledgers` and `<base>/backups`.
    pub fn under(base: &Path) -> Self {
        Self {
            ledger_root: base.join("ledgers"),
            backup_root: base.join("backups"),
        }
    }
}

/// Filesystem-backed JSON persistence for ledgers and their backups.
#[derive(Debug, Clone)]
pub struct JsonLedgerStorage {
    paths: StoragePaths,
    retention: usize,
}

impl JsonLedgerStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.ledger_root)?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            paths,
            retention: retention.max(1),
        })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn ledger_path(&self, name: &str) -> PathBuf {
        self.paths
            .ledger_root
            .join(format!("{}.{}", canonical_name(name), LEDGER_EXTENSION))
    }

    /// Summaries of every stored ledger, sorted by display name.
    pub fn list_ledger_metadata(&self) -> Result<Vec<LedgerMetadata>, CoreError> {
        let mut rows = Vec::new();
        for slug in self.list_ledgers()? {
            let ledger = self.load_ledger(&slug)?;
            rows.push(LedgerMetadata {
                path: self.ledger_path(&slug),
                slug,
                name: ledger.name.clone(),
                updated_at: ledger.updated_at,
                entry_count: ledger.len(),
            });
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    /// Backups of `name`, newest first.
    pub fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let Some(order) = parse_backup_id(file_name) else {
                continue;
            };
            entries.push(LedgerBackupInfo {
                ledger: canonical_name(name),
                id: file_name.to_string(),
                created_at: DateTime::from_naive_utc_and_offset(order.0, Utc),
                size_bytes: fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0),
                path,
                sequence: order.1,
            });
        }
        entries.sort_by_key(|info| Reverse((info.created_at, info.sequence)));
        Ok(entries)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.paths.backup_root.join(canonical_name(name))
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        fs::create_dir_all(&dir)?;
        let stem = format!(
            "{}_{}",
            canonical_name(name),
            Utc::now().format(BACKUP_TIMESTAMP_FORMAT)
        );
        let mut backup_path = dir.join(format!("{stem}.{LEDGER_EXTENSION}"));
        let mut sequence = 0;
        while backup_path.exists() {
            sequence += 1;
            backup_path = dir.join(format!("{stem}_{sequence}.{LEDGER_EXTENSION}"));
        }
        fs::copy(path, &backup_path)?;
        debug!(backup = %backup_path.display(), "previous ledger file backed up");
        self.prune_backups(name)
    }

    fn prune_backups(&self, name: &str) -> Result<(), CoreError> {
        for stale in self.list_backups(name)?.into_iter().skip(self.retention) {
            let _ = fs::remove_file(stale.path);
        }
        Ok(())
    }
}

impl LedgerStorage for JsonLedgerStorage {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError> {
        let path = self.ledger_path(name);
        self.backup_existing_file(name, &path)?;
        save_ledger_to_path(ledger, &path)?;
        info!(ledger = name, path = %path.display(), "ledger written");
        Ok(())
    }

    fn load_ledger(&self, name: &str) -> Result<Ledger, CoreError> {
        let path = self.ledger_path(name);
        if !path.exists() {
            return Err(CoreError::Storage(format!("ledger `{name}` not found")));
        }
        load_ledger_from_path(&path)
    }

    fn list_ledgers(&self) -> Result<Vec<String>, CoreError> {
        if !self.paths.ledger_root.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.paths.ledger_root)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(LEDGER_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_ledger(&self, name: &str) -> Result<(), CoreError> {
        let path = self.ledger_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn contains_ledger(&self, name: &str) -> Result<bool, CoreError> {
        Ok(self.ledger_path(name).is_file())
    }
}

/// Saves a ledger to an arbitrary path on disk.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<(), CoreError> {
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_ledger(ledger)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a ledger from the provided filesystem path.
pub fn load_ledger_from_path(path: &Path) -> Result<Ledger, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

#[derive(Debug, Clone)]
pub struct LedgerMetadata {
    pub slug: String,
    pub name: String,
    pub path: PathBuf,
    pub updated_at: DateTime<Utc>,
    pub entry_count: usize,
}

/// Describes a persisted backup artifact for a ledger.
#[derive(Debug, Clone)]
pub struct LedgerBackupInfo {
    pub ledger: String,
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    pub path: PathBuf,
    sequence: u32,
}

pub fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches(|c| c == '_' || c == '-').is_empty() {
        "ledger".into()
    } else {
        sanitized
    }
}

/// Extracts `(timestamp, sequence)` from `<slug>_<date>_<time>[_<n>].json`.
fn parse_backup_id(file_name: &str) -> Option<(NaiveDateTime, u32)> {
    let stem = file_name.strip_suffix(&format!(".{LEDGER_EXTENSION}"))?;
    let mut segments: Vec<&str> = stem.split('_').collect();
    let mut sequence = 0;
    if segments.len() >= 4 && !is_digits(segments[segments.len() - 1], 6) {
        sequence = segments.pop()?.parse().ok()?;
    }
    let time = segments.pop()?;
    let date = segments.pop()?;
    if segments.is_empty() || !is_digits(date, 8) || !is_digits(time, 6) {
        return None;
    }
    NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M%S")
        .ok()
        .map(|stamp| (stamp, sequence))
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn serialize_ledger(ledger: &Ledger) -> Result<String, CoreError> {
    serde_json::to_string_pretty(ledger).map_err(|err| CoreError::Serde(err.to_string()))
}
