//! Live topology document persistence with timestamped backups.
//!
//! The live document lives at `<data_dir>/servers.json`, backups at
//! `<data_dir>/backups/servers-<UTC timestamp>.json`. Filenames encode
//! the timestamp to second resolution, so lexicographic order is
//! chronological order. After every backup write the set is trimmed to
//! the newest `keep` files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use labdeck_core::types::DashboardConfig;

use crate::error::{Result, StoreError};

/// Filename of the live document under the data directory.
const LIVE_FILE: &str = "servers.json";
/// Prefix shared by every backup filename.
const BACKUP_PREFIX: &str = "servers-";

/// Store for the dashboard's topology document.
pub struct ConfigStore {
    data_dir: PathBuf,
    backups_dir: PathBuf,
    keep: usize,
}

impl ConfigStore {
    /// Create a store rooted at `data_dir`, retaining at most `keep`
    /// backups. Creates the directories if they don't exist.
    pub fn new(data_dir: impl Into<PathBuf>, keep: usize) -> Result<Self> {
        let data_dir = data_dir.into();
        let backups_dir = data_dir.join("backups");
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            data_dir,
            backups_dir,
            keep,
        })
    }

    /// Check a candidate document against the dashboard schema without
    /// touching any state.
    pub fn validate(doc: &Value) -> Result<()> {
        DashboardConfig::deserialize(doc)
            .map(|_| ())
            .map_err(|e| StoreError::Validation(e.to_string()))
    }

    /// Path of the live document file.
    pub fn live_path(&self) -> PathBuf {
        self.data_dir.join(LIVE_FILE)
    }

    /// The current live document. An absent file reads as the empty
    /// document `{"groups": []}`.
    pub fn live(&self) -> Result<Value> {
        match fs::read_to_string(self.live_path()) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(serde_json::json!({ "groups": [] }))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Validate `doc` and atomically replace the live document with it.
    ///
    /// An invalid candidate leaves the previous document untouched. The
    /// raw payload is persisted as-is, so fields the schema does not
    /// model survive the write.
    pub fn save(&self, doc: &Value) -> Result<()> {
        Self::validate(doc)?;
        write_atomic(&self.live_path(), doc)?;
        tracing::debug!(path = %self.live_path().display(), "Live document saved");
        Ok(())
    }

    /// [`save`](Self::save), then write a UTC-timestamped backup and
    /// trim the backup set down to the newest `keep` files. Returns the
    /// backup filename.
    pub fn save_with_backup(&self, doc: &Value) -> Result<String> {
        self.save(doc)?;

        let name = format!(
            "{BACKUP_PREFIX}{}.json",
            Utc::now().format("%Y%m%d-%H%M%S")
        );
        let json = serde_json::to_string_pretty(doc)?;
        fs::write(self.backups_dir.join(&name), json)?;
        tracing::info!(backup = %name, "Backup written");

        self.trim_backups();
        Ok(name)
    }

    /// Validate the named backup and promote it to the live document.
    ///
    /// A backup that is missing fails with `NotFound`; one that no
    /// longer parses or validates fails with `Validation` and leaves
    /// the live document untouched.
    pub fn restore(&self, name: &str) -> Result<()> {
        let raw = self.read_backup(name)?;
        let doc: Value =
            serde_json::from_slice(&raw).map_err(|e| StoreError::Validation(e.to_string()))?;
        Self::validate(&doc)?;
        write_atomic(&self.live_path(), &doc)?;
        tracing::info!(backup = %name, "Live document restored from backup");
        Ok(())
    }

    /// Backup filenames in ascending (= chronological) order.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(BACKUP_PREFIX) && name.ends_with(".json") {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Raw bytes of a named backup.
    pub fn read_backup(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.backup_path(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a backup name, rejecting anything that could escape the
    /// backups directory.
    fn backup_path(&self, name: &str) -> Result<PathBuf> {
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(self.backups_dir.join(name))
    }

    /// Delete all but the newest `keep` backups. Deleting an individual
    /// stale file is best-effort: a failure is logged and skipped, and
    /// never fails the surrounding save.
    fn trim_backups(&self) {
        let names = match self.list_backups() {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "Could not enumerate backups for trimming");
                return;
            }
        };
        if names.len() <= self.keep {
            return;
        }
        for stale in &names[..names.len() - self.keep] {
            if let Err(e) = fs::remove_file(self.backups_dir.join(stale)) {
                tracing::warn!(backup = %stale, error = %e, "Failed to delete stale backup");
            }
        }
    }
}

/// Write `value` to `path` via a temp file + rename, so a crash mid-write
/// cannot leave a half-written document behind.
fn write_atomic(path: &Path, value: &Value) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
