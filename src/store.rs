use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

// File-per-dataset tabular store. A dataset lives at <data_dir>/<name>.json
// as a serde row array; archives are full copies of the pre-update table at
// <archive_dir>/<stamp>/<name>.json.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    data_dir: PathBuf,
    archive_dir: PathBuf,
}

impl LedgerStore {
    pub fn new(data_dir: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            archive_dir: archive_dir.into(),
        }
    }

    pub fn data_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.json"))
    }

    pub fn archive_path(&self, name: &str, stamp: &str) -> PathBuf {
        self.archive_dir.join(stamp).join(format!("{name}.json"))
    }

    // A dataset that has never been written is an empty table.
    pub fn load<R: DeserializeOwned>(&self, name: &str) -> Result<Vec<R>> {
        let path = self.data_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read dataset {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("decode dataset {}", path.display()))
    }

    pub fn save<R: Serialize>(&self, name: &str, rows: &[R]) -> Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("create data dir {}", self.data_dir.display()))?;
        let path = self.data_path(name);
        let json = serde_json::to_string(rows).context("encode dataset rows")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("replace {}", path.display()))?;
        Ok(())
    }

    pub fn archive<R: Serialize>(&self, name: &str, rows: &[R], stamp: &str) -> Result<()> {
        let path = self.archive_path(name, stamp);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create archive dir {}", dir.display()))?;
        }
        let json = serde_json::to_string(rows).context("encode archive rows")?;
        fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        log::debug!("{name} archived to {}", path.display());
        Ok(())
    }
}
