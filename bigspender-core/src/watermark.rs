//! Persisted last-run state for incremental fetches.
//!
//! A single TOML key (`last_run = "YYYY-MM-DD"`). Read once before any account
//! is processed; written at most once, after every account has succeeded. A
//! run that dies in between leaves the previous value, so the next run
//! re-covers the same window instead of skipping days.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_STATE_FILE: &str = ".bigspender.state";

#[derive(Debug, Serialize, Deserialize)]
struct State {
    last_run: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct WatermarkStore {
    path: PathBuf,
}

impl WatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `to` boundary of the last successful run, if one exists.
    pub fn read(&self) -> Result<Option<NaiveDate>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        let state: State =
            toml::from_str(&s).with_context(|| format!("parse {}", self.path.display()))?;
        Ok(Some(state.last_run))
    }

    pub fn write(&self, last_run: NaiveDate) -> Result<()> {
        let s = toml::to_string(&State { last_run }).context("serialize state")?;
        fs::write(&self.path, s).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> WatermarkStore {
        WatermarkStore::new(dir.path().join(DEFAULT_STATE_FILE))
    }

    #[test]
    fn test_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).read().unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let date = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        store.write(date).unwrap();
        assert_eq!(store.read().unwrap(), Some(date));
    }

    #[test]
    fn test_state_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .write(NaiveDate::from_ymd_opt(2026, 2, 20).unwrap())
            .unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.trim(), r#"last_run = "2026-02-20""#);
    }

    #[test]
    fn test_successive_runs_advance_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let first = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let second = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        store.write(first).unwrap();
        store.write(second).unwrap();
        assert_eq!(store.read().unwrap(), Some(second));
    }

    #[test]
    fn test_garbage_state_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "last_run = \"not-a-date\"").unwrap();
        assert!(store.read().is_err());
    }
}
