use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use ticklist_core::{App, FileStore, TaskStore};

use crate::config::Config;

pub fn ticklist_home(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ticklist"))
}

pub fn ensure_ticklist_home(override_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = ticklist_home(override_dir)?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn log_path(home: &Path) -> PathBuf {
    home.join("ticklist.log")
}

/// Open the task list under `home` with the configured key and zone.
pub fn open_app(home: &Path, cfg: &Config) -> Result<App<FileStore>> {
    let store = TaskStore::open(FileStore::new(home), cfg.storage.key.clone(), cfg.zone()?);
    Ok(App::new(store, cfg.reminder_checker()))
}
