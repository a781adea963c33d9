//! Storage adapter: a string key-value store plus the task list codec on top.
//!
//! The store only mirrors the task list; `TaskStore` owns it. Reads never
//! fail: a missing key or a payload that is not a JSON array means "no tasks
//! yet", and a bad record inside the array is skipped on its own.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::task::{StoredTask, Task};

pub const DEFAULT_KEY: &str = "tasks";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key: `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let p = self.path_for(key);
        match fs::read_to_string(&p) {
            Ok(s) => Some(s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %p.display(), error = %e, "unreadable task file; starting empty");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("create {}", self.dir.display()))?;
        let p = self.path_for(key);
        // Readers see the old file or the new one, never a partial write.
        let tmp = p.with_extension("json.tmp");
        fs::write(&tmp, value).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, &p).with_context(|| format!("rename {} -> {}", tmp.display(), p.display()))?;
        Ok(())
    }
}

/// Read the task list under `key`, tolerating absent and malformed data.
pub fn load_tasks(store: &impl KeyValueStore, key: &str) -> Vec<Task> {
    let Some(raw) = store.get(key) else {
        return Vec::new();
    };
    if raw.trim().is_empty() {
        return Vec::new();
    }
    let records = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(key, error = %e, "malformed task data; treating as empty");
            return Vec::new();
        }
    };

    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<StoredTask>(value) {
            Ok(record) => Some(Task::from(record)),
            Err(e) => {
                tracing::warn!(key, index, error = %e, "skipping malformed task record");
                None
            }
        })
        .collect()
}

pub fn save_tasks(store: &mut impl KeyValueStore, key: &str, tasks: &[Task]) -> Result<()> {
    let json = serde_json::to_string(tasks).context("serialize tasks")?;
    store.set(key, &json)?;
    tracing::debug!(key, count = tasks.len(), "persisted tasks");
    Ok(())
}
