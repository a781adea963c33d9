use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use ticklist_core::{ReminderChecker, Zone, DEFAULT_KEY};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub storage: StorageSection,
    pub reminders: RemindersSection,
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageSection {
    /// Key the task list is stored under (file `<home>/<key>.json`).
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemindersSection {
    pub enabled: bool,
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplaySection {
    /// IANA zone like "America/Chicago". Unset means system local time.
    pub timezone: Option<String>,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            key: DEFAULT_KEY.to_string(),
        }
    }
}

impl Default for RemindersSection {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: ReminderChecker::DEFAULT_INTERVAL.as_secs(),
        }
    }
}

impl Config {
    pub fn zone(&self) -> Result<Zone> {
        match self.display.timezone.as_deref().map(str::trim) {
            None | Some("") => Ok(Zone::Local),
            Some(name) => Zone::parse(name).context("config [display].timezone"),
        }
    }

    pub fn reminder_checker(&self) -> ReminderChecker {
        ReminderChecker::new(Duration::from_secs(self.reminders.interval_secs.max(1)))
    }
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join("config.toml")
}

pub fn load_config(home: &Path) -> Result<Config> {
    let p = config_path(home);
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    let cfg: Config = toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?;
    // Unknown zone names fail here.
    cfg.zone()?;
    Ok(cfg)
}

pub fn save_config(home: &Path, cfg: &Config) -> Result<()> {
    let p = config_path(home);
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config(home: &Path) -> Result<()> {
    let p = config_path(home);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(home, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
