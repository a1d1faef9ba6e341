use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use shagent_core::{ContextMap, ContextStore, CoreError, FocusLedger, LedgerStore, DEFAULT_ATTENTION};
use std::fs;
use std::path::{Path, PathBuf};

/// `$SHAGENT_HOME`, else `~/.shagent`.
pub fn shagent_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SHAGENT_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".shagent"))
}

pub fn ensure_shagent_home() -> Result<PathBuf> {
    let dir = shagent_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> shagent_core::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// One JSON file per day: `<dir>/focus_log_YYYY-MM-DD.json`.
#[derive(Debug, Clone)]
pub struct JsonLedgerStore {
    dir: PathBuf,
}

impl JsonLedgerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(ensure_shagent_home()?.join("focus")))
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("focus_log_{}.json", date.format("%Y-%m-%d")))
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load(&self, date: NaiveDate) -> shagent_core::Result<Option<FocusLedger>> {
        let p = self.path_for(date);
        if !p.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&p)?;
        let ledger: FocusLedger = serde_json::from_str(&s)?;
        if ledger.date != date {
            return Err(CoreError::Store(format!(
                "{} holds the ledger for {}",
                p.display(),
                ledger.date
            )));
        }
        Ok(Some(ledger))
    }

    fn save(&mut self, ledger: &FocusLedger) -> shagent_core::Result<()> {
        write_json(&self.path_for(ledger.date), ledger)
    }
}

/// All task contexts in one JSON object keyed by task id.
#[derive(Debug, Clone)]
pub struct JsonContextStore {
    path: PathBuf,
}

impl JsonContextStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(ensure_shagent_home()?.join("task_contexts.json")))
    }
}

impl ContextStore for JsonContextStore {
    fn load_all(&self) -> shagent_core::Result<ContextMap> {
        if !self.path.exists() {
            return Ok(ContextMap::new());
        }
        let s = fs::read_to_string(&self.path)?;
        if s.trim().is_empty() {
            return Ok(ContextMap::new());
        }
        Ok(serde_json::from_str(&s)?)
    }

    fn save_all(&mut self, contexts: &ContextMap) -> shagent_core::Result<()> {
        write_json(&self.path, contexts)
    }
}

/// Last recorded attention ping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttentionState {
    pub last: f64,
    #[serde(default)]
    pub recorded_at: Option<NaiveDateTime>,
}

impl Default for AttentionState {
    fn default() -> Self {
        Self {
            last: DEFAULT_ATTENTION,
            recorded_at: None,
        }
    }
}

pub fn attention_path() -> Result<PathBuf> {
    Ok(ensure_shagent_home()?.join("attention.json"))
}

pub fn read_attention(path: &Path) -> Result<AttentionState> {
    if !path.exists() {
        return Ok(AttentionState::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn write_attention(path: &Path, state: &AttentionState) -> Result<()> {
    write_json(path, state).with_context(|| format!("write {}", path.display()))
}
