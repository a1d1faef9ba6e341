use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shagent_core::time::parse_timezone;
use shagent_core::{EnergyCurve, ScheduleOptions};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_shagent_home;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub profile: ProfileSection,
    pub schedule: ScheduleSection,
    pub focus: FocusSection,
    pub llm: LlmSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSection {
    /// IANA zone name.
    pub timezone: String,
    pub goals_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSection {
    pub day_start: String,
    pub day_end: String,
    pub block_minutes: i64,
    pub break_minutes: i64,
    pub default_energy: f64,
    pub calendar_ics_url: Option<String>,
    pub calendar_csv: Option<PathBuf>,
    /// "HH:00" -> level in 0..=1
    pub energy_curve: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusSection {
    pub daily_cap_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// Tried in order: "openai", "anthropic".
    pub providers: Vec<String>,
    pub openai_model: String,
    pub anthropic_model: String,
    pub openai_api_key_env: String,
    pub anthropic_api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for ProfileSection {
    fn default() -> Self {
        Self {
            timezone: "America/Chicago".to_string(),
            goals_csv: None,
        }
    }
}

impl Default for ScheduleSection {
    fn default() -> Self {
        let energy_curve = EnergyCurve::workday()
            .samples()
            .into_iter()
            .map(|s| (format!("{:02}:00", s.hour), s.level))
            .collect();
        Self {
            day_start: "09:00".to_string(),
            day_end: "17:30".to_string(),
            block_minutes: 50,
            break_minutes: 10,
            default_energy: shagent_core::DEFAULT_ENERGY,
            calendar_ics_url: None,
            calendar_csv: None,
            energy_curve,
        }
    }
}

impl Default for FocusSection {
    fn default() -> Self {
        Self {
            daily_cap_minutes: shagent_core::focus::DEFAULT_DAILY_CAP_MINUTES,
        }
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            providers: vec!["openai".to_string(), "anthropic".to_string()],
            openai_model: "gpt-4o-mini".to_string(),
            anthropic_model: "claude-3-5-sonnet-latest".to_string(),
            openai_api_key_env: "OPENAI_API_KEY".to_string(),
            anthropic_api_key_env: "ANTHROPIC_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        Ok(parse_timezone(&self.profile.timezone)?)
    }

    pub fn energy_curve(&self) -> Result<EnergyCurve> {
        let labels = self
            .schedule
            .energy_curve
            .iter()
            .map(|(label, level)| (label.as_str(), *level));
        EnergyCurve::from_labels(labels, self.schedule.default_energy).context("invalid [schedule] energy_curve")
    }

    pub fn schedule_options(&self) -> ScheduleOptions {
        ScheduleOptions {
            block_minutes: self.schedule.block_minutes,
            break_minutes: self.schedule.break_minutes,
            ..ScheduleOptions::default()
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_shagent_home()?.join("config.toml"))
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}
