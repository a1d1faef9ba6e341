//! Goals sheet (CSV) loader
//!
//! Expected header (every column optional except one of task/objective):
//!   task,domain,objective,minutes,energy,priority_num,status,time_of_day
//!
//! Spreadsheet exports often write integers as floats ("60.0"), so numeric
//! columns are read as floats and rounded.

use anyhow::{Context, Result};
use serde::Deserialize;
use shagent_core::EnergyLevel;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use crate::types::GoalRow;

const DEFAULT_MINUTES: i64 = 60;
const DEFAULT_PRIORITY: u32 = 3;

#[derive(Debug, Deserialize)]
struct RawGoalRow {
    #[serde(default)]
    task: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    objective: Option<String>,
    #[serde(default)]
    minutes: Option<f64>,
    #[serde(default)]
    energy: Option<String>,
    #[serde(default)]
    priority_num: Option<f64>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    time_of_day: Option<String>,
}

fn text(v: Option<String>) -> String {
    v.map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Parse goal rows from CSV. Malformed rows are skipped with a warning but
/// still consume their row index, so ids stay stable across edits.
pub fn parse_goals_csv<R: Read>(reader: R) -> Result<Vec<GoalRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for (idx, rec) in rdr.deserialize::<RawGoalRow>().enumerate() {
        let raw = match rec {
            Ok(r) => r,
            Err(e) => {
                warn!(row = idx, error = %e, "skipping malformed goal row");
                continue;
            }
        };

        let objective = text(raw.objective);
        let task = match text(raw.task) {
            t if t.is_empty() => objective.clone(),
            t => t,
        };
        if task.is_empty() {
            warn!(row = idx, "skipping goal row without task or objective");
            continue;
        }

        let minutes = match raw.minutes.map(|m| m.round() as i64) {
            Some(m) if m > 0 => m,
            _ => DEFAULT_MINUTES,
        };
        let priority = raw
            .priority_num
            .and_then(|p| u32::try_from(p.round() as i64).ok())
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PRIORITY);
        let energy = raw
            .energy
            .as_deref()
            .and_then(|e| e.parse::<EnergyLevel>().ok())
            .unwrap_or(EnergyLevel::Medium);

        out.push(GoalRow {
            id: idx.to_string(),
            task,
            domain: text(raw.domain),
            objective,
            minutes,
            energy,
            priority,
            status: text(raw.status),
            time_of_day: text(raw.time_of_day),
        });
    }

    Ok(out)
}

pub fn load_goals_csv(path: &Path) -> Result<Vec<GoalRow>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open goals CSV {}", path.display()))?;
    parse_goals_csv(file).with_context(|| format!("parse goals CSV {}", path.display()))
}
