//! OKR sheet (JSON) loader
//!
//! A JSON array of goals, each with a domain and an objective holding its
//! key results:
//!   [{"domain": "Writing", "priority": 2,
//!     "objective": {"title": "...", "key_results": [{"description": "...", "target": 1}]}}]

use anyhow::{Context, Result};
use shagent_core::Goal;
use std::io::Read;
use std::path::Path;
use tracing::debug;

pub fn parse_okr_json<R: Read>(reader: R) -> Result<Vec<Goal>> {
    let goals: Vec<Goal> = serde_json::from_reader(reader).context("decode OKR goals")?;
    debug!(
        goals = goals.len(),
        key_results = goals.iter().map(|g| g.objective.key_results.len()).sum::<usize>(),
        "OKR goals loaded"
    );
    Ok(goals)
}

pub fn load_okr_json(path: &Path) -> Result<Vec<Goal>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open OKR file {}", path.display()))?;
    parse_okr_json(file).with_context(|| format!("parse OKR file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_array() {
        assert!(parse_okr_json(r#"{"domain":"X"}"#.as_bytes()).is_err());
    }
}
