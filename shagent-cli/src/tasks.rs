//! Active tasks: goal-sheet rows joined with stored context.

use anyhow::{bail, Result};
use shagent_core::{
    canonical_category, categorize, classify_status, context_questions, ContextMap, TaskCard,
    TrackedTask,
};
use shagent_ingest::{load_goals_csv, GoalRow};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// `--goals` wins over `[profile] goals_csv`.
pub fn goals_path(cfg: &Config, explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit.or_else(|| cfg.profile.goals_csv.clone()) {
        Some(p) => Ok(p),
        None => bail!("no goals sheet configured; pass --goals <csv> or run: shagent setup"),
    }
}

pub fn card_for(row: &GoalRow, contexts: &ContextMap) -> TaskCard {
    let cats = categorize(&row.task, &row.objective);
    let raw_category = cats.categories.first().copied().unwrap_or(row.domain.as_str());
    let questions = context_questions(&row.domain, &row.objective);
    let status = classify_status(contexts.get(&row.id), questions, &row.domain);

    TaskCard {
        tracked: TrackedTask::new(row.to_task(), status),
        domain: row.domain_label(),
        category_key: canonical_category(raw_category),
        time_of_day: row.time_of_day.clone(),
        context_questions: questions.iter().map(|q| q.to_string()).collect(),
    }
}

/// Active rows as cards, most urgent first (priority, then higher energy,
/// then shorter).
pub fn build_cards(rows: &[GoalRow], contexts: &ContextMap) -> Vec<TaskCard> {
    let mut cards: Vec<TaskCard> = rows
        .iter()
        .filter(|r| r.is_active())
        .map(|r| card_for(r, contexts))
        .collect();
    cards.sort_by_key(|c| {
        let t = &c.tracked.task;
        (t.priority, Reverse(t.energy.rank()), t.duration_minutes)
    });
    cards
}

pub fn load_cards(path: &Path, contexts: &ContextMap) -> Result<Vec<TaskCard>> {
    let rows = load_goals_csv(path)?;
    Ok(build_cards(&rows, contexts))
}
