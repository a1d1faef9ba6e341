//! Day overview: tasks grouped by category and by readiness.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::categorizer::display_name;
use crate::focus::FocusStatus;
use crate::task::{TaskStatus, TrackedTask};

/// Tasks listed per category in the overview.
pub const CATEGORY_PREVIEW_LIMIT: usize = 5;

/// A tracked task plus the goal-sheet fields the overview reports on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskCard {
    #[serde(flatten)]
    pub tracked: TrackedTask,
    /// "<domain> - <objective>"
    pub domain: String,
    pub category_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub time_of_day: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context_questions: Vec<String>,
}

impl TaskCard {
    pub fn id(&self) -> &str {
        &self.tracked.task.id
    }

    pub fn status(&self) -> TaskStatus {
        self.tracked.status
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBucket {
    pub name: String,
    pub tasks: Vec<TaskCard>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub ready: usize,
    pub needs_context: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayOverview {
    /// keyed by hyphenated category slug
    pub categories: BTreeMap<String, CategoryBucket>,
    pub focus_limit: FocusStatus,
    pub summary: StatusCounts,
    pub needs_context: Vec<String>,
    pub ready_tasks: Vec<String>,
}

/// Group cards by category (first few per category) and count them by status.
pub fn today_overview(cards: &[TaskCard], focus: FocusStatus) -> TodayOverview {
    let mut categories: BTreeMap<String, CategoryBucket> = BTreeMap::new();
    let mut summary = StatusCounts::default();
    let mut needs_context = Vec::new();
    let mut ready_tasks = Vec::new();

    for card in cards {
        let key = match card.category_key.trim() {
            "" => "general",
            k => k,
        };
        let bucket = categories
            .entry(key.replace(' ', "-"))
            .or_insert_with(|| CategoryBucket {
                name: display_name(key),
                tasks: Vec::new(),
            });
        if bucket.tasks.len() < CATEGORY_PREVIEW_LIMIT {
            bucket.tasks.push(card.clone());
        }

        match card.status() {
            TaskStatus::NeedsContext => {
                summary.needs_context += 1;
                needs_context.push(card.id().to_string());
            }
            TaskStatus::InProgress => summary.in_progress += 1,
            TaskStatus::Completed => summary.completed += 1,
            TaskStatus::Ready => {
                summary.ready += 1;
                ready_tasks.push(card.id().to_string());
            }
        }
        summary.total += 1;
    }

    TodayOverview {
        categories,
        focus_limit: focus,
        summary,
        needs_context,
        ready_tasks,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionabilityEntry {
    pub id: String,
    pub title: String,
    pub domain: String,
    pub priority: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_context: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionabilityReport {
    pub ready: Vec<ActionabilityEntry>,
    pub needs_context: Vec<ActionabilityEntry>,
    pub in_progress: Vec<ActionabilityEntry>,
}

/// Split cards by readiness. Anything neither blocked nor underway,
/// completed cards included, is reported as ready.
pub fn actionability_report(cards: &[TaskCard]) -> ActionabilityReport {
    let mut report = ActionabilityReport::default();
    for card in cards {
        let mut entry = ActionabilityEntry {
            id: card.id().to_string(),
            title: card.tracked.task.title.clone(),
            domain: card.domain.clone(),
            priority: card.tracked.task.priority,
            missing_context: Vec::new(),
        };
        match card.status() {
            TaskStatus::InProgress => report.in_progress.push(entry),
            TaskStatus::NeedsContext => {
                entry.missing_context = card.context_questions.clone();
                report.needs_context.push(entry);
            }
            TaskStatus::Ready | TaskStatus::Completed => report.ready.push(entry),
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    fn card(id: &str, category: &str, status: TaskStatus) -> TaskCard {
        TaskCard {
            tracked: TrackedTask::new(Task::new(id, format!("task {id}")), status),
            domain: "CAREER ADVANCEMENT - Job Search".to_string(),
            category_key: category.to_string(),
            time_of_day: String::new(),
            context_questions: vec!["Which 2 companies are you targeting today?".to_string()],
        }
    }

    #[test]
    fn overview_counts_and_groups() {
        let cards: Vec<TaskCard> = (0..7)
            .map(|i| card(&i.to_string(), "career", TaskStatus::Ready))
            .chain([
                card("n", "mental health", TaskStatus::NeedsContext),
                card("p", "", TaskStatus::InProgress),
                card("d", "writing", TaskStatus::Completed),
            ])
            .collect();

        let o = today_overview(&cards, FocusStatus::from_total(30, 240));
        assert_eq!(o.summary.total, 10);
        assert_eq!(o.summary.ready, 7);
        assert_eq!(o.summary.needs_context, 1);
        assert_eq!(o.summary.in_progress, 1);
        assert_eq!(o.summary.completed, 1);
        assert_eq!(o.categories["career"].tasks.len(), CATEGORY_PREVIEW_LIMIT);
        assert_eq!(o.categories["career"].name, "💼 Career");
        assert!(o.categories.contains_key("mental-health"));
        assert_eq!(o.categories["general"].name, "General");
        assert_eq!(o.needs_context, vec!["n".to_string()]);
        assert_eq!(o.focus_limit.remaining_minutes, 210);
    }

    #[test]
    fn report_lists_missing_context_only_when_blocked() {
        let cards = vec![
            card("a", "career", TaskStatus::NeedsContext),
            card("b", "career", TaskStatus::Ready),
            card("c", "career", TaskStatus::InProgress),
        ];
        let r = actionability_report(&cards);
        assert_eq!(r.needs_context.len(), 1);
        assert_eq!(r.needs_context[0].missing_context.len(), 1);
        assert!(r.ready[0].missing_context.is_empty());
        assert_eq!(r.in_progress[0].id, "c");
    }
}
