//! shagent-core: planning, focus and advice primitives for the shagent planner

pub mod advisor;
pub mod calendar;
pub mod context;
pub mod energy;
pub mod error;
pub mod focus;
pub mod goals;
pub mod overview;
pub mod scheduler;
pub mod task;
pub mod task_queue;
pub mod time;
pub mod writing;

pub use advisor::{advise, attention_nudge, check_attention, AdviceAction, AdvisorInput, Advisory, DEFAULT_ATTENTION};
pub use calendar::{BusyCalendar, BusyInterval};
pub use context::{classify_status, context_questions, record_answers, set_status, ContextMap, ContextStore, TaskContext};
pub use energy::{EnergyCurve, EnergySample, DEFAULT_ENERGY};
pub use error::{CoreError, Result};
pub use focus::{DailyFocusBudget, FocusLedger, FocusSession, FocusStatus, LedgerStore, MemoryLedgerStore};
pub use goals::{goals_to_tasks, Goal, KeyResult, Objective};
pub use overview::{actionability_report, today_overview, ActionabilityReport, TaskCard, TodayOverview};
pub use scheduler::{build_plan, unscheduled, PlannedBlock, ScheduleOptions, SlotScheduler};
pub use task::{EnergyLevel, Task, TaskStatus, TrackedTask};
pub use task_queue::TaskQueue;
pub use writing::{heuristic_critique, parse_generated_critique, WritingCritique};

/// Keyword tagging of goal rows into life-area categories
pub mod categorizer {
    use serde::Serialize;
    use std::collections::BTreeMap;

    /// Category labels in match order, each with its substring keywords.
    const KEYWORDS: &[(&str, &[&str])] = &[
        ("Writing", &["poem", "poetry", "write", "draft", "edit", "essay", "screenplay", "script"]),
        ("Mental Health", &["sleep", "nsdr", "meditat", "breath", "gratitude", "journal"]),
        ("Career", &["interview", "communication", "portfolio", "job", "resume", "network", "pm", "product"]),
        ("Learning", &["read", "study", "course", "lecture", "math", "bayes", "probability", "active inference"]),
    ];

    /// Display metadata for canonical category keys.
    const CATEGORY_META: &[(&str, &str, &str)] = &[
        ("career", "💼", "Career"),
        ("writing", "✍️", "Writing"),
        ("research", "🔬", "Research / Active Inference"),
        ("mental health", "🧘", "Mental Health"),
        ("learning", "📚", "Learning"),
    ];

    /// Categorization result
    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
    pub struct CategoryResult {
        pub categories: Vec<&'static str>,
        pub multi_goal: bool,
    }

    impl CategoryResult {
        /// Comma-joined labels, empty when nothing matched.
        pub fn joined(&self) -> String {
            self.categories.join(",")
        }
    }

    /// Tag a task from its title and objective text.
    pub fn categorize(task: &str, objective: &str) -> CategoryResult {
        let text = format!("{task} {objective}").to_lowercase();
        let categories: Vec<&'static str> = KEYWORDS
            .iter()
            .filter(|(_, kws)| kws.iter().any(|k| text.contains(k)))
            .map(|(label, _)| *label)
            .collect();
        CategoryResult {
            multi_goal: categories.len() > 1,
            categories,
        }
    }

    /// Fold a free-form category or domain into one of the known keys.
    pub fn canonical_category(raw: &str) -> String {
        let slug = raw.trim().to_lowercase();
        if slug.is_empty() {
            return "general".to_string();
        }
        if CATEGORY_META.iter().any(|(key, _, _)| *key == slug) {
            return slug;
        }
        let known = if slug.contains("career") {
            "career"
        } else if slug.contains("write") || slug.contains("poetry") {
            "writing"
        } else if slug.contains("research") || slug.contains("inference") {
            "research"
        } else if slug.contains("mental") || slug.contains("health") {
            "mental health"
        } else if slug.contains("learn") || slug.contains("study") {
            "learning"
        } else {
            return slug;
        };
        known.to_string()
    }

    /// "<emoji> <label>" for a canonical key; unknown keys are title-cased.
    pub fn display_name(key: &str) -> String {
        match CATEGORY_META.iter().find(|(k, _, _)| *k == key) {
            Some((_, emoji, label)) => format!("{emoji} {label}"),
            None => key
                .split(' ')
                .map(|w| {
                    let mut chars = w.chars();
                    match chars.next() {
                        Some(c) => c.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<String>>()
                .join(" "),
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
    pub struct CategorySummary {
        pub by_category: BTreeMap<String, usize>,
        pub multi_goal_tasks: usize,
    }

    /// Count tasks per category label; multi-category tasks count once per label.
    pub fn summarize<'a>(results: impl IntoIterator<Item = &'a CategoryResult>) -> CategorySummary {
        let mut summary = CategorySummary::default();
        for r in results {
            for c in &r.categories {
                *summary.by_category.entry((*c).to_string()).or_insert(0) += 1;
            }
            if r.multi_goal {
                summary.multi_goal_tasks += 1;
            }
        }
        summary
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_categorize_writing() {
            let result = categorize("Draft sonnet", "Poetry Book");
            assert_eq!(result.categories, vec!["Writing"]);
            assert!(!result.multi_goal);
        }

        #[test]
        fn test_categorize_multi_goal() {
            let result = categorize("Write interview stories", "Interview Prep");
            assert_eq!(result.joined(), "Writing,Career");
            assert!(result.multi_goal);
        }

        #[test]
        fn test_categorize_nothing() {
            let result = categorize("Walk the dog", "");
            assert!(result.categories.is_empty());
            assert_eq!(result.joined(), "");
        }

        #[test]
        fn test_canonical_category() {
            assert_eq!(canonical_category(""), "general");
            assert_eq!(canonical_category("Writing"), "writing");
            assert_eq!(canonical_category("CAREER ADVANCEMENT"), "career");
            assert_eq!(canonical_category("RESEARCH & THEORY"), "research");
            assert_eq!(canonical_category("Mental Health"), "mental health");
            assert_eq!(canonical_category("Fitness"), "fitness");
        }

        #[test]
        fn test_display_name() {
            assert_eq!(display_name("career"), "💼 Career");
            assert_eq!(display_name("personal growth"), "Personal Growth");
        }

        #[test]
        fn test_summarize() {
            let rows = [
                categorize("Write essay", ""),
                categorize("Breathwork then journal about the job search", ""),
                categorize("Walk", ""),
            ];
            let s = summarize(rows.iter());
            assert_eq!(s.by_category["Writing"], 1);
            assert_eq!(s.by_category["Mental Health"], 1);
            assert_eq!(s.by_category["Career"], 1);
            assert_eq!(s.multi_goal_tasks, 1);
        }
    }
}

pub use categorizer::{canonical_category, categorize, summarize, CategoryResult, CategorySummary};
