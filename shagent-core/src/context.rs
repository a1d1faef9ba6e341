//! Task context: free-text answers that make a task actionable, and the
//! readiness status derived from them.
//!
//! Storage is behind [`ContextStore`]; the policy functions here are pure.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::task::TaskStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContext {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub answers: BTreeMap<String, String>,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

/// task id -> context entry.
pub type ContextMap = BTreeMap<String, TaskContext>;

pub trait ContextStore {
    fn load_all(&self) -> Result<ContextMap>;
    fn save_all(&mut self, contexts: &ContextMap) -> Result<()>;
}

/// (domain, objective, questions)
const QUESTION_BANK: &[(&str, &str, &[&str])] = &[
    (
        "PRODUCT LEADERSHIP",
        "Discovery Engine (PM)",
        &[
            "What is your current LinkedIn post topic/draft?",
            "Which Active Inference concept are you explaining this week?",
            "What research papers or examples will you cite?",
        ],
    ),
    (
        "PRODUCT LEADERSHIP",
        "Better Self App",
        &[
            "What feature are you working on right now?",
            "What is your current design/code state?",
            "What specific user problem are you solving?",
        ],
    ),
    (
        "RESEARCH & THEORY",
        "Active Inference Fellow",
        &[
            "What is your current Colab notebook URL?",
            "Which specific function/module are you implementing?",
            "What pseudocode or paper references do you have ready?",
        ],
    ),
    (
        "RESEARCH & THEORY",
        "Narrative Research",
        &[
            "What section of the paper are you working on?",
            "What research have you gathered so far?",
            "What is your current draft word count/status?",
        ],
    ),
    (
        "CREATIVE EXPRESSION",
        "Poetry Book",
        &[
            "What day of the 28-day syllabus are you on?",
            "What poetic form are you practicing today (iambic pentameter, heroic couplets, etc.)?",
            "What draft poems do you currently have in progress?",
        ],
    ),
    (
        "CREATIVE EXPRESSION",
        "Screenwriting",
        &[
            "What scene/act number are you working on?",
            "How many pages have you written so far?",
            "What is your target page count for this session?",
        ],
    ),
    (
        "CAREER ADVANCEMENT",
        "Job Search",
        &[
            "Which 2 companies are you targeting today?",
            "Is your resume tailored for these specific roles?",
            "Have you researched both companies' recent news/projects?",
        ],
    ),
    (
        "CAREER ADVANCEMENT",
        "Interview Prep",
        &[
            "Which company/role is this interview for?",
            "What interview format (behavioral, technical, case study)?",
            "What specific prep materials do you have?",
        ],
    ),
];

/// Questions to answer before a task under (domain, objective) is actionable.
pub fn context_questions(domain: &str, objective: &str) -> &'static [&'static str] {
    QUESTION_BANK
        .iter()
        .find(|(d, o, _)| *d == domain && *o == objective)
        .map(|(_, _, q)| *q)
        .unwrap_or(&[])
}

/// Derive a task's status from its stored context.
///
/// An explicit stored status wins. Mental-health work never waits on
/// context. Otherwise a task with open questions and no answers needs context.
pub fn classify_status(entry: Option<&TaskContext>, questions: &[&str], domain: &str) -> TaskStatus {
    if let Some(status) = entry.and_then(|e| e.status) {
        return status;
    }
    if domain.contains("Mental Health") {
        return TaskStatus::Ready;
    }
    let answered = entry.map(|e| !e.answers.is_empty()).unwrap_or(false);
    if !questions.is_empty() && !answered {
        return TaskStatus::NeedsContext;
    }
    TaskStatus::Ready
}

/// Store answers for `task_id`; the task becomes ready.
pub fn record_answers(
    contexts: &mut ContextMap,
    task_id: &str,
    answers: BTreeMap<String, String>,
    now: NaiveDateTime,
) -> TaskStatus {
    let entry = contexts.entry(task_id.to_string()).or_default();
    entry.answers = answers;
    entry.timestamp = Some(now);
    entry.status = Some(TaskStatus::Ready);
    TaskStatus::Ready
}

/// Force a status. Moving back to needs-info discards earlier answers.
pub fn set_status(contexts: &mut ContextMap, task_id: &str, status: TaskStatus, now: NaiveDateTime) {
    let entry = contexts.entry(task_id.to_string()).or_default();
    entry.status = Some(status);
    if status == TaskStatus::NeedsContext {
        entry.answers.clear();
    }
    entry.timestamp.get_or_insert(now);
}
