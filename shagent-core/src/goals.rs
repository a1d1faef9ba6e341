//! Goal descriptors (objective + key results) and their expansion into tasks.

use serde::{Deserialize, Serialize};

use crate::task::{EnergyLevel, Task};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyResult {
    pub description: String,
    pub target: f64,
    #[serde(default)]
    pub unit: String,
}

impl KeyResult {
    pub fn new(description: impl Into<String>, target: f64) -> Self {
        Self {
            description: description.into(),
            target,
            unit: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub title: String,
    #[serde(default)]
    pub key_results: Vec<KeyResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub domain: String,
    pub objective: Objective,
    #[serde(default)]
    pub skills: Vec<String>,
    /// 1 high, 5 low.
    #[serde(default = "default_goal_priority")]
    pub priority: u32,
}

fn default_goal_priority() -> u32 {
    3
}

/// One focus-block task per key result, tagged with the goal's domain.
pub fn goals_to_tasks(goals: &[Goal], block_minutes: i64) -> Vec<Task> {
    let mut out = Vec::new();
    for (gi, g) in goals.iter().enumerate() {
        for (i, kr) in g.objective.key_results.iter().enumerate() {
            out.push(
                Task::new(
                    format!("goal-{gi}-kr-{}", i + 1),
                    format!("{} • KR{}: {}", g.objective.title, i + 1, kr.description),
                )
                .with_duration(block_minutes)
                .with_energy(EnergyLevel::Medium)
                .with_priority(g.priority)
                .with_tags([g.domain.clone()]),
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_expands_per_key_result() {
        let goal = Goal {
            domain: "Writing".to_string(),
            objective: Objective {
                title: "Publish one poem per week".to_string(),
                key_results: vec![
                    KeyResult::new("Draft and edit a new poem", 1.0),
                    KeyResult::new("Submit to one journal", 1.0),
                ],
            },
            skills: vec!["meter".to_string(), "imagery".to_string()],
            priority: 2,
        };

        let tasks = goals_to_tasks(&[goal], 50);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Publish one poem per week • KR1: Draft and edit a new poem");
        assert_eq!(tasks[1].id, "goal-0-kr-2");
        assert_eq!(tasks[0].priority, 2);
        assert_eq!(tasks[0].duration_minutes, 50);
        assert_eq!(tasks[0].tags, vec!["Writing".to_string()]);
    }

    #[test]
    fn test_goal_without_key_results_yields_nothing() {
        let goal: Goal = serde_json::from_str(
            r#"{"domain":"Career","objective":{"title":"Ship portfolio"}}"#,
        )
        .unwrap();
        assert_eq!(goal.priority, 3);
        assert!(goals_to_tasks(&[goal], 50).is_empty());
    }
}
