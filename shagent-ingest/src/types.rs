use serde::{Deserialize, Serialize};
use shagent_core::{EnergyLevel, Task};

/// Normalized goal-sheet row (source-agnostic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRow {
    /// Zero-based row index in the source sheet.
    pub id: String,
    pub task: String,
    pub domain: String,
    pub objective: String,
    pub minutes: i64,
    pub energy: EnergyLevel,
    /// 1 = most urgent.
    pub priority: u32,
    /// Free-form sheet status; "Done" marks the row inactive.
    pub status: String,
    pub time_of_day: String,
}

impl GoalRow {
    pub fn is_active(&self) -> bool {
        self.status.trim() != "Done"
    }

    /// "<domain> - <objective>", trimmed when either side is blank.
    pub fn domain_label(&self) -> String {
        format!("{} - {}", self.domain, self.objective)
            .trim_matches([' ', '-'])
            .to_string()
    }

    pub fn to_task(&self) -> Task {
        let mut tags = Vec::new();
        if !self.domain.is_empty() {
            tags.push(self.domain.clone());
        }
        Task::new(self.id.clone(), self.task.clone())
            .with_duration(self.minutes)
            .with_energy(self.energy)
            .with_priority(self.priority)
            .with_tags(tags)
    }
}
