//! Task model consumed by the scheduler and the advisor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Energy a task demands from the slot it is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    Low,
    Medium,
    High,
}

impl EnergyLevel {
    /// Queue ordering rank: cheaper tasks sort first among equal priority.
    pub fn rank(self) -> u8 {
        match self {
            EnergyLevel::Low => 0,
            EnergyLevel::Medium => 1,
            EnergyLevel::High => 2,
        }
    }

    /// Minimum slot energy required to place a task of this level.
    pub fn threshold(self) -> f64 {
        match self {
            EnergyLevel::Low => 0.5,
            EnergyLevel::Medium => 0.75,
            EnergyLevel::High => 0.95,
        }
    }

    pub fn admits(self, slot_energy: f64) -> bool {
        slot_energy >= self.threshold()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EnergyLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(EnergyLevel::Low),
            "medium" | "med" => Ok(EnergyLevel::Medium),
            "high" => Ok(EnergyLevel::High),
            other => Err(CoreError::invalid(format!(
                "energy must be low, medium or high (got '{other}')"
            ))),
        }
    }
}

/// Readiness of a task as seen by the advisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "needs-info", alias = "needs-context")]
    NeedsContext,
    #[serde(rename = "ready")]
    Ready,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "completed")]
    Completed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NeedsContext => "needs-info",
            TaskStatus::Ready => "ready",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Ready or already started.
    pub fn is_workable(self) -> bool {
        matches!(self, TaskStatus::Ready | TaskStatus::InProgress)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "needs-info" | "needs-context" => Ok(TaskStatus::NeedsContext),
            "ready" => Ok(TaskStatus::Ready),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(CoreError::invalid(format!(
                "status must be one of needs-info, ready, in-progress, completed (got '{other}')"
            ))),
        }
    }
}

/// Core task type.
///
/// Tasks are rebuilt per request; the scheduler only reorders a working copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,

    /// Minutes.
    pub duration_minutes: i64,

    pub energy: EnergyLevel,

    /// 1 = most urgent; larger is less urgent.
    pub priority: u32,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration_minutes: 50,
            energy: EnergyLevel::Medium,
            priority: 3,
            tags: Vec::new(),
        }
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_energy(mut self, energy: EnergyLevel) -> Self {
        self.energy = energy;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::invalid(format!("task {}: title must be non-empty", self.id)));
        }
        if self.duration_minutes <= 0 {
            return Err(CoreError::invalid(format!(
                "task {}: duration must be positive (got {})",
                self.id, self.duration_minutes
            )));
        }
        Ok(())
    }
}

/// A task together with its readiness, as fed to the advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedTask {
    pub task: Task,
    pub status: TaskStatus,
}

impl TrackedTask {
    pub fn new(task: Task, status: TaskStatus) -> Self {
        Self { task, status }
    }
}
