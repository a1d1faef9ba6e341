//! NextTaskAdvisor: pick one next action from attention, time of day,
//! focus budget and task readiness.
//!
//! Pure function of its inputs. The caller owns the last attention ping and
//! passes it in on every call.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::focus::FocusStatus;
use crate::task::{EnergyLevel, TrackedTask};

/// Attention assumed when no ping has been recorded.
pub const DEFAULT_ATTENTION: f64 = 0.5;

const MORNING_PEAK_HOURS: std::ops::Range<u32> = 6..11;
const PEAK_ATTENTION: f64 = 0.65;
const LOW_ATTENTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceAction {
    Rest,
    Celebrate,
    GatherContext,
    StartTask,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub action: AdviceAction,
    pub message: String,
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<i64>,
}

impl Advisory {
    fn plain(action: AdviceAction, message: &str, rationale: &str) -> Self {
        Self {
            action,
            message: message.to_string(),
            rationale: rationale.to_string(),
            task_id: None,
            title: None,
            estimated_minutes: None,
        }
    }

    fn for_task(action: AdviceAction, t: &TrackedTask, message: String, rationale: &str) -> Self {
        Self {
            action,
            message,
            rationale: rationale.to_string(),
            task_id: Some(t.task.id.clone()),
            title: Some(t.task.title.clone()),
            estimated_minutes: (action == AdviceAction::StartTask).then_some(t.task.duration_minutes),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvisorInput {
    /// Latest attention score, 0.0-1.0.
    pub attention: f64,
    /// Local hour of day, 0-23.
    pub hour: u32,
    pub focus: FocusStatus,
}

impl AdvisorInput {
    pub fn new(attention: f64, hour: u32, focus: FocusStatus) -> Result<Self> {
        if hour > 23 {
            return Err(CoreError::invalid(format!("hour must be within 0..=23 (got {hour})")));
        }
        Ok(Self {
            attention: check_attention(attention)?,
            hour,
            focus,
        })
    }
}

/// Attention scores live in 0.0..=1.0; anything else (NaN included) is rejected.
pub fn check_attention(score: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(CoreError::invalid(format!(
            "attention score must be within 0.0..=1.0 (got {score})"
        )))
    }
}

/// Recommend the next action. First matching rule wins:
/// 1. focus cap reached -> rest
/// 2. nothing active -> celebrate
/// 3. a task needs context -> gather context for the highest-priority one
/// 4. nothing ready or in progress -> celebrate
/// 5. morning peak with high attention -> a ready high-energy task
/// 6. low attention -> a ready low-energy task
/// 7. otherwise the highest-priority ready/in-progress task
pub fn advise(input: &AdvisorInput, tasks: &[TrackedTask]) -> Advisory {
    if input.focus.limit_reached {
        return Advisory::plain(
            AdviceAction::Rest,
            "You've hit your daily focus limit. Time to recharge.",
            "Focus cap reached",
        );
    }

    if tasks.is_empty() {
        return Advisory::plain(
            AdviceAction::Celebrate,
            "You've cleared your priority list!",
            "No active tasks remain",
        );
    }

    let mut ordered: Vec<&TrackedTask> = tasks.iter().collect();
    ordered.sort_by_key(|t| {
        (
            t.task.priority,
            std::cmp::Reverse(t.task.energy.rank()),
            t.task.duration_minutes,
        )
    });

    if let Some(t) = ordered.iter().find(|t| t.status == crate::task::TaskStatus::NeedsContext) {
        return Advisory::for_task(
            AdviceAction::GatherContext,
            t,
            format!("Let's gather context for: {}", t.task.title),
            "Highest priority task still needs context",
        );
    }

    let workable: Vec<&TrackedTask> = ordered.into_iter().filter(|t| t.status.is_workable()).collect();
    let Some(first) = workable.first() else {
        return Advisory::plain(
            AdviceAction::Celebrate,
            "You're clear for the day!",
            "All tasks need context or are complete",
        );
    };

    let pick = |energy: EnergyLevel| workable.iter().find(|t| t.task.energy == energy);

    if MORNING_PEAK_HOURS.contains(&input.hour) && input.attention > PEAK_ATTENTION {
        if let Some(t) = pick(EnergyLevel::High) {
            return Advisory::for_task(
                AdviceAction::StartTask,
                t,
                format!("Peak morning energy! Start: {}", t.task.title),
                "High attention window for deep work",
            );
        }
    }

    if input.attention < LOW_ATTENTION {
        if let Some(t) = pick(EnergyLevel::Low) {
            return Advisory::for_task(
                AdviceAction::StartTask,
                t,
                format!("Low energy? Try: {}", t.task.title),
                "Lower focus required task recommended",
            );
        }
    }

    Advisory::for_task(
        AdviceAction::StartTask,
        first,
        format!("Next up: {}", first.task.title),
        "Highest priority task that's ready",
    )
}

/// Short nudge for an attention ping.
pub fn attention_nudge(score: f64) -> &'static str {
    if score < 0.35 {
        "Stand, breathe 4x, 30 sec reset. Then resume."
    } else if score < 0.6 {
        "Trim the task to one concrete step and continue for 10 minutes."
    } else {
        "Protect focus. Silence notifications for 25 minutes."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::FocusStatus;
    use crate::task::{Task, TaskStatus};

    fn input(attention: f64, hour: u32) -> AdvisorInput {
        AdvisorInput {
            attention,
            hour,
            focus: FocusStatus::from_total(0, 240),
        }
    }

    fn tracked(id: &str, prio: u32, energy: EnergyLevel, status: TaskStatus) -> TrackedTask {
        TrackedTask::new(
            Task::new(id, format!("task {id}")).with_priority(prio).with_energy(energy),
            status,
        )
    }

    #[test]
    fn rest_when_cap_reached() {
        let mut i = input(0.9, 9);
        i.focus = FocusStatus::from_total(240, 240);
        let a = advise(&i, &[tracked("1", 1, EnergyLevel::High, TaskStatus::Ready)]);
        assert_eq!(a.action, AdviceAction::Rest);
        assert!(a.task_id.is_none());
    }

    #[test]
    fn out_of_range_attention_rejected() {
        let focus = FocusStatus::from_total(0, 240);
        assert!(AdvisorInput::new(7.0, 9, focus).unwrap_err().is_invalid_input());
        assert!(AdvisorInput::new(-0.1, 9, focus).unwrap_err().is_invalid_input());
        assert!(AdvisorInput::new(f64::NAN, 9, focus).unwrap_err().is_invalid_input());
        assert!(AdvisorInput::new(0.5, 24, focus).unwrap_err().is_invalid_input());

        let ok = AdvisorInput::new(1.0, 9, focus).unwrap();
        assert_eq!(ok, input(1.0, 9));
        assert_eq!(check_attention(0.0).unwrap(), 0.0);
    }

    #[test]
    fn celebrate_when_empty() {
        assert_eq!(advise(&input(0.5, 12), &[]).action, AdviceAction::Celebrate);
    }

    #[test]
    fn gather_context_targets_highest_priority() {
        let tasks = vec![
            tracked("a", 3, EnergyLevel::Low, TaskStatus::NeedsContext),
            tracked("b", 1, EnergyLevel::High, TaskStatus::Ready),
            tracked("c", 2, EnergyLevel::Medium, TaskStatus::NeedsContext),
        ];
        let a = advise(&input(0.9, 9), &tasks);
        assert_eq!(a.action, AdviceAction::GatherContext);
        assert_eq!(a.task_id.as_deref(), Some("c"));
    }

    #[test]
    fn celebrate_when_only_completed() {
        let tasks = vec![tracked("a", 1, EnergyLevel::Low, TaskStatus::Completed)];
        let a = advise(&input(0.5, 12), &tasks);
        assert_eq!(a.action, AdviceAction::Celebrate);
        assert_eq!(a.rationale, "All tasks need context or are complete");
    }

    #[test]
    fn morning_peak_prefers_high_energy() {
        let tasks = vec![
            tracked("low", 1, EnergyLevel::Low, TaskStatus::Ready),
            tracked("deep", 4, EnergyLevel::High, TaskStatus::Ready),
        ];
        let a = advise(&input(0.8, 8), &tasks);
        assert_eq!(a.action, AdviceAction::StartTask);
        assert_eq!(a.task_id.as_deref(), Some("deep"));
        assert_eq!(a.estimated_minutes, Some(50));

        // Same attention in the afternoon falls through to priority order.
        let a = advise(&input(0.8, 14), &tasks);
        assert_eq!(a.task_id.as_deref(), Some("low"));
    }

    #[test]
    fn low_attention_prefers_low_energy() {
        let tasks = vec![
            tracked("hard", 1, EnergyLevel::High, TaskStatus::InProgress),
            tracked("easy", 5, EnergyLevel::Low, TaskStatus::Ready),
        ];
        let a = advise(&input(0.3, 15), &tasks);
        assert_eq!(a.task_id.as_deref(), Some("easy"));
    }

    #[test]
    fn falls_back_to_first_workable() {
        let tasks = vec![
            tracked("done", 1, EnergyLevel::Medium, TaskStatus::Completed),
            tracked("wip", 2, EnergyLevel::Medium, TaskStatus::InProgress),
            tracked("next", 3, EnergyLevel::Medium, TaskStatus::Ready),
        ];
        let a = advise(&input(0.3, 9), &tasks);
        assert_eq!(a.task_id.as_deref(), Some("wip"));
        assert_eq!(a.message, "Next up: task wip");
    }

    #[test]
    fn nudges_by_attention_band() {
        assert!(attention_nudge(0.2).starts_with("Stand"));
        assert!(attention_nudge(0.5).starts_with("Trim"));
        assert!(attention_nudge(0.9).starts_with("Protect"));
    }
}
