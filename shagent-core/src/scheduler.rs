//! SlotScheduler — greedy single-pass placement of tasks over one day.
//!
//! The sweep walks a cursor from day start to day end. At each position it
//! reads the energy level, pulls the first admissible task from the queue and
//! tries to place it in a contiguous slot. There is no backtracking: a task
//! whose slot hits a busy interval is dropped, and a task that would run past
//! day end stops the sweep.
//!
//! Guarantees of the emitted plan:
//! - `block.end - block.start == task.duration_minutes`
//! - blocks are ordered and never overlap each other
//! - no block overlaps a busy interval
//! - every block lies within `[day_start, day_end]`

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::calendar::{BusyCalendar, BusyInterval};
use crate::energy::EnergyCurve;
use crate::error::{CoreError, Result};
use crate::task::Task;
use crate::task_queue::TaskQueue;

/// Step sizes and block lengths for the sweep (minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    /// Standard focus block; a day shorter than this yields an empty plan.
    pub block_minutes: i64,
    /// Gap inserted after every placed task.
    pub break_minutes: i64,
    /// The sweep continues while `cursor + min_step <= day_end`.
    pub min_step_minutes: i64,
    /// Advance when no pending task is admissible at the cursor.
    pub idle_step_minutes: i64,
    /// Advance after a task is dropped on a busy conflict.
    pub conflict_step_minutes: i64,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            block_minutes: 50,
            break_minutes: 10,
            min_step_minutes: 5,
            idle_step_minutes: 30,
            conflict_step_minutes: 15,
        }
    }
}

impl ScheduleOptions {
    pub fn validate(&self) -> Result<()> {
        if self.block_minutes <= 0 {
            return Err(CoreError::invalid("block_minutes must be positive"));
        }
        if self.break_minutes < 0 {
            return Err(CoreError::invalid("break_minutes must not be negative"));
        }
        for (name, v) in [
            ("min_step_minutes", self.min_step_minutes),
            ("idle_step_minutes", self.idle_step_minutes),
            ("conflict_step_minutes", self.conflict_step_minutes),
        ] {
            if v <= 0 {
                return Err(CoreError::invalid(format!("{name} must be positive")));
            }
        }
        Ok(())
    }
}

/// One placed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedBlock {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub task: Task,
    /// Energy level read at `start`.
    pub energy: f64,
}

impl PlannedBlock {
    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

#[derive(Debug, Clone)]
pub struct SlotScheduler {
    energy: EnergyCurve,
    busy: BusyCalendar,
    options: ScheduleOptions,
}

impl SlotScheduler {
    pub fn new(energy: EnergyCurve, busy: BusyCalendar) -> Self {
        Self {
            energy,
            busy,
            options: ScheduleOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScheduleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }

    pub fn energy(&self) -> &EnergyCurve {
        &self.energy
    }

    pub fn busy(&self) -> &BusyCalendar {
        &self.busy
    }

    /// Place `tasks` between `day_start` and `day_end`.
    ///
    /// Tasks that never become admissible, do not fit before day end, or hit
    /// a busy interval are left out of the result; compare against the input
    /// with [`unscheduled`] to find them.
    pub fn build_plan(
        &self,
        tasks: Vec<Task>,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> Result<Vec<PlannedBlock>> {
        self.options.validate()?;
        if day_end < day_start {
            return Err(CoreError::invalid(format!(
                "day end {day_end} is before day start {day_start}"
            )));
        }
        for t in &tasks {
            t.validate()?;
        }

        let opts = self.options;
        if advance(day_start, opts.block_minutes).is_none_or(|t| t > day_end) {
            info!(
                block_minutes = opts.block_minutes,
                "day shorter than one focus block; nothing to plan"
            );
            return Ok(Vec::new());
        }

        let mut queue = TaskQueue::new(tasks);
        let mut plan: Vec<PlannedBlock> = Vec::new();
        let mut cursor = day_start;

        while advance(cursor, opts.min_step_minutes).is_some_and(|t| t <= day_end) && !queue.is_empty() {
            let slot_energy = self.energy.level_at(cursor);

            let Some(task) = queue.pop_first_matching(|t| t.energy.admits(slot_energy)) else {
                debug!(%cursor, slot_energy, "no admissible task; stepping");
                match advance(cursor, opts.idle_step_minutes) {
                    Some(next) => cursor = next,
                    None => break,
                }
                continue;
            };

            let slot_end = match advance(cursor, task.duration_minutes) {
                Some(end) if end <= day_end => end,
                _ => {
                    debug!(task = %task.id, minutes = task.duration_minutes, "task runs past day end; stopping sweep");
                    break;
                }
            };

            if self.busy.is_free(cursor, slot_end) {
                debug!(task = %task.id, start = %cursor, end = %slot_end, slot_energy, "placed");
                plan.push(PlannedBlock {
                    start: cursor,
                    end: slot_end,
                    task,
                    energy: slot_energy,
                });
                match advance(slot_end, opts.break_minutes) {
                    Some(next) => cursor = next,
                    None => break,
                }
            } else {
                let blocking: Vec<&str> = self
                    .busy
                    .conflicts(cursor, slot_end)
                    .into_iter()
                    .map(|b| b.label.as_str())
                    .collect();
                debug!(task = %task.id, %cursor, ?blocking, "busy conflict; dropping task");
                match advance(cursor, opts.conflict_step_minutes) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
        }

        info!(placed = plan.len(), pending = queue.len(), "plan built");
        Ok(plan)
    }
}

/// `at + minutes`, or `None` when the result leaves chrono's range.
fn advance(at: NaiveDateTime, minutes: i64) -> Option<NaiveDateTime> {
    Duration::try_minutes(minutes).and_then(|d| at.checked_add_signed(d))
}

/// Single function-level entry point for HTTP/CLI wrappers.
pub fn build_plan(
    tasks: Vec<Task>,
    day_start: NaiveDateTime,
    day_end: NaiveDateTime,
    energy: &EnergyCurve,
    busy: Vec<BusyInterval>,
    options: ScheduleOptions,
) -> Result<Vec<PlannedBlock>> {
    SlotScheduler::new(energy.clone(), BusyCalendar::new(busy))
        .with_options(options)
        .build_plan(tasks, day_start, day_end)
}

/// Input tasks that did not make it into `plan` (matched by id).
pub fn unscheduled<'a>(tasks: &'a [Task], plan: &[PlannedBlock]) -> Vec<&'a Task> {
    let placed: HashSet<&str> = plan.iter().map(|b| b.task.id.as_str()).collect();
    tasks
        .iter()
        .filter(|t| !placed.contains(t.id.as_str()))
        .collect()
}
