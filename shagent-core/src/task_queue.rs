//! TaskQueue — priority-ordered working set of pending tasks.
//!
//! Ordering is applied once, at construction:
//! - priority ASC (1 is most urgent)
//! - energy rank ASC (low < medium < high), so cheaper tasks win ties
//! - input order (stable sort) for anything still tied
//!
//! The queue is never re-sorted while the scheduler pulls from it.

use crate::task::Task;

#[derive(Debug, Default, Clone)]
pub struct TaskQueue {
    tasks: Vec<Task>,
}

impl TaskQueue {
    pub fn new(mut tasks: Vec<Task>) -> Self {
        tasks.sort_by_key(|t| (t.priority, t.energy.rank()));
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Remove and return the first task (in queue order) matching `pred`.
    /// `None` means no pending task matches.
    pub fn pop_first_matching<F>(&mut self, pred: F) -> Option<Task>
    where
        F: FnMut(&Task) -> bool,
    {
        let idx = self.tasks.iter().position(pred)?;
        Some(self.tasks.remove(idx))
    }

    /// Tasks still pending, in queue order.
    pub fn into_remaining(self) -> Vec<Task> {
        self.tasks
    }
}
