//! Reminder checker: a polling pass over the store that fires each due
//! reminder once.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::{Duration, Instant};

use crate::error::TaskError;
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use crate::task::{Task, TaskId};

/// What the user is shown when a reminder fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderNotice {
    pub task_id: TaskId,
    pub title: String,
    pub due_at_utc: DateTime<Utc>,
}

impl ReminderNotice {
    fn for_task(task: &Task, due_at_utc: DateTime<Utc>) -> Self {
        Self {
            task_id: task.id,
            title: format!("Reminder: {}", task.text),
            due_at_utc,
        }
    }
}

/// Delivery surface for reminder notices.
///
/// Delivery is best effort: the task is marked reminded whether or not this
/// succeeds.
pub trait Notifier {
    fn notify(&mut self, notice: &ReminderNotice) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct ReminderChecker {
    interval: Duration,
}

impl Default for ReminderChecker {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
        }
    }
}

impl ReminderChecker {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a loop that last ran a pass at `last` should run one now.
    pub fn due_for_pass(&self, last: Option<Instant>, now: Instant) -> bool {
        match last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Fire every reminder due at `now`, then persist once if anything fired.
    ///
    /// Returns the ids that fired, in list order.
    pub fn run_pass<S, N>(
        &self,
        store: &mut TaskStore<S>,
        now: DateTime<Utc>,
        notifier: &mut N,
    ) -> Result<Vec<TaskId>, TaskError>
    where
        S: KeyValueStore,
        N: Notifier + ?Sized,
    {
        let mut fired = Vec::new();

        for task in store.tasks_mut().iter_mut() {
            if !task.reminder_due(now) {
                continue;
            }
            let Some(due) = task.due_date_time else { continue };

            let notice = ReminderNotice::for_task(task, due);
            if let Err(e) = notifier.notify(&notice) {
                tracing::warn!(id = task.id, error = %e, "reminder delivery failed");
            }
            task.reminded = true;
            tracing::info!(id = task.id, due = %due, "reminder fired");
            fired.push(task.id);
        }

        if !fired.is_empty() {
            store.persist()?;
        }
        Ok(fired)
    }
}
