//! Renderer projection: turns the filtered task list into display rows.
//!
//! Pure: same tasks, filter and clock give the same view. Surfaces (terminal
//! UI, plain `list` output) draw a `ListView` in full on every change.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::filter::Filter;
use crate::task::{Task, TaskId};
use crate::time::Zone;

pub const REMINDER_LABEL: &str = "Reminder on";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DueKind {
    Overdue,
    Due,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueLabel {
    pub kind: DueKind,
    pub formatted: String,
}

impl DueLabel {
    pub fn text(&self) -> String {
        let prefix = match self.kind {
            DueKind::Overdue => "Overdue",
            DueKind::Due => "Due",
        };
        format!("{prefix} • {}", self.formatted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub due: Option<DueLabel>,
    pub reminder_on: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListView {
    pub filter: Filter,
    pub rows: Vec<TaskRow>,
    pub active_count: usize,
}

impl ListView {
    pub fn footer(&self) -> String {
        remaining_label(self.active_count)
    }
}

/// "1 task remaining", "0 tasks remaining", "3 tasks remaining".
pub fn remaining_label(active: usize) -> String {
    let plural = if active == 1 { "" } else { "s" };
    format!("{active} task{plural} remaining")
}

pub fn project_row(task: &Task, now: DateTime<Utc>, zone: Zone) -> TaskRow {
    let due = task.due_date_time.map(|at| DueLabel {
        kind: if task.is_overdue(now) {
            DueKind::Overdue
        } else {
            DueKind::Due
        },
        formatted: zone.format(at),
    });

    TaskRow {
        id: task.id,
        text: task.text.clone(),
        completed: task.completed,
        due,
        reminder_on: task.reminder && task.due_date_time.is_some(),
    }
}

/// Build the full view. `active_count` covers the whole list, not just the
/// filtered rows.
pub fn project<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    filter: Filter,
    active_count: usize,
    now: DateTime<Utc>,
    zone: Zone,
) -> ListView {
    ListView {
        filter,
        rows: tasks
            .into_iter()
            .map(|t| project_row(t, now, zone))
            .collect(),
        active_count,
    }
}
