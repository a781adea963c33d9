//! Task model.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Creation time in epoch milliseconds, bumped when needed to stay unique.
pub type TaskId = i64;

/// Core task type. Field names match the persisted JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,

    /// Absolute due instant (UTC). Fixed at creation.
    pub due_date_time: Option<DateTime<Utc>>,

    /// Notify when due.
    pub reminder: bool,

    /// Set once the reminder has fired; never reset.
    pub reminded: bool,
}

impl Task {
    pub fn new(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            due_date_time: None,
            reminder: false,
            reminded: false,
        }
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due_date_time = Some(due);
        self
    }

    pub fn with_reminder(mut self, reminder: bool) -> Self {
        self.reminder = reminder;
        self
    }

    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Due and not completed at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due_date_time.is_some_and(|due| due < now)
    }

    /// A reminder is waiting to fire at or before `now`.
    pub fn reminder_due(&self, now: DateTime<Utc>) -> bool {
        self.reminder
            && !self.reminded
            && !self.completed
            && self.due_date_time.is_some_and(|due| due <= now)
    }
}

/// Input to `TaskStore::add`, as collected from the add form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub text: String,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub reminder: bool,
}

impl NewTask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn due_on(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.due_time = Some(time);
        self
    }

    pub fn remind(mut self) -> Self {
        self.reminder = true;
        self
    }
}

/// Lenient persisted shape: older saves may lack the optional fields, or
/// carry `null` or `""` in their place.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredTask {
    id: TaskId,
    text: String,
    #[serde(default)]
    completed: Option<bool>,
    #[serde(default, deserialize_with = "lenient_due")]
    due_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    reminder: Option<bool>,
    #[serde(default)]
    reminded: Option<bool>,
}

/// Blank, null and unparseable due values all mean "no due time".
fn lenient_due<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    let Some(s) = raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(Some(dt.with_timezone(&Utc))),
        Err(e) => {
            tracing::warn!(value = s, error = %e, "unreadable dueDateTime; dropping it");
            Ok(None)
        }
    }
}

impl From<StoredTask> for Task {
    fn from(raw: StoredTask) -> Self {
        Self {
            id: raw.id,
            text: raw.text,
            completed: raw.completed.unwrap_or(false),
            due_date_time: raw.due_date_time,
            reminder: raw.reminder.unwrap_or(false),
            reminded: raw.reminded.unwrap_or(false),
        }
    }
}
