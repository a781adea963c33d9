//! TaskStore: the single owner of the in-memory task list.
//!
//! Every mutation writes the whole list through the storage adapter before
//! returning. Operations addressed to an unknown id are no-ops, so a stale id
//! from an old render is harmless.

use chrono::{DateTime, Utc};

use crate::error::TaskError;
use crate::filter::Filter;
use crate::storage::{load_tasks, save_tasks, KeyValueStore};
use crate::task::{NewTask, Task, TaskId};
use crate::time::{combine_due, Zone};

#[derive(Debug)]
pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    storage: S,
    key: String,
    zone: Zone,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Load whatever is stored under `key`. Never fails.
    pub fn open(storage: S, key: impl Into<String>, zone: Zone) -> Self {
        let mut store = Self {
            tasks: Vec::new(),
            storage,
            key: key.into(),
            zone,
        };
        store.load();
        store
    }

    /// Replace the in-memory list with the stored one.
    pub fn load(&mut self) {
        self.tasks = load_tasks(&self.storage, &self.key);
        tracing::debug!(key = %self.key, count = self.tasks.len(), "loaded tasks");
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks not yet completed, across the whole list.
    pub fn active_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_active()).count()
    }

    /// Tasks matching `filter`, in insertion order. Clone the iterator to
    /// walk it again.
    pub fn filtered(&self, filter: Filter) -> impl Iterator<Item = &Task> + Clone {
        self.tasks.iter().filter(move |t| filter.matches(t))
    }

    pub fn add(&mut self, input: NewTask) -> Result<Task, TaskError> {
        self.add_at(input, Utc::now())
    }

    /// `add` with an explicit creation time; the id derives from it.
    pub fn add_at(&mut self, input: NewTask, now: DateTime<Utc>) -> Result<Task, TaskError> {
        let text = input.text.trim();
        if text.is_empty() {
            return Err(TaskError::Validation);
        }

        let due = combine_due(input.due_date, input.due_time, self.zone)?;

        let mut task = Task::new(self.next_id(now)?, text).with_reminder(input.reminder);
        task.due_date_time = due;

        self.tasks.push(task.clone());
        self.persist()?;

        tracing::info!(id = task.id, due = ?task.due_date_time, reminder = task.reminder, "added task");
        Ok(task)
    }

    /// Returns whether a task was removed.
    pub fn delete(&mut self, id: TaskId) -> Result<bool, TaskError> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        let removed = self.tasks.len() != before;
        self.persist()?;
        if removed {
            tracing::info!(id, "deleted task");
        }
        Ok(removed)
    }

    /// Flip `completed`. Returns the new value, or `None` for an unknown id.
    pub fn toggle_complete(&mut self, id: TaskId) -> Result<Option<bool>, TaskError> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        task.completed = !task.completed;
        let completed = task.completed;
        self.persist()?;
        Ok(Some(completed))
    }

    /// Replace the text. Blank input is a cancelled edit, not an error.
    /// Returns whether anything changed.
    pub fn edit(&mut self, id: TaskId, new_text: &str) -> Result<bool, TaskError> {
        let text = new_text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if task.text == text {
            return Ok(false);
        }
        task.text = text.to_string();
        self.persist()?;
        Ok(true)
    }

    /// Remove every completed task. Returns how many went.
    pub fn clear_completed(&mut self) -> Result<usize, TaskError> {
        let before = self.tasks.len();
        self.tasks.retain(Task::is_active);
        let removed = before - self.tasks.len();
        self.persist()?;
        if removed > 0 {
            tracing::info!(removed, "cleared completed tasks");
        }
        Ok(removed)
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    pub(crate) fn persist(&mut self) -> Result<(), TaskError> {
        save_tasks(&mut self.storage, &self.key, &self.tasks)?;
        Ok(())
    }

    fn next_id(&self, now: DateTime<Utc>) -> Result<TaskId, TaskError> {
        let candidate = now.timestamp_millis();
        let Some(max) = self.tasks.iter().map(|t| t.id).max() else {
            return Ok(candidate);
        };
        if candidate > max {
            return Ok(candidate);
        }
        if let Some(id) = max.checked_add(1) {
            return Ok(id);
        }
        // The top of the id range is taken: reuse the first free id from now on.
        (candidate..=TaskId::MAX)
            .find(|id| self.get(*id).is_none())
            .ok_or(TaskError::IdsExhausted)
    }
}
