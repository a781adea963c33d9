//! Application shell: explicit command dispatch over one owned store.
//!
//! UI surfaces never touch the task list directly. Each interaction becomes a
//! `Command` carrying the task id it targets, and every command that can change
//! what is on screen marks the view dirty.

use chrono::{DateTime, Utc};

use crate::error::TaskError;
use crate::filter::{Filter, FilterController};
use crate::reminders::{Notifier, ReminderChecker};
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use crate::task::{NewTask, Task, TaskId};
use crate::view::{project, ListView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(NewTask),
    Toggle(TaskId),
    Edit { id: TaskId, text: String },
    Delete(TaskId),
    ClearCompleted,
    SetFilter(Filter),
}

/// What a dispatched command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(Task),
    Toggled { id: TaskId, completed: bool },
    Edited(TaskId),
    Deleted(TaskId),
    Cleared(usize),
    FilterChanged(Filter),
    /// Stale id or cancelled edit.
    Unchanged,
}

#[derive(Debug)]
pub struct App<S: KeyValueStore> {
    store: TaskStore<S>,
    filter: FilterController,
    reminders: ReminderChecker,
    dirty: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: TaskStore<S>, reminders: ReminderChecker) -> Self {
        Self {
            store,
            filter: FilterController::new(),
            reminders,
            // First frame always draws.
            dirty: true,
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn filter(&self) -> Filter {
        self.filter.current()
    }

    pub fn reminders(&self) -> &ReminderChecker {
        &self.reminders
    }

    /// Re-read the stored list; another `ticklist` process may have written it.
    pub fn reload(&mut self) {
        self.store.load();
        self.dirty = true;
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, TaskError> {
        tracing::debug!(?command, "dispatch");
        let result = self.execute(command);
        match &result {
            Ok(Outcome::Unchanged) => {}
            // A failed write keeps the in-memory change, so it still has to show.
            Ok(_) | Err(TaskError::Storage(_)) => self.dirty = true,
            Err(_) => {}
        }
        result
    }

    fn execute(&mut self, command: Command) -> Result<Outcome, TaskError> {
        let outcome = match command {
            Command::Add(input) => Outcome::Added(self.store.add(input)?),
            Command::Toggle(id) => match self.store.toggle_complete(id)? {
                Some(completed) => Outcome::Toggled { id, completed },
                None => Outcome::Unchanged,
            },
            Command::Edit { id, text } => {
                if self.store.edit(id, &text)? {
                    Outcome::Edited(id)
                } else {
                    Outcome::Unchanged
                }
            }
            Command::Delete(id) => {
                if self.store.delete(id)? {
                    Outcome::Deleted(id)
                } else {
                    Outcome::Unchanged
                }
            }
            Command::ClearCompleted => Outcome::Cleared(self.store.clear_completed()?),
            Command::SetFilter(filter) => {
                self.filter.set_filter(filter);
                Outcome::FilterChanged(filter)
            }
        };
        Ok(outcome)
    }

    /// One reminder pass. Requests a redraw when anything fired.
    pub fn run_reminders<N>(
        &mut self,
        now: DateTime<Utc>,
        notifier: &mut N,
    ) -> Result<Vec<TaskId>, TaskError>
    where
        N: Notifier + ?Sized,
    {
        let result = self.reminders.run_pass(&mut self.store, now, notifier);
        if !matches!(&result, Ok(fired) if fired.is_empty()) {
            self.dirty = true;
        }
        result
    }

    pub fn view(&self, now: DateTime<Utc>) -> ListView {
        let filter = self.filter.current();
        project(
            self.store.filtered(filter),
            filter,
            self.store.active_count(),
            now,
            self.store.zone(),
        )
    }

    /// Whether the surface must redraw; clears the request.
    pub fn take_redraw(&mut self) -> bool {
        let from_filter = self.filter.take_redraw();
        std::mem::take(&mut self.dirty) || from_filter
    }

    /// Force the next `take_redraw` to report true (terminal resize, modal
    /// dismissed).
    pub fn request_redraw(&mut self) {
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminders::ReminderNotice;
    use crate::storage::{MemoryStore, DEFAULT_KEY};
    use crate::time::Zone;
    use chrono::Duration;

    fn app() -> App<MemoryStore> {
        let store = TaskStore::open(MemoryStore::new(), DEFAULT_KEY, Zone::Local);
        App::new(store, ReminderChecker::default())
    }

    #[test]
    fn first_frame_draws_then_settles() {
        let mut a = app();
        assert!(a.take_redraw());
        assert!(!a.take_redraw());
    }

    #[test]
    fn mutations_and_filter_changes_request_redraw() {
        let mut a = app();
        a.take_redraw();

        let Outcome::Added(t) = a.dispatch(Command::Add(NewTask::new("read"))).unwrap() else {
            panic!("expected Added");
        };
        assert!(a.take_redraw());

        assert_eq!(
            a.dispatch(Command::Toggle(t.id)).unwrap(),
            Outcome::Toggled { id: t.id, completed: true }
        );
        assert!(a.take_redraw());

        a.dispatch(Command::SetFilter(Filter::Active)).unwrap();
        assert!(a.take_redraw());
        assert!(a.view(Utc::now()).rows.is_empty());
        assert_eq!(a.view(Utc::now()).footer(), "0 tasks remaining");
    }

    #[test]
    fn stale_ids_and_cancelled_edits_do_not_redraw() {
        let mut a = app();
        let Outcome::Added(t) = a.dispatch(Command::Add(NewTask::new("x"))).unwrap() else {
            panic!("expected Added");
        };
        a.take_redraw();

        assert_eq!(a.dispatch(Command::Delete(t.id + 1)).unwrap(), Outcome::Unchanged);
        assert_eq!(
            a.dispatch(Command::Edit { id: t.id, text: "  ".into() }).unwrap(),
            Outcome::Unchanged
        );
        assert!(!a.take_redraw());
    }

    #[test]
    fn validation_error_leaves_state_alone() {
        let mut a = app();
        a.take_redraw();
        let err = a.dispatch(Command::Add(NewTask::new(""))).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a task!");
        assert!(a.store().is_empty());
        assert!(!a.take_redraw());
    }

    /// Reads nothing back and refuses every write.
    #[derive(Debug, Default)]
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn failed_writes_still_redraw_the_changed_list() {
        struct Quiet;
        impl Notifier for Quiet {
            fn notify(&mut self, _n: &ReminderNotice) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let store = TaskStore::open(ReadOnlyStore, DEFAULT_KEY, Zone::Local);
        let mut a = App::new(store, ReminderChecker::default());
        a.take_redraw();

        let today = Zone::Local.today(Utc::now());
        let err = a
            .dispatch(Command::Add(NewTask::new("unsaved").due_on(today).remind()))
            .unwrap_err();
        assert!(matches!(err, TaskError::Storage(_)));
        assert_eq!(a.store().len(), 1);
        assert!(a.take_redraw());

        let later = Utc::now() + Duration::days(1);
        assert!(a.run_reminders(later, &mut Quiet).is_err());
        assert!(a.store().tasks()[0].reminded);
        assert!(a.take_redraw());
    }

    #[test]
    fn fired_reminder_requests_redraw() {
        struct Sink(usize);
        impl Notifier for Sink {
            fn notify(&mut self, _n: &ReminderNotice) -> anyhow::Result<()> {
                self.0 += 1;
                Ok(())
            }
        }

        let mut a = app();
        let today = Zone::Local.today(Utc::now());
        a.dispatch(Command::Add(NewTask::new("due").due_on(today).remind()))
            .unwrap();
        a.take_redraw();

        let mut sink = Sink(0);
        let later = Utc::now() + Duration::days(1);
        assert_eq!(a.run_reminders(later, &mut sink).unwrap().len(), 1);
        assert_eq!(sink.0, 1);
        assert!(a.take_redraw());
    }
}
