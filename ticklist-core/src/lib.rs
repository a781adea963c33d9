//! ticklist-core: task model, storage adapter, task store, reminders and the
//! view projection behind the `ticklist` CLI.

pub mod app;
pub mod error;
pub mod filter;
pub mod reminders;
pub mod storage;
pub mod store;
pub mod task;
pub mod time;
pub mod view;

pub use app::{App, Command, Outcome};
pub use error::{ParseFilterError, TaskError};
pub use filter::{Filter, FilterController};
pub use reminders::{Notifier, ReminderChecker, ReminderNotice};
pub use storage::{FileStore, KeyValueStore, MemoryStore, DEFAULT_KEY, load_tasks, save_tasks};
pub use store::TaskStore;
pub use task::{NewTask, Task, TaskId};
pub use time::{Zone, combine_due, parse_date_input, parse_time_input};
pub use view::{DueKind, DueLabel, ListView, REMINDER_LABEL, TaskRow, project, remaining_label};
