use chrono::{Duration, NaiveTime, TimeZone, Utc};
use std::collections::HashSet;
use ticklist_core::{
    App, Command, FileStore, Filter, KeyValueStore, MemoryStore, NewTask, Notifier, Outcome,
    ReminderChecker, ReminderNotice, TaskError, TaskId, TaskStore, Zone, DEFAULT_KEY,
};

fn chicago() -> Zone {
    Zone::parse("America/Chicago").unwrap()
}

#[derive(Default)]
struct Recorder(Vec<ReminderNotice>);

impl Notifier for Recorder {
    fn notify(&mut self, notice: &ReminderNotice) -> anyhow::Result<()> {
        self.0.push(notice.clone());
        Ok(())
    }
}

fn ids(store: &TaskStore<MemoryStore>, filter: Filter) -> HashSet<TaskId> {
    store.filtered(filter).map(|t| t.id).collect()
}

/// Add a date-only task for today, then delete it.
#[test]
fn test_buy_milk_add_then_delete() {
    let zone = chicago();
    let mut store = TaskStore::open(MemoryStore::new(), DEFAULT_KEY, zone);
    let today = zone.today(Utc::now());

    let task = store.add(NewTask::new("Buy milk").due_on(today)).unwrap();
    assert_eq!(store.len(), 1);
    assert!(!task.completed);

    let due = task.due_date_time.expect("date given, so due is set");
    let midnight = zone.resolve(today.and_time(NaiveTime::MIN)).unwrap();
    assert_eq!(due, midnight);

    store.delete(task.id).unwrap();
    assert!(store.is_empty());
}

/// Active and completed views split the full list with no overlap.
#[test]
fn test_active_and_completed_partition_all() {
    let mut store = TaskStore::open(MemoryStore::new(), DEFAULT_KEY, chicago());
    let now = Utc.with_ymd_and_hms(2026, 2, 19, 12, 0, 0).unwrap();

    let mut added = Vec::new();
    for i in 0..8 {
        let t = store
            .add_at(NewTask::new(format!("task {i}")), now)
            .unwrap();
        added.push(t.id);
    }
    for id in added.iter().step_by(3) {
        store.toggle_complete(*id).unwrap();
    }

    let all = ids(&store, Filter::All);
    let active = ids(&store, Filter::Active);
    let completed = ids(&store, Filter::Completed);

    assert_eq!(all.len(), 8);
    assert!(active.is_disjoint(&completed));
    assert_eq!(&active | &completed, all);
    assert_eq!(completed.len(), 3);
}

/// Saving and reopening through a real file keeps ids, text, flags and due times.
#[test]
fn test_file_round_trip_through_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let zone = chicago();
    let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

    let mut store = TaskStore::open(FileStore::new(tmp.path()), DEFAULT_KEY, zone);
    let a = store
        .add(NewTask::new("pay rent").due_on(date).at(NaiveTime::from_hms_opt(9, 30, 0).unwrap()).remind())
        .unwrap();
    let b = store.add(NewTask::new("no due date")).unwrap();
    store.toggle_complete(b.id).unwrap();

    let reopened = TaskStore::open(FileStore::new(tmp.path()), DEFAULT_KEY, zone);
    assert_eq!(reopened.tasks(), store.tasks());
    assert_eq!(
        reopened.get(a.id).unwrap().due_date_time,
        Some(Utc.with_ymd_and_hms(2026, 3, 1, 15, 30, 0).unwrap())
    );
    assert!(reopened.get(b.id).unwrap().completed);
}

/// Data saved by the browser version (missing flags, millisecond timestamps) still loads.
#[test]
fn test_loads_browser_saved_list() {
    let mut storage = MemoryStore::new();
    storage
        .set(
            DEFAULT_KEY,
            r#"[{"id":1771520000000,"text":"legacy"},
                {"id":1771520000001,"text":"with due","completed":false,
                 "dueDateTime":"2026-02-20T06:00:00.000Z","reminder":true,"reminded":false}]"#,
        )
        .unwrap();

    let store = TaskStore::open(storage, DEFAULT_KEY, chicago());
    assert_eq!(store.len(), 2);
    let legacy = store.get(1771520000000).unwrap();
    assert!(!legacy.completed && !legacy.reminder && !legacy.reminded);
    assert!(store.get(1771520000001).unwrap().reminder);
}

/// A reminder one millisecond overdue fires exactly once across two passes.
#[test]
fn test_reminder_fires_once_through_app() {
    let now = Utc::now();
    let zone = Zone::Local;
    let mut storage = MemoryStore::new();
    let task = ticklist_core::Task::new(5, "take meds")
        .with_due(now - Duration::milliseconds(1))
        .with_reminder(true);
    ticklist_core::save_tasks(&mut storage, DEFAULT_KEY, &[task]).unwrap();

    let mut app = App::new(TaskStore::open(storage, DEFAULT_KEY, zone), ReminderChecker::default());
    let mut rec = Recorder::default();

    assert_eq!(app.run_reminders(now, &mut rec).unwrap(), vec![5]);
    assert_eq!(app.run_reminders(now, &mut rec).unwrap(), Vec::<TaskId>::new());
    assert_eq!(rec.0.len(), 1);
    assert_eq!(rec.0[0].title, "Reminder: take meds");

    // Indicator stays on after firing.
    let view = app.view(now);
    assert!(view.rows[0].reminder_on);
}

/// Dispatching an empty add reports the validation error and changes nothing.
#[test]
fn test_empty_add_through_dispatch() {
    let store = TaskStore::open(MemoryStore::new(), DEFAULT_KEY, chicago());
    let mut app = App::new(store, ReminderChecker::default());

    let err = app.dispatch(Command::Add(NewTask::new("  "))).unwrap_err();
    assert!(matches!(err, TaskError::Validation));
    assert!(app.store().is_empty());

    let out = app.dispatch(Command::ClearCompleted).unwrap();
    assert_eq!(out, Outcome::Cleared(0));
}

/// A legacy record with a blank due date must not cost the rest of the list
/// on the next write.
#[test]
fn test_legacy_blank_due_survives_next_add() {
    let mut storage = MemoryStore::new();
    storage
        .set(
            DEFAULT_KEY,
            r#"[{"id":1,"text":"keep me","completed":true},{"id":2,"text":"legacy blank due","dueDateTime":""}]"#,
        )
        .unwrap();

    let mut store = TaskStore::open(storage, DEFAULT_KEY, chicago());
    assert_eq!(store.len(), 2);
    store.add(NewTask::new("new")).unwrap();

    let reopened = TaskStore::open(store.storage().clone(), DEFAULT_KEY, chicago());
    let texts: Vec<&str> = reopened.tasks().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["keep me", "legacy blank due", "new"]);
    assert!(reopened.get(1).unwrap().completed);
}
