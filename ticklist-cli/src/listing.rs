//! Plain-text rendering of a `ListView` for `ticklist list`.

use ticklist_core::{ListView, REMINDER_LABEL};

pub fn render_plain(view: &ListView) -> String {
    let mut s = String::new();
    s.push_str(&format!("# {} tasks\n\n", view.filter));

    if view.rows.is_empty() {
        s.push_str("(nothing here)\n");
    }

    for row in &view.rows {
        let check = if row.completed { "[x]" } else { "[ ]" };
        s.push_str(&format!("{check} {} {}", row.id, row.text));
        if let Some(due) = &row.due {
            s.push_str(&format!(" | {}", due.text()));
        }
        if row.reminder_on {
            s.push_str(&format!(" | {REMINDER_LABEL}"));
        }
        s.push('\n');
    }

    s.push_str(&format!("\n{}\n", view.footer()));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticklist_core::{DueKind, DueLabel, Filter, TaskRow};

    #[test]
    fn renders_rows_and_footer() {
        let view = ListView {
            filter: Filter::All,
            rows: vec![
                TaskRow {
                    id: 1,
                    text: "Buy milk".into(),
                    completed: false,
                    due: Some(DueLabel {
                        kind: DueKind::Overdue,
                        formatted: "2026-02-20 00:00".into(),
                    }),
                    reminder_on: true,
                },
                TaskRow {
                    id: 2,
                    text: "Walk dog".into(),
                    completed: true,
                    due: None,
                    reminder_on: false,
                },
            ],
            active_count: 1,
        };

        let out = render_plain(&view);
        assert_eq!(
            out,
            "# all tasks\n\n\
             [ ] 1 Buy milk | Overdue • 2026-02-20 00:00 | Reminder on\n\
             [x] 2 Walk dog\n\
             \n1 task remaining\n"
        );
    }

    #[test]
    fn empty_view_says_so() {
        let view = ListView {
            filter: Filter::Completed,
            rows: vec![],
            active_count: 0,
        };
        assert!(render_plain(&view).contains("(nothing here)"));
        assert!(render_plain(&view).ends_with("0 tasks remaining\n"));
    }
}
