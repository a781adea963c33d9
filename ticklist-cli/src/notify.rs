use anyhow::Result;
use std::io::Write;
use ticklist_core::{Notifier, ReminderNotice, Zone};

/// Prints reminder notices as lines, optionally ringing the terminal bell.
pub struct LineNotifier<W: Write> {
    out: W,
    zone: Zone,
    bell: bool,
}

impl<W: Write> LineNotifier<W> {
    pub fn new(out: W, zone: Zone, bell: bool) -> Self {
        Self { out, zone, bell }
    }
}

impl<W: Write> Notifier for LineNotifier<W> {
    fn notify(&mut self, notice: &ReminderNotice) -> Result<()> {
        if self.bell {
            write!(self.out, "\x07")?;
        }
        writeln!(
            self.out,
            "{} (due {})",
            notice.title,
            self.zone.format(notice.due_at_utc)
        )?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn writes_one_line_per_notice() {
        let zone = Zone::parse("America/Chicago").unwrap();
        let mut n = LineNotifier::new(Vec::new(), zone, false);
        n.notify(&ReminderNotice {
            task_id: 1,
            title: "Reminder: stretch".to_string(),
            due_at_utc: Utc.with_ymd_and_hms(2026, 2, 20, 15, 0, 0).unwrap(),
        })
        .unwrap();

        let s = String::from_utf8(n.out).unwrap();
        assert_eq!(s, "Reminder: stretch (due 2026-02-20 09:00)\n");
    }
}
