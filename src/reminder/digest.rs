//! Markdown digest rendering.

use super::bucket::{BucketedTasks, CalendarWindows};
use crate::tasks::Task;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use std::fmt::Display;

/// Render bucketed tasks as a Markdown digest.
///
/// Each non-empty bucket becomes a `## <label>` section followed by a blank
/// line, one `- <description>` line per task (highest urgency first, ties in
/// source order) and a trailing blank line. Buckets after "Due tomorrow"
/// append `, due on <date>` to each line. Returns an empty string when every
/// bucket is empty.
pub fn render_digest<Tz>(bucketed: &BucketedTasks, windows: &CalendarWindows<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    for (bucket, tasks) in bucketed.iter() {
        out.push_str(&format!("## {}\n\n", bucket.label()));
        for task in by_urgency(tasks) {
            out.push_str("- ");
            out.push_str(&task.description);
            if bucket.shows_due_date()
                && let Some(due) = task.due
            {
                out.push_str(", due on ");
                out.push_str(&format_due_date(due, windows));
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Highest urgency first. `sort_by` is stable, so equal scores keep their
/// source order.
fn by_urgency(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| b.urgency.total_cmp(&a.urgency));
    sorted
}

/// Local due date such as `Monday 19 October`, with the year appended when it
/// differs from the current one.
pub fn format_due_date<Tz>(due: DateTime<Utc>, windows: &CalendarWindows<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local = due.with_timezone(windows.timezone());
    if local.year() == windows.today_date().year() {
        local.format("%A %-d %B").to_string()
    } else {
        local.format("%A %-d %B %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::reminder::bucket::bucket_tasks;
    use chrono::{FixedOffset, TimeDelta};

    fn wednesday() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 14, 9, 30, 0)
            .unwrap()
    }

    fn render(tasks: Vec<Task>) -> String {
        let windows = CalendarWindows::starting(&wednesday());
        render_digest(&bucket_tasks(&windows, tasks), &windows)
    }

    fn after(hours: i64) -> DateTime<Utc> {
        wednesday().with_timezone(&Utc) + TimeDelta::hours(hours)
    }

    #[test]
    fn wednesday_scenario() {
        let digest = render(vec![
            Task::new("Task A").with_due(after(18)),
            Task::new("Task B").with_due(after(24 * 10)),
            Task::new("Task C"),
        ]);
        assert_eq!(
            digest,
            "## Without deadline\n\n- Task C\n\n\
             ## Due tomorrow\n\n- Task A\n\n\
             ## Due next week\n\n- Task B, due on Saturday 24 October\n\n"
        );
    }

    #[test]
    fn empty_digest_is_empty_string() {
        assert_eq!(render(Vec::new()), "");
        let waiting = Task::new("later").with_wait(after(72));
        assert_eq!(render(vec![waiting]), "");
    }

    #[test]
    fn sorts_by_urgency_descending_and_stable() {
        let digest = render(vec![
            Task::new("low").with_urgency(1.0),
            Task::new("tie-first").with_urgency(5.0),
            Task::new("high").with_urgency(9.5),
            Task::new("tie-second").with_urgency(5.0),
        ]);
        assert_eq!(
            digest,
            "## Without deadline\n\n- high\n- tie-first\n- tie-second\n- low\n\n"
        );
    }

    #[test]
    fn near_buckets_have_no_date_suffix() {
        let digest = render(vec![
            Task::new("today").with_due(after(6)),
            Task::new("tomorrow").with_due(after(30)),
        ]);
        assert!(!digest.contains("due on"));
        assert!(digest.contains("## Due today\n\n- today\n"));
        assert!(digest.contains("## Due tomorrow\n\n- tomorrow\n"));
    }

    #[test]
    fn this_week_has_date_suffix() {
        let digest = render(vec![Task::new("weekend").with_due(after(24 * 3))]);
        assert_eq!(
            digest,
            "## Due this week\n\n- weekend, due on Saturday 17 October\n\n"
        );
    }

    #[test]
    fn other_year_includes_year() {
        let due = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2027, 2, 3, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let digest = render(vec![Task::new("taxes").with_due(due)]);
        assert_eq!(
            digest,
            "## In future\n\n- taxes, due on Wednesday 3 February 2027\n\n"
        );
    }

    #[test]
    fn due_date_uses_local_calendar_day() {
        // 23:30 UTC on the 19th is already the 20th at UTC+1.
        let due = Utc.with_ymd_and_hms(2026, 10, 19, 23, 30, 0).unwrap();
        let windows = CalendarWindows::starting(&wednesday());
        assert_eq!(format_due_date(due, &windows), "Tuesday 20 October");
    }

    #[test]
    fn sections_follow_fixed_order() {
        let digest = render(vec![
            Task::new("far").with_due(after(24 * 40)),
            Task::new("soon").with_due(after(6)),
            Task::new("none"),
        ]);
        let none = digest.find("## Without deadline").unwrap();
        let today = digest.find("## Due today").unwrap();
        let future = digest.find("## In future").unwrap();
        assert!(none < today && today < future);
    }

    #[test]
    fn rendering_is_deterministic() {
        let windows = CalendarWindows::starting(&wednesday());
        let bucketed = bucket_tasks(
            &windows,
            vec![
                Task::new("a").with_due(after(100)).with_urgency(2.0),
                Task::new("b").with_urgency(3.0),
                Task::new("c").with_due(after(400)),
            ],
        );
        assert_eq!(
            render_digest(&bucketed, &windows),
            render_digest(&bucketed, &windows)
        );
    }
}
