//! Due-date buckets.
//!
//! Every task that is not waiting lands in exactly one of six buckets,
//! decided by comparing its due instant against calendar boundaries derived
//! from the current local day. All windows are open at the lower bound and
//! closed at the upper bound, so a task due exactly at today's midnight is
//! not "due today" and, matching no later window, falls into [`Bucket::Future`].

use crate::tasks::Task;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

/// Due-date category, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    /// The task has no due date.
    NoDeadline,
    /// Due after today's midnight, up to tomorrow's midnight.
    DueToday,
    /// Due after tomorrow's midnight, up to the day after.
    DueTomorrow,
    /// Due later, up to the next Monday's midnight.
    DueThisWeek,
    /// Due in the seven days after the next Monday.
    DueNextWeek,
    /// Everything else, overdue tasks included.
    Future,
}

impl Bucket {
    /// All buckets in presentation order.
    pub const ALL: [Self; 6] = [
        Self::NoDeadline,
        Self::DueToday,
        Self::DueTomorrow,
        Self::DueThisWeek,
        Self::DueNextWeek,
        Self::Future,
    ];

    /// Section heading used in the digest.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NoDeadline => "Without deadline",
            Self::DueToday => "Due today",
            Self::DueTomorrow => "Due tomorrow",
            Self::DueThisWeek => "Due this week",
            Self::DueNextWeek => "Due next week",
            Self::Future => "In future",
        }
    }

    /// Stable machine name.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::NoDeadline => "no_deadline",
            Self::DueToday => "due_today",
            Self::DueTomorrow => "due_tomorrow",
            Self::DueThisWeek => "due_this_week",
            Self::DueNextWeek => "due_next_week",
            Self::Future => "future",
        }
    }

    /// Whether digest lines in this bucket carry a "due on" suffix.
    #[must_use]
    pub fn shows_due_date(self) -> bool {
        matches!(self, Self::DueThisWeek | Self::DueNextWeek | Self::Future)
    }

    fn index(self) -> usize {
        match self {
            Self::NoDeadline => 0,
            Self::DueToday => 1,
            Self::DueTomorrow => 2,
            Self::DueThisWeek => 3,
            Self::DueNextWeek => 4,
            Self::Future => 5,
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Calendar boundaries for one run, anchored at local midnight of "now".
#[derive(Debug, Clone)]
pub struct CalendarWindows<Tz: TimeZone> {
    timezone: Tz,
    today_date: NaiveDate,
    today: DateTime<Utc>,
    tomorrow: DateTime<Utc>,
    overmorrow: DateTime<Utc>,
    next_monday: DateTime<Utc>,
    two_mondays_from_now: DateTime<Utc>,
}

impl<Tz: TimeZone> CalendarWindows<Tz> {
    /// Derive the windows from the current instant.
    ///
    /// The time-of-day part of `now` is discarded; boundaries are the local
    /// midnights of today, tomorrow, the day after, the next Monday (today
    /// itself when today is a Monday) and the Monday a week after that.
    pub fn starting(now: &DateTime<Tz>) -> Self {
        let timezone = now.timezone();
        let today_date = now.date_naive();
        let days_to_monday = (7 - today_date.weekday().num_days_from_monday()) % 7;
        let next_monday_date = today_date + TimeDelta::days(i64::from(days_to_monday));

        let windows = Self {
            today: local_midnight(&timezone, today_date),
            tomorrow: local_midnight(&timezone, today_date + TimeDelta::days(1)),
            overmorrow: local_midnight(&timezone, today_date + TimeDelta::days(2)),
            next_monday: local_midnight(&timezone, next_monday_date),
            two_mondays_from_now: local_midnight(
                &timezone,
                next_monday_date + TimeDelta::days(7),
            ),
            timezone,
            today_date,
        };

        tracing::debug!("today is {}", windows.today);
        tracing::debug!("tomorrow is {}", windows.tomorrow);
        tracing::debug!("overmorrow is {}", windows.overmorrow);
        tracing::debug!("next Monday is {}", windows.next_monday);
        tracing::debug!("two Mondays from now is {}", windows.two_mondays_from_now);
        windows
    }

    /// Timezone used for day boundaries and date display.
    pub fn timezone(&self) -> &Tz {
        &self.timezone
    }

    /// The local calendar date of "now".
    pub fn today_date(&self) -> NaiveDate {
        self.today_date
    }

    /// Today's local midnight.
    pub fn today(&self) -> DateTime<Utc> {
        self.today
    }

    /// Tomorrow's local midnight.
    pub fn tomorrow(&self) -> DateTime<Utc> {
        self.tomorrow
    }

    /// Local midnight two days from today.
    pub fn overmorrow(&self) -> DateTime<Utc> {
        self.overmorrow
    }

    /// Local midnight of the next Monday on or after today.
    pub fn next_monday(&self) -> DateTime<Utc> {
        self.next_monday
    }

    /// One week after [`Self::next_monday`].
    pub fn two_mondays_from_now(&self) -> DateTime<Utc> {
        self.two_mondays_from_now
    }

    /// Whether the task is still waiting and must be left out of the digest.
    pub fn is_waiting(&self, task: &Task) -> bool {
        task.wait.is_some_and(|wait| wait > self.today)
    }

    /// Bucket for a task, or `None` when the task is waiting.
    pub fn classify(&self, task: &Task) -> Option<Bucket> {
        if self.is_waiting(task) {
            return None;
        }
        let Some(due) = task.due else {
            return Some(Bucket::NoDeadline);
        };

        let bucket = if self.today < due && due <= self.tomorrow {
            Bucket::DueToday
        } else if self.tomorrow < due && due <= self.overmorrow {
            Bucket::DueTomorrow
        } else if self.overmorrow < due && due <= self.next_monday {
            Bucket::DueThisWeek
        } else if self.next_monday < due && due <= self.two_mondays_from_now {
            Bucket::DueNextWeek
        } else {
            Bucket::Future
        };
        Some(bucket)
    }
}

/// The earliest instant of `date` in `timezone`.
///
/// Where a DST transition skips midnight, the UTC reading of that midnight
/// is used instead.
fn local_midnight<Tz: TimeZone>(timezone: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    timezone
        .from_local_datetime(&naive)
        .earliest()
        .map_or_else(|| naive.and_utc(), |dt| dt.with_timezone(&Utc))
}

/// Tasks grouped by bucket, each group in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketedTasks {
    groups: [Vec<Task>; 6],
}

impl BucketedTasks {
    /// Tasks in `bucket`, in the order they were added.
    #[must_use]
    pub fn get(&self, bucket: Bucket) -> &[Task] {
        self.groups.get(bucket.index()).map_or(&[][..], Vec::as_slice)
    }

    /// Append a task to `bucket`.
    pub fn push(&mut self, bucket: Bucket, task: Task) {
        if let Some(group) = self.groups.get_mut(bucket.index()) {
            group.push(task);
        }
    }

    /// Non-empty buckets in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[Task])> {
        Bucket::ALL
            .into_iter()
            .map(|bucket| (bucket, self.get(bucket)))
            .filter(|(_, tasks)| !tasks.is_empty())
    }

    /// Total number of bucketed tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Whether no task was bucketed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }
}

/// Partition tasks into buckets, dropping waiting tasks.
pub fn bucket_tasks<Tz: TimeZone>(
    windows: &CalendarWindows<Tz>,
    tasks: impl IntoIterator<Item = Task>,
) -> BucketedTasks {
    let mut bucketed = BucketedTasks::default();
    for task in tasks {
        match windows.classify(&task) {
            Some(bucket) => {
                tracing::debug!(%bucket, due = ?task.due, "{}", task.description);
                bucketed.push(bucket, task);
            }
            None => {
                tracing::debug!(wait = ?task.wait, "skipping waiting task: {}", task.description);
            }
        }
    }
    bucketed
}
