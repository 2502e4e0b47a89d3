//! Reminder composition: load pending tasks, bucket them by due date, render
//! the Markdown digest and hand it to a delivery channel.
//!
//! Everything here takes "now" as a parameter; only the binary reads the
//! clock.

pub mod bucket;
pub mod digest;
pub mod html;

pub use bucket::{Bucket, BucketedTasks, CalendarWindows, bucket_tasks};
pub use digest::render_digest;
pub use html::render_markdown_html;

use crate::channels::Notifier;
use crate::error::Result;
use crate::tasks::TaskSource;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// What happened to a composed digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The digest was handed to the channel.
    Sent {
        /// Channel identifier, e.g. `gotify`.
        channel: &'static str,
    },
    /// There were no tasks to report, so nothing was sent.
    Skipped,
}

/// Load pending tasks and render the digest for `now`.
///
/// # Errors
///
/// Returns [`crate::ReminderError::SourceUnavailable`] if the source fails.
pub async fn compose_digest<Tz>(source: &dyn TaskSource, now: &DateTime<Tz>) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let tasks = source.load_pending_tasks().await?;
    let windows = CalendarWindows::starting(now);
    let bucketed = bucket_tasks(&windows, tasks);
    tracing::debug!(tasks = bucketed.len(), "bucketed pending tasks");
    Ok(render_digest(&bucketed, &windows))
}

/// Compose the digest for `now` and deliver it through `notifier`.
///
/// An empty digest is not delivered.
///
/// # Errors
///
/// Propagates source failures and the channel's encryption, transport or
/// configuration errors. Nothing is retried.
pub async fn send_reminder<Tz>(
    source: &dyn TaskSource,
    now: &DateTime<Tz>,
    notifier: &dyn Notifier,
) -> Result<Delivery>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let digest = compose_digest(source, now).await?;
    if digest.is_empty() {
        tracing::warn!("no pending tasks to remind about, skipping {}", notifier.id());
        return Ok(Delivery::Skipped);
    }

    notifier.notify(&digest).await?;
    tracing::info!("reminder delivered through {}", notifier.id());
    Ok(Delivery::Sent {
        channel: notifier.id(),
    })
}
