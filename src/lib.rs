//! task-reminder: daily digests of pending Taskwarrior tasks.
//!
//! One run reads the pending tasks, sorts them into due-date buckets, renders
//! a Markdown digest and delivers it through a single channel:
//! Task source → Buckets → Digest → Delivery channel
//!
//! # Architecture
//!
//! - **Tasks**: the [`tasks::TaskSource`] contract plus Taskwarrior-backed sources
//! - **Reminder**: pure bucketing and rendering, driven by an explicit "now"
//! - **Channels**: stdout, Gotify push, or PGP/MIME encrypted email behind
//!   [`channels::Notifier`]
//! - **Config / credentials**: TOML settings and secrets resolved by the caller
//!   and passed into the channels
//!
//! Scheduling is external (cron, systemd timers); nothing is persisted
//! between runs.

pub mod channels;
pub mod config;
pub mod credentials;
pub mod error;
pub mod reminder;
pub mod tasks;

pub use channels::{DeliveryChannel, Notifier};
pub use config::ReminderConfig;
pub use error::{ReminderError, Result};
pub use reminder::{Bucket, Delivery, compose_digest, send_reminder};
pub use tasks::{Task, TaskSource};
