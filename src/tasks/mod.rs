//! Pending tasks and the sources that supply them.

mod taskwarrior;

pub use taskwarrior::{ExportFileSource, TaskwarriorSource, parse_export};

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A pending task as read from the task store.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Free-text description.
    pub description: String,
    /// When the task is due, if it has a deadline.
    pub due: Option<DateTime<Utc>>,
    /// Tasks waiting until a future instant are hidden from the digest.
    pub wait: Option<DateTime<Utc>>,
    /// Priority score computed by the task store; higher sorts first.
    pub urgency: f64,
}

impl Task {
    /// A task with no deadline, no wait date and zero urgency.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            due: None,
            wait: None,
            urgency: 0.0,
        }
    }

    /// Set the due instant.
    #[must_use]
    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }

    /// Set the wait instant.
    #[must_use]
    pub fn with_wait(mut self, wait: DateTime<Utc>) -> Self {
        self.wait = Some(wait);
        self
    }

    /// Set the urgency score.
    #[must_use]
    pub fn with_urgency(mut self, urgency: f64) -> Self {
        self.urgency = urgency;
        self
    }
}

/// Task source contract. The pipeline only needs the pending tasks.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Load every pending task.
    async fn load_pending_tasks(&self) -> Result<Vec<Task>>;
}
