//! Taskwarrior-backed task sources.
//!
//! Both sources consume the JSON produced by `task export`: either by running
//! the `task` binary directly or by reading a dump written earlier.

use super::{Task, TaskSource};
use crate::error::{ReminderError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Taskwarrior's compact UTC timestamp, e.g. `20261016T220000Z`.
const DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Arguments for a quiet, non-interactive export of pending tasks.
const EXPORT_ARGS: [&str; 5] = [
    "rc.verbose=nothing",
    "rc.confirmation=off",
    "rc.json.array=on",
    "status:pending",
    "export",
];

#[derive(Deserialize)]
struct ExportedTask {
    #[serde(default)]
    status: Option<String>,
    description: String,
    #[serde(default)]
    due: Option<String>,
    #[serde(default)]
    wait: Option<String>,
    #[serde(default)]
    urgency: f64,
}

impl ExportedTask {
    fn is_pending(&self) -> bool {
        self.status.as_deref().is_none_or(|s| s == "pending")
    }

    fn into_task(self) -> Result<Task> {
        let due = self
            .due
            .as_deref()
            .map(|raw| parse_date("due", raw))
            .transpose()?;
        let wait = self
            .wait
            .as_deref()
            .map(|raw| parse_date("wait", raw))
            .transpose()?;
        Ok(Task {
            description: self.description,
            due,
            wait,
            urgency: self.urgency,
        })
    }
}

fn parse_date(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, DATE_FORMAT) {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ReminderError::SourceUnavailable(format!("unparseable {field} date `{raw}`")))
}

/// Parse the output of `task export` into pending tasks.
///
/// Records whose status is not `pending` are dropped. Blank input yields an
/// empty list (older Taskwarrior releases print nothing for an empty export).
///
/// # Errors
///
/// Returns [`ReminderError::SourceUnavailable`] if the JSON is malformed or a
/// date cannot be parsed.
pub fn parse_export(json: &str) -> Result<Vec<Task>> {
    if json.trim().is_empty() {
        return Ok(Vec::new());
    }
    let exported: Vec<ExportedTask> = serde_json::from_str(json)
        .map_err(|e| ReminderError::SourceUnavailable(format!("invalid task export: {e}")))?;
    exported
        .into_iter()
        .filter(ExportedTask::is_pending)
        .map(ExportedTask::into_task)
        .collect()
}

/// Runs the `task` binary and reads its pending tasks.
#[derive(Debug, Clone)]
pub struct TaskwarriorSource {
    program: PathBuf,
    taskrc: Option<PathBuf>,
    data_location: Option<PathBuf>,
}

impl TaskwarriorSource {
    /// Use the given `task` binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            taskrc: None,
            data_location: None,
        }
    }

    /// Locate the `task` binary.
    ///
    /// An explicit path wins; otherwise `task` is looked up on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::SourceUnavailable`] if no binary is found.
    pub fn discover(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            if path.is_file() {
                return Ok(Self::new(path));
            }
            return Err(ReminderError::SourceUnavailable(format!(
                "taskwarrior binary not found at {}",
                path.display()
            )));
        }
        which::which("task").map(Self::new).map_err(|e| {
            ReminderError::SourceUnavailable(format!("taskwarrior binary not found on PATH: {e}"))
        })
    }

    /// Point the child process at a specific `.taskrc` (`TASKRC`).
    #[must_use]
    pub fn with_taskrc(mut self, taskrc: impl Into<PathBuf>) -> Self {
        self.taskrc = Some(taskrc.into());
        self
    }

    /// Point the child process at a specific data directory (`TASKDATA`).
    #[must_use]
    pub fn with_data_location(mut self, data_location: impl Into<PathBuf>) -> Self {
        self.data_location = Some(data_location.into());
        self
    }

    /// Path of the binary that will be executed.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        command
            .args(EXPORT_ARGS)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(taskrc) = &self.taskrc {
            command.env("TASKRC", taskrc);
        }
        if let Some(data) = &self.data_location {
            command.env("TASKDATA", data);
        }
        command
    }
}

#[async_trait]
impl TaskSource for TaskwarriorSource {
    async fn load_pending_tasks(&self) -> Result<Vec<Task>> {
        tracing::debug!(program = %self.program.display(), "exporting pending tasks");
        let output = self.command().output().await.map_err(|e| {
            ReminderError::SourceUnavailable(format!(
                "failed to execute {}: {e}",
                self.program.display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReminderError::SourceUnavailable(format!(
                "{} export exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| {
            ReminderError::SourceUnavailable(format!("task export is not valid UTF-8: {e}"))
        })?;
        let tasks = parse_export(&stdout)?;
        tracing::debug!(count = tasks.len(), "loaded pending tasks");
        Ok(tasks)
    }
}

/// Reads a JSON dump produced by `task export`.
#[derive(Debug, Clone)]
pub struct ExportFileSource {
    path: PathBuf,
}

impl ExportFileSource {
    /// Read tasks from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TaskSource for ExportFileSource {
    async fn load_pending_tasks(&self) -> Result<Vec<Task>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ReminderError::SourceUnavailable(format!(
                "failed to read task export {}: {e}",
                self.path.display()
            ))
        })?;
        let tasks = parse_export(&content)?;
        tracing::debug!(
            count = tasks.len(),
            path = %self.path.display(),
            "loaded pending tasks from export file"
        );
        Ok(tasks)
    }
}
