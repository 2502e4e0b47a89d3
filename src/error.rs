//! Error types for the reminder pipeline.

/// Top-level error type for loading, rendering and delivering reminders.
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    /// The task source could not be run, read or parsed.
    #[error("task source unavailable: {0}")]
    SourceUnavailable(String),

    /// The digest could not be encrypted for the recipient.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Network, TLS or authentication failure during delivery.
    #[error("transport error: {0}")]
    Transport(String),

    /// Missing or invalid parameter, secret or configuration file.
    #[error("config error: {0}")]
    Config(String),

    /// A MIME message could not be assembled.
    #[error("message error: {0}")]
    Message(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ReminderError>;
