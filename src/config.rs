//! Configuration for task-reminder.
//!
//! Settings come from an optional TOML file, overridden field by field by
//! command-line flags. Before any delivery they are resolved into explicit
//! [`GotifyConfig`] or [`EmailConfig`] values. Secrets missing from both
//! sources are taken from the environment through a caller-supplied closure,
//! so this module never touches the process environment itself.
//!
//! ```toml
//! ca_cert = "/etc/ssl/private-ca.pem"
//!
//! [taskwarrior]
//! taskrc = "/home/me/.taskrc"
//!
//! [gotify]
//! host = "https://push.example.org"
//!
//! [email]
//! smtp_hostname = "mail.example.org"
//! smtp_username = "me"
//! sender = "reminder@example.org"
//! recipient = "me@example.org"
//! ```

use crate::credentials::Secret;
use crate::error::{ReminderError, Result};
use crate::tasks::{ExportFileSource, TaskSource, TaskwarriorSource};
use lettre::Address;
use lettre::message::Mailbox;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the Gotify application token.
pub const GOTIFY_TOKEN_VAR: &str = "GOTIFY_TOKEN";

/// Environment variable holding the SMTP password.
pub const SMTP_PASSWORD_VAR: &str = "SMTP_PASSWORD";

/// Subject of reminder emails unless configured otherwise.
pub const DEFAULT_SUBJECT: &str = "Task reminder";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Extra CA certificate (PEM) trusted by both delivery channels.
    pub ca_cert: Option<PathBuf>,
    /// Where pending tasks are read from.
    pub taskwarrior: TaskwarriorSettings,
    /// Gotify push settings.
    pub gotify: GotifySettings,
    /// Encrypted email settings.
    pub email: EmailSettings,
}

/// `[taskwarrior]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskwarriorSettings {
    /// Path to the `task` binary; looked up on `PATH` when unset.
    pub command: Option<PathBuf>,
    /// `TASKRC` for the `task` process.
    pub taskrc: Option<PathBuf>,
    /// `TASKDATA` for the `task` process.
    pub data_location: Option<PathBuf>,
    /// Read this `task export` dump instead of running `task`.
    pub export_file: Option<PathBuf>,
}

/// `[gotify]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GotifySettings {
    pub host: Option<String>,
    pub token: Option<Secret>,
    pub priority: Option<u8>,
}

/// `[email]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub smtp_hostname: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<Secret>,
    pub sender: Option<String>,
    pub sender_name: Option<String>,
    pub recipient: Option<String>,
    pub recipient_name: Option<String>,
    pub subject: Option<String>,
    /// Path to the `gpg` binary; looked up on `PATH` when unset.
    pub gpg_program: Option<PathBuf>,
    /// GnuPG home directory holding the recipient's public key.
    pub gpg_homedir: Option<PathBuf>,
}

/// Resolved Gotify channel configuration.
#[derive(Debug, Clone)]
pub struct GotifyConfig {
    /// Base URL of the Gotify server, e.g. `https://push.example.org`.
    pub host: String,
    /// Application token.
    pub token: Secret,
    /// Message priority; omitted from the request when `None`.
    pub priority: Option<u8>,
    /// Extra trusted CA certificate.
    pub ca_cert: Option<PathBuf>,
}

/// Resolved email channel configuration.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP submission server (implicit TLS).
    pub smtp_hostname: String,
    /// Port override; the implicit-TLS submission port otherwise.
    pub smtp_port: Option<u16>,
    pub smtp_username: String,
    pub smtp_password: Secret,
    pub sender: Mailbox,
    /// Recipient; the address also selects the encryption key.
    pub recipient: Mailbox,
    pub subject: String,
    /// Extra trusted CA certificate.
    pub ca_cert: Option<PathBuf>,
    pub gpg_program: Option<PathBuf>,
    pub gpg_homedir: Option<PathBuf>,
}

impl ReminderConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ReminderError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| ReminderError::Config(format!("invalid {}: {e}", path.display())))
    }

    /// Returns the default config file path: `<config dir>/task-reminder/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("task-reminder").join("config.toml"))
    }

    /// Load the explicit file if given (it must exist), else the default
    /// file when present, else an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Config`] if a file exists but cannot be read
    /// or parsed, or the explicit path does not exist.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }
        match Self::default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Build the task source described by the `[taskwarrior]` section.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::SourceUnavailable`] if the `task` binary
    /// cannot be found.
    pub fn task_source(&self) -> Result<Box<dyn TaskSource>> {
        let settings = &self.taskwarrior;
        if let Some(path) = &settings.export_file {
            return Ok(Box::new(ExportFileSource::new(path)));
        }
        let mut source = TaskwarriorSource::discover(settings.command.as_deref())?;
        if let Some(taskrc) = &settings.taskrc {
            source = source.with_taskrc(taskrc);
        }
        if let Some(data) = &settings.data_location {
            source = source.with_data_location(data);
        }
        tracing::debug!("reading tasks with {}", source.program().display());
        Ok(Box::new(source))
    }
}

fn required(value: Option<String>, what: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ReminderError::Config(format!("{what} is required")))
}

fn required_secret(
    configured: Option<Secret>,
    from_env: impl FnOnce() -> Result<Option<Secret>>,
    what: &str,
    var: &str,
) -> Result<Secret> {
    let secret = match configured {
        Some(secret) => Some(secret),
        None => from_env()?,
    };
    secret.filter(|s| !s.is_blank()).ok_or_else(|| {
        ReminderError::Config(format!(
            "{what} is required (pass it explicitly or set {var})"
        ))
    })
}

fn mailbox(address: Option<String>, name: Option<String>, what: &str) -> Result<Mailbox> {
    let address = required(address, what)?;
    let email: Address = address
        .parse()
        .map_err(|e| ReminderError::Config(format!("invalid {what} `{address}`: {e}")))?;
    let name = name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());
    Ok(Mailbox::new(name, email))
}

impl GotifySettings {
    /// Resolve into a [`GotifyConfig`].
    ///
    /// `token_from_env` is only called when no token was configured.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Config`] if the host or token is missing.
    pub fn resolve(
        self,
        ca_cert: Option<PathBuf>,
        token_from_env: impl FnOnce() -> Result<Option<Secret>>,
    ) -> Result<GotifyConfig> {
        let host = required(self.host, "gotify host")?;
        let token = required_secret(self.token, token_from_env, "gotify token", GOTIFY_TOKEN_VAR)?;
        Ok(GotifyConfig {
            host,
            token,
            priority: self.priority,
            ca_cert,
        })
    }
}

impl EmailSettings {
    /// Resolve into an [`EmailConfig`].
    ///
    /// `password_from_env` is only called when no password was configured.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Config`] if a required field is missing or an
    /// address is invalid.
    pub fn resolve(
        self,
        ca_cert: Option<PathBuf>,
        password_from_env: impl FnOnce() -> Result<Option<Secret>>,
    ) -> Result<EmailConfig> {
        let smtp_hostname = required(self.smtp_hostname, "SMTP hostname")?;
        let smtp_username = required(self.smtp_username, "SMTP username")?;
        let sender = mailbox(self.sender, self.sender_name, "email sender")?;
        let recipient = mailbox(self.recipient, self.recipient_name, "email recipient")?;
        let smtp_password = required_secret(
            self.smtp_password,
            password_from_env,
            "SMTP password",
            SMTP_PASSWORD_VAR,
        )?;
        let subject = self
            .subject
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_owned());

        Ok(EmailConfig {
            smtp_hostname,
            smtp_port: self.smtp_port,
            smtp_username,
            smtp_password,
            sender,
            recipient,
            subject,
            ca_cert,
            gpg_program: self.gpg_program,
            gpg_homedir: self.gpg_homedir,
        })
    }
}
