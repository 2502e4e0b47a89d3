//! Secret handling for delivery credentials.
//!
//! Delivery channels never read the environment themselves. The binary
//! sources each secret once (command line, config file, or environment),
//! wraps it in a [`Secret`], and passes it down inside the channel config.
//!
//! ```
//! use task_reminder::credentials::Secret;
//!
//! let token = Secret::new("AbCdEf.123");
//! assert_eq!(format!("{token:?}"), "Secret([REDACTED])");
//! assert_eq!(token.expose(), "AbCdEf.123");
//! ```

pub mod secure;

use crate::error::{ReminderError, Result};
use serde::{Deserialize, Deserializer};
use std::fmt;

/// A secret string (API token, SMTP password).
///
/// `Debug` never prints the value and the backing buffer is zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the plaintext value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the secret is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Secret").field(&"[REDACTED]").finish()
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        secure::secure_clear(&mut self.0);
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self)
    }
}

/// Read `var` from the process environment and remove it.
///
/// Returns `Ok(None)` when the variable is not set. The variable is removed
/// even when its value is blank.
///
/// # Safety
///
/// Mutates the process environment. Call it only while the process is
/// single-threaded, before the async runtime or any other thread starts.
///
/// # Errors
///
/// Returns [`ReminderError::Config`] if the value is not valid Unicode.
pub unsafe fn take_env_secret(var: &str) -> Result<Option<Secret>> {
    let value = match std::env::var(var) {
        Ok(value) => value,
        Err(std::env::VarError::NotPresent) => return Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => {
            // SAFETY: upheld by the caller.
            unsafe { std::env::remove_var(var) };
            return Err(ReminderError::Config(format!(
                "environment variable {var} is not valid unicode"
            )));
        }
    };

    tracing::debug!("removing {var} from the process environment");
    // SAFETY: upheld by the caller.
    unsafe { std::env::remove_var(var) };
    Ok(Some(Secret::new(value)))
}
