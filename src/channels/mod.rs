//! Delivery channels for the rendered digest (stdout, Gotify, encrypted email).
//!
//! Exactly one channel is used per run. The set is closed: the binary maps
//! each subcommand onto one [`DeliveryChannel`] variant and every variant
//! builds a [`Notifier`].

pub mod email;
pub mod gotify;
pub mod stdout;
pub mod traits;

pub use traits::Notifier;

use crate::config::{EmailConfig, GotifyConfig};
use crate::error::Result;

/// The channel selected for this run, with its resolved configuration.
#[derive(Debug)]
pub enum DeliveryChannel {
    /// Print the digest to standard output.
    Stdout,
    /// Push the digest to a Gotify server.
    Gotify(GotifyConfig),
    /// Send the digest as a PGP/MIME encrypted email.
    Email(EmailConfig),
}

impl DeliveryChannel {
    /// Stable identifier of the selected channel.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::Stdout => stdout::CHANNEL_ID,
            Self::Gotify(_) => gotify::CHANNEL_ID,
            Self::Email(_) => email::CHANNEL_ID,
        }
    }

    /// Build the notifier for this channel.
    ///
    /// No network connection is opened here.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ReminderError::Config`] if a custom CA certificate
    /// cannot be read or parsed, or [`crate::ReminderError::Encryption`] if
    /// `gpg` cannot be located.
    pub fn into_notifier(self) -> Result<Box<dyn Notifier>> {
        let notifier: Box<dyn Notifier> = match self {
            Self::Stdout => Box::new(stdout::StdoutNotifier),
            Self::Gotify(config) => Box::new(gotify::GotifyNotifier::new(config)?),
            Self::Email(config) => {
                let mut encryptor = email::GpgEncryptor::discover(config.gpg_program.as_deref())?;
                if let Some(homedir) = &config.gpg_homedir {
                    encryptor = encryptor.with_homedir(homedir);
                }
                Box::new(email::EmailNotifier::new(config, encryptor)?)
            }
        };
        tracing::debug!("using {} delivery channel", notifier.id());
        Ok(notifier)
    }
}
