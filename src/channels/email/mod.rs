//! Encrypted email delivery.
//!
//! The digest is sent as a PGP/MIME message through an implicit-TLS SMTP
//! submission server. Encryption happens before any connection is opened, so
//! a missing recipient key never reaches the network.

pub mod message;
pub mod pgp;

pub use message::{Envelope, encrypted_message};
pub use pgp::{Encryptor, GpgEncryptor};

use crate::channels::traits::Notifier;
use crate::config::EmailConfig;
use crate::error::{ReminderError, Result};
use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Certificate, Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

pub(crate) const CHANNEL_ID: &str = "email";

/// Email channel adapter: encrypt with `E`, submit over SMTP.
pub struct EmailNotifier<E: Encryptor = GpgEncryptor> {
    config: EmailConfig,
    encryptor: E,
    tls: Option<TlsParameters>,
}

impl<E: Encryptor> EmailNotifier<E> {
    /// Prepare the channel. A configured CA certificate is loaded here so a
    /// bad path fails before any encryption or network work.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Config`] if the CA certificate cannot be read
    /// or parsed.
    pub fn new(config: EmailConfig, encryptor: E) -> Result<Self> {
        let tls = match &config.ca_cert {
            Some(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    ReminderError::Config(format!(
                        "failed to read CA certificate {}: {e}",
                        path.display()
                    ))
                })?;
                let certificate = Certificate::from_pem(&pem).map_err(|e| {
                    ReminderError::Config(format!(
                        "invalid CA certificate {}: {e}",
                        path.display()
                    ))
                })?;
                let parameters = TlsParameters::builder(config.smtp_hostname.clone())
                    .add_root_certificate(certificate)
                    .build()
                    .map_err(|e| {
                        ReminderError::Config(format!("failed to set up SMTP TLS: {e}"))
                    })?;
                Some(parameters)
            }
            None => None,
        };
        Ok(Self {
            config,
            encryptor,
            tls,
        })
    }

    fn envelope(&self) -> Envelope {
        Envelope {
            sender: self.config.sender.clone(),
            recipient: self.config.recipient.clone(),
            subject: self.config.subject.clone(),
        }
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_hostname)
            .map_err(|e| {
                ReminderError::Transport(format!(
                    "invalid SMTP relay {}: {e}",
                    self.config.smtp_hostname
                ))
            })?
            .credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.expose().to_owned(),
            ));
        if let Some(port) = self.config.smtp_port {
            builder = builder.port(port);
        }
        if let Some(tls) = &self.tls {
            builder = builder.tls(Tls::Wrapper(tls.clone()));
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl<E: Encryptor> Notifier for EmailNotifier<E> {
    fn id(&self) -> &'static str {
        CHANNEL_ID
    }

    async fn notify(&self, digest: &str) -> Result<()> {
        let message = encrypted_message(&self.envelope(), digest, &self.encryptor).await?;

        tracing::info!(
            "sending encrypted reminder to {} through {}",
            self.config.recipient.email,
            self.config.smtp_hostname
        );
        self.transport()?.send(message).await.map_err(|e| {
            ReminderError::Transport(format!(
                "SMTP submission to {} failed: {e}",
                self.config.smtp_hostname
            ))
        })?;
        Ok(())
    }
}
