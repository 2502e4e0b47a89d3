use crate::channels::traits::Notifier;
use crate::config::GotifyConfig;
use crate::error::{ReminderError, Result};
use async_trait::async_trait;
use serde_json::json;

pub(crate) const CHANNEL_ID: &str = "gotify";

/// Title of every pushed reminder.
pub const MESSAGE_TITLE: &str = "Daily tasks reminder";

/// Gotify channel adapter using the application message REST API.
pub struct GotifyNotifier {
    config: GotifyConfig,
    client: reqwest::Client,
}

impl GotifyNotifier {
    /// Build the HTTP client, trusting the configured CA certificate if any.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Config`] if the CA certificate cannot be read
    /// or parsed, or the client cannot be built.
    pub fn new(config: GotifyConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(path) = &config.ca_cert {
            let pem = std::fs::read(path).map_err(|e| {
                ReminderError::Config(format!(
                    "failed to read CA certificate {}: {e}",
                    path.display()
                ))
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                ReminderError::Config(format!(
                    "invalid CA certificate {}: {e}",
                    path.display()
                ))
            })?;
            builder = builder.add_root_certificate(certificate);
        }
        let client = builder
            .build()
            .map_err(|e| ReminderError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn message_url(&self) -> String {
        format!("{}/message", self.config.host.trim_end_matches('/'))
    }

    fn payload(&self, digest: &str) -> serde_json::Value {
        let mut body = json!({
            "message": digest,
            "title": MESSAGE_TITLE,
            "extras": {
                "client::display": {
                    "contentType": "text/markdown"
                }
            }
        });
        if let Some(priority) = self.config.priority {
            body["priority"] = json!(priority);
        }
        body
    }
}

#[async_trait]
impl Notifier for GotifyNotifier {
    fn id(&self) -> &'static str {
        CHANNEL_ID
    }

    async fn notify(&self, digest: &str) -> Result<()> {
        let url = self.message_url();
        tracing::info!("sending message through Gotify host {}", self.config.host);

        let response = self
            .client
            .post(&url)
            .query(&[("token", self.config.token.expose())])
            .json(&self.payload(digest))
            .send()
            .await
            // The URL carries the token as a query parameter.
            .map_err(|e| {
                ReminderError::Transport(format!("gotify request failed: {}", e.without_url()))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ReminderError::Transport(format!(
                "gotify send failed ({status}): {}",
                body.trim()
            )));
        }
        Ok(())
    }
}
