//! PGP/MIME message assembly (RFC 3156).
//!
//! The digest first becomes a complete inner message (headers plus a
//! plain-text / HTML alternative). That message is encrypted as a whole and
//! wrapped in a `multipart/encrypted` container with two parts: the
//! `application/pgp-encrypted` version marker and the armoured ciphertext.

use super::pgp::Encryptor;
use crate::error::{ReminderError, Result};
use crate::reminder::render_markdown_html;
use lettre::Message;
use lettre::message::header::{self, Header, HeaderName, HeaderValue};
use lettre::message::{Mailbox, MultiPart, SinglePart};

/// Protocol of the `multipart/encrypted` container.
pub const PGP_ENCRYPTED: &str = "application/pgp-encrypted";

/// File name of the ciphertext part.
pub const CIPHERTEXT_NAME: &str = "encrypted.asc";

/// `Content-Description` header, used to label the PGP/MIME parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDescription(String);

impl ContentDescription {
    /// A description with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl Header for ContentDescription {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Content-Description")
    }

    fn parse(s: &str) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_owned()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// Addressing shared by the inner and outer messages.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// `From` mailbox.
    pub sender: Mailbox,
    /// `To` mailbox; its address also selects the encryption key.
    pub recipient: Mailbox,
    /// `Subject` line.
    pub subject: String,
}

impl Envelope {
    fn builder(&self) -> lettre::message::MessageBuilder {
        Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(self.subject.clone())
    }
}

fn content_type(raw: &str) -> Result<header::ContentType> {
    header::ContentType::parse(raw)
        .map_err(|e| ReminderError::Message(format!("invalid content type `{raw}`: {e}")))
}

/// The cleartext message: the digest as text and as HTML.
///
/// # Errors
///
/// Returns [`ReminderError::Message`] if the message cannot be built.
pub fn inner_message(envelope: &Envelope, digest: &str) -> Result<Message> {
    let html = render_markdown_html(digest);
    envelope
        .builder()
        .multipart(MultiPart::alternative_plain_html(digest.to_owned(), html))
        .map_err(|e| ReminderError::Message(format!("failed to build inner message: {e}")))
}

/// Wrap armoured ciphertext in a PGP/MIME `multipart/encrypted` message.
///
/// # Errors
///
/// Returns [`ReminderError::Message`] if the message cannot be built.
pub fn pgp_mime_message(envelope: &Envelope, ciphertext: String) -> Result<Message> {
    let version = SinglePart::builder()
        .header(content_type(PGP_ENCRYPTED)?)
        .header(ContentDescription::new("PGP/MIME version identification"))
        .body(String::from("Version: 1\n"));

    let payload = SinglePart::builder()
        .header(content_type(&format!(
            "application/octet-stream; name=\"{CIPHERTEXT_NAME}\""
        ))?)
        .header(ContentDescription::new("OpenPGP encrypted message"))
        .header(header::ContentDisposition::inline_with_name(CIPHERTEXT_NAME))
        .body(ciphertext);

    envelope
        .builder()
        .multipart(
            MultiPart::encrypted(PGP_ENCRYPTED.to_owned())
                .singlepart(version)
                .singlepart(payload),
        )
        .map_err(|e| ReminderError::Message(format!("failed to build encrypted message: {e}")))
}

/// Build the inner message, encrypt it for the recipient and wrap it.
///
/// # Errors
///
/// Returns [`ReminderError::Encryption`] if encryption fails, or
/// [`ReminderError::Message`] if either message cannot be built.
pub async fn encrypted_message(
    envelope: &Envelope,
    digest: &str,
    encryptor: &dyn Encryptor,
) -> Result<Message> {
    let inner = inner_message(envelope, digest)?;
    let recipient: &str = envelope.recipient.email.as_ref();
    let ciphertext = encryptor.encrypt(recipient, &inner.formatted()).await?;
    pgp_mime_message(envelope, ciphertext)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const CIPHERTEXT: &str =
        "-----BEGIN PGP MESSAGE-----\n\nhQEMA0FAKECIPHERTEXT\n-----END PGP MESSAGE-----\n";
    const DIGEST: &str = "## Due today\n\n- Pay rent\n\n";

    #[derive(Default)]
    struct RecordingEncryptor {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Encryptor for RecordingEncryptor {
        async fn encrypt(&self, recipient: &str, plaintext: &[u8]) -> Result<String> {
            self.calls.lock().unwrap().push((
                recipient.to_owned(),
                String::from_utf8_lossy(plaintext).into_owned(),
            ));
            Ok(CIPHERTEXT.to_owned())
        }
    }

    struct NoKeyEncryptor;

    #[async_trait]
    impl Encryptor for NoKeyEncryptor {
        async fn encrypt(&self, recipient: &str, _plaintext: &[u8]) -> Result<String> {
            Err(ReminderError::Encryption(format!(
                "could not encrypt text for {recipient}"
            )))
        }
    }

    fn envelope() -> Envelope {
        Envelope {
            sender: "Reminder <reminder@example.org>".parse().unwrap(),
            recipient: "me@example.org".parse().unwrap(),
            subject: "Task reminder".to_owned(),
        }
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8(message.formatted()).unwrap()
    }

    #[test]
    fn inner_message_has_text_and_html_alternatives() {
        let text = formatted(&inner_message(&envelope(), DIGEST).unwrap());
        assert!(text.contains("Subject: Task reminder"));
        assert!(text.contains("multipart/alternative"));
        assert!(text.contains("text/plain"));
        assert!(text.contains("text/html"));
        assert!(text.contains("- Pay rent"));
        assert!(text.contains("<li>Pay rent</li>"));
    }

    #[test]
    fn outer_message_follows_pgp_mime_layout() {
        let text = formatted(&pgp_mime_message(&envelope(), CIPHERTEXT.to_owned()).unwrap());
        assert!(text.contains("multipart/encrypted"));
        assert!(text.contains("protocol="));
        assert!(text.contains("Content-Description: PGP/MIME version identification"));
        assert!(text.contains("Version: 1"));
        assert!(text.contains("Content-Description: OpenPGP encrypted message"));
        assert!(text.contains("application/octet-stream"));
        assert!(text.contains("encrypted.asc"));
        assert!(text.contains("-----BEGIN PGP MESSAGE-----"));

        let version_at = text.find("Version: 1").unwrap();
        let cipher_at = text.find("-----BEGIN PGP MESSAGE-----").unwrap();
        assert!(version_at < cipher_at);
    }

    #[tokio::test]
    async fn encrypts_whole_inner_message_for_recipient() {
        let encryptor = RecordingEncryptor::default();
        let message = encrypted_message(&envelope(), DIGEST, &encryptor)
            .await
            .unwrap();

        let calls = encryptor.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (recipient, plaintext) = &calls[0];
        assert_eq!(recipient, "me@example.org");
        assert!(plaintext.contains("Subject: Task reminder"));
        assert!(plaintext.contains("multipart/alternative"));

        let outer = formatted(&message);
        assert!(!outer.contains("Pay rent"));
        assert!(outer.contains("hQEMA0FAKECIPHERTEXT"));
    }

    #[tokio::test]
    async fn encryption_failure_propagates() {
        let err = encrypted_message(&envelope(), DIGEST, &NoKeyEncryptor)
            .await
            .unwrap_err();
        assert!(matches!(err, ReminderError::Encryption(_)));
    }
}
