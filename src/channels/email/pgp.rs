//! OpenPGP encryption of the inner message.
//!
//! Encryption is delegated to GnuPG: the recipient's public key is looked up
//! by email address in the local keyring. There is no unencrypted fallback.

use crate::error::{ReminderError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;

/// Encrypts a payload for a recipient, producing ASCII-armoured ciphertext.
#[async_trait]
pub trait Encryptor: Send + Sync {
    /// Encrypt `plaintext` to the key registered for `recipient`.
    async fn encrypt(&self, recipient: &str, plaintext: &[u8]) -> Result<String>;
}

/// Runs `gpg` in batch mode.
#[derive(Debug, Clone)]
pub struct GpgEncryptor {
    program: PathBuf,
    homedir: Option<PathBuf>,
}

impl GpgEncryptor {
    /// Use the given `gpg` binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            homedir: None,
        }
    }

    /// Locate `gpg`: an explicit path wins, otherwise `PATH` is searched.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Encryption`] if no binary is found.
    pub fn discover(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            if path.is_file() {
                return Ok(Self::new(path));
            }
            return Err(ReminderError::Encryption(format!(
                "gpg binary not found at {}",
                path.display()
            )));
        }
        which::which("gpg")
            .or_else(|_| which::which("gpg2"))
            .map(Self::new)
            .map_err(|e| ReminderError::Encryption(format!("gpg binary not found on PATH: {e}")))
    }

    /// Use a specific GnuPG home directory instead of the default keyring.
    #[must_use]
    pub fn with_homedir(mut self, homedir: impl Into<PathBuf>) -> Self {
        self.homedir = Some(homedir.into());
        self
    }

    fn command(&self, recipient: &str) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        if let Some(homedir) = &self.homedir {
            command.arg("--homedir").arg(homedir);
        }
        command
            .args([
                "--batch",
                "--yes",
                "--quiet",
                "--no-tty",
                "--armor",
                "--trust-model",
                "always",
                "--auto-key-locate",
                "local",
                "--encrypt",
                "--recipient",
            ])
            .arg(recipient)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

#[async_trait]
impl Encryptor for GpgEncryptor {
    async fn encrypt(&self, recipient: &str, plaintext: &[u8]) -> Result<String> {
        tracing::debug!(program = %self.program.display(), "encrypting message for {recipient}");
        let mut child = self.command(recipient).spawn().map_err(|e| {
            ReminderError::Encryption(format!(
                "failed to execute {}: {e}",
                self.program.display()
            ))
        })?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReminderError::Encryption("gpg stdin unavailable".to_owned()))?;

        // Feed stdin while draining stdout so large payloads cannot deadlock.
        let writer = async move {
            let written = stdin.write_all(plaintext).await;
            drop(stdin);
            written
        };
        let (written, output) = tokio::join!(writer, child.wait_with_output());
        let output = output.map_err(|e| ReminderError::Encryption(format!("gpg failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReminderError::Encryption(format!(
                "could not encrypt text for {recipient}: {}",
                stderr.trim()
            )));
        }
        written.map_err(|e| ReminderError::Encryption(format!("failed to write to gpg: {e}")))?;

        let armored = String::from_utf8(output.stdout)
            .map_err(|e| ReminderError::Encryption(format!("gpg output is not ASCII armour: {e}")))?;
        if armored.trim().is_empty() {
            return Err(ReminderError::Encryption(format!(
                "gpg produced no ciphertext for {recipient}"
            )));
        }
        Ok(armored)
    }
}
