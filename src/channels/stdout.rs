use crate::channels::traits::Notifier;
use crate::error::Result;
use async_trait::async_trait;
use std::io::Write;

pub(crate) const CHANNEL_ID: &str = "stdout";

/// Prints the digest to standard output unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    fn id(&self) -> &'static str {
        CHANNEL_ID
    }

    async fn notify(&self, digest: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(digest.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
