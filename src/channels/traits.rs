use crate::error::Result;
use async_trait::async_trait;

/// Delivery channel contract. New channels only need to implement this trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Stable channel identifier (e.g. `gotify`, `email`).
    fn id(&self) -> &'static str;

    /// Deliver a rendered Markdown digest. Called once per run; failures are
    /// returned to the caller, never retried here.
    async fn notify(&self, digest: &str) -> Result<()>;
}
