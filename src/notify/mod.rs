//! Change notification backends.

pub mod email;

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::pipeline::JobDiff;

pub use email::EmailNotifier;

/// Pluggable notification backend for listing changes.
///
/// Delivery is not idempotent at the transport level: calling `notify`
/// twice sends two notifications. The pipeline invokes it at most once
/// per run.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a change report.
    async fn notify(&self, diff: &JobDiff) -> Result<()>;
}

/// Backend that logs the rendered diff instead of delivering it.
///
/// Used by CLI runs without SMTP credentials and by tests.
#[derive(Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, diff: &JobDiff) -> Result<()> {
        info!(
            "Notification suppressed ({} changes):\n{}",
            diff.change_count(),
            diff.render()
        );
        Ok(())
    }
}
