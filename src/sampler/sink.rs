#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use tokio::sync::mpsc;
use tracing::debug;

use super::types::DisplayUpdate;

/// Consumer of sampled values
///
/// `publish` runs on the blocking pool while the sampler holds its gate
/// lock, so implementations must be quick and must not call back into the
/// sampler's lifecycle methods. Hand work to another context instead, as
/// [`ChannelSink`] does.
#[cfg_attr(any(test, feature = "mock"), automock)]
pub trait DisplaySink: Send + Sync {
    fn publish(&self, update: &DisplayUpdate);
}

/// Forwards updates to a consumer context over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<DisplayUpdate>,
}

impl ChannelSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DisplayUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl DisplaySink for ChannelSink {
    fn publish(&self, update: &DisplayUpdate) {
        if self.tx.send(update.clone()).is_err() {
            debug!(key = %update.key, "Display receiver dropped; update discarded");
        }
    }
}
