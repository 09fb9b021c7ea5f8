//! Terminal channel abstraction and close notifications

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Identity of one created channel; never reused within a host.
pub type ChannelId = u64;

/// Emitted by a host when one of its channels goes away
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelClosed {
    pub name: String,
    pub id: ChannelId,
}

/// Error types for terminal session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to create terminal '{name}': {reason}")]
    ChannelCreation { name: String, reason: String },
    #[error("Terminal '{0}' is no longer running")]
    ChannelGone(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// One live command stream
#[async_trait]
pub trait TerminalChannel: Send {
    fn id(&self) -> ChannelId;

    fn name(&self) -> &str;

    /// Bring the channel in front of the user.
    async fn show(&mut self) -> Result<(), SessionError>;

    /// Clear prior output.
    async fn clear(&mut self) -> Result<(), SessionError>;

    /// Submit a command line; `execute = false` stages it without running.
    async fn submit(&mut self, text: &str, execute: bool) -> Result<(), SessionError>;

    /// Tear the channel down immediately.
    async fn dispose(self: Box<Self>) -> Result<(), SessionError>;

    /// Let already submitted commands finish, then release the channel.
    async fn close(self: Box<Self>) -> Result<(), SessionError> {
        self.dispose().await
    }
}

/// Creates channels and reports their closure
#[async_trait]
pub trait TerminalHost: Send + Sync {
    async fn create(&self, name: &str) -> Result<Box<dyn TerminalChannel>, SessionError>;

    /// Register for close notifications of every channel this host creates.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelClosed>;
}

/// Fan-out of close notifications to every subscriber
#[derive(Debug, Default)]
pub struct CloseNotifier {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<ChannelClosed>>>,
}

impl CloseNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelClosed> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    /// Deliver `event` to live subscribers and forget dropped ones.
    pub fn publish(&self, event: ChannelClosed) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .map(|subscribers| subscribers.len())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_all_subscribers() {
        let notifier = CloseNotifier::new();
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        let event = ChannelClosed {
            name: "Unite".to_string(),
            id: 7,
        };
        notifier.publish(event.clone());

        assert_eq!(first.try_recv().unwrap(), event);
        assert_eq!(second.try_recv().unwrap(), event);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let notifier = CloseNotifier::new();
        let kept = notifier.subscribe();
        drop(notifier.subscribe());

        notifier.publish(ChannelClosed {
            name: "Unite".to_string(),
            id: 1,
        });
        assert_eq!(notifier.subscriber_count(), 1);
        drop(kept);
    }
}
