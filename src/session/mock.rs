//! Recording terminal host for tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use super::channel::{
    ChannelClosed, ChannelId, CloseNotifier, SessionError, TerminalChannel, TerminalHost,
};

/// One observed host or channel operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Create { name: String, id: ChannelId },
    Show { id: ChannelId },
    Clear { id: ChannelId },
    Submit { id: ChannelId, text: String, execute: bool },
    Dispose { id: ChannelId },
    Close { id: ChannelId },
}

/// Host that records every operation instead of running a shell
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
    next_id: AtomicU64,
    notifier: CloseNotifier,
    fail_next: Mutex<Option<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Text of every submitted command line, in order.
    pub fn submitted(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Submit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> usize {
        self.count(|call| matches!(call, HostCall::Create { .. }))
    }

    pub fn disposed(&self) -> usize {
        self.count(|call| matches!(call, HostCall::Dispose { .. }))
    }

    /// Simulate the user closing channel `id` outside the tool.
    pub fn close_externally(&self, id: ChannelId) {
        let name = self.calls().into_iter().find_map(|call| match call {
            HostCall::Create { name, id: created } if created == id => Some(name),
            _ => None,
        });
        if let Some(name) = name {
            self.notifier.publish(ChannelClosed { name, id });
        }
    }

    /// Make the next `create` fail with `reason`.
    pub fn fail_next_create(&self, reason: &str) {
        if let Ok(mut fail_next) = self.fail_next.lock() {
            *fail_next = Some(reason.to_string());
        }
    }

    fn count(&self, predicate: impl Fn(&HostCall) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }
}

fn record(calls: &Mutex<Vec<HostCall>>, call: HostCall) {
    if let Ok(mut calls) = calls.lock() {
        calls.push(call);
    }
}

#[async_trait]
impl TerminalHost for RecordingHost {
    async fn create(&self, name: &str) -> Result<Box<dyn TerminalChannel>, SessionError> {
        let failure = self.fail_next.lock().ok().and_then(|mut fail| fail.take());
        if let Some(reason) = failure {
            return Err(SessionError::ChannelCreation {
                name: name.to_string(),
                reason,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        record(&self.calls, HostCall::Create { name: name.to_string(), id });

        Ok(Box::new(RecordingChannel {
            id,
            name: name.to_string(),
            calls: self.calls.clone(),
        }))
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelClosed> {
        self.notifier.subscribe()
    }
}

struct RecordingChannel {
    id: ChannelId,
    name: String,
    calls: Arc<Mutex<Vec<HostCall>>>,
}

#[async_trait]
impl TerminalChannel for RecordingChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn show(&mut self) -> Result<(), SessionError> {
        record(&self.calls, HostCall::Show { id: self.id });
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), SessionError> {
        record(&self.calls, HostCall::Clear { id: self.id });
        Ok(())
    }

    async fn submit(&mut self, text: &str, execute: bool) -> Result<(), SessionError> {
        record(
            &self.calls,
            HostCall::Submit {
                id: self.id,
                text: text.to_string(),
                execute,
            },
        );
        Ok(())
    }

    async fn dispose(self: Box<Self>) -> Result<(), SessionError> {
        record(&self.calls, HostCall::Dispose { id: self.id });
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), SessionError> {
        record(&self.calls, HostCall::Close { id: self.id });
        Ok(())
    }
}
