//! Terminal host backed by a child shell process
//!
//! Each channel is one shell whose stdin receives the submitted command lines
//! and whose output goes straight to the user's terminal.

use async_trait::async_trait;
use colored::Colorize;
use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::channel::{
    ChannelClosed, ChannelId, CloseNotifier, SessionError, TerminalChannel, TerminalHost,
};

const DEFAULT_SHELL: &str = "/bin/sh";

/// Spawns one shell per channel
///
/// A shell's stdin cannot hold an editable, unsent line, so staging is print
/// only: a submit with `execute = false` echoes the line as `staged:` for the
/// user to copy and never reaches the shell.
pub struct ShellHost {
    shell: String,
    next_id: AtomicU64,
    notifier: Arc<CloseNotifier>,
}

impl ShellHost {
    /// Use `shell`, falling back to `$SHELL` and then `/bin/sh`.
    pub fn new(shell: Option<String>) -> Self {
        let shell = shell
            .or_else(|| std::env::var("SHELL").ok())
            .filter(|shell| !shell.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SHELL.to_string());

        Self {
            shell,
            next_id: AtomicU64::new(1),
            notifier: Arc::new(CloseNotifier::new()),
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }
}

#[async_trait]
impl TerminalHost for ShellHost {
    async fn create(&self, name: &str) -> Result<Box<dyn TerminalChannel>, SessionError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        let mut child = Command::new(&self.shell)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SessionError::ChannelCreation {
                name: name.to_string(),
                reason: format!("{}: {}", self.shell, e),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| SessionError::ChannelCreation {
            name: name.to_string(),
            reason: "shell stdin unavailable".to_string(),
        })?;

        info!("Spawned {} for terminal '{}' ({})", self.shell, name, id);

        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let notifier = self.notifier.clone();
        let event = ChannelClosed {
            name: name.to_string(),
            id,
        };

        let watcher = tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => debug!("Terminal {} exited with {}", event.id, status),
                    Err(e) => warn!("Failed to wait for terminal {}: {}", event.id, e),
                },
                _ = kill_rx => {
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill terminal {}: {}", event.id, e);
                    }
                }
            }
            notifier.publish(event);
        });

        Ok(Box::new(ShellChannel {
            id,
            name: name.to_string(),
            stdin: Some(stdin),
            kill_tx: Some(kill_tx),
            watcher,
            shown: false,
        }))
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelClosed> {
        self.notifier.subscribe()
    }
}

struct ShellChannel {
    id: ChannelId,
    name: String,
    stdin: Option<ChildStdin>,
    kill_tx: Option<oneshot::Sender<()>>,
    watcher: JoinHandle<()>,
    shown: bool,
}

#[async_trait]
impl TerminalChannel for ShellChannel {
    fn id(&self) -> ChannelId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn show(&mut self) -> Result<(), SessionError> {
        if !self.shown {
            println!("{} {}", "▶".green(), self.name.bold());
            self.shown = true;
        }
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), SessionError> {
        crossterm::execute!(std::io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
        Ok(())
    }

    async fn submit(&mut self, text: &str, execute: bool) -> Result<(), SessionError> {
        if !execute {
            println!("{} {}", "staged:".yellow(), text);
            return Ok(());
        }

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| SessionError::ChannelGone(self.name.clone()))?;

        let line = format!("{}\n", text);
        let written = async {
            stdin.write_all(line.as_bytes()).await?;
            stdin.flush().await
        }
        .await;

        written.map_err(|e| {
            debug!("Write to terminal {} failed: {}", self.id, e);
            SessionError::ChannelGone(self.name.clone())
        })
    }

    async fn dispose(self: Box<Self>) -> Result<(), SessionError> {
        let this = *self;
        debug!("Disposing terminal {}", this.id);
        drop(this.stdin);
        if let Some(kill_tx) = this.kill_tx {
            let _ = kill_tx.send(());
        }
        if let Err(e) = this.watcher.await {
            warn!("Terminal watcher failed: {}", e);
        }
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), SessionError> {
        let this = *self;
        debug!("Closing terminal {}", this.id);
        // EOF on stdin lets the shell finish queued commands and exit
        drop(this.stdin);
        if let Err(e) = this.watcher.await {
            warn!("Terminal watcher failed: {}", e);
        }
        Ok(())
    }
}
