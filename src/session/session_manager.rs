//! Session Manager for the shared terminal channel lifecycle

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::wizard::ArgumentVector;

use super::channel::{ChannelClosed, SessionError, TerminalChannel, TerminalHost};

/// Session state tracking
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No channel yet, or the last one was closed
    Closed,
    Open,
    Terminated,
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Display label of the channel
    pub name: String,
    /// Clear prior output before every submitted command
    pub clear_before_submit: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: "Unite".to_string(),
            clear_before_submit: true,
        }
    }
}

impl From<&Settings> for SessionConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            name: settings.terminal.name.clone(),
            clear_before_submit: settings.terminal.clear_before_submit,
        }
    }
}

/// Session statistics for monitoring
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub start_time: DateTime<Utc>,
    pub channels_created: u64,
    pub channels_disposed: u64,
    pub external_closes: u64,
    pub commands_dispatched: u64,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            start_time: Utc::now(),
            channels_created: 0,
            channels_disposed: 0,
            external_closes: 0,
            commands_dispatched: 0,
        }
    }
}

/// Owner of the single shared terminal channel
pub struct SessionManager {
    /// Session configuration
    config: SessionConfig,
    /// Host creating channels
    host: Arc<dyn TerminalHost>,
    /// Live channel, if any
    channel: Option<Box<dyn TerminalChannel>>,
    /// Close notifications from the host
    closed_rx: mpsc::UnboundedReceiver<ChannelClosed>,
    /// Last relocation issued on the live channel
    cwd: Option<PathBuf>,
    /// Session state
    state: SessionState,
    /// Session statistics
    stats: SessionStats,
}

impl SessionManager {
    /// Create a new SessionManager; no channel exists until the first dispatch
    pub fn new(config: SessionConfig, host: Arc<dyn TerminalHost>) -> Self {
        info!("Creating session manager for terminal '{}'", config.name);

        let closed_rx = host.subscribe();

        Self {
            config,
            host,
            channel: None,
            closed_rx,
            cwd: None,
            state: SessionState::Closed,
            stats: SessionStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Whether a live channel currently exists
    pub fn is_open(&mut self) -> bool {
        self.drain_closed();
        self.channel.is_some()
    }

    /// Directory of the last relocation on the live channel
    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn get_state(&self) -> &SessionState {
        &self.state
    }

    pub fn get_stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Submit `args` on the shared channel.
    ///
    /// With `reset_channel` an existing channel is disposed and a fresh one
    /// created; otherwise the live channel is reused. `execute = false` stages
    /// the command line without running it.
    pub async fn dispatch(
        &mut self,
        args: ArgumentVector,
        reset_channel: bool,
        execute: bool,
    ) -> Result<(), SessionError> {
        self.drain_closed();

        let channel = match self.channel.take() {
            Some(channel) if !reset_channel => channel,
            Some(channel) => {
                info!("Resetting terminal '{}'", self.config.name);
                self.cwd = None;
                self.state = SessionState::Closed;
                channel.dispose().await?;
                self.stats.channels_disposed += 1;
                self.create_channel().await?
            }
            None => self.create_channel().await?,
        };
        let channel = self.channel.insert(channel);

        channel.show().await?;
        if self.config.clear_before_submit {
            channel.clear().await?;
        }

        let command_line = args.command_line();
        debug!(execute, "Submitting to terminal: {}", command_line);

        let submitted = channel.submit(&command_line, execute).await;
        if let Err(e) = submitted {
            warn!("Terminal '{}' rejected command: {}", self.config.name, e);
            self.channel = None;
            self.cwd = None;
            self.state = SessionState::Closed;
            return Err(e);
        }

        self.stats.commands_dispatched += 1;
        Ok(())
    }

    /// Change the working directory of the live channel without resetting it.
    pub async fn relocate(&mut self, path: &Path) -> Result<(), SessionError> {
        let mut args = ArgumentVector::new(["cd"]);
        args.push(crate::wizard::quote_value(&path.to_string_lossy()));

        self.dispatch(args, false, true).await?;
        self.cwd = Some(path.to_path_buf());
        Ok(())
    }

    /// React to a host close notification.
    ///
    /// Only an event naming the live channel's own identity closes it; late
    /// events for channels already replaced are ignored.
    pub fn handle_closed(&mut self, event: &ChannelClosed) {
        let matches = self
            .channel
            .as_ref()
            .is_some_and(|channel| channel.id() == event.id && channel.name() == event.name);

        if matches {
            info!("Terminal '{}' was closed externally", event.name);
            self.channel = None;
            self.cwd = None;
            self.state = SessionState::Closed;
            self.stats.external_closes += 1;
        } else {
            debug!("Ignoring close of stale terminal {} ({})", event.name, event.id);
        }
    }

    /// Let submitted commands finish and release the channel.
    pub async fn shutdown(&mut self) -> Result<(), SessionError> {
        info!("Shutting down terminal session");

        self.drain_closed();
        if let Some(channel) = self.channel.take() {
            channel.close().await?;
        }

        self.cwd = None;
        self.state = SessionState::Terminated;
        info!("Shutdown completed");
        Ok(())
    }

    async fn create_channel(&mut self) -> Result<Box<dyn TerminalChannel>, SessionError> {
        let channel = self.host.create(&self.config.name).await?;
        info!("Created terminal '{}' ({})", channel.name(), channel.id());

        self.stats.channels_created += 1;
        self.cwd = None;
        self.state = SessionState::Open;
        Ok(channel)
    }

    fn drain_closed(&mut self) {
        while let Ok(event) = self.closed_rx.try_recv() {
            self.handle_closed(&event);
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if self.channel.is_some() && self.state != SessionState::Terminated {
            warn!("SessionManager dropped without proper shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mock::{HostCall, RecordingHost};

    fn manager(host: &Arc<RecordingHost>) -> SessionManager {
        SessionManager::new(SessionConfig::default(), host.clone())
    }

    fn args(tokens: &[&str]) -> ArgumentVector {
        ArgumentVector::new(tokens.iter().copied())
    }

    #[tokio::test]
    async fn test_first_dispatch_creates_channel() {
        let host = Arc::new(RecordingHost::new());
        let mut session = manager(&host);
        assert!(!session.is_open());

        session.dispatch(args(&["unite", "version"]), false, true).await.unwrap();

        assert!(session.is_open());
        assert_eq!(
            host.calls(),
            vec![
                HostCall::Create { name: "Unite".to_string(), id: 1 },
                HostCall::Show { id: 1 },
                HostCall::Clear { id: 1 },
                HostCall::Submit { id: 1, text: "unite version".to_string(), execute: true },
            ]
        );
        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_double_reset_disposes_exactly_once() {
        let host = Arc::new(RecordingHost::new());
        let mut session = manager(&host);

        session.dispatch(args(&["unite", "version"]), true, true).await.unwrap();
        session.dispatch(args(&["unite", "help"]), true, true).await.unwrap();

        let lifecycle: Vec<HostCall> = host
            .calls()
            .into_iter()
            .filter(|call| matches!(call, HostCall::Create { .. } | HostCall::Dispose { .. }))
            .collect();
        assert_eq!(
            lifecycle,
            vec![
                HostCall::Create { name: "Unite".to_string(), id: 1 },
                HostCall::Dispose { id: 1 },
                HostCall::Create { name: "Unite".to_string(), id: 2 },
            ]
        );
        assert_eq!(session.get_stats().channels_disposed, 1);
        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_relocate_reuses_channel() {
        let host = Arc::new(RecordingHost::new());
        let mut session = manager(&host);

        session.dispatch(args(&["unite", "version"]), true, true).await.unwrap();
        session.relocate(Path::new("/work/my app/www")).await.unwrap();
        session.dispatch(args(&["gulp", "build"]), false, true).await.unwrap();

        assert_eq!(host.created(), 1);
        assert_eq!(host.disposed(), 0);
        assert_eq!(
            host.submitted(),
            vec![
                "unite version".to_string(),
                "cd \"/work/my app/www\"".to_string(),
                "gulp build".to_string(),
            ]
        );
        assert_eq!(session.cwd(), Some(Path::new("/work/my app/www")));
        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_relocate_escapes_quotes_in_path() {
        let host = Arc::new(RecordingHost::new());
        let mut session = manager(&host);

        session.relocate(Path::new(r#"/work/it's"odd/www"#)).await.unwrap();
        session.dispatch(args(&["gulp", "build"]), false, true).await.unwrap();

        assert_eq!(
            host.submitted(),
            vec![r#"cd "/work/it's\"odd/www""#.to_string(), "gulp build".to_string()]
        );
        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_external_close_recreates_channel() {
        let host = Arc::new(RecordingHost::new());
        let mut session = manager(&host);

        session.dispatch(args(&["gulp", "serve"]), false, true).await.unwrap();
        host.close_externally(1);
        assert!(!session.is_open());

        session.dispatch(args(&["gulp", "serve"]), false, true).await.unwrap();
        assert_eq!(host.created(), 2);
        assert_eq!(host.disposed(), 0);
        assert_eq!(session.get_stats().external_closes, 1);
        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_close_event_is_ignored() {
        let host = Arc::new(RecordingHost::new());
        let mut session = manager(&host);

        session.dispatch(args(&["unite", "version"]), true, true).await.unwrap();
        session.dispatch(args(&["unite", "help"]), true, true).await.unwrap();

        // a late notification for the disposed first channel
        session.handle_closed(&ChannelClosed { name: "Unite".to_string(), id: 1 });
        assert!(session.is_open());

        session.handle_closed(&ChannelClosed { name: "Other".to_string(), id: 2 });
        assert!(session.is_open());
        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_staged_submit() {
        let host = Arc::new(RecordingHost::new());
        let mut session = manager(&host);

        session
            .dispatch(args(&["unite", "configure", "--packageName=app"]), true, false)
            .await
            .unwrap();

        assert!(host.calls().contains(&HostCall::Submit {
            id: 1,
            text: "unite configure --packageName=app".to_string(),
            execute: false,
        }));
        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_can_be_disabled() {
        let host = Arc::new(RecordingHost::new());
        let config = SessionConfig {
            clear_before_submit: false,
            ..SessionConfig::default()
        };
        let mut session = SessionManager::new(config, host.clone());

        session.dispatch(args(&["gulp", "unit"]), false, true).await.unwrap();
        assert!(!host.calls().iter().any(|call| matches!(call, HostCall::Clear { .. })));
        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_creation_failure_propagates() {
        let host = Arc::new(RecordingHost::new());
        host.fail_next_create("no pty available");
        let mut session = manager(&host);

        let err = session
            .dispatch(args(&["unite", "version"]), false, true)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::ChannelCreation { .. }));
        assert!(!session.is_open());
        assert!(host.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_closes_channel() {
        let host = Arc::new(RecordingHost::new());
        let mut session = manager(&host);

        session.dispatch(args(&["gulp", "build"]), false, true).await.unwrap();
        session.shutdown().await.unwrap();

        assert_eq!(session.get_state(), &SessionState::Terminated);
        assert!(host.calls().contains(&HostCall::Close { id: 1 }));
    }
}
