//! Terminal session management module
//!
//! Owns the single shared terminal channel, the hosts that create it, and the
//! router turning interactive input into commands.

pub mod channel;
pub mod command_router;
pub mod mock;
pub mod session_manager;
pub mod shell_host;

pub use channel::{
    ChannelClosed, ChannelId, CloseNotifier, SessionError, TerminalChannel, TerminalHost,
};
pub use command_router::{CommandRouter, InteractiveCommand};
pub use session_manager::{SessionConfig, SessionManager, SessionState, SessionStats};
pub use shell_host::ShellHost;
