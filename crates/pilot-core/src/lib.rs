//! Pilot Core Library
//!
//! Client-side state for a remote browser-use agent: session lifecycle,
//! chat transcript, sandbox files and human takeover, kept in sync with the
//! agent's HTTP API.

pub mod busy;
pub mod chat;
pub mod config;
pub mod console;
pub mod error;
pub mod extract;
pub mod files;
pub mod http;
pub mod messages;
pub mod ports;
pub mod progress;
pub mod session;
pub mod takeover;

#[cfg(test)]
mod testing;

pub use pilot_types::*;

pub use chat::{ChatCoordinator, ChatLog, SendGate, SendOutcome};
pub use config::ClientConfig;
pub use console::{Console, ConsoleSnapshot};
pub use error::{PilotError, Result};
pub use files::FileRegistry;
pub use http::HttpBackend;
pub use ports::{BackendApi, Notice, NoticeLevel, Notifier};
pub use progress::ProgressTracker;
pub use session::{SessionClient, Teardown};
pub use takeover::{PollHandle, TakeoverController, TakeoverState};
