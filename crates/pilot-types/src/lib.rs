//! Pilot Types - Pure data types shared by the client library and the CLI
//!
//! Holds the session/chat/file model and the JSON shapes exchanged with the
//! browser-agent backend. No async runtime dependencies.

pub mod chat;
pub mod display;
pub mod file;
pub mod session;
pub mod wire;

pub use chat::*;
pub use display::*;
pub use file::*;
pub use session::*;
