//! Port traits (interfaces) for dependency injection

pub mod backend;
pub mod notifier;

pub use backend::BackendApi;
pub use notifier::{Notice, NoticeLevel, Notifier};
