//! Error types for Pilot

use crate::messages::BACKEND_CONNECT_FAILED;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PilotError>;

#[derive(Error, Debug)]
pub enum PilotError {
    #[error("Please enter a message")]
    EmptyMessage,

    #[error("Please create a session first")]
    SessionNotReady,

    #[error("Enable takeover before sending commands")]
    TakeoverRequired,

    #[error("Another {0} request is already in progress")]
    OperationInProgress(&'static str),

    #[error("{0}")]
    Backend(String),

    #[error("Failed to connect to backend: {0}")]
    Connection(String),

    #[error("Unexpected response from backend: {0}")]
    Decode(String),

    #[error("Failed to download {0}")]
    DownloadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl PilotError {
    /// Rejected locally, before any request was made
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PilotError::EmptyMessage
                | PilotError::SessionNotReady
                | PilotError::TakeoverRequired
                | PilotError::OperationInProgress(_)
        )
    }

    /// The request never produced a usable reply
    pub fn is_connectivity(&self) -> bool {
        matches!(self, PilotError::Connection(_) | PilotError::Decode(_))
    }

    /// Text shown to the user when this error ends an operation
    pub fn notice_text(&self) -> String {
        match self {
            PilotError::Backend(detail) => detail.clone(),
            PilotError::Connection(_) | PilotError::Decode(_) => BACKEND_CONNECT_FAILED.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for PilotError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PilotError::Decode(e.to_string())
        } else {
            PilotError::Connection(e.to_string())
        }
    }
}

impl From<serde_json::Error> for PilotError {
    fn from(e: serde_json::Error) -> Self {
        PilotError::Decode(e.to_string())
    }
}
