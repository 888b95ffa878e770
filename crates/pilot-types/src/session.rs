//! Remote desktop session state

use serde::{Deserialize, Serialize};

/// Snapshot of the remote sandbox session as last reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub active: bool,
    pub initialized: bool,
    #[serde(default)]
    pub taken_over: bool,
    #[serde(default)]
    pub stream_url: Option<String>,
}

impl SessionState {
    /// Commands may only be sent to a session that is both active and initialized
    pub fn can_chat(&self) -> bool {
        self.active && self.initialized
    }

    /// Stream URL, only while the session is live
    pub fn live_stream_url(&self) -> Option<&str> {
        if self.can_chat() {
            self.stream_url.as_deref().filter(|url| !url.is_empty())
        } else {
            None
        }
    }

    pub fn tool_status(&self) -> ToolStatus {
        if !self.active {
            ToolStatus::Waiting
        } else if self.initialized && self.live_stream_url().is_some() {
            ToolStatus::Browser
        } else if self.initialized {
            ToolStatus::Ready
        } else {
            ToolStatus::Loading
        }
    }
}

/// What the agent is currently using, as shown in the preview panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Waiting,
    Loading,
    Ready,
    Browser,
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolStatus::Waiting => write!(f, "Waiting"),
            ToolStatus::Loading => write!(f, "Loading"),
            ToolStatus::Ready => write!(f, "Ready"),
            ToolStatus::Browser => write!(f, "Browser"),
        }
    }
}
