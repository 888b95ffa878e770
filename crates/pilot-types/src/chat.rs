//! Chat transcript entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client-generated message id.
///
/// Backed by a UUIDv7: time-based, and still unique when two messages are
/// submitted within the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One user command and the agent's reply to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub message: String,
    /// Empty until the backend reply arrives
    pub response: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    /// Set once the reply (or a transport failure) has been merged
    #[serde(default)]
    pub settled: bool,
}

impl ChatMessage {
    /// A freshly submitted message awaiting its reply
    pub fn pending(message: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            message: message.into(),
            response: String::new(),
            success: false,
            timestamp: Utc::now(),
            settled: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| MessageId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn pending_message_has_empty_response() {
        let msg = ChatMessage::pending("open google.com");
        assert!(msg.is_pending());
        assert!(msg.response.is_empty());
        assert!(!msg.success);
    }
}
