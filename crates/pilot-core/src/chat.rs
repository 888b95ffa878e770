//! Chat transcript and command dispatch
//!
//! Messages are appended optimistically before the request goes out and then
//! settled in place once the reply (or a transport failure) arrives. The log
//! is keyed by [`MessageId`], so each reply lands on exactly one entry no
//! matter how many sends are in flight.

use crate::busy::BusyFlag;
use crate::error::{PilotError, Result};
use crate::messages;
use crate::ports::{BackendApi, Notifier};
use pilot_types::wire::ChatRequest;
use pilot_types::{ChatMessage, MessageId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Keyed message store projected into insertion order
#[derive(Debug, Default, Clone)]
pub struct ChatLog {
    order: Vec<MessageId>,
    entries: HashMap<MessageId, ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) -> MessageId {
        let id = message.id;
        if self.entries.insert(id, message).is_none() {
            self.order.push(id);
        }
        id
    }

    /// Merge the outcome for `id`. Returns false when the id is unknown or
    /// was already settled; the entry is then left as it was.
    pub fn settle(&mut self, id: &MessageId, response: String, success: bool) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) if entry.is_pending() => {
                entry.response = response;
                entry.success = success;
                entry.settled = true;
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, id: &MessageId) -> Option<&ChatMessage> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.order.last().and_then(|id| self.entries.get(id))
    }

    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.entries.clear();
    }
}

/// Conditions a command has to meet before it may be sent
#[derive(Debug, Clone, Copy, Default)]
pub struct SendGate {
    pub session_ready: bool,
    pub takeover_active: bool,
}

/// How a send settled
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub id: MessageId,
    pub success: bool,
    pub response: String,
    /// Log length right after the reply was merged
    pub log_len: usize,
}

pub struct ChatCoordinator {
    api: Arc<dyn BackendApi>,
    notifier: Arc<dyn Notifier>,
    log: RwLock<ChatLog>,
    sending: BusyFlag,
    require_takeover: bool,
}

impl ChatCoordinator {
    pub fn new(
        api: Arc<dyn BackendApi>,
        notifier: Arc<dyn Notifier>,
        require_takeover: bool,
    ) -> Self {
        Self {
            api,
            notifier,
            log: RwLock::new(ChatLog::new()),
            sending: BusyFlag::new(),
            require_takeover,
        }
    }

    pub fn is_sending(&self) -> bool {
        self.sending.is_busy()
    }

    pub async fn snapshot(&self) -> Vec<ChatMessage> {
        self.log.read().await.snapshot()
    }

    pub async fn len(&self) -> usize {
        self.log.read().await.len()
    }

    pub async fn clear(&self) {
        self.log.write().await.clear();
    }

    fn check(&self, text: &str, gate: SendGate) -> Result<()> {
        if text.is_empty() {
            Err(PilotError::EmptyMessage)
        } else if !gate.session_ready {
            Err(PilotError::SessionNotReady)
        } else if self.require_takeover && !gate.takeover_active {
            Err(PilotError::TakeoverRequired)
        } else {
            Ok(())
        }
    }

    /// Send one command. Validation failures return `Err` without touching
    /// the backend; every send that passes validation returns `Ok` with the
    /// settled outcome, including API and transport failures.
    pub async fn send_message(&self, text: &str, gate: SendGate) -> Result<SendOutcome> {
        let message = text.trim();
        if let Err(e) = self.check(message, gate) {
            self.notifier.error(&e.to_string());
            return Err(e);
        }

        let id = self
            .log
            .write()
            .await
            .append(ChatMessage::pending(message));
        let _sending = self.sending.enter();
        info!("Sending command {}: {}", id, message);

        let (response, success) = match self.api.send_chat(&ChatRequest::new(message)).await {
            Ok(reply) if reply.success => {
                self.notifier.success(messages::TASK_COMPLETED);
                (reply.reply_text(), true)
            }
            Ok(reply) => {
                let text = reply
                    .error
                    .as_deref()
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or(messages::TASK_FAILED);
                warn!("Command {} failed: {}", id, text);
                self.notifier.error(text);
                (reply.reply_text(), false)
            }
            Err(PilotError::Backend(detail)) => {
                warn!("Command {} rejected: {}", id, detail);
                self.notifier.error(&detail);
                (detail, false)
            }
            Err(e) => {
                warn!("Command {} could not be delivered: {}", id, e);
                self.notifier.error(messages::BACKEND_CONNECT_FAILED);
                (messages::BACKEND_CONNECT_FAILED.to_string(), false)
            }
        };

        let mut log = self.log.write().await;
        log.settle(&id, response.clone(), success);

        Ok(SendOutcome {
            id,
            success,
            response,
            log_len: log.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NoticeLevel;
    use crate::testing::{FakeBackend, RecordingNotifier, Scripted};
    use serde_json::json;

    const READY: SendGate = SendGate {
        session_ready: true,
        takeover_active: false,
    };

    fn coordinator(require_takeover: bool) -> (ChatCoordinator, Arc<FakeBackend>, Arc<RecordingNotifier>) {
        let api = FakeBackend::new();
        let notifier = RecordingNotifier::new();
        (
            ChatCoordinator::new(api.clone(), notifier.clone(), require_takeover),
            api,
            notifier,
        )
    }

    #[test]
    fn settle_applies_once_per_id() {
        let mut log = ChatLog::new();
        let id = log.append(ChatMessage::pending("first"));
        let other = log.append(ChatMessage::pending("second"));

        assert!(log.settle(&id, "done".to_string(), true));
        assert!(!log.settle(&id, "again".to_string(), false));
        assert!(!log.settle(&MessageId::new(), "orphan".to_string(), true));

        assert_eq!(log.get(&id).unwrap().response, "done");
        assert!(log.get(&other).unwrap().is_pending());
        let order: Vec<_> = log.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn successful_send_updates_matching_entry() {
        let (chat, api, notifier) = coordinator(false);
        api.reply("send_chat", json!({"success": true, "message": "Task completed", "result": "done"}));

        let outcome = chat.send_message("  open google.com ", READY).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.log_len, 1);
        let log = chat.snapshot().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].id, outcome.id);
        assert_eq!(log[0].message, "open google.com");
        assert_eq!(log[0].response, "done");
        assert!(log[0].success);
        assert_eq!(notifier.last().unwrap().text, messages::TASK_COMPLETED);
        assert!(!chat.is_sending());
        assert_eq!(api.calls(), vec!["send_chat:open google.com"]);
    }

    #[tokio::test]
    async fn network_failure_is_recorded_in_transcript() {
        let (chat, api, notifier) = coordinator(false);
        api.script("send_chat", Scripted::Offline);

        let outcome = chat.send_message("open google.com", READY).await.unwrap();

        assert!(!outcome.success);
        let log = chat.snapshot().await;
        assert_eq!(log[0].response, messages::BACKEND_CONNECT_FAILED);
        assert!(!log[0].success);
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Error);
        assert!(!chat.is_sending());
    }

    #[tokio::test]
    async fn api_failure_falls_back_to_message() {
        let (chat, api, notifier) = coordinator(false);
        api.reply(
            "send_chat",
            json!({"success": false, "message": "Task execution failed", "error": "element not found"}),
        );

        let outcome = chat.send_message("click login", READY).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.response, "Task execution failed");
        assert_eq!(notifier.last().unwrap().text, "element not found");
    }

    #[tokio::test]
    async fn blank_input_never_reaches_backend() {
        let (chat, api, notifier) = coordinator(false);

        for text in ["", "   ", "\n\t"] {
            let err = chat.send_message(text, READY).await.unwrap_err();
            assert!(matches!(err, PilotError::EmptyMessage));
        }

        assert!(api.calls().is_empty());
        assert_eq!(notifier.count(NoticeLevel::Error), 3);
        assert_eq!(chat.len().await, 0);
    }

    #[tokio::test]
    async fn inactive_session_is_rejected() {
        let (chat, api, _) = coordinator(false);

        let err = chat
            .send_message("hello", SendGate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PilotError::SessionNotReady));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn takeover_gate_applies_only_when_required() {
        let (chat, api, _) = coordinator(true);
        api.reply("send_chat", json!({"success": true, "result": "ok"}));

        let err = chat.send_message("hello", READY).await.unwrap_err();
        assert!(matches!(err, PilotError::TakeoverRequired));

        let gate = SendGate {
            session_ready: true,
            takeover_active: true,
        };
        assert!(chat.send_message("hello", gate).await.unwrap().success);
    }

    #[tokio::test]
    async fn concurrent_sends_settle_independently() {
        let (chat, api, _) = coordinator(false);
        let chat = Arc::new(chat);
        api.reply("send_chat", json!({"success": true, "result": "ok"}));
        let gate = api.hold("send_chat");

        let first = tokio::spawn({
            let chat = chat.clone();
            async move { chat.send_message("one", READY).await }
        });
        let second = tokio::spawn({
            let chat = chat.clone();
            async move { chat.send_message("two", READY).await }
        });
        while api.calls_to("send_chat") < 2 {
            tokio::task::yield_now().await;
        }
        assert!(chat.is_sending());
        assert!(chat.snapshot().await.iter().all(|m| m.is_pending()));

        gate.notify_one();
        gate.notify_one();
        let a = first.await.unwrap().unwrap();
        let b = second.await.unwrap().unwrap();

        assert_ne!(a.id, b.id);
        let log = chat.snapshot().await;
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|m| m.success && m.response == "ok"));
        assert!(!chat.is_sending());
    }

    #[tokio::test]
    async fn clear_empties_log() {
        let (chat, api, _) = coordinator(false);
        api.reply("send_chat", json!({"success": true, "result": "ok"}));
        chat.send_message("one", READY).await.unwrap();

        chat.clear().await;
        assert_eq!(chat.len().await, 0);
    }
}
