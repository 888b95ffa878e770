//! Remote session lifecycle
//!
//! Wraps the `/api/session/*` endpoints and publishes the resulting
//! [`SessionState`] on a watch channel. Every operation ends with exactly one
//! notification and leaves the state untouched when it fails.

use crate::busy::BusyFlag;
use crate::error::{PilotError, Result};
use crate::messages;
use crate::ports::{BackendApi, Notifier};
use pilot_types::wire::{ActionResponse, SessionResponse};
use pilot_types::SessionState;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// The three ways a session can be shut down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// `DELETE /api/session/close`: sandbox kept, can be resumed
    Pause,
    /// `DELETE /api/session/terminate`
    Terminate,
    /// `DELETE /api/session/destroy`
    Destroy,
}

impl Teardown {
    fn success_text(self) -> &'static str {
        match self {
            Teardown::Pause => messages::SESSION_PAUSED,
            Teardown::Terminate => messages::SESSION_TERMINATED,
            Teardown::Destroy => messages::SESSION_DESTROYED,
        }
    }

    /// Whether the transcript and file list go away with the session
    pub fn discards_history(self) -> bool {
        !matches!(self, Teardown::Pause)
    }
}

impl std::fmt::Display for Teardown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Teardown::Pause => write!(f, "pause"),
            Teardown::Terminate => write!(f, "terminate"),
            Teardown::Destroy => write!(f, "destroy"),
        }
    }
}

pub struct SessionClient {
    api: Arc<dyn BackendApi>,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<SessionState>,
    /// Create/resume in flight; a second start is rejected
    starting: BusyFlag,
    stopping: BusyFlag,
}

impl SessionClient {
    pub fn new(api: Arc<dyn BackendApi>, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            api,
            notifier,
            state,
            starting: BusyFlag::new(),
            stopping: BusyFlag::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_starting(&self) -> bool {
        self.starting.is_busy()
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.is_busy()
    }

    /// Poll `/api/session/status` and overwrite the snapshot with it
    pub async fn check_status(&self) -> Result<SessionState> {
        let status = match self.api.session_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to check session status: {}", e);
                self.notifier.error(messages::BACKEND_CONNECT_FAILED);
                return Err(e);
            }
        };

        if status.success {
            self.state.send_modify(|state| {
                state.active = status.active;
                state.initialized = status.initialized;
                if let Some(taken_over) = status.taken_over {
                    state.taken_over = taken_over;
                }
                if let Some(url) = status.stream_url.clone().filter(|u| !u.is_empty()) {
                    state.stream_url = Some(url);
                }
            });
            debug!(
                "Session status: active={} initialized={}",
                status.active, status.initialized
            );
        } else {
            debug!(
                "Status check reported failure: {}",
                status.message.as_deref().unwrap_or("no message")
            );
        }

        Ok(self.state())
    }

    pub async fn create(&self) -> Result<SessionState> {
        let _starting = self.begin_start()?;

        let response = self.api.create_session().await;
        let response = self.settle_start("create", response)?;

        self.state.send_modify(|state| {
            state.active = true;
            state.initialized = true;
            state.stream_url = response.stream_url.clone();
        });
        info!(
            "Session created, stream at {}",
            response.stream_url.as_deref().unwrap_or("<none>")
        );
        self.notifier.success(messages::SESSION_CREATED);

        Ok(self.state())
    }

    /// Resume a paused session, then reconcile with a fresh status check
    pub async fn resume(&self) -> Result<SessionState> {
        let _starting = self.begin_start()?;

        let response = self.api.resume_session().await;
        let response = self.settle_start("resume", response)?;

        self.state.send_modify(|state| {
            state.active = true;
            state.stream_url = response.stream_url.clone();
        });
        info!("Session resumed");
        self.notifier.success(messages::SESSION_RESUMED);

        // Status failures notify on their own; the resume itself succeeded
        let _ = self.check_status().await;

        Ok(self.state())
    }

    pub async fn pause(&self) -> Result<()> {
        self.teardown(Teardown::Pause).await
    }

    pub async fn terminate(&self) -> Result<()> {
        self.teardown(Teardown::Terminate).await
    }

    pub async fn destroy(&self) -> Result<()> {
        self.teardown(Teardown::Destroy).await
    }

    pub async fn teardown(&self, kind: Teardown) -> Result<()> {
        let Some(_stopping) = self.stopping.try_enter() else {
            let e = PilotError::OperationInProgress("session shutdown");
            self.notifier.error(&e.to_string());
            return Err(e);
        };

        let response = match kind {
            Teardown::Pause => self.api.close_session().await,
            Teardown::Terminate => self.api.terminate_session().await,
            Teardown::Destroy => self.api.destroy_session().await,
        };

        match response {
            Ok(ActionResponse { success: true, .. }) => {
                match kind {
                    Teardown::Pause => self.state.send_modify(|state| {
                        state.active = false;
                        state.taken_over = false;
                        state.stream_url = None;
                    }),
                    Teardown::Terminate | Teardown::Destroy => self.reset(),
                }
                info!("Session {} succeeded", kind);
                self.notifier.success(kind.success_text());
                Ok(())
            }
            Ok(response) => {
                let text = response
                    .failure_text()
                    .unwrap_or(messages::BACKEND_CONNECT_FAILED)
                    .to_string();
                warn!("Session {} rejected: {}", kind, text);
                self.notifier.error(&text);
                Err(PilotError::Backend(text))
            }
            Err(e) => {
                warn!("Session {} failed: {}", kind, e);
                self.notifier.error(&e.notice_text());
                Err(e)
            }
        }
    }

    /// Forget everything known about the remote session
    pub fn reset(&self) {
        self.state.send_replace(SessionState::default());
    }

    fn begin_start(&self) -> Result<crate::busy::BusyGuard<'_>> {
        self.starting.try_enter().ok_or_else(|| {
            let e = PilotError::OperationInProgress("session start");
            self.notifier.error(&e.to_string());
            e
        })
    }

    fn settle_start(
        &self,
        action: &str,
        response: Result<SessionResponse>,
    ) -> Result<SessionResponse> {
        match response {
            Ok(response) if response.success => Ok(response),
            Ok(response) => {
                let text = response
                    .failure_text()
                    .unwrap_or(messages::BACKEND_CONNECT_FAILED)
                    .to_string();
                warn!("Session {} rejected: {}", action, text);
                self.notifier.error(&text);
                Err(PilotError::Backend(text))
            }
            Err(e) => {
                warn!("Session {} failed: {}", action, e);
                self.notifier.error(&e.notice_text());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NoticeLevel;
    use crate::testing::{FakeBackend, RecordingNotifier, Scripted};
    use serde_json::json;

    fn client() -> (SessionClient, Arc<FakeBackend>, Arc<RecordingNotifier>) {
        let api = FakeBackend::new();
        let notifier = RecordingNotifier::new();
        (
            SessionClient::new(api.clone(), notifier.clone()),
            api,
            notifier,
        )
    }

    #[tokio::test]
    async fn status_reports_inactive_session() {
        let (client, api, notifier) = client();
        api.reply(
            "session_status",
            json!({"success": true, "active": false, "initialized": false, "message": "No active session"}),
        );

        let state = client.check_status().await.unwrap();
        assert!(!state.active);
        assert!(!state.can_chat());
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn status_failure_keeps_prior_state() {
        let (client, api, notifier) = client();
        api.reply(
            "create_session",
            json!({"success": true, "stream_url": "https://x/vnc", "message": "ok"}),
        );
        client.create().await.unwrap();

        api.script("session_status", Scripted::Offline);
        assert!(client.check_status().await.is_err());

        let state = client.state();
        assert!(state.active && state.initialized);
        assert_eq!(state.stream_url.as_deref(), Some("https://x/vnc"));
        assert_eq!(
            notifier.last().unwrap().text,
            messages::BACKEND_CONNECT_FAILED
        );
    }

    #[tokio::test]
    async fn status_without_stream_url_keeps_existing_url() {
        let (client, api, _) = client();
        api.reply(
            "create_session",
            json!({"success": true, "stream_url": "https://x/vnc", "message": "ok"}),
        );
        client.create().await.unwrap();

        api.reply(
            "session_status",
            json!({"success": true, "active": true, "initialized": true, "taken_over": true}),
        );
        let state = client.check_status().await.unwrap();
        assert_eq!(state.stream_url.as_deref(), Some("https://x/vnc"));
        assert!(state.taken_over);
    }

    #[tokio::test]
    async fn rejected_create_without_error_shows_connect_failure() {
        let (client, api, notifier) = client();
        api.reply(
            "create_session",
            json!({"success": false, "message": "Session could not be created"}),
        );

        assert!(client.create().await.is_err());
        assert!(!client.state().active);
        let last = notifier.last().unwrap();
        assert_eq!(last.level, NoticeLevel::Error);
        assert_eq!(last.text, messages::BACKEND_CONNECT_FAILED);
    }

    #[tokio::test]
    async fn create_activates_session() {
        let (client, api, notifier) = client();
        api.reply(
            "create_session",
            json!({"success": true, "stream_url": "https://x/vnc", "message": "ok"}),
        );
        let mut rx = client.subscribe();

        let state = client.create().await.unwrap();

        assert!(state.active && state.initialized);
        assert_eq!(state.live_stream_url(), Some("https://x/vnc"));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().active);
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Success);
        assert!(!client.is_starting());
    }

    #[tokio::test]
    async fn create_failure_surfaces_server_error() {
        let (client, api, notifier) = client();
        api.reply(
            "create_session",
            json!({"success": false, "error": "sandbox quota exceeded"}),
        );

        let err = client.create().await.unwrap_err();
        assert!(matches!(err, PilotError::Backend(_)));
        assert_eq!(client.state(), SessionState::default());
        assert_eq!(notifier.last().unwrap().text, "sandbox quota exceeded");
        assert!(!client.is_starting());
    }

    #[tokio::test]
    async fn create_offline_uses_generic_message() {
        let (client, _, notifier) = client();

        assert!(client.create().await.is_err());
        assert_eq!(
            notifier.last().unwrap().text,
            messages::BACKEND_CONNECT_FAILED
        );
    }

    #[tokio::test]
    async fn duplicate_start_is_rejected_while_in_flight() {
        let (client, api, _) = client();
        let client = Arc::new(client);
        api.reply(
            "create_session",
            json!({"success": true, "stream_url": "https://x/vnc", "message": "ok"}),
        );
        let gate = api.hold("create_session");

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.create().await }
        });
        while !client.is_starting() {
            tokio::task::yield_now().await;
        }

        let err = client.resume().await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(api.calls_to("resume_session"), 0);

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert!(!client.is_starting());
    }

    #[tokio::test]
    async fn resume_reconciles_with_status() {
        let (client, api, _) = client();
        api.reply(
            "resume_session",
            json!({"success": true, "stream_url": "https://x/vnc2", "message": "resumed"}),
        );
        api.reply(
            "session_status",
            json!({"success": true, "active": true, "initialized": true}),
        );

        let state = client.resume().await.unwrap();
        assert!(state.can_chat());
        assert_eq!(state.stream_url.as_deref(), Some("https://x/vnc2"));
        assert_eq!(api.calls(), vec!["resume_session", "session_status"]);
    }

    #[tokio::test]
    async fn terminate_resets_state() {
        let (client, api, notifier) = client();
        api.reply(
            "create_session",
            json!({"success": true, "stream_url": "https://x/vnc", "message": "ok"}),
        );
        client.create().await.unwrap();

        api.reply("terminate_session", json!({"success": true, "message": "terminated"}));
        client.terminate().await.unwrap();

        assert_eq!(client.state(), SessionState::default());
        assert_eq!(notifier.last().unwrap().text, messages::SESSION_TERMINATED);
    }

    #[tokio::test]
    async fn destroy_failure_leaves_state() {
        let (client, api, notifier) = client();
        api.reply(
            "create_session",
            json!({"success": true, "stream_url": "https://x/vnc", "message": "ok"}),
        );
        client.create().await.unwrap();

        api.script("destroy_session", Scripted::Detail("Failed to destroy".to_string()));
        assert!(client.destroy().await.is_err());

        assert!(client.state().active);
        assert_eq!(notifier.last().unwrap().text, "Failed to destroy");
        assert!(!client.is_stopping());
    }

    #[tokio::test]
    async fn pause_deactivates_and_drops_stream() {
        let (client, api, _) = client();
        api.reply(
            "create_session",
            json!({"success": true, "stream_url": "https://x/vnc", "message": "ok"}),
        );
        client.create().await.unwrap();

        api.reply("close_session", json!({"success": true, "message": "paused"}));
        client.pause().await.unwrap();

        let state = client.state();
        assert!(!state.active);
        assert_eq!(state.stream_url, None);
        assert!(!Teardown::Pause.discards_history());
    }
}
