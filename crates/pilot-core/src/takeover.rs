//! Human takeover of the remote desktop
//!
//! Tracks whether the agent or the user controls the desktop. Status is
//! polled by a background task that only ticks while the session is active
//! and is cancelled deterministically through its [`PollHandle`].

use crate::busy::BusyFlag;
use crate::error::{PilotError, Result};
use crate::messages;
use crate::ports::{BackendApi, Notifier};
use pilot_types::SessionState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TakeoverState {
    pub is_active: bool,
    pub is_loading: bool,
}

pub struct TakeoverController {
    api: Arc<dyn BackendApi>,
    notifier: Arc<dyn Notifier>,
    active: AtomicBool,
    loading: BusyFlag,
}

impl TakeoverController {
    pub fn new(api: Arc<dyn BackendApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            active: AtomicBool::new(false),
            loading: BusyFlag::new(),
        }
    }

    pub fn state(&self) -> TakeoverState {
        TakeoverState {
            is_active: self.active.load(Ordering::Acquire),
            is_loading: self.loading.is_busy(),
        }
    }

    pub fn reset(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Refresh the flag from `/api/takeover/status`. Failures are only logged.
    pub async fn check_status(&self) -> Result<bool> {
        match self.api.takeover_status().await {
            Ok(status) if status.success => {
                let active = status.data.takeover_active.unwrap_or(false);
                self.active.store(active, Ordering::Release);
                Ok(active)
            }
            Ok(_) => {
                debug!("Takeover status reported failure");
                Ok(self.state().is_active)
            }
            Err(e) => {
                warn!("Failed to check takeover status: {}", e);
                Err(e)
            }
        }
    }

    /// Hand control to the user, or back to the agent
    pub async fn toggle(&self, session_active: bool) -> Result<bool> {
        if !session_active {
            let e = PilotError::SessionNotReady;
            self.notifier.error(&e.to_string());
            return Err(e);
        }

        let Some(_loading) = self.loading.try_enter() else {
            let e = PilotError::OperationInProgress("takeover");
            self.notifier.error(&e.to_string());
            return Err(e);
        };

        let enabling = !self.active.load(Ordering::Acquire);
        let (done_text, error_text) = if enabling {
            (messages::TAKEOVER_ENABLED, messages::TAKEOVER_ENABLE_ERROR)
        } else {
            (messages::TAKEOVER_DISABLED, messages::TAKEOVER_DISABLE_ERROR)
        };

        let response = if enabling {
            self.api.enable_takeover().await
        } else {
            self.api.disable_takeover().await
        };

        match response {
            Ok(response) if response.success => {
                self.active.store(enabling, Ordering::Release);
                info!("Takeover {}", if enabling { "enabled" } else { "disabled" });
                self.notifier.success(done_text);
                Ok(enabling)
            }
            Ok(response) => {
                let detail = response.failure_text().unwrap_or("Unknown error").to_string();
                warn!("{}: {}", error_text, detail);
                self.notifier.error(&format!("{}: {}", error_text, detail));
                Err(PilotError::Backend(detail))
            }
            Err(e) => {
                warn!("{}: {}", error_text, e);
                self.notifier.error(&format!("{}: {}", error_text, e));
                Err(e)
            }
        }
    }

    pub async fn take_over_desktop(&self) -> Result<()> {
        let response = self.api.desktop_takeover().await;
        self.desktop_action(response, messages::DESKTOP_TAKEN)
    }

    pub async fn release_desktop(&self) -> Result<()> {
        let response = self.api.desktop_release().await;
        self.desktop_action(response, messages::DESKTOP_RELEASED)
    }

    fn desktop_action(
        &self,
        response: Result<pilot_types::wire::ActionResponse>,
        done_text: &str,
    ) -> Result<()> {
        match response {
            Ok(response) if response.success => {
                let text = response.message.as_deref().unwrap_or(done_text);
                self.notifier.success(text);
                Ok(())
            }
            Ok(response) => {
                let text = response
                    .failure_text()
                    .unwrap_or(messages::DESKTOP_ACTION_FAILED)
                    .to_string();
                self.notifier.error(&text);
                Err(PilotError::Backend(text))
            }
            Err(e) => {
                self.notifier.error(&e.notice_text());
                Err(e)
            }
        }
    }

    /// Poll takeover status every `interval` while the session is active.
    ///
    /// Checks once as soon as the session becomes active, pauses while it is
    /// inactive, and stops for good when the handle is stopped or dropped.
    pub fn spawn_polling(
        self: &Arc<Self>,
        mut session: watch::Receiver<SessionState>,
        interval: Duration,
    ) -> PollHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let controller = Arc::clone(self);

        let task = tokio::spawn(async move {
            loop {
                let active = session.borrow_and_update().active;
                if !active {
                    tokio::select! {
                        _ = token.cancelled() => return,
                        changed = session.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            continue;
                        }
                    }
                }

                debug!("Takeover polling started");
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    tokio::select! {
                        _ = token.cancelled() => return,
                        _ = ticker.tick() => {
                            // Errors are already logged by check_status
                            let _ = controller.check_status().await;
                        }
                        changed = session.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            let active = session.borrow_and_update().active;
                            if !active {
                                debug!("Session inactive, takeover polling paused");
                                break;
                            }
                        }
                    }
                }
            }
        });

        PollHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// Owns the polling task; dropping it cancels the task
pub struct PollHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Cancel and wait for the task to exit
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
