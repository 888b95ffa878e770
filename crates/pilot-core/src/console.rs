//! One remote session as seen from the terminal
//!
//! `Console` owns the session, chat, file and takeover components and wires
//! the effects they have on each other: a terminated session clears the
//! transcript, a reply that mentions a file triggers a listing refresh, and so
//! on. Front ends only talk to this type.

use crate::chat::{ChatCoordinator, SendGate, SendOutcome};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::extract;
use crate::files::FileRegistry;
use crate::http::HttpBackend;
use crate::ports::{BackendApi, Notifier};
use crate::progress::ProgressTracker;
use crate::session::{SessionClient, Teardown};
use crate::takeover::{PollHandle, TakeoverController, TakeoverState};
use pilot_types::wire::HealthResponse;
use pilot_types::{ChatMessage, DerivedDisplayState, SandboxFile, SessionState, ToolStatus};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

/// Everything a renderer needs, captured at one point in time
#[derive(Debug, Clone)]
pub struct ConsoleSnapshot {
    pub session: SessionState,
    pub messages: Vec<ChatMessage>,
    pub files: Vec<SandboxFile>,
    pub display: DerivedDisplayState,
    pub takeover: TakeoverState,
    pub sending: bool,
    pub loading_files: bool,
    pub tool_status: ToolStatus,
}

pub struct Console {
    config: ClientConfig,
    api: Arc<dyn BackendApi>,
    session: SessionClient,
    chat: ChatCoordinator,
    files: Arc<FileRegistry>,
    takeover: Arc<TakeoverController>,
    progress: RwLock<ProgressTracker>,
}

impl Console {
    pub fn new(config: ClientConfig, api: Arc<dyn BackendApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            session: SessionClient::new(api.clone(), notifier.clone()),
            chat: ChatCoordinator::new(
                api.clone(),
                notifier.clone(),
                config.require_takeover_for_chat,
            ),
            files: Arc::new(FileRegistry::new(api.clone(), notifier.clone())),
            takeover: Arc::new(TakeoverController::new(api.clone(), notifier)),
            progress: RwLock::new(ProgressTracker::new()),
            api,
            config,
        }
    }

    /// Console backed by the HTTP API at `config.api_base`
    pub fn connect(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let api = Arc::new(HttpBackend::new(&config)?);
        Ok(Self::new(config, api, notifier))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    pub fn takeover_state(&self) -> TakeoverState {
        self.takeover.state()
    }

    pub fn is_sending(&self) -> bool {
        self.chat.is_sending()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.chat.snapshot().await
    }

    pub async fn files(&self) -> Vec<SandboxFile> {
        self.files.files().await
    }

    pub async fn display(&self) -> DerivedDisplayState {
        self.progress.read().await.snapshot()
    }

    pub async fn snapshot(&self) -> ConsoleSnapshot {
        let session = self.session.state();
        ConsoleSnapshot {
            tool_status: session.tool_status(),
            session,
            messages: self.chat.snapshot().await,
            files: self.files.files().await,
            display: self.progress.read().await.snapshot(),
            takeover: self.takeover.state(),
            sending: self.chat.is_sending(),
            loading_files: self.files.is_loading(),
        }
    }

    /// Initial sync: session status, then files and takeover if a session
    /// is already running
    pub async fn start(&self) -> Result<SessionState> {
        let state = self.check_status().await?;
        if state.active {
            let _ = self.takeover.check_status().await;
        }
        Ok(self.session.state())
    }

    /// Re-read session status. Files are listed whenever the session turns
    /// ready, wherever it was created.
    pub async fn check_status(&self) -> Result<SessionState> {
        let was_ready = self.session.state().can_chat();
        let state = self.session.check_status().await?;
        if !was_ready && state.can_chat() {
            let _ = self.files.fetch(true).await;
        }
        self.refresh_display().await;
        Ok(state)
    }

    pub async fn create(&self) -> Result<SessionState> {
        self.session.create().await?;
        self.after_session_change().await;
        Ok(self.session.state())
    }

    pub async fn resume(&self) -> Result<SessionState> {
        self.session.resume().await?;
        self.after_session_change().await;
        Ok(self.session.state())
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

    async fn teardown(&self, kind: Teardown) -> Result<()> {
        self.session.teardown(kind).await?;

        self.takeover.reset();
        if kind.discards_history() {
            self.chat.clear().await;
            self.files.clear().await;
            self.progress.write().await.reset();
        } else {
            self.refresh_display().await;
        }
        Ok(())
    }

    async fn after_session_change(&self) {
        let state = self.session.state();
        if state.can_chat() {
            // Listing failures are logged by the registry
            let _ = self.files.fetch(true).await;
        }
        self.refresh_display().await;
    }

    async fn refresh_display(&self) {
        let log = self.chat.snapshot().await;
        let active = self.session.state().active;
        if self.progress.write().await.refresh_browser_url(&log, active) {
            debug!("Preview URL updated");
        }
    }

    /// Send a command to the agent and fold the reply into the display state
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        let gate = SendGate {
            session_ready: self.session.state().can_chat(),
            takeover_active: self.takeover.state().is_active,
        };
        let outcome = self.chat.send_message(text, gate).await?;

        if outcome.success {
            let mut progress = self.progress.write().await;
            progress.record_completed(text.trim(), outcome.log_len);
            if let Some(path) = extract::file_path_in(&outcome.response) {
                progress.record_file_path(path);
            }
        }
        self.refresh_display().await;

        if outcome.success && extract::mentions_file(&outcome.response) {
            self.schedule_file_refresh();
        }

        Ok(outcome)
    }

    /// Re-list files after the configured delay, if the session is still
    /// active by then
    pub fn schedule_file_refresh(&self) -> JoinHandle<()> {
        let files = Arc::clone(&self.files);
        let session = self.session.subscribe();
        let delay = self.config.file_refresh_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let active = session.borrow().active;
            if active {
                let _ = files.fetch(true).await;
            }
        })
    }

    pub async fn refresh_files(&self) -> Result<Vec<SandboxFile>> {
        self.files.fetch(self.session.state().active).await
    }

    /// Download a file by listed path or name. Unknown keys are treated as a
    /// sandbox path.
    pub async fn download(&self, key: &str, dest_dir: &Path) -> Result<PathBuf> {
        let file = match self.files.find(key).await {
            Some(file) => file,
            None => {
                let _ = self.refresh_files().await;
                self.files
                    .find(key)
                    .await
                    .unwrap_or_else(|| SandboxFile::from_path(key))
            }
        };
        self.files.download(&file, dest_dir).await
    }

    pub async fn add_file(&self, path: &str) -> Result<()> {
        self.files.add(path, self.session.state().active).await
    }

    pub async fn toggle_takeover(&self) -> Result<bool> {
        self.takeover.toggle(self.session.state().active).await
    }

    pub async fn check_takeover(&self) -> Result<bool> {
        self.takeover.check_status().await
    }

    pub async fn take_over_desktop(&self) -> Result<()> {
        self.takeover.take_over_desktop().await
    }

    pub async fn release_desktop(&self) -> Result<()> {
        self.takeover.release_desktop().await
    }

    pub fn spawn_takeover_polling(&self) -> PollHandle {
        self.takeover
            .spawn_polling(self.session.subscribe(), self.config.poll_interval)
    }

    pub async fn previous_step(&self) -> usize {
        self.progress.write().await.previous_step()
    }

    pub async fn next_step(&self) -> usize {
        self.progress.write().await.next_step()
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.api.health().await
    }
}
