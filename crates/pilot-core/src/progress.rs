//! Step counter and preview annotations for the console
//!
//! Everything here is derived from the chat log and session state and is
//! recomputed after each change. Nothing is ever sent to the backend.

use crate::extract;
use pilot_types::{ChatMessage, DerivedDisplayState};

#[derive(Debug, Default, Clone)]
pub struct ProgressTracker {
    state: DerivedDisplayState,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DerivedDisplayState {
        self.state.clone()
    }

    /// Store `url` unless it is already the current one. Returns whether
    /// anything changed.
    pub fn apply_browser_url(&mut self, url: Option<String>) -> bool {
        let url = url.unwrap_or_default();
        if url == self.state.current_browser_url {
            return false;
        }
        self.state.current_browser_url = url;
        true
    }

    /// Re-derive the preview URL from the log. Cleared while the session is
    /// inactive; a log with no recognizable URL keeps the last guess.
    pub fn refresh_browser_url(&mut self, log: &[ChatMessage], session_active: bool) -> bool {
        if !session_active {
            return self.apply_browser_url(None);
        }
        match extract::extract_browser_url(log) {
            Some(url) => self.apply_browser_url(Some(url)),
            None => false,
        }
    }

    /// A command completed; the log now holds `log_len` entries
    pub fn record_completed(&mut self, command: &str, log_len: usize) {
        let steps = log_len.max(1);
        self.state.current_command = command.to_string();
        self.state.total_steps = steps;
        self.state.current_step = steps;
    }

    pub fn record_file_path(&mut self, path: String) {
        self.state.current_file_path = path;
    }

    pub fn previous_step(&mut self) -> usize {
        if self.state.current_step > 1 {
            self.state.current_step -= 1;
        }
        self.state.current_step
    }

    pub fn next_step(&mut self) -> usize {
        if self.state.current_step < self.state.total_steps {
            self.state.current_step += 1;
        }
        self.state.current_step
    }

    pub fn reset(&mut self) {
        self.state = DerivedDisplayState::default();
    }
}
