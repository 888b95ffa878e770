//! Display-only state derived from the chat log

use serde::{Deserialize, Serialize};

/// Progress/preview annotations shown next to the transcript.
///
/// Derived from the chat log and session state on every change. Never sent
/// back to the backend and never authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedDisplayState {
    pub current_step: usize,
    pub total_steps: usize,
    pub current_command: String,
    pub current_file_path: String,
    pub current_browser_url: String,
}

impl Default for DerivedDisplayState {
    fn default() -> Self {
        Self {
            current_step: 1,
            total_steps: 1,
            current_command: String::new(),
            current_file_path: String::new(),
            current_browser_url: String::new(),
        }
    }
}
