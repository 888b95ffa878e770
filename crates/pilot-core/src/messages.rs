//! Notification texts

pub const BACKEND_CONNECT_FAILED: &str = "Failed to connect to backend";

pub const SESSION_CREATED: &str = "Browser session created successfully!";
pub const SESSION_RESUMED: &str = "Session resumed successfully";
pub const SESSION_PAUSED: &str = "Session paused, sandbox kept for later";
pub const SESSION_TERMINATED: &str = "Session terminated";
pub const SESSION_DESTROYED: &str = "Session destroyed";

pub const TASK_COMPLETED: &str = "Task completed successfully";
pub const TASK_FAILED: &str = "Task execution failed";

pub const DOWNLOAD_FAILED: &str = "Failed to download file";
pub const FILE_ADD_FAILED: &str = "Failed to add file";

pub const TAKEOVER_ENABLED: &str = "Takeover enabled, you now control the desktop";
pub const TAKEOVER_DISABLED: &str = "Takeover disabled, the agent is back in control";
pub const TAKEOVER_ENABLE_ERROR: &str = "Failed to enable takeover";
pub const TAKEOVER_DISABLE_ERROR: &str = "Failed to disable takeover";

pub const DESKTOP_TAKEN: &str = "Desktop control taken over";
pub const DESKTOP_RELEASED: &str = "Desktop control released";
pub const DESKTOP_ACTION_FAILED: &str = "Desktop control request failed";

pub fn downloaded(name: &str) -> String {
    format!("Downloaded {}", name)
}

pub fn file_added(path: &str) -> String {
    format!("File added: {}", path)
}
