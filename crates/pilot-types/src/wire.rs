//! JSON bodies exchanged with the browser-agent HTTP API
//!
//! Every optional field defaults so partially filled bodies still decode;
//! the backend omits fields freely depending on the outcome.

use crate::SandboxFile;
use serde::{Deserialize, Serialize};

/// `GET /api/session/status`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub initialized: bool,
    #[serde(default)]
    pub taken_over: Option<bool>,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/session/create` and `POST /api/session/resume`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Generic `{success, message, error}` reply used by close/terminate/destroy,
/// the takeover toggles, the legacy desktop endpoints and `files/add`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ActionResponse {
    /// Server-supplied failure text, preferring `error` over `message`
    pub fn failure_text(&self) -> Option<&str> {
        non_empty(self.error.as_deref()).or_else(|| non_empty(self.message.as_deref()))
    }
}

impl SessionResponse {
    /// Server-supplied `error`. A failed session call's `message` is not
    /// shown to the user.
    pub fn failure_text(&self) -> Option<&str> {
        non_empty(self.error.as_deref())
    }
}

/// `POST /api/chat` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: serde_json::Map::new(),
        }
    }
}

/// `POST /api/chat` reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
}

impl ChatResponse {
    /// Text recorded in the transcript: `result` when present, else `message`
    pub fn reply_text(&self) -> String {
        non_empty(self.result.as_deref())
            .or_else(|| self.message.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

/// `GET /api/files`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilesResponse {
    pub success: bool,
    #[serde(default)]
    pub files: Vec<SandboxFile>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/takeover/status`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TakeoverStatusResponse {
    pub success: bool,
    #[serde(default)]
    pub data: TakeoverStatusData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TakeoverStatusData {
    #[serde(default)]
    pub takeover_active: Option<bool>,
}

/// `GET /api/health`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_reply_prefers_result() {
        let reply: ChatResponse = serde_json::from_value(serde_json::json!({
            "success": true,
            "message": "Task completed",
            "result": "done",
            "task": "open google.com"
        }))
        .unwrap();
        assert_eq!(reply.reply_text(), "done");

        let reply: ChatResponse = serde_json::from_value(serde_json::json!({
            "success": false,
            "message": "Task execution failed",
            "result": "",
            "error": "timeout"
        }))
        .unwrap();
        assert_eq!(reply.reply_text(), "Task execution failed");
    }

    #[test]
    fn session_failure_text_ignores_message() {
        let response: SessionResponse = serde_json::from_value(serde_json::json!({
            "success": false,
            "message": "Session could not be created"
        }))
        .unwrap();
        assert_eq!(response.failure_text(), None);

        let response: SessionResponse = serde_json::from_value(serde_json::json!({
            "success": false,
            "message": "Session could not be created",
            "error": "sandbox quota exceeded"
        }))
        .unwrap();
        assert_eq!(response.failure_text(), Some("sandbox quota exceeded"));
    }

    #[test]
    fn takeover_status_tolerates_missing_flag() {
        let status: TakeoverStatusResponse =
            serde_json::from_value(serde_json::json!({"success": true, "data": {}})).unwrap();
        assert_eq!(status.data.takeover_active, None);
    }

    #[test]
    fn chat_request_serializes_empty_context() {
        let body = serde_json::to_value(ChatRequest::new("hello")).unwrap();
        assert_eq!(body, serde_json::json!({"message": "hello", "context": {}}));
    }
}
