//! In-memory backend and notifier used by the unit tests

use crate::error::{PilotError, Result};
use crate::ports::{BackendApi, Notice, NoticeLevel, Notifier};
use async_trait::async_trait;
use bytes::Bytes;
use pilot_types::wire::{
    ActionResponse, ChatRequest, ChatResponse, FilesResponse, HealthResponse, SessionResponse,
    StatusResponse, TakeoverStatusResponse,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// What an endpoint answers with
#[derive(Debug, Clone)]
pub enum Scripted {
    Json(serde_json::Value),
    Bytes(Vec<u8>),
    /// Non-2xx with a `detail` body
    Detail(String),
    /// Transport failure
    Offline,
}

/// Scripted [`BackendApi`]: every endpoint answers with the reply set for it
/// (sticky) and records the call. Unscripted endpoints behave as offline.
#[derive(Default)]
pub struct FakeBackend {
    replies: Mutex<HashMap<&'static str, Scripted>>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, endpoint: &'static str, body: serde_json::Value) {
        self.script(endpoint, Scripted::Json(body));
    }

    pub fn script(&self, endpoint: &'static str, reply: Scripted) {
        self.replies.lock().unwrap().insert(endpoint, reply);
    }

    /// Park requests to `endpoint` until the returned handle is notified
    pub fn hold(&self, endpoint: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(endpoint, gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == endpoint || c.starts_with(&format!("{}:", endpoint)))
            .count()
    }

    async fn answer(&self, endpoint: &'static str, arg: Option<&str>) -> Scripted {
        self.calls.lock().unwrap().push(match arg {
            Some(arg) => format!("{}:{}", endpoint, arg),
            None => endpoint.to_string(),
        });

        let gate = self.gates.lock().unwrap().get(endpoint).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.replies
            .lock()
            .unwrap()
            .get(endpoint)
            .cloned()
            .unwrap_or(Scripted::Offline)
    }

    async fn json<T: DeserializeOwned>(&self, endpoint: &'static str, arg: Option<&str>) -> Result<T> {
        match self.answer(endpoint, arg).await {
            Scripted::Json(value) => Ok(serde_json::from_value(value)?),
            Scripted::Bytes(_) => Err(PilotError::Decode("binary body".to_string())),
            Scripted::Detail(detail) => Err(PilotError::Backend(detail)),
            Scripted::Offline => Err(PilotError::Connection("connection refused".to_string())),
        }
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn session_status(&self) -> Result<StatusResponse> {
        self.json("session_status", None).await
    }

    async fn create_session(&self) -> Result<SessionResponse> {
        self.json("create_session", None).await
    }

    async fn resume_session(&self) -> Result<SessionResponse> {
        self.json("resume_session", None).await
    }

    async fn close_session(&self) -> Result<ActionResponse> {
        self.json("close_session", None).await
    }

    async fn terminate_session(&self) -> Result<ActionResponse> {
        self.json("terminate_session", None).await
    }

    async fn destroy_session(&self) -> Result<ActionResponse> {
        self.json("destroy_session", None).await
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.json("send_chat", Some(&request.message)).await
    }

    async fn list_files(&self) -> Result<FilesResponse> {
        self.json("list_files", None).await
    }

    async fn download_file(&self, path: &str) -> Result<Bytes> {
        match self.answer("download_file", Some(path)).await {
            Scripted::Bytes(bytes) => Ok(Bytes::from(bytes)),
            Scripted::Json(value) => Ok(Bytes::from(value.to_string())),
            Scripted::Detail(detail) => Err(PilotError::Backend(detail)),
            Scripted::Offline => Err(PilotError::Connection("connection refused".to_string())),
        }
    }

    async fn add_file(&self, path: &str) -> Result<ActionResponse> {
        self.json("add_file", Some(path)).await
    }

    async fn takeover_status(&self) -> Result<TakeoverStatusResponse> {
        self.json("takeover_status", None).await
    }

    async fn enable_takeover(&self) -> Result<ActionResponse> {
        self.json("enable_takeover", None).await
    }

    async fn disable_takeover(&self) -> Result<ActionResponse> {
        self.json("disable_takeover", None).await
    }

    async fn desktop_takeover(&self) -> Result<ActionResponse> {
        self.json("desktop_takeover", None).await
    }

    async fn desktop_release(&self) -> Result<ActionResponse> {
        self.json("desktop_release", None).await
    }

    async fn health(&self) -> Result<HealthResponse> {
        self.json("health", None).await
    }
}

/// Keeps every notice for later assertions
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().unwrap().last().cloned()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.level == level)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
