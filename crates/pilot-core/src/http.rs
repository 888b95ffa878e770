//! HTTP client for the browser-agent API

use crate::config::ClientConfig;
use crate::error::{PilotError, Result};
use crate::ports::BackendApi;
use async_trait::async_trait;
use bytes::Bytes;
use pilot_types::wire::{
    ActionResponse, ChatRequest, ChatResponse, FilesResponse, HealthResponse, SessionResponse,
    StatusResponse, TakeoverStatusResponse,
};
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

pub struct HttpBackend {
    http: ReqwestClient,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| PilotError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.http.get(self.url(path)), path).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.http.post(self.url(path)), path).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.http.delete(self.url(path)), path).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, path: &str) -> Result<T> {
        debug!("Requesting {}", path);
        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let error: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
            return Err(PilotError::Backend(
                error_detail(&error).unwrap_or_else(|| format!("HTTP {} from {}", status, path)),
            ));
        }

        serde_json::from_str(&body)
            .map_err(|e| PilotError::Decode(format!("{} ({})", e, path)))
    }
}

/// Server-supplied error text: FastAPI's `detail`, else `error`, else `message`
fn error_detail(body: &serde_json::Value) -> Option<String> {
    ["detail", "error", "message"].iter().find_map(|key| match &body[key] {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.trim().is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn session_status(&self) -> Result<StatusResponse> {
        self.get("/api/session/status").await
    }

    async fn create_session(&self) -> Result<SessionResponse> {
        self.execute(
            self.http
                .post(self.url("/api/session/create"))
                .json(&serde_json::json!({})),
            "/api/session/create",
        )
        .await
    }

    async fn resume_session(&self) -> Result<SessionResponse> {
        self.post("/api/session/resume").await
    }

    async fn close_session(&self) -> Result<ActionResponse> {
        self.delete("/api/session/close").await
    }

    async fn terminate_session(&self) -> Result<ActionResponse> {
        self.delete("/api/session/terminate").await
    }

    async fn destroy_session(&self) -> Result<ActionResponse> {
        self.delete("/api/session/destroy").await
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.execute(self.http.post(self.url("/api/chat")).json(request), "/api/chat")
            .await
    }

    async fn list_files(&self) -> Result<FilesResponse> {
        self.get("/api/files").await
    }

    async fn download_file(&self, path: &str) -> Result<Bytes> {
        let response = self
            .http
            .get(self.url("/api/files/download"))
            .query(&[("file_path", path)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
            return Err(PilotError::Backend(
                error_detail(&error).unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }

        Ok(response.bytes().await?)
    }

    async fn add_file(&self, path: &str) -> Result<ActionResponse> {
        self.execute(
            self.http
                .post(self.url("/api/files/add"))
                .query(&[("file_path", path)]),
            "/api/files/add",
        )
        .await
    }

    async fn takeover_status(&self) -> Result<TakeoverStatusResponse> {
        self.get("/api/takeover/status").await
    }

    async fn enable_takeover(&self) -> Result<ActionResponse> {
        self.post("/api/takeover/enable").await
    }

    async fn disable_takeover(&self) -> Result<ActionResponse> {
        self.post("/api/takeover/disable").await
    }

    async fn desktop_takeover(&self) -> Result<ActionResponse> {
        self.post("/api/desktop/takeover").await
    }

    async fn desktop_release(&self) -> Result<ActionResponse> {
        self.post("/api/desktop/release").await
    }

    async fn health(&self) -> Result<HealthResponse> {
        self.get("/api/health").await
    }
}
