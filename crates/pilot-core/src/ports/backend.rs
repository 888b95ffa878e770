//! Remote browser-agent API

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use pilot_types::wire::{
    ActionResponse, ChatRequest, ChatResponse, FilesResponse, HealthResponse, SessionResponse,
    StatusResponse, TakeoverStatusResponse,
};

/// Every endpoint the client consumes.
///
/// Implementations return `Err` only when no usable reply was obtained
/// (transport failure, undecodable body, or a non-2xx status carrying the
/// server's `detail`). A decoded `success: false` body is returned as `Ok`.
#[async_trait]
pub trait BackendApi: Send + Sync {
    // Session lifecycle
    async fn session_status(&self) -> Result<StatusResponse>;
    async fn create_session(&self) -> Result<SessionResponse>;
    async fn resume_session(&self) -> Result<SessionResponse>;
    async fn close_session(&self) -> Result<ActionResponse>;
    async fn terminate_session(&self) -> Result<ActionResponse>;
    async fn destroy_session(&self) -> Result<ActionResponse>;

    // Chat
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    // Files
    async fn list_files(&self) -> Result<FilesResponse>;
    async fn download_file(&self, path: &str) -> Result<Bytes>;
    async fn add_file(&self, path: &str) -> Result<ActionResponse>;

    // Takeover
    async fn takeover_status(&self) -> Result<TakeoverStatusResponse>;
    async fn enable_takeover(&self) -> Result<ActionResponse>;
    async fn disable_takeover(&self) -> Result<ActionResponse>;

    // Legacy desktop control
    async fn desktop_takeover(&self) -> Result<ActionResponse>;
    async fn desktop_release(&self) -> Result<ActionResponse>;

    async fn health(&self) -> Result<HealthResponse>;
}
