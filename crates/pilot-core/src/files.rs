//! Sandbox file listing and download

use crate::busy::BusyFlag;
use crate::error::{PilotError, Result};
use crate::messages;
use crate::ports::{BackendApi, Notifier};
use pilot_types::SandboxFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub struct FileRegistry {
    api: Arc<dyn BackendApi>,
    notifier: Arc<dyn Notifier>,
    files: RwLock<Vec<SandboxFile>>,
    loading: BusyFlag,
}

impl FileRegistry {
    pub fn new(api: Arc<dyn BackendApi>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            files: RwLock::new(Vec::new()),
            loading: BusyFlag::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_busy()
    }

    pub async fn files(&self) -> Vec<SandboxFile> {
        self.files.read().await.clone()
    }

    /// Look a file up by exact path, then by name
    pub async fn find(&self, key: &str) -> Option<SandboxFile> {
        let files = self.files.read().await;
        files
            .iter()
            .find(|f| f.path == key)
            .or_else(|| files.iter().find(|f| f.name == key))
            .cloned()
    }

    pub async fn clear(&self) {
        self.files.write().await.clear();
    }

    /// Replace the cached listing with the server's. Does nothing while the
    /// session is inactive; failures are logged and keep the previous list.
    pub async fn fetch(&self, session_active: bool) -> Result<Vec<SandboxFile>> {
        if !session_active {
            debug!("Skipping file listing, session inactive");
            return Ok(self.files().await);
        }

        let _loading = self.loading.enter();
        match self.api.list_files().await {
            Ok(listing) if listing.success => {
                debug!("Listed {} sandbox files", listing.files.len());
                *self.files.write().await = listing.files.clone();
                Ok(listing.files)
            }
            Ok(listing) => {
                let text = listing
                    .error
                    .unwrap_or_else(|| "Failed to list files".to_string());
                warn!("Failed to fetch files: {}", text);
                Err(PilotError::Backend(text))
            }
            Err(e) => {
                warn!("Error fetching files: {}", e);
                Err(e)
            }
        }
    }

    /// Download `file` by its listed path into `dest_dir`, saved under the
    /// listed name.
    pub async fn download(&self, file: &SandboxFile, dest_dir: &Path) -> Result<PathBuf> {
        let bytes = match self.api.download_file(&file.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Error downloading {}: {}", file.path, e);
                self.notifier.error(messages::DOWNLOAD_FAILED);
                return Err(PilotError::DownloadFailed(file.name.clone()));
            }
        };

        let target = dest_dir.join(local_file_name(file));
        let written = async {
            tokio::fs::create_dir_all(dest_dir).await?;
            tokio::fs::write(&target, &bytes).await
        }
        .await;

        if let Err(e) = written {
            warn!("Failed to save {:?}: {}", target, e);
            self.notifier.error(messages::DOWNLOAD_FAILED);
            return Err(PilotError::Io(e));
        }

        info!("Downloaded {} ({} bytes) to {:?}", file.path, bytes.len(), target);
        self.notifier.success(&messages::downloaded(&file.name));
        Ok(target)
    }

    /// Ask the backend to track a file it did not pick up on its own
    pub async fn add(&self, path: &str, session_active: bool) -> Result<()> {
        match self.api.add_file(path).await {
            Ok(response) if response.success => {
                self.notifier.success(&messages::file_added(path));
                if let Err(e) = self.fetch(session_active).await {
                    debug!("Refresh after add failed: {}", e);
                }
                Ok(())
            }
            Ok(response) => {
                let text = response
                    .failure_text()
                    .unwrap_or(messages::FILE_ADD_FAILED)
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
}

/// The listed name reduced to its last component, so a name can never
/// escape the destination directory
fn local_file_name(file: &SandboxFile) -> String {
    [file.name.as_str(), file.path.as_str()]
        .iter()
        .filter_map(|candidate| Path::new(candidate).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .find(|name| !name.is_empty() && name != "..")
        .unwrap_or_else(|| "download".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::NoticeLevel;
    use crate::testing::{FakeBackend, RecordingNotifier, Scripted};
    use serde_json::json;

    fn registry() -> (FileRegistry, Arc<FakeBackend>, Arc<RecordingNotifier>) {
        let api = FakeBackend::new();
        let notifier = RecordingNotifier::new();
        (FileRegistry::new(api.clone(), notifier.clone()), api, notifier)
    }

    fn two_files() -> serde_json::Value {
        json!({
            "success": true,
            "files": [
                {"name": "my report.md", "path": "/home/user/my report.md", "size": 12, "type": "md"},
                {"name": "data.csv", "path": "/home/user/data.csv", "size": 0, "type": "csv"}
            ]
        })
    }

    #[tokio::test]
    async fn fetch_is_noop_while_inactive() {
        let (files, api, _) = registry();
        api.reply("list_files", two_files());

        assert!(files.fetch(false).await.unwrap().is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn fetch_replaces_listing_wholesale() {
        let (files, api, _) = registry();
        api.reply("list_files", two_files());
        assert_eq!(files.fetch(true).await.unwrap().len(), 2);

        api.reply(
            "list_files",
            json!({"success": true, "files": [{"name": "new.txt", "path": "/tmp/new.txt"}]}),
        );
        files.fetch(true).await.unwrap();

        let listed = files.files().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "new.txt");
        assert!(!files.is_loading());
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_list_without_notice() {
        let (files, api, notifier) = registry();
        api.reply("list_files", two_files());
        files.fetch(true).await.unwrap();

        api.reply("list_files", json!({"success": false, "error": "sandbox gone", "files": []}));
        assert!(files.fetch(true).await.is_err());
        api.script("list_files", Scripted::Offline);
        assert!(files.fetch(true).await.is_err());

        assert_eq!(files.files().await.len(), 2);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn download_uses_listed_path_and_name() {
        let (files, api, notifier) = registry();
        api.reply("list_files", two_files());
        api.script("download_file", Scripted::Bytes(b"# Report".to_vec()));
        files.fetch(true).await.unwrap();
        let dir = tempfile::tempdir().unwrap();

        let first = files.files().await.remove(0);
        let saved = files.download(&first, dir.path()).await.unwrap();

        assert_eq!(saved, dir.path().join("my report.md"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"# Report");
        assert!(api
            .calls()
            .contains(&"download_file:/home/user/my report.md".to_string()));
        assert_eq!(notifier.last().unwrap().text, "Downloaded my report.md");
    }

    #[tokio::test]
    async fn download_failure_notifies() {
        let (files, api, notifier) = registry();
        api.script("download_file", Scripted::Detail("File not found".to_string()));
        let dir = tempfile::tempdir().unwrap();
        let file = SandboxFile {
            name: "gone.txt".to_string(),
            path: "/tmp/gone.txt".to_string(),
            size: 0,
            file_type: "txt".to_string(),
        };

        let err = files.download(&file, dir.path()).await.unwrap_err();
        assert!(matches!(err, PilotError::DownloadFailed(name) if name == "gone.txt"));
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Error);
        assert!(!dir.path().join("gone.txt").exists());
    }

    #[tokio::test]
    async fn add_refreshes_listing() {
        let (files, api, _) = registry();
        api.reply("add_file", json!({"success": true, "message": "File added successfully"}));
        api.reply("list_files", two_files());

        files.add("/home/user/data.csv", true).await.unwrap();
        assert_eq!(api.calls(), vec!["add_file:/home/user/data.csv", "list_files"]);
        assert!(files.find("data.csv").await.is_some());
        assert!(files.find("/home/user/my report.md").await.is_some());
    }

    #[test]
    fn local_name_strips_directories() {
        let file = SandboxFile {
            name: "../../etc/passwd".to_string(),
            path: "/tmp/passwd".to_string(),
            size: 0,
            file_type: String::new(),
        };
        assert_eq!(local_file_name(&file), "passwd");
    }
}
