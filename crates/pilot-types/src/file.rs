//! Files produced by the agent inside the sandbox

use serde::{Deserialize, Serialize};

/// A file listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxFile {
    pub name: String,
    pub path: String,
    /// Size in bytes, 0 when unknown
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub file_type: String,
}

impl SandboxFile {
    /// A file known only by its sandbox path, named after the last component
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .rsplit('/')
            .find(|part| !part.is_empty())
            .unwrap_or("download")
            .to_string();
        let file_type = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();
        Self {
            name,
            path,
            size: 0,
            file_type,
        }
    }

    /// Human readable size for listings
    pub fn display_size(&self) -> String {
        const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

        if self.size == 0 {
            return "-".to_string();
        }

        let mut size = self.size as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }

        if unit == 0 {
            format!("{} {}", self.size, UNITS[0])
        } else {
            format!("{:.1} {}", size, UNITS[unit])
        }
    }
}
