use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub ignore_apps: Vec<String>,
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub sensitive_keywords: Vec<String>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sensitive_keywords: ["password", "token", "key", "secret"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub webhook_url: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoExpireConfig {
    pub enabled: bool,
    /// 負數在讀取設定時即被拒絕
    pub minutes: u64,
}

impl Default for AutoExpireConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            minutes: 1440,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipulseConfig {
    pub filters: FilterConfig,
    pub notifications: NotificationConfig,
    pub sync: SyncConfig,
    pub auto_expire: AutoExpireConfig,
}

impl ClipulseConfig {
    /// 檔案不存在或格式錯誤時使用預設值
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Invalid config {}: {}; using defaults", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// 同步已啟用且設定了 webhook 時回傳網址
    pub fn sync_target(&self) -> Option<&str> {
        match (&self.sync.webhook_url, self.sync.enabled) {
            (Some(url), true) if !url.is_empty() => Some(url.as_str()),
            _ => None,
        }
    }
}

/// clipulse 資料目錄 (`~/.clipulse`)
#[derive(Debug, Clone)]
pub struct ClipulsePaths {
    pub data_dir: PathBuf,
}

impl ClipulsePaths {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .ok_or_else(|| crate::utils::error::ToolError::MissingConfigError {
                    field: "home directory".to_string(),
                })?
                .join(".clipulse"),
        };
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn database(&self) -> PathBuf {
        self.data_dir.join("clipboard.db")
    }

    pub fn config(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }
}
