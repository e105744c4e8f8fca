use crate::utils::display::SpinnerStyle;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// fetcher 可保存的設定；未設定的欄位由命令列或預設值決定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherSettings {
    pub interval: Option<u64>,
    pub max_attempts: Option<u32>,
    pub headers: Option<HashMap<String, String>>,
    pub webhook: Option<String>,
    pub sound: Option<PathBuf>,
    pub no_sound: Option<bool>,
    pub spinner: Option<SpinnerStyle>,
}

impl FetcherSettings {
    /// 檔案不存在時為空設定；JSON 錯誤時警告並使用空設定
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("No config at {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("⚠️ Invalid JSON in {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `self` 優先，缺少的欄位取自 `fallback`
    pub fn or(self, fallback: FetcherSettings) -> FetcherSettings {
        FetcherSettings {
            interval: self.interval.or(fallback.interval),
            max_attempts: self.max_attempts.or(fallback.max_attempts),
            headers: self.headers.or(fallback.headers),
            webhook: self.webhook.or(fallback.webhook),
            sound: self.sound.or(fallback.sound),
            no_sound: self.no_sound.or(fallback.no_sound),
            spinner: self.spinner.or(fallback.spinner),
        }
    }
}

/// 預設音效與日誌檔所在目錄
pub fn fetcher_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cli-toolbox")
        .join("fetcher")
}

pub fn default_sound_path() -> PathBuf {
    fetcher_data_dir().join("sound.mp3")
}

pub fn default_log_path() -> PathBuf {
    fetcher_data_dir().join("fetcher.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cli_values_win_over_file() {
        let cli = FetcherSettings {
            interval: Some(10),
            ..Default::default()
        };
        let file = FetcherSettings {
            interval: Some(30),
            max_attempts: Some(4),
            ..Default::default()
        };
        let merged = cli.or(file);
        assert_eq!(merged.interval, Some(10));
        assert_eq!(merged.max_attempts, Some(4));
    }

    #[test]
    fn test_load_missing_and_invalid() {
        let dir = TempDir::new().unwrap();
        assert_eq!(FetcherSettings::load(&dir.path().join("none.json")), FetcherSettings::default());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "[1, 2").unwrap();
        assert_eq!(FetcherSettings::load(&bad), FetcherSettings::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fetcher.json");
        let settings = FetcherSettings {
            interval: Some(7),
            webhook: Some("https://hooks.example.com/x".to_string()),
            spinner: Some(SpinnerStyle::Earth),
            ..Default::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(FetcherSettings::load(&path), settings);
    }
}
