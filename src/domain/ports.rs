use crate::utils::error::Result;
use std::path::Path;

/// 讀取系統剪貼簿
pub trait ClipboardSource: Send + Sync {
    /// `Ok(None)` 表示剪貼簿目前沒有文字內容
    fn read(&self) -> Result<Option<String>>;
}

/// 取得目前前景應用程式名稱
pub trait WindowProbe: Send + Sync {
    fn active_app(&self) -> String;
}

pub trait SoundPlayer: Send + Sync {
    fn play(&self, path: &Path) -> Result<()>;
}

/// 下載完成等事件的通知管道
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<()>;
}
