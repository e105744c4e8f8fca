use crate::adapters::http::HttpClient;
use crate::adapters::sqlite::ClipulseDb;
use crate::config::clipulse_config::ClipulseConfig;
use crate::domain::model::ClipboardEntry;
use crate::domain::ports::{ClipboardSource, WindowProbe};
use crate::utils::error::Result;
use regex::{Regex, RegexBuilder};
use similar::TextDiff;
use std::time::Duration;
use tokio::sync::watch;

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
const ERROR_BACKOFF: Duration = Duration::from_secs(1);
const SYNC_TIMEOUT: Duration = Duration::from_secs(5);

pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

pub fn format_entry(entry: &ClipboardEntry, show_full: bool) -> String {
    let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
    let content = if show_full || entry.content.chars().count() <= 100 {
        entry.content.clone()
    } else {
        format!("{}...", truncate_chars(&entry.content, 100))
    };
    format!("[{}] {}: {}", timestamp, entry.source_app, content)
}

/// 前一筆到目前這筆的 unified diff
pub fn unified_diff(previous: &str, current: &str) -> String {
    TextDiff::from_lines(previous, current)
        .unified_diff()
        .header("Previous", "Current")
        .to_string()
}

/// 編譯後的過濾規則
#[derive(Debug, Clone)]
pub struct ContentFilter {
    ignore_apps: Vec<String>,
    patterns: Vec<Regex>,
}

impl ContentFilter {
    /// 無效的正規表示式會被略過
    pub fn from_config(config: &ClipulseConfig) -> Self {
        let patterns = config
            .filters
            .ignore_patterns
            .iter()
            .filter_map(|pattern| match compile_pattern(pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!("Skipping invalid ignore pattern '{}': {}", pattern, e);
                    None
                }
            })
            .collect();
        Self {
            ignore_apps: config
                .filters
                .ignore_apps
                .iter()
                .map(|app| app.to_lowercase())
                .collect(),
            patterns,
        }
    }

    pub fn should_ignore(&self, content: &str, app: &str) -> bool {
        let app = app.to_lowercase();
        self.ignore_apps.iter().any(|ignored| app.contains(ignored.as_str()))
            || self.patterns.iter().any(|re| re.is_match(content))
    }
}

pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

pub fn contains_sensitive(config: &ClipulseConfig, content: &str) -> bool {
    if !config.notifications.enabled {
        return false;
    }
    let lowered = content.to_lowercase();
    config
        .notifications
        .sensitive_keywords
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    Unchanged,
    Filtered,
    Duplicate,
    Recorded { sensitive: bool },
}

/// 剪貼簿監控
pub struct ClipulseMonitor<C: ClipboardSource, W: WindowProbe> {
    db: ClipulseDb,
    config: ClipulseConfig,
    filter: ContentFilter,
    clipboard: C,
    window: W,
    http: HttpClient,
    last_content: String,
}

impl<C: ClipboardSource, W: WindowProbe> ClipulseMonitor<C, W> {
    pub fn new(db: ClipulseDb, config: ClipulseConfig, clipboard: C, window: W) -> Result<Self> {
        let filter = ContentFilter::from_config(&config);
        Ok(Self {
            db,
            config,
            filter,
            clipboard,
            window,
            http: HttpClient::new()?,
            last_content: String::new(),
        })
    }

    pub fn db(&self) -> &ClipulseDb {
        &self.db
    }

    /// 單次輪詢
    pub async fn poll_once(&mut self) -> Result<PollResult> {
        let result = self.check_clipboard().await?;
        if self.config.auto_expire.enabled {
            self.db.expire_older_than(self.config.auto_expire.minutes)?;
        }
        Ok(result)
    }

    async fn check_clipboard(&mut self) -> Result<PollResult> {
        let Some(content) = self.clipboard.read()? else {
            return Ok(PollResult::Unchanged);
        };
        if content == self.last_content || content.trim().is_empty() {
            return Ok(PollResult::Unchanged);
        }

        let app = self.window.active_app();
        let result = if self.filter.should_ignore(&content, &app) {
            tracing::debug!("Ignored clipboard content from {}", app);
            PollResult::Filtered
        } else {
            let entry = ClipboardEntry::now(content.clone(), app);
            if self.db.add_entry(&entry)? {
                println!(
                    "📋 [{}] From {}: {}...",
                    entry.timestamp.format("%H:%M:%S"),
                    entry.source_app,
                    truncate_chars(&entry.content, 50)
                );
                let sensitive = contains_sensitive(&self.config, &entry.content);
                if sensitive {
                    println!("⚠️  WARNING: Sensitive content detected!");
                }
                self.sync_entry(&entry).await;
                PollResult::Recorded { sensitive }
            } else {
                PollResult::Duplicate
            }
        };

        // 被過濾的內容也要記住，避免重複判斷
        self.last_content = content;
        Ok(result)
    }

    async fn sync_entry(&self, entry: &ClipboardEntry) {
        let Some(url) = self.config.sync_target() else {
            return;
        };
        match self.http.post_json(url, entry, SYNC_TIMEOUT).await {
            Ok(200) => tracing::debug!("Synced entry {}", entry.hash),
            Ok(status) => println!("Webhook sync failed: {}", status),
            Err(e) => println!("Webhook sync error: {}", e),
        }
    }

    /// 持續監控直到收到停止訊號
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        println!("🔍 Clipulse is monitoring your clipboard... (Press Ctrl+C to stop)");
        while !*shutdown.borrow() {
            let delay = match self.poll_once().await {
                Ok(_) => POLL_INTERVAL,
                Err(e) => {
                    println!("Error monitoring clipboard: {}", e);
                    ERROR_BACKOFF
                }
            };
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {}
            }
        }
        println!("\n👋 Stopping clipboard monitoring...");
        Ok(())
    }
}
