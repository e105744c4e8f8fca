use crate::adapters::http::{header_map, HttpClient, WebhookNotifier};
use crate::adapters::sound::CommandSoundPlayer;
use crate::domain::model::WatchOutcome;
use crate::domain::ports::{Notifier, SoundPlayer};
use crate::utils::display::{ProgressLine, WatchDisplay};
use crate::utils::error::{Result, ToolError};
use chrono::{Local, NaiveDateTime};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::watch;
use tokio::task::JoinSet;

const HEAD_TIMEOUT: Duration = Duration::from_secs(10);
const GET_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    pub interval_secs: u64,
    /// 0 表示不限次數
    pub max_attempts: u32,
    pub headers: HashMap<String, String>,
    pub check_size: bool,
    pub expected_size: Option<u64>,
    pub no_sound: bool,
    pub sound: Option<PathBuf>,
    pub webhook: Option<String>,
}

/// 網址路徑的最後一段
pub fn url_file_name(url: &str) -> Option<String> {
    let name = match url::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string)),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    }?;
    (!name.is_empty()).then_some(name)
}

/// 儲存路徑為目錄時，依網址自動命名
pub fn auto_name_file(url: &str, save_path: &Path) -> PathBuf {
    auto_name_file_at(url, save_path, Local::now().naive_local())
}

pub fn auto_name_file_at(url: &str, save_path: &Path, now: NaiveDateTime) -> PathBuf {
    let is_dir_like = save_path.is_dir() || save_path.to_string_lossy().ends_with('/');
    if !is_dir_like {
        return save_path.to_path_buf();
    }
    let file_name = match url_file_name(url) {
        Some(name) if name.contains('.') => name,
        _ => format!("downloaded_{}.file", now.format("%Y%m%d_%H%M%S")),
    };
    save_path.join(file_name)
}

/// 多網址模式的輸出路徑: `file_<n>_<名稱>`
pub fn multi_output_path(out_dir: &Path, index: usize, url: &str) -> PathBuf {
    match url_file_name(url) {
        Some(name) => out_dir.join(format!("file_{}_{}", index + 1, name)),
        None => out_dir.join(format!("file_{}", index + 1)),
    }
}

/// 讀取網址清單，略過空行與 `#` 註解
pub fn read_url_list(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(ToolError::NotFound {
            what: path.display().to_string(),
        });
    }
    let urls = parse_url_list(&std::fs::read_to_string(path)?);
    if urls.is_empty() {
        return Err(ToolError::config("No URLs found in file"));
    }
    Ok(urls)
}

pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn display_name(url: &str) -> String {
    url_file_name(url).unwrap_or_else(|| url.to_string())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

/// 監看網址直到檔案可下載
pub struct Fetcher {
    http: HttpClient,
    options: WatchOptions,
    display: WatchDisplay,
    sound: Arc<dyn SoundPlayer>,
    notifier: Option<Arc<dyn Notifier>>,
    shutdown: watch::Receiver<bool>,
}

impl Fetcher {
    pub fn new(options: WatchOptions, display: WatchDisplay, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let http = HttpClient::with_headers(header_map(&options.headers)?)?;
        let notifier = options
            .webhook
            .as_ref()
            .map(|url| Arc::new(WebhookNotifier::new(http.clone(), url.clone())) as Arc<dyn Notifier>);
        Ok(Self {
            http,
            options,
            display,
            sound: Arc::new(CommandSoundPlayer),
            notifier,
            shutdown,
        })
    }

    pub fn with_sound_player(mut self, sound: Arc<dyn SoundPlayer>) -> Self {
        self.sound = sound;
        self
    }

    pub fn display(&self) -> &WatchDisplay {
        &self.display
    }

    fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// 等待指定時間；期間收到停止訊號時回傳 `true`
    async fn sleep_or_shutdown(&self, duration: Duration) -> bool {
        let mut shutdown = self.shutdown.clone();
        if *shutdown.borrow() {
            return true;
        }
        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return false,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        (&mut sleep).await;
                        return false;
                    }
                    if *shutdown.borrow() {
                        return true;
                    }
                }
            }
        }
    }

    /// 執行 `future`；期間收到停止訊號時回傳 `Cancelled`
    async fn or_shutdown<F: Future>(&self, future: F) -> Result<F::Output> {
        let mut shutdown = self.shutdown.clone();
        if *shutdown.borrow() {
            return Err(ToolError::Cancelled);
        }
        tokio::pin!(future);
        loop {
            tokio::select! {
                output = &mut future => return Ok(output),
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        return Ok((&mut future).await);
                    }
                    if *shutdown.borrow() {
                        return Err(ToolError::Cancelled);
                    }
                }
            }
        }
    }

    /// 單次嘗試：HEAD 檢查後下載，回傳寫入位元組數
    pub async fn fetch_file(&self, url: &str, path: &Path, line: &ProgressLine) -> Result<u64> {
        let name = display_name(url);
        line.set_message(format!("Checking {}...", name));

        let mut known_size = None;
        match self.or_shutdown(self.http.head(url, HEAD_TIMEOUT)).await? {
            Ok(head) if head.status() == StatusCode::OK => {
                if let Some(size) = head.content_length().filter(|size| *size > 0) {
                    line.set_message(format!(
                        "Found {} ({:.2} MB)",
                        name,
                        size as f64 / 1024.0 / 1024.0
                    ));
                    if self.options.check_size {
                        if let Some(expected) = self.options.expected_size {
                            if expected != size {
                                return Err(ToolError::SizeMismatch {
                                    expected,
                                    actual: size,
                                });
                            }
                        }
                    }
                    known_size = Some(size);
                }
            }
            Ok(head) => tracing::debug!("HEAD {} returned {}", url, head.status()),
            Err(e) => tracing::debug!("HEAD {} failed: {}", url, e),
        }

        let mut response = self.or_shutdown(self.http.get(url, GET_TIMEOUT)).await??;
        if response.status() != StatusCode::OK {
            return Err(ToolError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        if let Some(total) = known_size.or_else(|| response.content_length()) {
            line.start_download(total);
        }
        line.set_message(format!("Downloading {}...", name));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let partial = part_path(path);
        let mut file = tokio::fs::File::create(&partial).await?;

        let mut downloaded: u64 = 0;
        let result: Result<()> = async {
            while let Some(chunk) = self.or_shutdown(response.chunk()).await?? {
                file.write_all(&chunk).await?;
                downloaded += chunk.len() as u64;
                line.set_position(downloaded);
            }
            file.flush().await?;
            Ok(())
        }
        .await;
        drop(file);

        if let Err(e) = result {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, path).await?;
        Ok(downloaded)
    }

    /// 重試直到下載成功、達到次數上限或收到停止訊號
    pub async fn watch(&self, url: &str, path: &Path, line: &ProgressLine) -> WatchOutcome {
        let name = display_name(url);
        let mut attempt: u32 = 0;

        loop {
            if self.is_shutdown() {
                return WatchOutcome::Cancelled { attempts: attempt };
            }
            attempt += 1;
            if self.options.max_attempts > 0 && attempt > self.options.max_attempts {
                self.display.error(&format!(
                    "Max attempts ({}) reached for {}",
                    self.options.max_attempts, name
                ));
                return WatchOutcome::GaveUp {
                    attempts: attempt - 1,
                };
            }

            line.reset();
            line.set_message(format!("Attempt {} - {}", attempt, name));
            tracing::debug!("Attempt {} for {}", attempt, url);

            match self.fetch_file(url, path, line).await {
                Ok(bytes) => {
                    line.finish();
                    self.display.success(&format!("Downloaded {}", name));
                    self.on_success(url, path).await;
                    return WatchOutcome::Downloaded {
                        path: path.to_path_buf(),
                        bytes,
                        attempts: attempt,
                    };
                }
                Err(ToolError::Cancelled) => {
                    return WatchOutcome::Cancelled { attempts: attempt };
                }
                Err(e @ ToolError::HttpStatus { .. }) => self.display.warning(&e.to_string()),
                Err(e) => self.display.error(&format!("Error: {}", e)),
            }

            line.reset();
            for remaining in (1..=self.options.interval_secs).rev() {
                line.set_message(format!("Waiting {}s before retry - {}", remaining, name));
                if self.sleep_or_shutdown(Duration::from_secs(1)).await {
                    return WatchOutcome::Cancelled { attempts: attempt };
                }
            }
        }
    }

    async fn on_success(&self, url: &str, path: &Path) {
        if !self.options.no_sound {
            if let Some(sound) = self.options.sound.clone().filter(|p| p.exists()) {
                let player = Arc::clone(&self.sound);
                let played = tokio::task::spawn_blocking(move || player.play(&sound)).await;
                match played {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => self.display.warning(&format!("Failed to play sound: {}", e)),
                    Err(e) => self.display.warning(&format!("Failed to play sound: {}", e)),
                }
            }
        }

        if let Some(notifier) = &self.notifier {
            let message = format!(
                "✅ File downloaded successfully: {} -> {}",
                url,
                path.display()
            );
            match notifier.notify(&message).await {
                Ok(()) => self.display.info("Notification sent"),
                Err(e) => self.display.error(&format!("Failed to send notification: {}", e)),
            }
        }
    }

    /// 單一網址模式
    pub async fn watch_one(&self, url: &str, path: &Path) -> WatchOutcome {
        let line = self.display.line(format!("Initializing {}...", display_name(url)));
        let outcome = self.watch(url, path, &line).await;
        line.finish();
        outcome
    }

    /// 同時監看多個網址，依輸入順序回傳結果
    pub async fn watch_many(self: Arc<Self>, urls: Vec<String>, out_dir: &Path) -> Vec<(String, WatchOutcome)> {
        self.display
            .info(&format!("Starting to watch {} URLs...", urls.len()));

        let mut tasks = JoinSet::new();
        for (index, url) in urls.into_iter().enumerate() {
            let output = multi_output_path(out_dir, index, &url);
            let line = self.display.line(format!("Initializing {}...", display_name(&url)));
            let fetcher = Arc::clone(&self);
            tasks.spawn(async move {
                let outcome = fetcher.watch(&url, &output, &line).await;
                line.finish();
                (index, url, outcome)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!("Watch task failed: {}", e),
            }
        }
        results.sort_by_key(|(index, _, _)| *index);

        self.display.clear();
        self.display.success("All downloads completed!");
        results
            .into_iter()
            .map(|(_, url, outcome)| (url, outcome))
            .collect()
    }
}
