use crate::adapters::pty::{terminal_size, PtySession, RawModeGuard};
use crate::domain::model::{CastEvent, CastHeader, EventKind, Recording};
use crate::utils::error::{Result, ToolError};
use std::collections::HashMap;
use std::io::{IsTerminal, Read, Write};
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

pub const CAST_VERSION: u32 = 2;
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const READ_BUFFER: usize = 1024;

pub fn default_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/bash".to_string())
}

pub fn default_term() -> String {
    std::env::var("TERM").unwrap_or_else(|_| "xterm-256color".to_string())
}

/// 逐段解碼 UTF-8，保留跨讀取邊界的多位元組序列
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        // 不完整的尾端留到下一次
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// 串流結束時剩餘的位元組
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

impl Recording {
    pub fn new(width: u16, height: u16, shell: &str, term: &str) -> Self {
        let mut env = HashMap::new();
        env.insert("SHELL".to_string(), shell.to_string());
        env.insert("TERM".to_string(), term.to_string());
        Self {
            header: CastHeader {
                version: CAST_VERSION,
                width,
                height,
                timestamp: Some(chrono::Utc::now().timestamp()),
                env,
            },
            events: Vec::new(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// 讀取錄影檔：JSON 文件或逐行的 asciicast v2
pub fn load(path: &Path) -> Result<Recording> {
    if !path.exists() {
        return Err(ToolError::NotFound {
            what: path.display().to_string(),
        });
    }
    parse_recording(&std::fs::read_to_string(path)?)
}

pub fn parse_recording(content: &str) -> Result<Recording> {
    let document_err = match serde_json::from_str::<Recording>(content) {
        Ok(recording) => return Ok(recording),
        Err(e) => e,
    };

    let mut lines = content.lines().map(str::trim).filter(|line| !line.is_empty());
    let header = match lines.next().map(serde_json::from_str::<CastHeader>) {
        Some(Ok(header)) => header,
        _ => return Err(document_err.into()),
    };
    let events = lines
        .map(serde_json::from_str::<CastEvent>)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    tracing::debug!("Loaded newline-delimited recording with {} events", events.len());
    Ok(Recording { header, events })
}

/// 在偽終端機中錄製 shell，直到 shell 結束
pub fn record(output: &Path, shell: Option<String>) -> Result<Recording> {
    let shell = shell.unwrap_or_else(default_shell);
    let term = default_term();
    let (cols, rows) = terminal_size();

    let mut session = PtySession::spawn(&shell, &term, cols, rows)?;
    let mut pty_reader = session.reader()?;
    let mut pty_writer = session.writer()?;
    let recording = Recording::new(cols, rows, &shell, &term);

    let raw_mode = if std::io::stdin().is_terminal() {
        Some(RawModeGuard::enable()?)
    } else {
        None
    };

    let start = Instant::now();
    let (tx, rx) = mpsc::channel::<CastEvent>();

    let output_tx = tx.clone();
    let output_thread = std::thread::spawn(move || {
        let mut decoder = Utf8Decoder::new();
        let mut stdout = std::io::stdout();
        let mut buf = [0u8; READ_BUFFER];
        loop {
            let n = match pty_reader.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            let _ = stdout.write_all(&buf[..n]);
            let _ = stdout.flush();
            let text = decoder.push(&buf[..n]);
            if !text.is_empty() {
                let event = CastEvent(start.elapsed().as_secs_f64(), EventKind::Output, text);
                if output_tx.send(event).is_err() {
                    break;
                }
            }
        }
        let rest = decoder.finish();
        if !rest.is_empty() {
            let _ = output_tx.send(CastEvent(start.elapsed().as_secs_f64(), EventKind::Output, rest));
        }
    });

    // stdin 讀取會一直阻塞，shell 結束後不等待此執行緒
    let input_tx = tx;
    std::thread::spawn(move || {
        let mut stdin = std::io::stdin();
        let mut decoder = Utf8Decoder::new();
        let mut buf = [0u8; READ_BUFFER];
        loop {
            let n = match stdin.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            if pty_writer.write_all(&buf[..n]).is_err() {
                break;
            }
            let text = decoder.push(&buf[..n]);
            if !text.is_empty() {
                let event = CastEvent(start.elapsed().as_secs_f64(), EventKind::Input, text);
                if input_tx.send(event).is_err() {
                    break;
                }
            }
        }
    });

    let waited = session.wait();
    drop(session);
    if output_thread.join().is_err() {
        tracing::warn!("Output reader thread panicked");
    }
    drop(raw_mode);

    finish_recording(recording, rx.try_iter().collect(), output, waited)
}

/// 排序並存檔後才回報 shell 的結束錯誤，已錄到的事件不會遺失
pub fn finish_recording(
    mut recording: Recording,
    mut events: Vec<CastEvent>,
    output: &Path,
    waited: Result<()>,
) -> Result<Recording> {
    events.sort_by(|a, b| a.time().total_cmp(&b.time()));
    recording.events = events;

    recording.save(output)?;
    tracing::info!(
        "Saved {} events to {}",
        recording.events.len(),
        output.display()
    );
    waited?;
    Ok(recording)
}

pub fn validate_speed(speed: f64) -> Result<f64> {
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err(ToolError::invalid_value(
            "speed",
            speed.to_string(),
            "must be greater than 0",
        ))
    }
}

/// 依事件時間重播輸出；只寫出 `o` 事件
pub async fn play<W: Write>(recording: &Recording, speed: f64, out: &mut W) -> Result<()> {
    let speed = validate_speed(speed)?;
    out.write_all(CLEAR_SCREEN.as_bytes())?;
    out.flush()?;

    let mut last = 0.0;
    for event in &recording.events {
        let delay = (event.time() - last) / speed;
        if delay > 0.0 {
            let delay = Duration::try_from_secs_f64(delay).map_err(|_| {
                ToolError::invalid_value(
                    "speed",
                    speed.to_string(),
                    format!("a {:.3}s gap cannot be played back at this speed", event.time() - last),
                )
            })?;
            tokio::time::sleep(delay).await;
        }
        last = event.time();

        if event.kind() == EventKind::Output {
            out.write_all(event.data().as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}

pub fn info_lines(path: &Path, recording: &Recording) -> Vec<String> {
    vec![
        format!("File: {}", path.display()),
        format!("Version: {}", recording.header.version),
        format!("Size: {}x{}", recording.header.width, recording.header.height),
        format!("Duration: {:.2}s", recording.duration()),
        format!("Events: {}", recording.events.len()),
        format!("Shell: {}", recording.shell()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoder_keeps_split_sequences() {
        let bytes = "héllo ✓".as_bytes();
        let mut decoder = Utf8Decoder::new();
        let mut text = String::new();
        for chunk in bytes.chunks(1) {
            text.push_str(&decoder.push(chunk));
        }
        text.push_str(&decoder.finish());
        assert_eq!(text, "héllo ✓");
    }

    #[test]
    fn test_decoder_replaces_invalid_bytes() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.push(b"a\xffb"), "a\u{FFFD}b");
        assert_eq!(decoder.push(b"\xe2\x9c"), "");
        assert_eq!(decoder.finish(), "\u{FFFD}");
    }

    #[test]
    fn test_parse_document_and_ndjson() {
        let document = r#"{
            "version": 2, "width": 80, "height": 24, "timestamp": 1700000000,
            "env": {"SHELL": "/bin/zsh", "TERM": "xterm"},
            "events": [[0.1, "o", "$ "], [0.5, "i", "l"]]
        }"#;
        let recording = parse_recording(document).unwrap();
        assert_eq!(recording.events.len(), 2);
        assert_eq!(recording.shell(), "/bin/zsh");

        let ndjson = "{\"version\": 2, \"width\": 100, \"height\": 30}\n[0.2, \"o\", \"hi\"]\n\n[1.25, \"o\", \"!\"]\n";
        let recording = parse_recording(ndjson).unwrap();
        assert_eq!(recording.header.width, 100);
        assert_eq!(recording.duration(), 1.25);
        assert_eq!(recording.shell(), "unknown");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_recording("not a recording").is_err());
    }

    #[test]
    fn test_validate_speed() {
        assert!(validate_speed(2.0).is_ok());
        assert!(validate_speed(0.0).is_err());
        assert!(validate_speed(-1.0).is_err());
        assert!(validate_speed(f64::NAN).is_err());
    }

    #[test]
    fn test_info_lines_for_empty_recording() {
        let recording = Recording::new(120, 40, "/bin/bash", "xterm-256color");
        let lines = info_lines(Path::new("demo.cast"), &recording);
        assert_eq!(lines[0], "File: demo.cast");
        assert_eq!(lines[2], "Size: 120x40");
        assert_eq!(lines[3], "Duration: 0.00s");
        assert_eq!(lines[4], "Events: 0");
        assert_eq!(lines[5], "Shell: /bin/bash");
    }

    #[tokio::test]
    async fn test_play_writes_only_output() {
        let mut recording = Recording::new(80, 24, "/bin/sh", "xterm");
        recording.events = vec![
            CastEvent(0.5, EventKind::Output, "$ ".to_string()),
            CastEvent(1.0, EventKind::Input, "ls\r".to_string()),
            CastEvent(1.5, EventKind::Other, "marker".to_string()),
            CastEvent(2.0, EventKind::Output, "a.txt\r\n".to_string()),
        ];
        let mut out = Vec::new();
        play(&recording, 20.0, &mut out).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("{}$ a.txt\r\n", CLEAR_SCREEN));
    }

    #[test]
    fn test_finish_recording_saves_before_reporting_wait_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("session.cast");
        let recording = Recording::new(80, 24, "/bin/sh", "xterm");
        let events = vec![
            CastEvent(0.9, EventKind::Output, "bye".to_string()),
            CastEvent(0.1, EventKind::Output, "$ ".to_string()),
        ];

        let result = finish_recording(recording, events, &output, Err(ToolError::pty("wait failed")));
        assert!(matches!(result, Err(ToolError::PtyError { .. })));

        let saved = load(&output).unwrap();
        assert_eq!(saved.events.len(), 2);
        assert_eq!(saved.events[0].data(), "$ ");
    }

    /// 極慢的速度讓等待時間超出範圍時回傳錯誤
    #[tokio::test]
    async fn test_play_rejects_unrepresentable_delay() {
        let mut recording = Recording::new(80, 24, "/bin/sh", "xterm");
        recording.events = vec![CastEvent(1.0, EventKind::Output, "x".to_string())];

        let mut out = Vec::new();
        let result = play(&recording, 1e-300, &mut out).await;
        assert!(matches!(
            result,
            Err(ToolError::InvalidConfigValueError { ref field, .. }) if field == "speed"
        ));
        assert_eq!(String::from_utf8(out).unwrap(), CLEAR_SCREEN);

        recording.events = vec![CastEvent(1e300, EventKind::Output, "x".to_string())];
        let mut out = Vec::new();
        assert!(play(&recording, 1.0, &mut out).await.is_err());
    }
}
