use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// 時間戳固定格式，字串比較即時間順序
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: &'static str,
    pub summary: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Linked { link: PathBuf },
    NotLinked,
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    AlreadyLinked,
    Replaced,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NicAddress {
    pub nic: String,
    pub ip: std::net::Ipv4Addr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    pub content: String,
    pub timestamp: NaiveDateTime,
    pub source_app: String,
    pub hash: String,
}

impl ClipboardEntry {
    pub fn new(content: impl Into<String>, timestamp: NaiveDateTime, source_app: impl Into<String>) -> Self {
        let content = content.into();
        let hash = content_hash(&content);
        Self {
            content,
            timestamp,
            source_app: source_app.into(),
            hash,
        }
    }

    pub fn now(content: impl Into<String>, source_app: impl Into<String>) -> Self {
        Self::new(content, Local::now().naive_local(), source_app)
    }

    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

pub fn content_hash(content: &str) -> String {
    format!("{:x}", md5::compute(content.as_bytes()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "i")]
    Input,
    #[serde(rename = "o")]
    Output,
    #[serde(other)]
    Other,
}

/// `[seconds, "i" | "o", data]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastEvent(pub f64, pub EventKind, pub String);

impl CastEvent {
    pub fn time(&self) -> f64 {
        self.0
    }

    pub fn kind(&self) -> EventKind {
        self.1
    }

    pub fn data(&self) -> &str {
        &self.2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastHeader {
    pub version: u32,
    pub width: u16,
    pub height: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(flatten)]
    pub header: CastHeader,
    #[serde(default)]
    pub events: Vec<CastEvent>,
}

impl Recording {
    pub fn duration(&self) -> f64 {
        self.events.last().map(CastEvent::time).unwrap_or(0.0)
    }

    pub fn shell(&self) -> &str {
        self.header
            .env
            .get("SHELL")
            .map(String::as_str)
            .unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Downloaded {
        path: PathBuf,
        bytes: u64,
        attempts: u32,
    },
    GaveUp {
        attempts: u32,
    },
    Cancelled {
        attempts: u32,
    },
}

impl WatchOutcome {
    pub fn is_downloaded(&self) -> bool {
        matches!(self, WatchOutcome::Downloaded { .. })
    }
}
