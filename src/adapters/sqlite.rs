use crate::domain::model::{ClipboardEntry, TIMESTAMP_FORMAT};
use crate::utils::error::Result;
use chrono::{Duration, Local, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;

/// 剪貼簿歷史資料庫
pub struct ClipulseDb {
    conn: Connection,
}

impl ClipulseDb {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Self {
            conn: Connection::open(path)?,
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS clipboard_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                source_app TEXT,
                hash TEXT UNIQUE
            );
            CREATE INDEX IF NOT EXISTS idx_clipboard_history_timestamp
                ON clipboard_history(timestamp);",
        )?;
        Ok(())
    }

    /// 新增紀錄；雜湊重複時回傳 `false`
    pub fn add_entry(&self, entry: &ClipboardEntry) -> Result<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO clipboard_history (content, timestamp, source_app, hash)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entry.content,
                entry.timestamp_string(),
                entry.source_app,
                entry.hash
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn get_history(&self, limit: usize) -> Result<Vec<ClipboardEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT content, timestamp, source_app FROM clipboard_history
             ORDER BY timestamp DESC, id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], row_to_entry)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// 子字串搜尋 (ASCII 不分大小寫)
    pub fn search(&self, keyword: &str) -> Result<Vec<ClipboardEntry>> {
        let pattern = format!("%{}%", escape_like(keyword));
        let mut stmt = self.conn.prepare(
            "SELECT content, timestamp, source_app FROM clipboard_history
             WHERE content LIKE ?1 ESCAPE '\\'
             ORDER BY timestamp DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![pattern], row_to_entry)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn clear(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM clipboard_history", [])?)
    }

    /// 刪除早於 `minutes` 分鐘前的紀錄；時間超出可表示範圍時不刪除
    pub fn expire_older_than(&self, minutes: u64) -> Result<usize> {
        match expiry_cutoff(Local::now().naive_local(), minutes) {
            Some(cutoff) => self.expire_before(cutoff),
            None => {
                tracing::debug!("Expiry window of {} minutes reaches past the earliest date", minutes);
                Ok(0)
            }
        }
    }

    pub fn expire_before(&self, cutoff: NaiveDateTime) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM clipboard_history WHERE timestamp < ?1",
            params![cutoff.format(TIMESTAMP_FORMAT).to_string()],
        )?;
        if removed > 0 {
            tracing::debug!("Expired {} clipboard entries", removed);
        }
        Ok(removed)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM clipboard_history", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ClipboardEntry> {
    let content: String = row.get(0)?;
    let raw_timestamp: String = row.get(1)?;
    let source_app: Option<String> = row.get(2)?;
    let timestamp = NaiveDateTime::parse_from_str(&raw_timestamp, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    Ok(ClipboardEntry::new(
        content,
        timestamp,
        source_app.unwrap_or_else(|| "unknown".to_string()),
    ))
}

pub fn expiry_cutoff(now: NaiveDateTime, minutes: u64) -> Option<NaiveDateTime> {
    i64::try_from(minutes)
        .ok()
        .and_then(Duration::try_minutes)
        .and_then(|window| now.checked_sub_signed(window))
}

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_duplicate_content_is_ignored() {
        let db = ClipulseDb::open_in_memory().unwrap();
        assert!(db.add_entry(&ClipboardEntry::new("hello", at(9, 0), "term")).unwrap());
        assert!(!db.add_entry(&ClipboardEntry::new("hello", at(9, 5), "editor")).unwrap());
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn test_history_is_newest_first() {
        let db = ClipulseDb::open_in_memory().unwrap();
        db.add_entry(&ClipboardEntry::new("first", at(9, 0), "a")).unwrap();
        db.add_entry(&ClipboardEntry::new("third", at(11, 0), "a")).unwrap();
        db.add_entry(&ClipboardEntry::new("second", at(10, 0), "a")).unwrap();

        let history = db.get_history(2).unwrap();
        let contents: Vec<&str> = history.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["third", "second"]);
        assert_eq!(history[0].timestamp, at(11, 0));
    }

    #[test]
    fn test_search_matches_substring_literally() {
        let db = ClipulseDb::open_in_memory().unwrap();
        db.add_entry(&ClipboardEntry::new("cargo build", at(9, 0), "a")).unwrap();
        db.add_entry(&ClipboardEntry::new("100% done", at(9, 1), "a")).unwrap();
        db.add_entry(&ClipboardEntry::new("CARGO test", at(9, 2), "a")).unwrap();

        assert_eq!(db.search("cargo").unwrap().len(), 2);
        let percent = db.search("%").unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].content, "100% done");
    }

    #[test]
    fn test_expire_and_clear() {
        let db = ClipulseDb::open_in_memory().unwrap();
        db.add_entry(&ClipboardEntry::new("old", at(8, 0), "a")).unwrap();
        db.add_entry(&ClipboardEntry::new("new", at(12, 0), "a")).unwrap();

        assert_eq!(db.expire_before(at(10, 0)).unwrap(), 1);
        assert_eq!(db.get_history(10).unwrap()[0].content, "new");
        assert_eq!(db.clear().unwrap(), 1);
        assert_eq!(db.count().unwrap(), 0);
    }

    #[test]
    fn test_expiry_cutoff_bounds() {
        assert_eq!(expiry_cutoff(at(10, 0), 30), Some(at(9, 30)));
        assert_eq!(expiry_cutoff(at(10, 0), 10_000_000_000_000), None);
        assert_eq!(expiry_cutoff(at(10, 0), u64::MAX), None);
    }

    /// 超大的分鐘數不會清空歷史
    #[test]
    fn test_huge_expiry_window_keeps_history() {
        let db = ClipulseDb::open_in_memory().unwrap();
        db.add_entry(&ClipboardEntry::new("old", at(8, 0), "a")).unwrap();

        assert_eq!(db.expire_older_than(10_000_000_000_000).unwrap(), 0);
        assert_eq!(db.expire_older_than(u64::MAX).unwrap(), 0);
        assert_eq!(db.count().unwrap(), 1);

        assert_eq!(db.expire_older_than(60).unwrap(), 1);
        assert_eq!(db.count().unwrap(), 0);
    }
}
