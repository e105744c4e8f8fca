use crate::core::clipulse::{format_entry, truncate_chars};
use crate::domain::model::ClipboardEntry;
use crate::utils::error::{Result, ToolError};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserAction {
    Redraw,
    ShowDetail,
    Quit,
    Ignore,
}

/// 歷史瀏覽器的選取與捲動狀態
#[derive(Debug, Clone)]
pub struct HistoryBrowser {
    entries: Vec<ClipboardEntry>,
    selected: usize,
    offset: usize,
}

impl HistoryBrowser {
    pub fn new(entries: Vec<ClipboardEntry>) -> Self {
        Self {
            entries,
            selected: 0,
            offset: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&ClipboardEntry> {
        self.entries.get(self.selected)
    }

    pub fn handle_key(&mut self, code: KeyCode) -> BrowserAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => BrowserAction::Quit,
            KeyCode::Up if self.selected > 0 => {
                self.selected -= 1;
                BrowserAction::Redraw
            }
            KeyCode::Down if self.selected + 1 < self.entries.len() => {
                self.selected += 1;
                BrowserAction::Redraw
            }
            KeyCode::Enter if !self.entries.is_empty() => BrowserAction::ShowDetail,
            _ => BrowserAction::Ignore,
        }
    }

    /// 回傳可見範圍，並調整捲動位置讓選取項目可見
    pub fn visible_range(&mut self, rows: usize) -> std::ops::Range<usize> {
        let rows = rows.max(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + rows {
            self.offset = self.selected + 1 - rows;
        }
        let end = (self.offset + rows).min(self.entries.len());
        self.offset..end
    }
}

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() > width.saturating_sub(1) {
        format!("{}...", truncate_chars(text, width.saturating_sub(4)))
    } else {
        text.to_string()
    }
}

fn draw_list<W: Write>(out: &mut W, browser: &mut HistoryBrowser) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let (width, height) = (width as usize, height as usize);

    queue!(out, Clear(ClearType::All))?;
    let title = "📋 Clipulse History Browser";
    queue!(
        out,
        MoveTo((width.saturating_sub(title.chars().count()) / 2) as u16, 0),
        SetAttribute(Attribute::Bold),
        Print(title),
        SetAttribute(Attribute::Reset),
        MoveTo(0, 1),
        Print("─".repeat(width))
    )?;

    let list_rows = height.saturating_sub(5);
    let range = browser.visible_range(list_rows);
    for (row, index) in range.enumerate() {
        let entry = &browser.entries[index];
        let is_selected = index == browser.selected;
        let prefix = if is_selected { "→ " } else { "  " };
        let line = fit(&format!("{}{}", prefix, format_entry(entry, false)), width);
        queue!(out, MoveTo(0, (row + 3) as u16))?;
        if is_selected {
            queue!(out, SetAttribute(Attribute::Reverse), Print(line), SetAttribute(Attribute::Reset))?;
        } else {
            queue!(out, Print(line))?;
        }
    }

    queue!(
        out,
        MoveTo(0, height.saturating_sub(1) as u16),
        Print("↑/↓: Navigate | Enter: View full | q: Quit")
    )?;
    out.flush()
}

fn draw_detail<W: Write>(out: &mut W, entry: &ClipboardEntry) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let (width, height) = (width as usize, height as usize);

    queue!(
        out,
        Clear(ClearType::All),
        MoveTo(0, 0),
        SetAttribute(Attribute::Bold),
        Print(format!("Full Content ({}):", entry.timestamp.format("%Y-%m-%d %H:%M:%S"))),
        SetAttribute(Attribute::Reset),
        MoveTo(0, 1),
        Print("─".repeat(width))
    )?;
    for (i, line) in entry.content.lines().enumerate() {
        if i + 3 >= height.saturating_sub(2) {
            break;
        }
        queue!(out, MoveTo(0, (i + 3) as u16), Print(fit(line, width)))?;
    }
    queue!(
        out,
        MoveTo(0, height.saturating_sub(1) as u16),
        Print("Press any key to return...")
    )?;
    out.flush()
}

fn next_key() -> std::io::Result<KeyCode> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(key.code);
            }
        }
    }
}

fn event_loop<W: Write>(out: &mut W, browser: &mut HistoryBrowser) -> std::io::Result<()> {
    draw_list(out, browser)?;
    loop {
        match browser.handle_key(next_key()?) {
            BrowserAction::Quit => return Ok(()),
            BrowserAction::Redraw => draw_list(out, browser)?,
            BrowserAction::ShowDetail => {
                if let Some(entry) = browser.selected_entry() {
                    draw_detail(out, entry)?;
                    next_key()?;
                }
                draw_list(out, browser)?;
            }
            BrowserAction::Ignore => {}
        }
    }
}

/// 全螢幕瀏覽剪貼簿歷史
pub fn run_history_browser(entries: Vec<ClipboardEntry>) -> Result<()> {
    let mut browser = HistoryBrowser::new(entries);
    let mut stdout = std::io::stdout();

    terminal::enable_raw_mode().map_err(ToolError::pty)?;
    execute!(stdout, EnterAlternateScreen, Hide)?;

    let result = event_loop(&mut stdout, &mut browser);

    // 無論成功與否都還原終端機
    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode().map_err(ToolError::pty)?;
    result.map_err(ToolError::from)
}
