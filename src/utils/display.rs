use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BRIGHT_RED: &str = "\x1b[91m";
    pub const BRIGHT_GREEN: &str = "\x1b[92m";
    pub const BRIGHT_YELLOW: &str = "\x1b[93m";
    pub const BRIGHT_BLUE: &str = "\x1b[94m";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpinnerStyle {
    #[default]
    Dots,
    Bars,
    Arrows,
    Clock,
    Earth,
    Moon,
    Pulse,
    Wave,
}

impl SpinnerStyle {
    pub fn frames(self) -> &'static [&'static str] {
        match self {
            SpinnerStyle::Dots => &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            SpinnerStyle::Bars => &[
                "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█", "▇", "▆", "▅", "▄", "▃", "▂",
            ],
            SpinnerStyle::Arrows => &["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"],
            SpinnerStyle::Clock => &[
                "🕐", "🕑", "🕒", "🕓", "🕔", "🕕", "🕖", "🕗", "🕘", "🕙", "🕚", "🕛",
            ],
            SpinnerStyle::Earth => &["🌍", "🌎", "🌏"],
            SpinnerStyle::Moon => &["🌑", "🌒", "🌓", "🌔", "🌕", "🌖", "🌗", "🌘"],
            SpinnerStyle::Pulse => &["●", "◐", "◑", "◒", "◓", "◔", "◕", "◖", "◗", "◘"],
            SpinnerStyle::Wave => &[
                "▰", "▱▰", "▱▱▰", "▱▱▱▰", "▱▱▱▱▰", "▱▱▱▱▱▰", "▱▱▱▱▱▱▰", "▱▱▱▱▱▱▱▰",
            ],
        }
    }

    /// indicatif 的最後一格是完成狀態
    fn tick_strings(self) -> Vec<&'static str> {
        let mut ticks = self.frames().to_vec();
        ticks.push(" ");
        ticks
    }

    fn spinner_style(self) -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.yellow} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&self.tick_strings())
    }

    fn bar_style(self) -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.yellow} {msg} [{bar:30.cyan/bright_black}] {percent}% {eta:.dim}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .tick_strings(&self.tick_strings())
        .progress_chars("█░")
    }
}

/// 多行動畫輸出：每個網址一行 spinner / 進度條
#[derive(Debug, Clone)]
pub struct WatchDisplay {
    multi: MultiProgress,
    style: SpinnerStyle,
    animated: bool,
    colors: bool,
}

impl WatchDisplay {
    pub fn new(style: SpinnerStyle, animated: bool) -> Self {
        let target = if animated {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        Self {
            multi: MultiProgress::with_draw_target(target),
            style,
            animated,
            colors: std::io::stdout().is_terminal(),
        }
    }

    /// 不輸出動畫 (daemon 模式與測試)
    pub fn hidden() -> Self {
        Self::new(SpinnerStyle::default(), false)
    }

    pub fn line(&self, message: impl Into<String>) -> ProgressLine {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(self.style.spinner_style());
        bar.set_message(message.into());
        if self.animated {
            bar.enable_steady_tick(TICK_INTERVAL);
        }
        ProgressLine {
            bar,
            style: self.style,
            animated: self.animated,
        }
    }

    fn emit(&self, symbol: &str, color: &str, message: &str) {
        let symbol = if self.colors {
            format!("{}{}{}", color, symbol, colors::RESET)
        } else {
            symbol.to_string()
        };
        let line = format!("{} {}", symbol, message);
        if self.animated {
            // 印在動畫行的上方
            if self.multi.println(&line).is_err() {
                println!("{}", line);
            }
        } else {
            println!("{}", line);
        }
    }

    pub fn success(&self, message: &str) {
        tracing::info!("{}", message);
        self.emit("✓", colors::BRIGHT_GREEN, message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}", message);
        self.emit("✗", colors::BRIGHT_RED, message);
    }

    pub fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
        self.emit("⚠", colors::BRIGHT_YELLOW, message);
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}", message);
        self.emit("ℹ", colors::BRIGHT_BLUE, message);
    }

    pub fn clear(&self) {
        if let Err(e) = self.multi.clear() {
            tracing::debug!("Failed to clear display: {}", e);
        }
    }
}

/// 單一網址的狀態行
#[derive(Debug, Clone)]
pub struct ProgressLine {
    bar: ProgressBar,
    style: SpinnerStyle,
    animated: bool,
}

impl ProgressLine {
    pub fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        if !self.animated {
            tracing::debug!("{}", message);
        }
        self.bar.set_message(message);
    }

    /// 切換為進度條
    pub fn start_download(&self, total: u64) {
        self.bar.set_style(self.style.bar_style());
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    /// 回到 spinner (重試前)
    pub fn reset(&self) {
        self.bar.set_style(self.style.spinner_style());
        self.bar.unset_length();
        self.bar.set_position(0);
    }

    pub fn set_position(&self, position: u64) {
        self.bar.set_position(position);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_style_has_frames() {
        for style in [
            SpinnerStyle::Dots,
            SpinnerStyle::Bars,
            SpinnerStyle::Arrows,
            SpinnerStyle::Clock,
            SpinnerStyle::Earth,
            SpinnerStyle::Moon,
            SpinnerStyle::Pulse,
            SpinnerStyle::Wave,
        ] {
            assert!(style.tick_strings().len() >= 2);
        }
    }

    #[test]
    fn test_style_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SpinnerStyle::Moon).unwrap(), "\"moon\"");
    }

    #[test]
    fn test_hidden_display_lines() {
        let display = WatchDisplay::hidden();
        let line = display.line("Checking file.zip...");
        line.start_download(100);
        line.set_position(50);
        line.reset();
        line.finish();
    }
}
