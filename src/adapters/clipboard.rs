use crate::domain::ports::{ClipboardSource, WindowProbe};
use crate::utils::error::{Result, ToolError};
use std::io::ErrorKind;
use std::process::Command;

/// 依序嘗試的剪貼簿讀取指令
const PASTE_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-paste", &["--no-newline"]),
    ("xclip", &["-selection", "clipboard", "-o"]),
    ("xsel", &["--clipboard", "--output"]),
    ("pbpaste", &[]),
];

/// 透過系統指令讀取剪貼簿
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    /// 找出第一個可用的剪貼簿指令
    pub fn detect() -> Result<Self> {
        for (program, args) in PASTE_COMMANDS {
            match Command::new(program).args(*args).output() {
                Ok(_) => {
                    tracing::debug!("Using clipboard command: {}", program);
                    return Ok(Self {
                        program: program.to_string(),
                        args: args.iter().map(|a| a.to_string()).collect(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(ToolError::Unsupported {
            message: "No clipboard command found (install wl-clipboard, xclip or xsel)".to_string(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ClipboardSource for CommandClipboard {
    fn read(&self) -> Result<Option<String>> {
        let output = Command::new(&self.program).args(&self.args).output()?;
        // 剪貼簿為空時多數指令回傳非零
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandWindowProbe;

impl CommandWindowProbe {
    fn query() -> Option<String> {
        let output = if cfg!(target_os = "macos") {
            Command::new("osascript")
                .args([
                    "-e",
                    "tell application \"System Events\" to get name of first application process whose frontmost is true",
                ])
                .output()
        } else {
            Command::new("xdotool")
                .args(["getactivewindow", "getwindowname"])
                .output()
        }
        .ok()?;

        if !output.status.success() {
            return None;
        }
        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!name.is_empty()).then_some(name)
    }
}

impl WindowProbe for CommandWindowProbe {
    fn active_app(&self) -> String {
        Self::query().unwrap_or_else(|| "unknown".to_string())
    }
}
