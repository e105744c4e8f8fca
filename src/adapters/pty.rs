use crate::utils::error::{Result, ToolError};
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use std::io::{Read, Write};

/// 終端機 raw mode，離開作用域時還原
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        crossterm::terminal::enable_raw_mode().map_err(ToolError::pty)?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = crossterm::terminal::disable_raw_mode() {
            tracing::warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

/// 目前終端機大小 (cols, rows)，非終端機時為 80x24
pub fn terminal_size() -> (u16, u16) {
    crossterm::terminal::size().unwrap_or((80, 24))
}

/// 在偽終端機中執行的 shell
pub struct PtySession {
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
}

impl PtySession {
    pub fn spawn(shell: &str, term: &str, cols: u16, rows: u16) -> Result<Self> {
        let pair = native_pty_system()
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(ToolError::pty)?;

        let mut cmd = CommandBuilder::new(shell);
        cmd.env("TERM", term);
        if let Ok(cwd) = std::env::current_dir() {
            cmd.cwd(cwd);
        }

        let child = pair.slave.spawn_command(cmd).map_err(ToolError::pty)?;
        // 父行程不持有 slave，shell 結束後讀取端才會收到 EOF
        drop(pair.slave);

        tracing::debug!("Spawned {} in a {}x{} pty", shell, cols, rows);
        Ok(Self {
            master: pair.master,
            child,
        })
    }

    pub fn reader(&self) -> Result<Box<dyn Read + Send>> {
        self.master.try_clone_reader().map_err(ToolError::pty)
    }

    pub fn writer(&self) -> Result<Box<dyn Write + Send>> {
        self.master.take_writer().map_err(ToolError::pty)
    }

    pub fn wait(&mut self) -> Result<()> {
        let status = self.child.wait()?;
        tracing::debug!("Shell exited: {:?}", status);
        Ok(())
    }
}
