use crate::domain::model::{LinkOutcome, LinkStatus, ToolInfo};
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::validate_file_name;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

pub const TOOLS: &[ToolInfo] = &[
    ToolInfo {
        name: "asciicast",
        summary: "Record and replay terminal sessions",
    },
    ToolInfo {
        name: "clipulse",
        summary: "Clipboard activity monitor and history",
    },
    ToolInfo {
        name: "fetcher",
        summary: "Watch URLs until files are available, then download them",
    },
    ToolInfo {
        name: "ipinfo",
        summary: "Show local and public IP addresses",
    },
    ToolInfo {
        name: "treeview",
        summary: "Print a folder structure as a tree",
    },
];

pub fn find_tool(name: &str) -> Option<&'static ToolInfo> {
    TOOLS.iter().find(|tool| tool.name == name)
}

/// 以符號連結將已安裝的工具放到 bin 目錄
#[derive(Debug, Clone)]
pub struct Installer {
    install_dir: PathBuf,
    bin_dir: PathBuf,
}

impl Installer {
    pub fn new(install_dir: impl Into<PathBuf>, bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            bin_dir: bin_dir.into(),
        }
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn source_path(&self, tool: &str) -> PathBuf {
        self.install_dir.join(tool)
    }

    pub fn link(&self, tool: &str, name: &str, force: bool) -> Result<LinkOutcome> {
        if find_tool(tool).is_none() {
            return Err(ToolError::NotFound {
                what: format!("tool '{}'", tool),
            });
        }
        validate_file_name("name", name)?;

        let source = self.source_path(tool);
        if !source.is_file() {
            return Err(ToolError::NotFound {
                what: source.display().to_string(),
            });
        }
        if ensure_executable(&source)? {
            tracing::info!("Marked {} as executable", source.display());
        }

        fs::create_dir_all(&self.bin_dir)?;
        let target = self.bin_dir.join(name);

        let mut outcome = LinkOutcome::Created;
        if let Ok(meta) = fs::symlink_metadata(&target) {
            if meta.file_type().is_symlink() && points_to(&target, &source) {
                return Ok(LinkOutcome::AlreadyLinked);
            }
            if !force {
                return Err(ToolError::invalid_value(
                    "name",
                    target.display().to_string(),
                    "Target already exists (use --force to replace it)",
                ));
            }
            if meta.is_dir() {
                return Err(ToolError::invalid_value(
                    "name",
                    target.display().to_string(),
                    "Refusing to replace a directory",
                ));
            }
            fs::remove_file(&target)?;
            outcome = LinkOutcome::Replaced;
        }

        create_symlink(&source, &target)?;
        tracing::info!("Linked {} -> {}", target.display(), source.display());
        Ok(outcome)
    }

    /// 只移除符號連結，不刪除一般檔案
    pub fn unlink(&self, name: &str) -> Result<PathBuf> {
        validate_file_name("name", name)?;
        let target = self.bin_dir.join(name);
        let meta = fs::symlink_metadata(&target).map_err(|_| ToolError::NotFound {
            what: target.display().to_string(),
        })?;
        if !meta.file_type().is_symlink() {
            return Err(ToolError::invalid_value(
                "name",
                target.display().to_string(),
                "Not a symbolic link; refusing to remove it",
            ));
        }
        fs::remove_file(&target)?;
        tracing::info!("Removed {}", target.display());
        Ok(target)
    }

    pub fn status(&self, tool: &str) -> Result<LinkStatus> {
        let source = self.source_path(tool);
        if !source.is_file() {
            return Ok(LinkStatus::Missing);
        }
        if !self.bin_dir.is_dir() {
            return Ok(LinkStatus::NotLinked);
        }

        let mut links = Vec::new();
        for entry in fs::read_dir(&self.bin_dir)? {
            let path = entry?.path();
            let is_symlink = fs::symlink_metadata(&path)
                .map(|m| m.file_type().is_symlink())
                .unwrap_or(false);
            if is_symlink && points_to(&path, &source) {
                links.push(path);
            }
        }
        links.sort();
        Ok(links
            .into_iter()
            .next()
            .map(|link| LinkStatus::Linked { link })
            .unwrap_or(LinkStatus::NotLinked))
    }

    pub fn list(&self) -> Result<Vec<(ToolInfo, LinkStatus)>> {
        TOOLS
            .iter()
            .map(|tool| Ok((*tool, self.status(tool.name)?)))
            .collect()
    }
}

fn points_to(link: &Path, source: &Path) -> bool {
    let Ok(target) = fs::read_link(link) else {
        return false;
    };
    if target == source {
        return true;
    }
    // 相對連結以連結所在目錄解析
    let resolved = match link.parent() {
        Some(parent) if target.is_relative() => parent.join(&target),
        _ => target,
    };
    match (fs::canonicalize(&resolved), fs::canonicalize(source)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// bin 目錄是否在 PATH 中
pub fn dir_on_path(dir: &Path, path_var: Option<&OsStr>) -> bool {
    let Some(path_var) = path_var else {
        return false;
    };
    let wanted = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    std::env::split_paths(path_var).any(|entry| {
        entry == dir || fs::canonicalize(&entry).map(|e| e == wanted).unwrap_or(false)
    })
}

#[cfg(unix)]
fn create_symlink(source: &Path, target: &Path) -> Result<()> {
    std::os::unix::fs::symlink(source, target)?;
    Ok(())
}

#[cfg(not(unix))]
fn create_symlink(_source: &Path, _target: &Path) -> Result<()> {
    Err(ToolError::Unsupported {
        message: "Symbolic links require a UNIX-like system".to_string(),
    })
}

/// 缺少執行權限時補上 u+x,g+x,o+x；回傳是否有變更
#[cfg(unix)]
pub fn ensure_executable(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    let mode = permissions.mode();
    if mode & 0o111 == 0o111 {
        return Ok(false);
    }
    permissions.set_mode(mode | 0o111);
    fs::set_permissions(path, permissions)?;
    Ok(true)
}

#[cfg(not(unix))]
pub fn ensure_executable(_path: &Path) -> Result<bool> {
    Err(ToolError::Unsupported {
        message: "Permission bits require a UNIX-like system".to_string(),
    })
}
