use crate::utils::error::{Result, ToolError};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    "__pycache__",
    "node_modules",
    ".venv",
    ".idea",
    ".vscode",
    "dist",
    "build",
    ".DS_Store",
];

/// `--ignore` 未指定時附加的名稱
pub const DEFAULT_EXTRA_IGNORES: &[&str] = &[".venv", "node_modules"];

pub fn ignored_set<I, S>(extra: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    DEFAULT_IGNORED_DIRS
        .iter()
        .map(|s| s.to_string())
        .chain(extra.into_iter().map(Into::into))
        .collect()
}

/// 產生資料夾樹狀輸出 (不含根目錄那一行)
pub fn render_tree(base: &Path, ignored: &BTreeSet<String>) -> Result<Vec<String>> {
    if !base.is_dir() {
        return Err(ToolError::invalid_value(
            "folder",
            base.display().to_string(),
            "Not a directory",
        ));
    }
    let entries = sorted_entries(base, ignored)?;
    let mut lines = Vec::new();
    walk(base, entries, "", ignored, &mut lines);
    Ok(lines)
}

fn sorted_entries(dir: &Path, ignored: &BTreeSet<String>) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if !ignored.contains(&name) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn walk(
    dir: &Path,
    entries: Vec<String>,
    prefix: &str,
    ignored: &BTreeSet<String>,
    lines: &mut Vec<String>,
) {
    let count = entries.len();
    for (index, name) in entries.into_iter().enumerate() {
        let is_last = index + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        lines.push(format!("{}{}{}", prefix, connector, name));

        let full_path = dir.join(&name);
        // 不追蹤符號連結，避免循環
        let is_real_dir = fs::symlink_metadata(&full_path)
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_real_dir {
            continue;
        }

        let extension = if is_last { "    " } else { "│   " };
        match sorted_entries(&full_path, ignored) {
            Ok(children) => walk(
                &full_path,
                children,
                &format!("{}{}", prefix, extension),
                ignored,
                lines,
            ),
            Err(e) => tracing::warn!("Skipping {}: {}", full_path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/core")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("Cargo.toml"), "").unwrap();
        fs::write(root.join("src/lib.rs"), "").unwrap();
        fs::write(root.join("src/core/mod.rs"), "").unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        dir
    }

    #[test]
    fn test_render_tree_layout() {
        let dir = fixture();
        let lines = render_tree(dir.path(), &ignored_set(Vec::<String>::new())).unwrap();
        assert_eq!(
            lines,
            vec![
                "├── Cargo.toml",
                "├── README.md",
                "└── src",
                "    ├── core",
                "    │   └── mod.rs",
                "    └── lib.rs",
            ]
        );
    }

    #[test]
    fn test_extra_ignores() {
        let dir = fixture();
        let lines = render_tree(dir.path(), &ignored_set(["src"])).unwrap();
        assert_eq!(lines, vec!["├── Cargo.toml", "└── README.md"]);
    }

    #[test]
    fn test_intermediate_dir_uses_vertical_bar() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(dir.path().join("a/inner.txt"), "").unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        let lines = render_tree(dir.path(), &ignored_set(Vec::<String>::new())).unwrap();
        assert_eq!(lines, vec!["├── a", "│   └── inner.txt", "└── b.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dirs_are_not_followed() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("real")).unwrap();
        fs::write(dir.path().join("real/file"), "").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("real/loop")).unwrap();
        let lines = render_tree(dir.path(), &ignored_set(Vec::<String>::new())).unwrap();
        assert_eq!(lines, vec!["└── real", "    ├── file", "    └── loop"]);
    }

    #[test]
    fn test_rejects_files() {
        let dir = fixture();
        assert!(render_tree(&dir.path().join("Cargo.toml"), &ignored_set(Vec::<String>::new())).is_err());
    }
}
