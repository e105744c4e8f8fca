use crate::utils::error::{Result, ToolError};
use crate::utils::validation::{validate_file_name, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolboxConfig {
    pub paths: PathsConfig,
    /// 工具名稱 → 指令名稱
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub bin_dir: Option<PathBuf>,
    pub install_dir: Option<PathBuf>,
}

impl ToolboxConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cli-toolbox").join("toolbox.toml"))
    }

    /// 明確指定的檔案必須存在；預設位置的檔案可省略
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path().filter(|path| path.exists()) {
                Some(path) => Self::from_file(&path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::NotFound {
                what: path.display().to_string(),
            });
        }
        tracing::debug!("Loading toolbox config from {}", path.display());
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(&substitute_env_vars(content)?)?;
        config.validate()?;
        Ok(config)
    }

    pub fn command_name<'a>(&'a self, tool: &'a str) -> &'a str {
        self.aliases.get(tool).map(String::as_str).unwrap_or(tool)
    }

    /// 命令列 > 設定檔 > `~/.local/bin`
    pub fn bin_dir(&self, cli: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = cli.or_else(|| self.paths.bin_dir.clone()) {
            return Ok(dir);
        }
        dirs::home_dir()
            .map(|home| home.join(".local").join("bin"))
            .ok_or_else(|| ToolError::MissingConfigError {
                field: "paths.bin_dir".to_string(),
            })
    }

    /// 命令列 > 設定檔 > toolbox 執行檔所在目錄
    pub fn install_dir(&self, cli: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = cli.or_else(|| self.paths.install_dir.clone()) {
            return Ok(dir);
        }
        let exe = std::env::current_exe()?;
        exe.parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| ToolError::MissingConfigError {
                field: "paths.install_dir".to_string(),
            })
    }
}

impl Validate for ToolboxConfig {
    fn validate(&self) -> Result<()> {
        for (tool, name) in &self.aliases {
            if crate::core::installer::find_tool(tool).is_none() {
                return Err(ToolError::invalid_value(
                    format!("aliases.{}", tool),
                    tool,
                    "unknown tool",
                ));
            }
            validate_file_name(&format!("aliases.{}", tool), name)?;
        }
        Ok(())
    }
}

/// 替換 `${VAR}`；未定義的變數保留原文
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}")?;
    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });
    Ok(result.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_paths_and_aliases() {
        let config = ToolboxConfig::from_toml_str(
            r#"
            [paths]
            bin_dir = "/opt/tools/bin"

            [aliases]
            treeview = "tree"
            "#,
        )
        .unwrap();
        assert_eq!(config.paths.bin_dir, Some(PathBuf::from("/opt/tools/bin")));
        assert_eq!(config.paths.install_dir, None);
        assert_eq!(config.command_name("treeview"), "tree");
        assert_eq!(config.command_name("ipinfo"), "ipinfo");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TOOLBOX_TEST_BIN", "/tmp/toolbox-bin");
        let content = r#"
            [paths]
            bin_dir = "${TOOLBOX_TEST_BIN}"
            install_dir = "${TOOLBOX_TEST_UNDEFINED_VAR}"
        "#;
        let config = ToolboxConfig::from_toml_str(content).unwrap();
        assert_eq!(config.paths.bin_dir, Some(PathBuf::from("/tmp/toolbox-bin")));
        assert_eq!(
            config.paths.install_dir,
            Some(PathBuf::from("${TOOLBOX_TEST_UNDEFINED_VAR}"))
        );
        std::env::remove_var("TOOLBOX_TEST_BIN");
    }

    #[test]
    fn test_rejects_unknown_tool_alias() {
        let err = ToolboxConfig::from_toml_str("[aliases]\nnope = \"x\"\n").unwrap_err();
        assert!(matches!(err, ToolError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_rejects_alias_with_slash() {
        assert!(ToolboxConfig::from_toml_str("[aliases]\nfetcher = \"a/b\"\n").is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let config = ToolboxConfig {
            paths: PathsConfig {
                bin_dir: Some(PathBuf::from("/from/file")),
                install_dir: None,
            },
            ..Default::default()
        };
        assert_eq!(
            config.bin_dir(Some(PathBuf::from("/from/cli"))).unwrap(),
            PathBuf::from("/from/cli")
        );
        assert_eq!(config.bin_dir(None).unwrap(), PathBuf::from("/from/file"));
        assert!(config.install_dir(None).is_ok());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(ToolboxConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
