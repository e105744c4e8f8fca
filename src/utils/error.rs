use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Invalid pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("File size mismatch. Expected: {expected}, Got: {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Terminal error: {message}")]
    PtyError { message: String },

    #[error("Unsupported: {message}")]
    Unsupported { message: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required setting: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, ToolError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    FileSystem,
    Storage,
    Configuration,
    Terminal,
    Platform,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 依嚴重程度決定退出碼
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl ToolError {
    pub fn config(message: impl Into<String>) -> Self {
        ToolError::ConfigError {
            message: message.into(),
        }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ToolError::InvalidConfigValueError {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn pty(err: impl std::fmt::Display) -> Self {
        ToolError::PtyError {
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ToolError::ApiError(_) | ToolError::HttpStatus { .. } | ToolError::SizeMismatch { .. } => {
                ErrorCategory::Network
            }
            ToolError::IoError(_) | ToolError::NotFound { .. } => ErrorCategory::FileSystem,
            ToolError::DatabaseError(_) | ToolError::SerializationError(_) => ErrorCategory::Storage,
            ToolError::PatternError(_)
            | ToolError::TomlError(_)
            | ToolError::ConfigError { .. }
            | ToolError::InvalidConfigValueError { .. }
            | ToolError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ToolError::PtyError { .. } => ErrorCategory::Terminal,
            ToolError::Unsupported { .. } => ErrorCategory::Platform,
            ToolError::Cancelled => ErrorCategory::Interrupted,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 使用者中斷不算失敗
            ErrorCategory::Interrupted => ErrorSeverity::Low,
            // 網路錯誤通常可以重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::FileSystem | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Terminal | ErrorCategory::Platform => {
                ErrorSeverity::Critical
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ToolError::ApiError(_) => "Check your network connection and that the URL is reachable".to_string(),
            ToolError::HttpStatus { status, .. } if *status == 404 => {
                "The file is not published yet; keep watching or check the URL".to_string()
            }
            ToolError::HttpStatus { .. } => "Check the URL and any required headers".to_string(),
            ToolError::SizeMismatch { .. } => {
                "Verify --expected-size or drop --check-size".to_string()
            }
            ToolError::IoError(_) => "Check that the path exists and you have permission to use it".to_string(),
            ToolError::NotFound { .. } => "Check the path or name and try again".to_string(),
            ToolError::SerializationError(_) => "The file is not valid JSON; fix or remove it".to_string(),
            ToolError::DatabaseError(_) => {
                "The history database may be locked or corrupt; try `clipulse clear`".to_string()
            }
            ToolError::PatternError(_) => "Fix the regular expression syntax".to_string(),
            ToolError::TomlError(_) => "Make sure the config file is valid TOML".to_string(),
            ToolError::PtyError { .. } => "Run the command from an interactive terminal".to_string(),
            ToolError::Unsupported { .. } => "This tool only supports UNIX-like systems".to_string(),
            ToolError::Cancelled => "Run the command again to resume".to_string(),
            ToolError::ConfigError { .. }
            | ToolError::InvalidConfigValueError { .. }
            | ToolError::MissingConfigError { .. } => "Check the command-line options with --help".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ToolError::ApiError(e) if e.is_timeout() => "The request timed out".to_string(),
            ToolError::ApiError(e) if e.is_connect() => "Could not connect to the server".to_string(),
            ToolError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid {}: {}", field, reason)
            }
            ToolError::MissingConfigError { field } => format!("Missing {}", field),
            other => other.to_string(),
        }
    }

    /// 輸出錯誤並回傳對應退出碼
    pub fn report(&self) -> i32 {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            self,
            self.category(),
            self.severity()
        );
        eprintln!("❌ {}", self.user_friendly_message());
        eprintln!("💡 {}", self.recovery_suggestion());
        self.severity().exit_code()
    }
}
