use crate::core::treeview::DEFAULT_EXTRA_IGNORES;
use crate::utils::display::SpinnerStyle;
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::{
    validate_file_name, validate_non_empty_string, validate_path, validate_positive_number,
    validate_url, Validate,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// ---------------------------------------------------------------- toolbox

#[derive(Debug, Clone, Parser)]
#[command(name = "toolbox")]
#[command(about = "Expose the bundled CLI tools as commands on your PATH")]
pub struct ToolboxArgs {
    #[command(subcommand)]
    pub command: ToolboxCommand,

    /// Folder the command links are created in (default: ~/.local/bin)
    #[arg(long, global = true)]
    pub bin_dir: Option<PathBuf>,

    /// Folder holding the tool executables (default: next to toolbox)
    #[arg(long, global = true)]
    pub install_dir: Option<PathBuf>,

    /// toolbox.toml to use instead of ~/.config/cli-toolbox/toolbox.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ToolboxCommand {
    /// Create a symlink for a tool in the bin folder
    Link {
        tool: String,
        /// Command name (default: alias from config or the tool name)
        #[arg(long)]
        name: Option<String>,
        /// Replace an existing file at the link location
        #[arg(short, long)]
        force: bool,
    },
    /// Remove a command symlink from the bin folder
    Unlink { name: String },
    /// Show which tools are linked
    List,
}

impl Validate for ToolboxArgs {
    fn validate(&self) -> Result<()> {
        match &self.command {
            ToolboxCommand::Link { tool, name, .. } => {
                validate_non_empty_string("tool", tool)?;
                if let Some(name) = name {
                    validate_file_name("name", name)?;
                }
            }
            ToolboxCommand::Unlink { name } => validate_file_name("name", name)?,
            ToolboxCommand::List => {}
        }
        Ok(())
    }
}

// ---------------------------------------------------------------- treeview

#[derive(Debug, Clone, Parser)]
#[command(name = "treeview")]
#[command(about = "Display folder structure in a tree-like format")]
pub struct TreeviewArgs {
    /// Folder to display
    pub folder: PathBuf,

    /// Extra folder or file names to skip
    #[arg(long, num_args = 1.., default_values = DEFAULT_EXTRA_IGNORES)]
    pub ignore: Vec<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for TreeviewArgs {
    fn validate(&self) -> Result<()> {
        validate_path("folder", &self.folder.to_string_lossy())?;
        for name in &self.ignore {
            validate_non_empty_string("ignore", name)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------- ipinfo

#[derive(Debug, Clone, Parser)]
#[command(name = "ipinfo")]
#[command(about = "Show local IPv4 addresses and the public IP")]
pub struct IpinfoArgs {
    /// Only show the public IP
    #[arg(long, group = "mode")]
    pub public: bool,

    /// Show local and public IPs
    #[arg(long, group = "mode")]
    pub all: bool,

    /// Public IP lookup URL
    #[arg(long, default_value = crate::core::ipinfo::DEFAULT_PUBLIC_IP_ENDPOINT)]
    pub endpoint: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl IpinfoArgs {
    pub fn show_local(&self) -> bool {
        !self.public
    }

    pub fn show_public(&self) -> bool {
        self.public || self.all
    }
}

impl Validate for IpinfoArgs {
    fn validate(&self) -> Result<()> {
        if self.show_public() {
            validate_url("endpoint", &self.endpoint)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------- fetcher

pub const DEFAULT_OUTPUT: &str = "./downloaded.file";
pub const DEFAULT_INTERVAL: u64 = 5;

#[derive(Debug, Clone, Parser)]
#[command(name = "fetcher")]
#[command(about = "Watch URLs until the file is available, then download it")]
pub struct FetcherArgs {
    /// URL to watch
    pub url: Option<String>,

    /// Output path (folder with -m)
    #[arg(short = 'O', long = "out", default_value = DEFAULT_OUTPUT)]
    pub out: PathBuf,

    /// Seconds between attempts
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Do not play a sound on success
    #[arg(long)]
    pub no_sound: bool,

    /// Sound file played on success
    #[arg(long)]
    pub sound: Option<PathBuf>,

    /// File with one URL per line
    #[arg(short, long)]
    pub multiple: Option<PathBuf>,

    /// Give up after N attempts (0 = never)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Expected size in bytes
    #[arg(long)]
    pub expected_size: Option<u64>,

    /// Compare the announced size with --expected-size
    #[arg(long)]
    pub check_size: bool,

    /// Request headers as a JSON object
    #[arg(long)]
    pub headers: Option<String>,

    /// Webhook notified on success
    #[arg(long)]
    pub webhook: Option<String>,

    #[arg(long, value_enum)]
    pub spinner: Option<SpinnerStyle>,

    /// Load settings from a JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Save the effective settings to a JSON file
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// No animation; progress goes to the log file
    #[arg(long)]
    pub daemon: bool,
}

impl Validate for FetcherArgs {
    fn validate(&self) -> Result<()> {
        if self.url.is_none() && self.multiple.is_none() {
            return Err(ToolError::MissingConfigError {
                field: "URL (No URL provided)".to_string(),
            });
        }
        if let Some(url) = &self.url {
            validate_url("url", url)?;
        }
        if let Some(webhook) = &self.webhook {
            validate_url("webhook", webhook)?;
        }
        if self.check_size {
            if let Some(size) = self.expected_size {
                validate_positive_number("expected_size", size, 1)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------- clipulse

#[derive(Debug, Clone, Parser)]
#[command(name = "clipulse")]
#[command(about = "Clipboard monitor with searchable history")]
pub struct ClipulseArgs {
    #[command(subcommand)]
    pub command: Option<ClipulseCommand>,

    /// Data folder (default: ~/.clipulse)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ClipulseCommand {
    /// Monitor the clipboard
    Watch,
    /// Show recent entries
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        full: bool,
        /// Browse interactively
        #[arg(long)]
        tui: bool,
    },
    /// Search the history
    Search {
        keyword: String,
        #[arg(long)]
        full: bool,
    },
    /// Delete all entries
    Clear,
    /// Export the history to a file
    Export(ExportArgs),
    /// Manage app and pattern filters
    Filter(FilterArgs),
    /// Delete entries older than N minutes
    Expire {
        #[arg(long)]
        minutes: u64,
    },
    /// Configure the sync webhook
    Sync(SyncArgs),
    /// Diff the two newest entries
    Diff {
        #[arg(long, default_value_t = 2)]
        count: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Txt,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Txt => "txt",
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[arg(long, group = "format")]
    pub json: bool,
    #[arg(long, group = "format")]
    pub txt: bool,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn format(&self) -> ExportFormat {
        if self.json {
            ExportFormat::Json
        } else {
            ExportFormat::Txt
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!("clipboard_history.{}", self.format().extension()))
        })
    }
}

#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct FilterArgs {
    /// Ignore clipboard changes from this app
    #[arg(long)]
    pub add_app: Option<String>,
    /// Ignore content matching this regex
    #[arg(long)]
    pub add_pattern: Option<String>,
    #[arg(long)]
    pub list: bool,
    #[arg(long)]
    pub clear: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    #[arg(long)]
    pub webhook: Option<String>,
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,
    #[arg(long)]
    pub disable: bool,
}

impl Validate for ClipulseArgs {
    fn validate(&self) -> Result<()> {
        match &self.command {
            Some(ClipulseCommand::Search { keyword, .. }) => {
                validate_non_empty_string("keyword", keyword)?
            }
            Some(ClipulseCommand::History { limit, .. }) => {
                validate_positive_number("limit", *limit as u64, 1)?
            }
            Some(ClipulseCommand::Diff { count }) => {
                validate_positive_number("count", *count as u64, 2)?
            }
            Some(ClipulseCommand::Sync(SyncArgs {
                webhook: Some(url), ..
            })) => validate_url("webhook", url)?,
            _ => {}
        }
        Ok(())
    }
}

// ---------------------------------------------------------------- asciicast

#[derive(Debug, Clone, Parser)]
#[command(name = "asciicast")]
#[command(about = "Record and replay terminal sessions like a movie")]
pub struct AsciicastArgs {
    #[command(subcommand)]
    pub command: Option<AsciicastCommand>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum AsciicastCommand {
    /// Record a terminal session
    Rec {
        /// Output file (.cast)
        output: PathBuf,
        /// Shell to use (default: $SHELL)
        #[arg(long)]
        shell: Option<String>,
    },
    /// Play back a recording
    Play {
        /// Input file (.cast)
        input: PathBuf,
        /// Playback speed multiplier
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
    },
    /// Show recording info
    Info {
        /// Input file (.cast)
        input: PathBuf,
    },
}
