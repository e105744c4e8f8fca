pub mod cli;
pub mod clipulse_config;
pub mod fetcher_config;
pub mod toolbox_config;

pub use clipulse_config::{ClipulseConfig, ClipulsePaths};
pub use fetcher_config::FetcherSettings;
pub use toolbox_config::ToolboxConfig;
