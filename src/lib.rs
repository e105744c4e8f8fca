pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{ClipulseConfig, FetcherSettings, ToolboxConfig};
pub use core::{clipulse::ClipulseMonitor, fetcher::Fetcher, installer::Installer};
pub use utils::error::{Result, ToolError};
