pub mod asciicast;
pub mod clipulse;
pub mod fetcher;
pub mod installer;
pub mod ipinfo;
pub mod treeview;

pub use crate::domain::model::{ClipboardEntry, LinkOutcome, LinkStatus, Recording, WatchOutcome};
pub use crate::utils::error::Result;
