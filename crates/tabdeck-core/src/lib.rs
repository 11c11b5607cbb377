pub mod config;
pub mod error;
pub mod favicon;
pub mod links;
pub mod storage;

pub use config::{AppConfig, FaviconConfig, ScrollConfig};
pub use error::{Error, Result};
pub use links::{QuickLink, Settings};
