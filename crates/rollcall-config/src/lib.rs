//! Rollcall configuration
//!
//! Typed settings for the scan input controller, keyboard navigation and the
//! announcer, loaded from an optional TOML file layered under `ROLLCALL__*`
//! environment variables.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::ConfigManager;
pub use types::{
    AnnouncerSettings, EngineConfig, NavigationSettings, ScanMessages, ScanSettings,
};
