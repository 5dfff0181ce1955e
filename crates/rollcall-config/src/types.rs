//! Configuration types

use serde::{Deserialize, Serialize};

/// Root configuration for the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Scan input timing and messages
    pub scan: ScanSettings,
    /// Keyboard navigation defaults
    pub navigation: NavigationSettings,
    /// Live-region announcer
    pub announcer: AnnouncerSettings,
}

/// Timing of the scan input controller, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanSettings {
    /// Minimum time between two accepted scans (`SCAN_DEBOUNCE_MS`)
    pub debounce_ms: u64,
    /// Delay before focus returns to the scan surface after a success (`AUTO_CLEAR_MS`)
    pub auto_clear_ms: u64,
    /// Focus-retention poll interval (`FOCUS_CHECK_MS`)
    pub focus_check_ms: u64,
    /// Announcement texts
    pub messages: ScanMessages,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            auto_clear_ms: 5000,
            focus_check_ms: 100,
            messages: ScanMessages::default(),
        }
    }
}

/// Texts narrated by the scan input controller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScanMessages {
    pub in_progress: String,
    pub too_quick: String,
    pub error: String,
    pub success: String,
}

impl Default for ScanMessages {
    fn default() -> Self {
        Self {
            in_progress: "Scan already in progress".to_string(),
            too_quick: "Scan too quick, please wait".to_string(),
            error: "Scan error".to_string(),
            success: "Scan recorded".to_string(),
        }
    }
}

/// Default flags for keyboard-navigated regions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavigationSettings {
    pub auto_focus_on_mount: bool,
    pub trap_focus: bool,
    pub restore_focus_on_unmount: bool,
    pub enable_arrow_keys: bool,
    pub enable_tab_navigation: bool,
    pub enable_enter_key: bool,
    pub enable_escape_key: bool,
    /// Wrap from the last target to the first (and back) instead of stopping
    pub wrap: bool,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            auto_focus_on_mount: false,
            trap_focus: false,
            restore_focus_on_unmount: true,
            enable_arrow_keys: true,
            enable_tab_navigation: true,
            enable_enter_key: true,
            enable_escape_key: true,
            wrap: true,
        }
    }
}

/// Announcer settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnnouncerSettings {
    /// Drop every announcement when false
    pub enabled: bool,
    /// Number of requests kept for diagnostics
    pub history_limit: usize,
}

impl Default for AnnouncerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            history_limit: 50,
        }
    }
}
