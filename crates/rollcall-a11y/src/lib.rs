//! Accessible input and focus control
//!
//! This crate provides the headless half of a screen-reader friendly kiosk UI:
//! - A host document model and the [`FocusHost`] boundary
//! - Focusable-set resolution over a bounded region
//! - Focus movement, save/restore and focus traps
//! - Keyboard navigation with a fixed key binding table
//! - Live-region announcements with polite and assertive channels

pub mod error;
pub mod focus;
pub mod keys;
pub mod navigation;
pub mod region;
pub mod resolver;
pub mod screen_reader;

pub use error::ParseError;
pub use focus::{FocusManager, FocusTrap, TrapMonitor, TrapOutcome, WrapPolicy};
pub use keys::{Key, KeyEvent, Modifier};
pub use navigation::{
    KeyBinding, KeyBindingTable, KeyDispatch, KeyHandler, KeyboardNavigation, MountedNavigation,
    NavKey, NavigationOptions,
};
pub use region::{Document, Element, FocusHost, NodeId, SharedDocument, Size, Target, TargetKind};
pub use resolver::{resolve, FocusableSet, TargetFilter, TargetPredicate};
pub use screen_reader::{
    AnnouncementPriority, AnnouncementRequest, Announcer, LiveRegion, LiveRegionMutation,
    LiveRegionSink, RecordingSink,
};
