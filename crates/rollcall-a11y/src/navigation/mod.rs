//! Keyboard navigation for a bounded region

pub mod bindings;
pub mod keyboard;

pub use bindings::{KeyBinding, KeyBindingTable, KeyHandler, NavKey};
pub use keyboard::{KeyDispatch, KeyboardNavigation, MountedNavigation, NavigationOptions};
