//! Fixed key binding table
//!
//! The navigation controller only understands seven keys. Each has exactly one
//! slot holding its enablement flag and optional handler, so dispatch is an
//! exhaustive `match` over [`NavKey`].
//!
//! Every slot shares one modifier rule: a press carrying Ctrl, Alt or Meta is
//! never intercepted, so application shortcuts keep working inside navigated
//! regions. Shift passes through; only Tab reads it, as the direction.

use std::fmt;
use std::sync::Arc;

use crate::keys::{Key, KeyEvent};

/// Caller-supplied reaction to a navigation key
pub type KeyHandler = Arc<dyn Fn(&KeyEvent) + Send + Sync>;

/// Keys handled by the navigation controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavKey {
    Enter,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Shift+Tab is the same slot, moving backward
    Tab,
}

impl NavKey {
    /// Every key, in slot order
    pub const ALL: [NavKey; 7] = [
        NavKey::Enter,
        NavKey::Escape,
        NavKey::ArrowUp,
        NavKey::ArrowDown,
        NavKey::ArrowLeft,
        NavKey::ArrowRight,
        NavKey::Tab,
    ];

    /// Map a raw key to its navigation slot, if it has one
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Enter => Some(NavKey::Enter),
            Key::Escape => Some(NavKey::Escape),
            Key::Up => Some(NavKey::ArrowUp),
            Key::Down => Some(NavKey::ArrowDown),
            Key::Left => Some(NavKey::ArrowLeft),
            Key::Right => Some(NavKey::ArrowRight),
            Key::Tab => Some(NavKey::Tab),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        match self {
            NavKey::Enter => 0,
            NavKey::Escape => 1,
            NavKey::ArrowUp => 2,
            NavKey::ArrowDown => 3,
            NavKey::ArrowLeft => 4,
            NavKey::ArrowRight => 5,
            NavKey::Tab => 6,
        }
    }
}

/// One slot of the table
#[derive(Clone)]
pub struct KeyBinding {
    /// Key this slot belongs to
    pub key: NavKey,
    /// Disabled slots ignore their key entirely
    pub enabled: bool,
    handler: Option<KeyHandler>,
}

impl KeyBinding {
    fn new(key: NavKey) -> Self {
        Self {
            key,
            enabled: true,
            handler: None,
        }
    }

    /// Caller override, if one was installed
    pub fn handler(&self) -> Option<&KeyHandler> {
        self.handler.as_ref()
    }

    /// Whether this slot should react to `event`
    ///
    /// False for shortcut combinations and for disabled slots.
    pub fn accepts(&self, event: &KeyEvent) -> bool {
        self.enabled && !event.is_shortcut()
    }
}

impl fmt::Debug for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBinding")
            .field("key", &self.key)
            .field("enabled", &self.enabled)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

/// Key → binding table, one slot per [`NavKey`]
#[derive(Debug, Clone)]
pub struct KeyBindingTable {
    slots: [KeyBinding; 7],
}

impl KeyBindingTable {
    /// Table with every key enabled and no handlers
    pub fn new() -> Self {
        Self {
            slots: NavKey::ALL.map(KeyBinding::new),
        }
    }

    /// Slot for `key`
    pub fn get(&self, key: NavKey) -> &KeyBinding {
        &self.slots[key.slot()]
    }

    /// Enable or disable the slot for `key`
    pub fn set_enabled(&mut self, key: NavKey, enabled: bool) {
        self.slots[key.slot()].enabled = enabled;
    }

    /// Install or replace the handler for `key`
    pub fn set_handler(&mut self, key: NavKey, handler: KeyHandler) {
        self.slots[key.slot()].handler = Some(handler);
    }

    /// Slots in [`NavKey::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = &KeyBinding> {
        self.slots.iter()
    }
}

impl Default for KeyBindingTable {
    fn default() -> Self {
        Self::new()
    }
}
