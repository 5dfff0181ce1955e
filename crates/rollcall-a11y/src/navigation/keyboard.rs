//! Keyboard navigation controller
//!
//! Binds one region to the key binding table. Arrow Up/Down fall back to
//! previous/next focus, Tab runs through the region's focus trap when trapping
//! is on, and Enter, Escape, Left and Right only do something when a handler
//! is configured.

use std::fmt;
use std::sync::Arc;

use rollcall_config::NavigationSettings;
use tracing::{debug, trace};

use super::bindings::{KeyBindingTable, KeyHandler, NavKey};
use crate::focus::{FocusManager, FocusTrap, TrapMonitor, WrapPolicy};
use crate::keys::KeyEvent;
use crate::region::{FocusHost, NodeId};
use crate::resolver::{TargetFilter, TargetPredicate};

/// Configuration of one navigated region
#[derive(Clone)]
pub struct NavigationOptions {
    pub auto_focus_on_mount: bool,
    pub trap_focus: bool,
    pub restore_focus_on_unmount: bool,
    pub enable_arrow_keys: bool,
    pub enable_tab_navigation: bool,
    pub enable_enter_key: bool,
    pub enable_escape_key: bool,
    pub wrap: bool,
    handlers: Vec<(NavKey, KeyHandler)>,
    predicate: Option<TargetPredicate>,
}

impl NavigationOptions {
    /// Options mirroring `settings`, with no handlers or filter
    pub fn from_settings(settings: &NavigationSettings) -> Self {
        Self {
            auto_focus_on_mount: settings.auto_focus_on_mount,
            trap_focus: settings.trap_focus,
            restore_focus_on_unmount: settings.restore_focus_on_unmount,
            enable_arrow_keys: settings.enable_arrow_keys,
            enable_tab_navigation: settings.enable_tab_navigation,
            enable_enter_key: settings.enable_enter_key,
            enable_escape_key: settings.enable_escape_key,
            wrap: settings.wrap,
            handlers: Vec::new(),
            predicate: None,
        }
    }

    /// Install a handler for `key`, replacing any earlier one
    pub fn on(mut self, key: NavKey, handler: impl Fn(&KeyEvent) + Send + Sync + 'static) -> Self {
        self.handlers.retain(|(bound, _)| *bound != key);
        self.handlers.push((key, Arc::new(handler)));
        self
    }

    /// Narrow the eligible targets with a custom predicate
    pub fn with_filter(mut self, predicate: TargetPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn auto_focus(mut self, enabled: bool) -> Self {
        self.auto_focus_on_mount = enabled;
        self
    }

    /// Trap Tab inside the region while mounted
    pub fn trap(mut self, enabled: bool) -> Self {
        self.trap_focus = enabled;
        self
    }

    pub fn restore_on_unmount(mut self, enabled: bool) -> Self {
        self.restore_focus_on_unmount = enabled;
        self
    }

    pub fn wrapping(mut self, enabled: bool) -> Self {
        self.wrap = enabled;
        self
    }

    /// Build the binding table once for a mounted controller
    pub fn binding_table(&self) -> KeyBindingTable {
        let mut table = KeyBindingTable::new();
        table.set_enabled(NavKey::Enter, self.enable_enter_key);
        table.set_enabled(NavKey::Escape, self.enable_escape_key);
        for key in [
            NavKey::ArrowUp,
            NavKey::ArrowDown,
            NavKey::ArrowLeft,
            NavKey::ArrowRight,
        ] {
            table.set_enabled(key, self.enable_arrow_keys);
        }
        table.set_enabled(NavKey::Tab, self.enable_tab_navigation);
        for (key, handler) in &self.handlers {
            table.set_handler(*key, Arc::clone(handler));
        }
        table
    }

    fn filter(&self) -> TargetFilter {
        match &self.predicate {
            Some(predicate) => TargetFilter::default().with_predicate(Arc::clone(predicate)),
            None => TargetFilter::default(),
        }
    }
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self::from_settings(&NavigationSettings::default())
    }
}

impl fmt::Debug for NavigationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationOptions")
            .field("auto_focus_on_mount", &self.auto_focus_on_mount)
            .field("trap_focus", &self.trap_focus)
            .field("restore_focus_on_unmount", &self.restore_focus_on_unmount)
            .field("enable_arrow_keys", &self.enable_arrow_keys)
            .field("enable_tab_navigation", &self.enable_tab_navigation)
            .field("enable_enter_key", &self.enable_enter_key)
            .field("enable_escape_key", &self.enable_escape_key)
            .field("wrap", &self.wrap)
            .field(
                "handlers",
                &self.handlers.iter().map(|(key, _)| *key).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// What the controller did with a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDispatch {
    /// Not a navigation key, disabled, or part of a shortcut
    Ignored,
    Handled,
}

/// Entry point for mounting keyboard navigation on a region
pub struct KeyboardNavigation;

impl KeyboardNavigation {
    /// Mount navigation on `region`
    ///
    /// Captures the current focus when restoring is configured, starts a focus
    /// trap when trapping is configured, then applies auto-focus.
    pub fn mount(
        host: Arc<dyn FocusHost>,
        region: NodeId,
        options: NavigationOptions,
        monitor: &TrapMonitor,
    ) -> MountedNavigation {
        let mut manager = FocusManager::new(host, region)
            .with_filter(options.filter())
            .with_wrap(WrapPolicy::from_flag(options.wrap));

        if options.restore_focus_on_unmount {
            manager.save_focus();
        }
        let trap = options
            .trap_focus
            .then(|| FocusTrap::activate_without_restore(manager.clone(), monitor));
        if options.auto_focus_on_mount {
            manager.focus_first();
        }

        debug!(region = region.raw(), ?options, "keyboard navigation mounted");
        MountedNavigation {
            table: options.binding_table(),
            restore: options.restore_focus_on_unmount,
            manager,
            trap,
            unmounted: false,
        }
    }
}

/// Keyboard navigation bound to a region until unmounted or dropped
pub struct MountedNavigation {
    manager: FocusManager,
    table: KeyBindingTable,
    trap: Option<FocusTrap>,
    restore: bool,
    unmounted: bool,
}

impl MountedNavigation {
    /// Manager bound to the navigated region
    pub fn focus_manager(&self) -> &FocusManager {
        &self.manager
    }

    pub fn bindings(&self) -> &KeyBindingTable {
        &self.table
    }

    /// True when mounted with an active focus trap
    pub fn is_trapping(&self) -> bool {
        self.trap.is_some()
    }

    /// Route one key press
    ///
    /// While a trap is active Tab always goes through it, even with the Tab
    /// binding disabled; the binding only gates the caller's Tab handler.
    pub fn handle_key(&self, event: &mut KeyEvent) -> KeyDispatch {
        let Some(key) = NavKey::from_key(&event.key) else {
            return KeyDispatch::Ignored;
        };
        if event.is_shortcut() {
            trace!(%event, "shortcut combination left to the host");
            return KeyDispatch::Ignored;
        }
        let binding = self.table.get(key);
        let handler = binding.handler().filter(|_| binding.enabled);

        match key {
            NavKey::Tab => {
                let mut acted = false;
                if let Some(trap) = &self.trap {
                    let outcome = trap.handle_key(event);
                    trace!(?outcome, "tab routed through focus trap");
                    acted = true;
                }
                if let Some(handler) = handler {
                    handler(&*event);
                    acted = true;
                }
                if acted {
                    KeyDispatch::Handled
                } else {
                    KeyDispatch::Ignored
                }
            }
            _ if !binding.accepts(event) => KeyDispatch::Ignored,
            NavKey::ArrowUp | NavKey::ArrowDown => {
                match handler {
                    Some(handler) => handler(&*event),
                    None if key == NavKey::ArrowUp => {
                        self.manager.focus_previous();
                    }
                    None => {
                        self.manager.focus_next();
                    }
                }
                event.prevent_default();
                KeyDispatch::Handled
            }
            NavKey::Enter | NavKey::Escape | NavKey::ArrowLeft | NavKey::ArrowRight => {
                match handler {
                    Some(handler) => {
                        handler(&*event);
                        event.prevent_default();
                        KeyDispatch::Handled
                    }
                    None => KeyDispatch::Ignored,
                }
            }
        }
    }

    /// Release the trap and restore captured focus
    pub fn unmount(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        drop(self.trap.take());
        if self.restore {
            let restored = self.manager.restore_focus();
            debug!(
                region = self.manager.region().raw(),
                restored, "keyboard navigation unmounted"
            );
        }
    }
}

impl Drop for MountedNavigation {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for MountedNavigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedNavigation")
            .field("manager", &self.manager)
            .field("table", &self.table)
            .field("trapping", &self.trap.is_some())
            .field("restore", &self.restore)
            .finish()
    }
}
