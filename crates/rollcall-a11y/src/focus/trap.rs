//! Scoped focus traps
//!
//! A [`FocusTrap`] lives exactly as long as the bounded region that asked for
//! it. Dropping it, on any path, unregisters it from the [`TrapMonitor`] and
//! gives focus back to whatever held it before activation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use super::manager::{FocusManager, TrapOutcome};
use crate::keys::KeyEvent;
use crate::region::NodeId;

/// Shared count of active focus traps
///
/// Components that correct focus on their own (the scan surface) consult it
/// and stand down while a dialog owns the keyboard.
#[derive(Debug, Clone, Default)]
pub struct TrapMonitor {
    active: Arc<AtomicUsize>,
}

impl TrapMonitor {
    /// Registry with no active traps
    pub fn new() -> Self {
        Self::default()
    }

    /// True while at least one trap is active
    pub fn is_trapping(&self) -> bool {
        self.active_count() > 0
    }

    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        self.active.fetch_add(1, Ordering::SeqCst);
    }

    fn leave(&self) {
        let _ = self
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                count.checked_sub(1)
            });
    }
}

/// Active focus-trapping session
#[derive(Debug)]
pub struct FocusTrap {
    manager: FocusManager,
    monitor: TrapMonitor,
    restore_on_release: bool,
    released: bool,
}

impl FocusTrap {
    /// Save the current focus and start trapping inside the manager's region
    pub fn activate(manager: FocusManager, monitor: &TrapMonitor) -> Self {
        Self::start(manager, monitor, true)
    }

    /// Start trapping without restoring focus on release
    pub fn activate_without_restore(manager: FocusManager, monitor: &TrapMonitor) -> Self {
        Self::start(manager, monitor, false)
    }

    fn start(mut manager: FocusManager, monitor: &TrapMonitor, restore_on_release: bool) -> Self {
        let saved = manager.save_focus();
        monitor.enter();
        debug!(
            region = manager.region().raw(),
            saved = saved.map(NodeId::raw),
            "focus trap activated"
        );
        Self {
            manager,
            monitor: monitor.clone(),
            restore_on_release,
            released: false,
        }
    }

    pub fn region(&self) -> NodeId {
        self.manager.region()
    }

    pub fn saved_focus(&self) -> Option<NodeId> {
        self.manager.saved_focus()
    }

    /// Manager the trap routes Tab through
    pub fn manager(&self) -> &FocusManager {
        &self.manager
    }

    /// Route a key press through the trap
    pub fn handle_key(&self, event: &mut KeyEvent) -> TrapOutcome {
        self.manager.trap_focus(event)
    }

    /// End the trap now instead of at drop
    pub fn release(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.monitor.leave();
        if self.restore_on_release {
            let restored = self.manager.restore_focus();
            debug!(region = self.region().raw(), restored, "focus trap released");
        }
    }
}

impl Drop for FocusTrap {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{Document, Element, SharedDocument};

    #[test]
    fn test_trap_restores_and_unregisters_on_drop() {
        let mut doc = Document::new();
        let root = doc.root();
        let opener = doc.append(root, Element::button("open")).unwrap();
        let dialog = doc.append(root, Element::container("dialog")).unwrap();
        let confirm = doc.append(dialog, Element::button("confirm")).unwrap();
        let doc = SharedDocument::new(doc);
        doc.write().focus(opener);

        let monitor = TrapMonitor::new();
        {
            let trap = FocusTrap::activate(FocusManager::new(Arc::new(doc.clone()), dialog), &monitor);
            assert!(monitor.is_trapping());
            assert_eq!(trap.saved_focus(), Some(opener));
            trap.manager().focus_first();
            assert_eq!(doc.read().active(), Some(confirm));
        }

        assert!(!monitor.is_trapping());
        assert_eq!(doc.read().active(), Some(opener));
    }

    #[test]
    fn test_release_is_idempotent_with_drop() {
        let doc = SharedDocument::new(Document::new());
        let root = doc.read().root();
        let monitor = TrapMonitor::new();
        let first = FocusTrap::activate(FocusManager::new(Arc::new(doc.clone()), root), &monitor);
        let second = FocusTrap::activate_without_restore(
            FocusManager::new(Arc::new(doc.clone()), root),
            &monitor,
        );
        assert_eq!(monitor.active_count(), 2);

        first.release();
        assert_eq!(monitor.active_count(), 1);
        drop(second);
        assert_eq!(monitor.active_count(), 0);
    }
}
