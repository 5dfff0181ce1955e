//! Focus management for a bounded region
//!
//! Every operation re-resolves the focusable set, so the manager is safe to
//! use while the region is changing underneath it. None of the operations
//! fail: an empty region, a vanished target or focus sitting outside the
//! region all degrade to a no-op or to the nearest sensible target.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::keys::{Key, KeyEvent};
use crate::region::{FocusHost, NodeId};
use crate::resolver::{resolve, FocusableSet, TargetFilter};

/// Behaviour at either end of the focusable set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapPolicy {
    /// Continue from the opposite end
    #[default]
    Wrap,
    /// Stay on the boundary target
    Stop,
}

impl WrapPolicy {
    /// `true` wraps, `false` stops at the edges
    pub fn from_flag(wrap: bool) -> Self {
        if wrap {
            WrapPolicy::Wrap
        } else {
            WrapPolicy::Stop
        }
    }
}

/// Result of routing a Tab press through [`FocusManager::trap_focus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapOutcome {
    /// Focus was moved to the given target and the event consumed
    Redirected(NodeId),
    /// Focus stays where it is and the event was consumed
    Held,
    /// The host's own Tab handling stays inside the region
    PassThrough,
}

/// Focus management for one region
#[derive(Clone)]
pub struct FocusManager {
    host: Arc<dyn FocusHost>,
    region: NodeId,
    filter: TargetFilter,
    wrap: WrapPolicy,
    saved: Option<NodeId>,
}

impl FocusManager {
    /// Manager for `region` with the default filter, wrapping at the edges
    pub fn new(host: Arc<dyn FocusHost>, region: NodeId) -> Self {
        Self {
            host,
            region,
            filter: TargetFilter::default(),
            wrap: WrapPolicy::Wrap,
            saved: None,
        }
    }

    pub fn with_filter(mut self, filter: TargetFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_wrap(mut self, wrap: WrapPolicy) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn region(&self) -> NodeId {
        self.region
    }

    pub fn wrap(&self) -> WrapPolicy {
        self.wrap
    }

    pub fn host(&self) -> &Arc<dyn FocusHost> {
        &self.host
    }

    /// Current eligible targets of the region
    pub fn eligible_targets(&self) -> FocusableSet {
        resolve(self.host.as_ref(), self.region, &self.filter)
    }

    fn current_index(&self, set: &FocusableSet) -> Option<usize> {
        self.host.active().and_then(|active| set.position(active))
    }

    fn move_to(&self, target: Option<NodeId>) -> Option<NodeId> {
        let target = target?;
        if self.host.focus(target) {
            Some(target)
        } else {
            debug!(target = target.raw(), "host refused focus");
            None
        }
    }

    /// Focus the first eligible target
    pub fn focus_first(&self) -> Option<NodeId> {
        self.move_to(self.eligible_targets().first())
    }

    /// Focus the last eligible target
    pub fn focus_last(&self) -> Option<NodeId> {
        self.move_to(self.eligible_targets().last())
    }

    /// Focus the target after the current one
    ///
    /// Focus outside the region behaves like [`focus_first`](Self::focus_first).
    pub fn focus_next(&self) -> Option<NodeId> {
        let set = self.eligible_targets();
        let next = match self.current_index(&set) {
            None => set.first(),
            Some(index) if index + 1 < set.len() => set.get(index + 1),
            Some(_) => match self.wrap {
                WrapPolicy::Wrap => set.first(),
                WrapPolicy::Stop => None,
            },
        };
        self.move_to(next)
    }

    /// Focus the target before the current one
    ///
    /// Focus outside the region behaves like [`focus_last`](Self::focus_last).
    pub fn focus_previous(&self) -> Option<NodeId> {
        let set = self.eligible_targets();
        let previous = match self.current_index(&set) {
            None => set.last(),
            Some(0) => match self.wrap {
                WrapPolicy::Wrap => set.last(),
                WrapPolicy::Stop => None,
            },
            Some(index) => set.get(index - 1),
        };
        self.move_to(previous)
    }

    /// Remember the current focus owner
    pub fn save_focus(&mut self) -> Option<NodeId> {
        self.saved = self.host.active();
        self.saved
    }

    /// Focus captured by the last [`FocusManager::save_focus`]
    pub fn saved_focus(&self) -> Option<NodeId> {
        self.saved
    }

    /// Return focus to the saved target
    ///
    /// The saved id is consumed. Returns false when nothing was saved or the
    /// target no longer exists.
    pub fn restore_focus(&mut self) -> bool {
        let Some(saved) = self.saved.take() else {
            return false;
        };
        if !self.host.contains(saved) {
            debug!(target = saved.raw(), "saved focus target is gone");
            return false;
        }
        self.host.focus(saved)
    }

    /// Keep a Tab press inside the region
    ///
    /// Forward past the last target goes to the first, backward past the
    /// first goes to the last (or stays put under [`WrapPolicy::Stop`]).
    /// Whenever the press is redirected or held its default is prevented.
    pub fn trap_focus(&self, event: &mut KeyEvent) -> TrapOutcome {
        if event.key != Key::Tab {
            return TrapOutcome::PassThrough;
        }

        let set = self.eligible_targets();
        if set.is_empty() {
            event.prevent_default();
            return TrapOutcome::Held;
        }

        let backward = event.shift();
        let redirect = match (self.current_index(&set), backward) {
            (None, false) => Some(set.first()),
            (None, true) => Some(set.last()),
            (Some(index), false) if index + 1 == set.len() => Some(match self.wrap {
                WrapPolicy::Wrap => set.first(),
                WrapPolicy::Stop => None,
            }),
            (Some(0), true) => Some(match self.wrap {
                WrapPolicy::Wrap => set.last(),
                WrapPolicy::Stop => None,
            }),
            _ => None,
        };

        match redirect {
            None => TrapOutcome::PassThrough,
            Some(target) => {
                event.prevent_default();
                match self.move_to(target) {
                    Some(id) => {
                        debug!(target = id.raw(), backward, "tab redirected inside trap");
                        TrapOutcome::Redirected(id)
                    }
                    None => TrapOutcome::Held,
                }
            }
        }
    }
}

impl fmt::Debug for FocusManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusManager")
            .field("region", &self.region)
            .field("filter", &self.filter)
            .field("wrap", &self.wrap)
            .field("saved", &self.saved)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Modifier;
    use crate::region::{Document, Element, SharedDocument};

    fn two_buttons() -> (SharedDocument, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let dialog = doc.append(root, Element::container("dialog")).unwrap();
        let a = doc.append(dialog, Element::button("A")).unwrap();
        let b = doc.append(dialog, Element::button("B")).unwrap();
        (SharedDocument::new(doc), dialog, a, b)
    }

    #[test]
    fn test_forward_tab_wraps_to_first() {
        let (doc, dialog, a, b) = two_buttons();
        let manager = FocusManager::new(Arc::new(doc.clone()), dialog);
        doc.write().focus(b);

        let mut event = KeyEvent::new(Key::Tab);
        assert_eq!(manager.trap_focus(&mut event), TrapOutcome::Redirected(a));
        assert!(event.is_default_prevented());
        assert_eq!(doc.read().active(), Some(a));
    }

    #[test]
    fn test_backward_tab_wraps_to_last() {
        let (doc, dialog, a, b) = two_buttons();
        let manager = FocusManager::new(Arc::new(doc.clone()), dialog);
        doc.write().focus(a);

        let mut event = KeyEvent::new(Key::Tab).with_modifier(Modifier::Shift);
        assert_eq!(manager.trap_focus(&mut event), TrapOutcome::Redirected(b));
        assert_eq!(doc.read().active(), Some(b));
    }

    #[test]
    fn test_inner_tab_passes_through() {
        let (doc, dialog, a, _) = two_buttons();
        let manager = FocusManager::new(Arc::new(doc.clone()), dialog);
        doc.write().focus(a);

        let mut event = KeyEvent::new(Key::Tab);
        assert_eq!(manager.trap_focus(&mut event), TrapOutcome::PassThrough);
        assert!(!event.is_default_prevented());
    }

    #[test]
    fn test_stop_policy_holds_at_boundary() {
        let (doc, dialog, _, b) = two_buttons();
        let manager = FocusManager::new(Arc::new(doc.clone()), dialog).with_wrap(WrapPolicy::Stop);
        doc.write().focus(b);

        let mut event = KeyEvent::new(Key::Tab);
        assert_eq!(manager.trap_focus(&mut event), TrapOutcome::Held);
        assert!(event.is_default_prevented());
        assert_eq!(doc.read().active(), Some(b));
        assert_eq!(manager.focus_next(), None);
    }

    #[test]
    fn test_outside_focus_enters_at_edges() {
        let (doc, dialog, a, b) = two_buttons();
        let root = doc.read().root();
        let outside = doc.write().append(root, Element::button("outside")).unwrap();
        let manager = FocusManager::new(Arc::new(doc.clone()), dialog);

        doc.write().focus(outside);
        assert_eq!(manager.focus_next(), Some(a));
        doc.write().focus(outside);
        assert_eq!(manager.focus_previous(), Some(b));
    }

    #[test]
    fn test_restore_skips_removed_target() {
        let (doc, dialog, a, _) = two_buttons();
        let mut manager = FocusManager::new(Arc::new(doc.clone()), dialog);
        doc.write().focus(a);
        manager.save_focus();
        doc.write().remove(a);

        assert!(!manager.restore_focus());
        assert!(!manager.restore_focus());
    }
}
