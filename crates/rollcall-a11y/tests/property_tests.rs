//! Property-based tests for focusable-set resolution and focus movement

use std::sync::Arc;

use proptest::prelude::*;
use rollcall_a11y::{
    resolve, Document, Element, FocusManager, FocusTrap, Key, KeyEvent, Modifier, NodeId,
    SharedDocument, TargetFilter, TargetKind, TrapMonitor, WrapPolicy,
};

#[derive(Debug, Clone)]
struct Flags {
    kind: TargetKind,
    disabled: bool,
    aria_disabled: bool,
    hidden: bool,
    zero_area: bool,
    tab_index: Option<i32>,
    /// Nest under the previous element instead of the region
    nested: bool,
}

fn kind_strategy() -> impl Strategy<Value = TargetKind> {
    prop_oneof![
        Just(TargetKind::Container),
        Just(TargetKind::Button),
        Just(TargetKind::Link),
        Just(TargetKind::TextField),
        Just(TargetKind::TextArea),
        Just(TargetKind::Select),
        Just(TargetKind::Generic),
        Just(TargetKind::Static),
    ]
}

fn flags_strategy() -> impl Strategy<Value = Flags> {
    (
        kind_strategy(),
        any::<bool>(),
        any::<bool>(),
        prop::bool::weighted(0.2),
        prop::bool::weighted(0.2),
        prop::option::of(-1i32..3),
        any::<bool>(),
    )
        .prop_map(
            |(kind, disabled, aria_disabled, hidden, zero_area, tab_index, nested)| Flags {
                kind,
                disabled,
                aria_disabled,
                hidden,
                zero_area,
                tab_index,
                nested,
            },
        )
}

fn build(flags: &[Flags]) -> (SharedDocument, NodeId) {
    let mut doc = Document::new();
    let region = doc.append(doc.root(), Element::container("region")).unwrap();
    let mut previous = region;
    for flag in flags {
        let mut element = Element::new(flag.kind, "target")
            .disabled(flag.disabled)
            .aria_disabled(flag.aria_disabled)
            .hidden(flag.hidden);
        if flag.zero_area {
            element = element.size(0.0, 0.0);
        }
        if let Some(index) = flag.tab_index {
            element = element.tab_index(index);
        }
        let parent = if flag.nested { previous } else { region };
        previous = doc.append(parent, element).unwrap();
    }
    (SharedDocument::new(doc), region)
}

proptest! {
    /// The eligible set never contains a disabled, assistive-disabled,
    /// hidden (directly or via an ancestor) or zero-area target.
    #[test]
    fn prop_eligible_set_excludes_ineligible(flags in prop::collection::vec(flags_strategy(), 0..24)) {
        let (doc, region) = build(&flags);
        let set = resolve(&doc, region, &TargetFilter::default());
        let candidates = doc.read().candidates(region);

        for id in set.targets() {
            let target = candidates.iter().find(|t| t.id == *id).unwrap();
            prop_assert!(!target.disabled);
            prop_assert!(!target.aria_disabled);
            prop_assert!(!target.hidden);
            prop_assert!(!target.size.is_empty());
            prop_assert!(target.kind != TargetKind::Container && target.kind != TargetKind::Static);
        }

        // Traversal order is preserved
        let positions: Vec<usize> = set
            .targets()
            .iter()
            .map(|id| candidates.iter().position(|t| t.id == *id).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    /// Focus movement never leaves the region and never panics
    #[test]
    fn prop_navigation_stays_inside_region(
        flags in prop::collection::vec(flags_strategy(), 0..16),
        moves in prop::collection::vec(0u8..6, 0..32),
        wrap in any::<bool>(),
    ) {
        let (doc, region) = build(&flags);
        let manager = FocusManager::new(Arc::new(doc.clone()), region)
            .with_wrap(WrapPolicy::from_flag(wrap));
        let monitor = TrapMonitor::new();
        let trap = FocusTrap::activate(manager.clone(), &monitor);

        for step in moves {
            let moved = match step {
                0 => manager.focus_first(),
                1 => manager.focus_last(),
                2 => manager.focus_next(),
                3 => manager.focus_previous(),
                4 => {
                    trap.handle_key(&mut KeyEvent::new(Key::Tab));
                    None
                }
                _ => {
                    trap.handle_key(&mut KeyEvent::new(Key::Tab).with_modifier(Modifier::Shift));
                    None
                }
            };
            let set = manager.eligible_targets();
            if let Some(id) = moved {
                prop_assert!(set.contains(id));
            }
            if let Some(active) = doc.read().active() {
                prop_assert!(set.contains(active));
            }
        }
    }
}

#[test]
fn test_empty_region_operations_are_noops() {
    let (doc, region) = build(&[]);
    let mut manager = FocusManager::new(Arc::new(doc.clone()), region);

    assert_eq!(manager.focus_first(), None);
    assert_eq!(manager.focus_last(), None);
    assert_eq!(manager.focus_next(), None);
    assert_eq!(manager.focus_previous(), None);
    assert_eq!(manager.save_focus(), None);
    assert!(!manager.restore_focus());
    assert_eq!(doc.read().active(), None);
}
