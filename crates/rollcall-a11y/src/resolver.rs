//! Focusable-set resolution
//!
//! [`resolve`] is a pure function of the host state at call time. Results are
//! never cached: targets appear, disappear and toggle `disabled` between two
//! key presses.

use std::fmt;
use std::sync::Arc;

use crate::region::{FocusHost, NodeId, Target, TargetKind};

/// Extra eligibility check supplied by a caller
pub type TargetPredicate = Arc<dyn Fn(&Target) -> bool + Send + Sync>;

/// Which targets may receive keyboard focus
#[derive(Clone)]
pub struct TargetFilter {
    kinds: Vec<TargetKind>,
    predicate: Option<TargetPredicate>,
}

impl TargetFilter {
    /// Accept only the given kinds
    pub fn new(kinds: impl IntoIterator<Item = TargetKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            predicate: None,
        }
    }

    /// Narrow the filter with a custom predicate
    pub fn with_predicate(mut self, predicate: TargetPredicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Kinds accepted before the other rules apply
    pub fn kinds(&self) -> &[TargetKind] {
        &self.kinds
    }

    fn matches_kind(&self, target: &Target) -> bool {
        if !self.kinds.contains(&target.kind) {
            return false;
        }
        match target.kind {
            TargetKind::Generic => target.tab_index.is_some_and(|index| index >= 0),
            _ => target.tab_index.map_or(true, |index| index >= 0),
        }
    }

    /// Whether `target` can currently receive focus
    pub fn is_eligible(&self, target: &Target) -> bool {
        self.matches_kind(target)
            && !target.disabled
            && !target.aria_disabled
            && !target.hidden
            && !target.size.is_empty()
            && self.predicate.as_ref().map_or(true, |accept| accept(target))
    }
}

impl Default for TargetFilter {
    fn default() -> Self {
        Self::new([
            TargetKind::Button,
            TargetKind::Link,
            TargetKind::TextField,
            TargetKind::TextArea,
            TargetKind::Select,
            TargetKind::Generic,
        ])
    }
}

impl fmt::Debug for TargetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetFilter")
            .field("kinds", &self.kinds)
            .field("predicate", &self.predicate.is_some())
            .finish()
    }
}

/// Ordered, currently eligible focus targets of one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusableSet {
    region: NodeId,
    targets: Vec<NodeId>,
}

impl FocusableSet {
    /// Region the set was resolved for
    pub fn region(&self) -> NodeId {
        self.region
    }

    /// Targets in traversal order
    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.targets.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.targets.last().copied()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.targets.get(index).copied()
    }

    /// Index of `id`, or `None` when it is not eligible
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.targets.iter().position(|target| *target == id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.position(id).is_some()
    }
}

/// Resolve the eligible targets of `region` in traversal order
pub fn resolve(host: &dyn FocusHost, region: NodeId, filter: &TargetFilter) -> FocusableSet {
    let targets = host
        .candidates(region)
        .into_iter()
        .filter(|target| filter.is_eligible(target))
        .map(|target| target.id)
        .collect();
    FocusableSet { region, targets }
}
