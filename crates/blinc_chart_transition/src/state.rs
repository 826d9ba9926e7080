//! Transition state calculation
//!
//! Diffs the previous and next child trees to decide which nodes enter and
//! exit, or trusts the state handed down by an enclosing chart.

use std::sync::Arc;

use blinc_animation::PropMap;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::config::AnimateConfig;
use crate::element::{datum_key, ChildDescriptor};
use crate::factory::TransitionEvent;

/// Props of a [`TransitionOrchestrator`](crate::TransitionOrchestrator)
#[derive(Clone, Debug)]
pub struct TransitionProps {
    /// Absent: render synchronously, no transitions
    pub animate: Option<AnimateConfig>,
    /// The single animated child
    pub child: ChildDescriptor,
    /// Restricts driver interpolation to these prop names
    pub animation_whitelist: Option<Vec<String>>,
}

impl TransitionProps {
    pub fn new(child: ChildDescriptor) -> Self {
        Self {
            animate: None,
            child,
            animation_whitelist: None,
        }
    }

    pub fn with_animate(mut self, animate: AnimateConfig) -> Self {
        self.animate = Some(animate);
        self
    }

    pub fn with_whitelist<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.animation_whitelist = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn parent_state(&self) -> Option<&ParentState> {
        self.animate.as_ref()?.parent_state.as_ref()
    }
}

/// Immutable capture of props at one point in time
pub type PropsSnapshot = Arc<TransitionProps>;

/// Transition state handed down by an enclosing chart
#[derive(Clone, Debug, Default)]
pub struct ParentState {
    pub nodes_will_exit: bool,
    /// The enclosing chart renders continuous children
    pub continuous: bool,
    pub next_props: Option<PropsSnapshot>,
}

/// Positional path of a child in the child tree (`"0"`, `"0.1"`)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChildKey(String);

impl ChildKey {
    /// Key of the top-level child
    pub fn root() -> Self {
        Self::from_path(&[0])
    }

    pub fn from_path(path: &[usize]) -> Self {
        let parts: Vec<String> = path.iter().map(|i| i.to_string()).collect();
        ChildKey(parts.join("."))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Set of node (datum) keys
pub type NodeSet = FxHashSet<String>;

/// How a node takes part in the current transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeClass {
    Entering,
    Exiting,
    Persisting,
}

/// Entering and exiting nodes of one child
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChildTransition {
    pub entering: Option<NodeSet>,
    pub exiting: Option<NodeSet>,
}

impl ChildTransition {
    pub fn classify(&self, node_key: &str) -> NodeClass {
        if self.entering.as_ref().is_some_and(|s| s.contains(node_key)) {
            NodeClass::Entering
        } else if self.exiting.as_ref().is_some_and(|s| s.contains(node_key)) {
            NodeClass::Exiting
        } else {
            NodeClass::Persisting
        }
    }
}

/// Which side decides the transition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionMode {
    /// No animate config: nothing is driven
    #[default]
    Inactive,
    /// An enclosing chart supplied the state
    Delegated,
    /// Computed from the children diff
    SelfManaged,
}

/// Result of one props change
///
/// When self-managed, `old_props` is set exactly when `nodes_will_exit` is.
/// A delegated state keeps `old_props` for domain selection only; the
/// enclosing chart has already transformed the props it passes down, so the
/// child never renders from the old snapshot.
#[derive(Clone, Debug, Default)]
pub struct TransitionState {
    pub mode: TransitionMode,
    pub nodes_will_exit: bool,
    pub nodes_will_enter: bool,
    /// Entering nodes have shown their pre-enter props and may animate in
    pub nodes_should_enter: bool,
    pub children_transitions: IndexMap<ChildKey, ChildTransition>,
    pub old_props: Option<PropsSnapshot>,
    pub next_props: Option<PropsSnapshot>,
}

impl TransitionState {
    /// State with no transition in flight
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn child_transition(&self, key: &ChildKey) -> Option<&ChildTransition> {
        self.children_transitions.get(key)
    }

    pub fn classify(&self, child: &ChildKey, node_key: &str) -> NodeClass {
        self.child_transition(child)
            .map_or(NodeClass::Persisting, |t| t.classify(node_key))
    }

    /// Any child, nested ones included, has exiting nodes
    pub fn has_exiting_nodes(&self) -> bool {
        self.children_transitions.values().any(|t| t.exiting.is_some())
    }

    /// Any child, nested ones included, has entering nodes
    pub fn has_entering_nodes(&self) -> bool {
        self.children_transitions.values().any(|t| t.entering.is_some())
    }
}

/// Orchestrator state for its mount lifetime
#[derive(Clone, Debug, Default)]
pub struct OrchestratorState {
    /// Mounted and ready to run the load transition
    pub nodes_should_load: bool,
    pub nodes_done_load: bool,
    pub transition: TransitionState,
}

/// Every change to [`OrchestratorState`] goes through one of these
#[derive(Clone, Debug)]
pub enum StateUpdate {
    Mounted,
    /// A props change produced a new transition state
    Replace(TransitionState),
    Event(TransitionEvent),
}

impl OrchestratorState {
    pub fn apply(&mut self, update: StateUpdate) {
        match update {
            StateUpdate::Mounted => self.nodes_should_load = true,
            StateUpdate::Replace(state) => self.transition = state,
            StateUpdate::Event(event) => self.apply_event(event),
        }
    }

    fn apply_event(&mut self, event: TransitionEvent) {
        let transition = &mut self.transition;
        match event {
            TransitionEvent::BeforeLoadFinished => self.nodes_done_load = true,
            TransitionEvent::LoadFinished => {
                self.nodes_should_load = false;
                self.nodes_done_load = true;
            }
            TransitionEvent::ExitFinished => {
                transition.nodes_will_exit = false;
                transition.old_props = None;
            }
            TransitionEvent::EnterReady => transition.nodes_should_enter = true,
            TransitionEvent::EnterFinished => {
                transition.nodes_will_enter = false;
                transition.nodes_should_enter = false;
            }
        }
    }
}

/// Compute the transition between `prev` and `next`.
pub fn compute_transition_state(prev: &PropsSnapshot, next: &PropsSnapshot) -> TransitionState {
    let Some(animate) = prev.animate.as_ref() else {
        return TransitionState::empty();
    };

    if let Some(parent) = animate.parent_state.as_ref() {
        return TransitionState {
            mode: TransitionMode::Delegated,
            old_props: parent.nodes_will_exit.then(|| Arc::clone(prev)),
            next_props: Some(Arc::clone(next)),
            ..TransitionState::default()
        };
    }

    let mut diff = ChildrenDiff::default();
    let mut path: SmallVec<[usize; 4]> = SmallVec::new();
    path.push(0);
    diff.visit(&prev.child, &next.child, &mut path);

    let nodes_will_exit = diff.nodes_will_exit;
    TransitionState {
        mode: TransitionMode::SelfManaged,
        nodes_will_exit,
        nodes_will_enter: diff.nodes_will_enter,
        nodes_should_enter: false,
        children_transitions: diff.transitions,
        old_props: nodes_will_exit.then(|| Arc::clone(prev)),
        next_props: Some(Arc::clone(next)),
    }
}

#[derive(Default)]
struct ChildrenDiff {
    nodes_will_exit: bool,
    nodes_will_enter: bool,
    transitions: IndexMap<ChildKey, ChildTransition>,
}

impl ChildrenDiff {
    fn visit(
        &mut self,
        old: &ChildDescriptor,
        next: &ChildDescriptor,
        path: &mut SmallVec<[usize; 4]>,
    ) {
        if !old.children().is_empty() && !next.children().is_empty() {
            // Children pair by position; extra children on either side get no transition.
            let pairs = old.children().iter().zip(next.children());
            for (i, (old_child, next_child)) in pairs.enumerate() {
                path.push(i);
                self.visit(old_child, next_child, path);
                path.pop();
            }
            return;
        }

        if !old.same_kind(next) {
            return;
        }
        let (Some(old_data), Some(next_data)) = (old.data(), next.data()) else {
            return;
        };

        let old_keys = keyed(&old_data);
        let next_keys = keyed(&next_data);
        let entering = difference(&next_keys, &old_keys);
        let exiting = difference(&old_keys, &next_keys);

        self.nodes_will_enter |= entering.is_some();
        self.nodes_will_exit |= exiting.is_some();
        self.transitions
            .insert(ChildKey::from_path(path), ChildTransition { entering, exiting });
    }
}

fn keyed(data: &[PropMap]) -> NodeSet {
    data.iter()
        .enumerate()
        .map(|(i, datum)| datum_key(datum, i))
        .collect()
}

/// Keys of `a` missing from `b`, or `None` when there are none
fn difference(a: &NodeSet, b: &NodeSet) -> Option<NodeSet> {
    let diff: NodeSet = a.difference(b).cloned().collect();
    (!diff.is_empty()).then_some(diff)
}
