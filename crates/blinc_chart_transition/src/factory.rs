//! Transition prop factory
//!
//! Given the orchestrator's props and state, decides for one child which
//! phase it is in (load, exit, enter or idle) and produces the animate
//! timing, transformed data and completion event for that phase.
//!
//! The factory never mutates state. Completion is reported through
//! [`TransitionPropSet::on_end`]; the orchestrator applies the event once the
//! animation driver settles.

use blinc_animation::{AnimValue, PropMap};
use tracing::trace;

use crate::config::{AnimateConfig, DatumTransform, Phase, PhaseConfig};
use crate::element::{datum_key, ChildDescriptor};
use crate::state::{ChildKey, ChildTransition, NodeSet, OrchestratorState, TransitionProps};

/// Emitted when a transition phase finishes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionEvent {
    /// Pre-load props have been shown
    BeforeLoadFinished,
    LoadFinished,
    ExitFinished,
    /// Entering nodes have shown their pre-enter props
    EnterReady,
    EnterFinished,
}

/// Props one child needs for its current phase
#[derive(Clone, Debug, Default)]
pub struct TransitionPropSet {
    pub animate: Option<AnimateConfig>,
    pub data: Option<Vec<PropMap>>,
    /// Clip override for continuous children
    pub clip_width: Option<f32>,
    pub on_end: Option<TransitionEvent>,
}

impl TransitionPropSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The prop layer merged over the child's own props
    pub fn to_props(&self) -> PropMap {
        let mut out = PropMap::new();
        if let Some(data) = &self.data {
            out.insert(
                "data".into(),
                AnimValue::List(data.iter().cloned().map(AnimValue::Map).collect()),
            );
        }
        if let Some(width) = self.clip_width {
            out.insert("clipWidth".into(), AnimValue::Number(width));
        }
        out
    }
}

/// Computes transition props from a read-only view of the orchestrator
#[derive(Clone, Copy, Debug)]
pub struct TransitionPropsFactory<'a> {
    props: &'a TransitionProps,
    state: &'a OrchestratorState,
}

impl<'a> TransitionPropsFactory<'a> {
    pub fn new(props: &'a TransitionProps, state: &'a OrchestratorState) -> Self {
        Self { props, state }
    }

    pub fn props_for(&self, child: &ChildDescriptor, index: usize) -> TransitionPropSet {
        let animate = self.effective_animate(child);
        let data = child.data();
        let transition = self.child_transition(index);

        let set = if !self.state.nodes_done_load {
            self.load(animate, data)
        } else if self.state.transition.nodes_will_exit {
            self.exit(animate, data, transition)
        } else if self.state.transition.nodes_will_enter {
            self.enter(animate, data, transition)
        } else {
            TransitionPropSet {
                animate: Some(animate),
                data,
                ..TransitionPropSet::default()
            }
        };

        trace!(
            child = child.element_name(),
            index,
            on_end = ?set.on_end,
            "transition props"
        );
        set
    }

    /// Orchestrator animate over the child's, each phase over the element
    /// kind's defaults
    fn effective_animate(&self, child: &ChildDescriptor) -> AnimateConfig {
        let mut animate = match &self.props.animate {
            Some(own) => own.layered_over(child.animate()),
            None => child.animate().cloned().unwrap_or_default(),
        };
        if let Some(defaults) = child.element().default_transitions() {
            for phase in [Phase::Load, Phase::Enter, Phase::Exit] {
                let layered = PhaseConfig::layered(animate.phase(phase), defaults.phase(phase));
                *animate.phase_mut(phase) = layered;
            }
        }
        animate
    }

    /// Nodes of the child at `index` itself; nested children are keyed by
    /// their own path and do not match
    fn child_transition(&self, index: usize) -> Option<&'a ChildTransition> {
        self.state
            .transition
            .child_transition(&ChildKey::from_path(&[index]))
    }

    fn load(&self, mut animate: AnimateConfig, data: Option<Vec<PropMap>>) -> TransitionPropSet {
        let phase = animate.on_load.clone();
        // A load phase without a duration leaves the data untouched
        let untimed = phase.as_ref().is_some_and(|p| p.duration.is_none());
        animate.duration = animate.phase_duration(Phase::Load);

        if self.state.nodes_should_load {
            let data = if untimed {
                data
            } else {
                transform_nodes(data, None, phase.as_ref().and_then(|p| p.after.as_ref()))
            };
            return TransitionPropSet {
                animate: Some(animate),
                data,
                clip_width: None,
                on_end: Some(TransitionEvent::LoadFinished),
            };
        }

        if untimed {
            return TransitionPropSet {
                animate: Some(animate),
                data,
                clip_width: None,
                on_end: Some(TransitionEvent::BeforeLoadFinished),
            };
        }
        TransitionPropSet {
            animate: Some(animate),
            data: transform_nodes(data, None, phase.as_ref().and_then(|p| p.before.as_ref())),
            clip_width: Some(0.0),
            on_end: Some(TransitionEvent::BeforeLoadFinished),
        }
    }

    fn enter(
        &self,
        mut animate: AnimateConfig,
        data: Option<Vec<PropMap>>,
        transition: Option<&ChildTransition>,
    ) -> TransitionPropSet {
        let entering = transition.and_then(|t| t.entering.as_ref());
        // Nested children may be the ones entering
        let any_entering = self.state.transition.has_entering_nodes();
        let enter_duration = animate.phase_duration(Phase::Enter);
        let phase = animate.on_enter.clone().unwrap_or_default();

        if self.state.transition.nodes_should_enter {
            if enter_duration.is_some() {
                animate.duration = enter_duration;
            }
            let data = match entering {
                Some(nodes) => transform_nodes(data, Some(nodes), phase.after.as_ref()),
                None => data,
            };
            return TransitionPropSet {
                animate: Some(animate),
                data,
                clip_width: None,
                on_end: any_entering.then_some(TransitionEvent::EnterFinished),
            };
        }

        // Pre-enter frame moves existing nodes at the regular duration
        let data = match entering {
            Some(nodes) => transform_nodes(data, Some(nodes), phase.before.as_ref()),
            None => data,
        };
        TransitionPropSet {
            animate: Some(animate),
            data,
            clip_width: None,
            on_end: any_entering.then_some(TransitionEvent::EnterReady),
        }
    }

    fn exit(
        &self,
        mut animate: AnimateConfig,
        data: Option<Vec<PropMap>>,
        transition: Option<&ChildTransition>,
    ) -> TransitionPropSet {
        let exiting = transition.and_then(|t| t.exiting.as_ref());
        let exit_duration = animate.phase_duration(Phase::Exit);
        let before = animate.on_exit.as_ref().and_then(|p| p.before.clone());
        let on_end = self
            .state
            .transition
            .has_exiting_nodes()
            .then_some(TransitionEvent::ExitFinished);

        match exiting {
            Some(nodes) => {
                animate.duration = exit_duration;
                TransitionPropSet {
                    animate: Some(animate),
                    data: transform_nodes(data, Some(nodes), before.as_ref()),
                    clip_width: None,
                    on_end,
                }
            }
            None => {
                // Wait out the exit of nested children
                animate.delay = exit_duration;
                if exit_duration.is_some() {
                    animate.duration = exit_duration;
                }
                TransitionPropSet {
                    animate: Some(animate),
                    data,
                    clip_width: None,
                    on_end,
                }
            }
        }
    }
}

/// Apply `transform` to the datums whose key is in `nodes`, or to every datum
/// when `nodes` is `None`
fn transform_nodes(
    data: Option<Vec<PropMap>>,
    nodes: Option<&NodeSet>,
    transform: Option<&DatumTransform>,
) -> Option<Vec<PropMap>> {
    let data = data?;
    let Some(transform) = transform else {
        return Some(data);
    };
    let out = data
        .iter()
        .enumerate()
        .map(|(i, datum)| {
            let selected = nodes.map_or(true, |n| n.contains(&datum_key(datum, i)));
            if selected {
                transform.apply(datum, i, &data)
            } else {
                datum.clone()
            }
        })
        .collect();
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Line, Scatter};
    use crate::state::{compute_transition_state, StateUpdate};
    use blinc_animation::props;
    use std::sync::Arc;

    fn scatter(keys: &[&str]) -> ChildDescriptor {
        ChildDescriptor::new(Scatter).with_data(
            keys.iter()
                .enumerate()
                .map(|(i, k)| props! { "key" => *k, "x" => i as f32, "opacity" => 1.0 })
                .collect(),
        )
    }

    fn props_for(child: ChildDescriptor) -> TransitionProps {
        TransitionProps::new(child).with_animate(AnimateConfig::new(300.0))
    }

    fn loaded() -> OrchestratorState {
        let mut state = OrchestratorState::default();
        state.apply(StateUpdate::Mounted);
        state.apply(StateUpdate::Event(TransitionEvent::LoadFinished));
        state
    }

    fn opacity(set: &TransitionPropSet, key: &str) -> Option<f32> {
        set.data
            .as_ref()?
            .iter()
            .find(|d| d.get("key") == Some(&AnimValue::from(key)))?
            .get("opacity")?
            .as_number()
    }

    #[test]
    fn before_mount_shows_pre_load_props() {
        let props = props_for(ChildDescriptor::new(Line).with_prop("width", 300.0));
        let state = OrchestratorState::default();
        let set = TransitionPropsFactory::new(&props, &state).props_for(&props.child, 0);

        assert_eq!(set.clip_width, Some(0.0));
        assert_eq!(set.on_end, Some(TransitionEvent::BeforeLoadFinished));
        assert_eq!(set.animate.as_ref().unwrap().duration, Some(2000.0));
    }

    #[test]
    fn mounted_load_uses_load_duration_and_after_transform() {
        let props = props_for(scatter(&["a"]));
        let mut state = OrchestratorState::default();
        state.apply(StateUpdate::Mounted);
        let set = TransitionPropsFactory::new(&props, &state).props_for(&props.child, 0);

        assert_eq!(set.on_end, Some(TransitionEvent::LoadFinished));
        assert_eq!(set.clip_width, None);
        assert_eq!(set.animate.as_ref().unwrap().duration, Some(2000.0));
        assert_eq!(opacity(&set, "a"), Some(1.0));
    }

    #[test]
    fn untimed_load_phase_leaves_data_alone() {
        let animate = AnimateConfig::new(300.0).with_phase(
            Phase::Load,
            PhaseConfig::default().before(DatumTransform::Set(props! { "opacity" => 0.5 })),
        );
        let props = TransitionProps::new(
            ChildDescriptor::new(crate::elements::Group).with_data(vec![props! { "key" => "a" }]),
        )
        .with_animate(animate);
        let state = OrchestratorState::default();
        let set = TransitionPropsFactory::new(&props, &state).props_for(&props.child, 0);

        assert_eq!(set.clip_width, None);
        assert_eq!(set.data, props.child.data());
        assert_eq!(set.on_end, Some(TransitionEvent::BeforeLoadFinished));
    }

    #[test]
    fn exiting_nodes_get_before_transform_and_exit_duration() {
        let prev = Arc::new(props_for(scatter(&["a", "b"])));
        let next = Arc::new(props_for(scatter(&["a"])));
        let mut state = loaded();
        state.apply(StateUpdate::Replace(compute_transition_state(&prev, &next)));

        let set = TransitionPropsFactory::new(&prev, &state).props_for(&prev.child, 0);
        assert_eq!(set.on_end, Some(TransitionEvent::ExitFinished));
        assert_eq!(set.animate.as_ref().unwrap().duration, Some(600.0));
        assert_eq!(opacity(&set, "b"), Some(0.0));
        assert_eq!(opacity(&set, "a"), Some(1.0));
    }

    #[test]
    fn entering_nodes_show_before_then_after_props() {
        let prev = Arc::new(props_for(scatter(&["a"])));
        let next = Arc::new(props_for(scatter(&["a", "b"])));
        let mut state = loaded();
        state.apply(StateUpdate::Replace(compute_transition_state(&prev, &next)));

        let factory = TransitionPropsFactory::new(&next, &state);
        let pre = factory.props_for(&next.child, 0);
        assert_eq!(pre.on_end, Some(TransitionEvent::EnterReady));
        assert_eq!(pre.animate.as_ref().unwrap().duration, Some(300.0));
        assert_eq!(opacity(&pre, "b"), Some(0.0));

        state.apply(StateUpdate::Event(TransitionEvent::EnterReady));
        let post = TransitionPropsFactory::new(&next, &state).props_for(&next.child, 0);
        assert_eq!(post.on_end, Some(TransitionEvent::EnterFinished));
        assert_eq!(post.animate.as_ref().unwrap().duration, Some(600.0));
        assert_eq!(opacity(&post, "b"), Some(1.0));
    }

    fn group(first: &[&str], second: &[&str]) -> ChildDescriptor {
        ChildDescriptor::new(crate::elements::Group)
            .with_children(vec![scatter(first), scatter(second)])
    }

    #[test]
    fn nested_exit_finishes_through_the_group() {
        let animate = AnimateConfig::new(300.0).with_phase(Phase::Exit, PhaseConfig::new(200.0));
        let animated = |child| Arc::new(TransitionProps::new(child).with_animate(animate.clone()));
        let prev = animated(group(&["a"], &["x", "y"]));
        let next = animated(group(&["a"], &["x"]));
        let mut state = loaded();
        state.apply(StateUpdate::Replace(compute_transition_state(&prev, &next)));

        let set = TransitionPropsFactory::new(&prev, &state).props_for(&prev.child, 0);
        assert_eq!(set.on_end, Some(TransitionEvent::ExitFinished));
        assert_eq!(set.animate.as_ref().unwrap().delay, Some(200.0));
    }

    #[test]
    fn nested_enter_reports_ready_then_finished() {
        let prev = Arc::new(props_for(group(&["a"], &["x"])));
        let next = Arc::new(props_for(group(&["a"], &["x", "y"])));
        let mut state = loaded();
        state.apply(StateUpdate::Replace(compute_transition_state(&prev, &next)));

        let pre = TransitionPropsFactory::new(&next, &state).props_for(&next.child, 0);
        assert_eq!(pre.on_end, Some(TransitionEvent::EnterReady));

        state.apply(StateUpdate::Event(TransitionEvent::EnterReady));
        let post = TransitionPropsFactory::new(&next, &state).props_for(&next.child, 0);
        assert_eq!(post.on_end, Some(TransitionEvent::EnterFinished));
    }

    #[test]
    fn nested_transitions_leave_top_level_data_alone() {
        let prev = Arc::new(props_for(group(&["x", "y"], &["a"])));
        let next = Arc::new(props_for(group(&["x"], &["a"])));
        let mut state = loaded();
        state.apply(StateUpdate::Replace(compute_transition_state(&prev, &next)));

        // Top-level data keyed like a nested child's nodes stays untransformed
        let child = scatter(&["x", "y"]);
        let set = TransitionPropsFactory::new(&prev, &state).props_for(&child, 0);
        assert_eq!(opacity(&set, "y"), Some(1.0));
    }

    #[test]
    fn idle_child_keeps_its_data() {
        let props = props_for(scatter(&["a"]));
        let state = loaded();
        let set = TransitionPropsFactory::new(&props, &state).props_for(&props.child, 0);
        assert_eq!(set.on_end, None);
        assert_eq!(set.data, props.child.data());
        assert_eq!(set.animate.as_ref().unwrap().duration, Some(300.0));
    }

    #[test]
    fn prop_layer_carries_data_and_clip() {
        let set = TransitionPropSet {
            data: Some(vec![props! { "x" => 1.0 }]),
            clip_width: Some(0.0),
            ..TransitionPropSet::empty()
        };
        let layer = set.to_props();
        assert_eq!(layer["clipWidth"], AnimValue::Number(0.0));
        assert_eq!(layer["data"].as_list().map(<[_]>::len), Some(1));
        assert!(TransitionPropSet::empty().to_props().is_empty());
    }
}
