//! Transition orchestrator
//!
//! Owns one animated chart child across its mount lifetime. Each render
//! combines the resolved domain, clip geometry, transition props and the
//! child's own props, then hands the animatable subset to an
//! [`AnimationDriver`]. The host advances the shared [`Timer`] and calls
//! [`TransitionOrchestrator::frame`] once per frame:
//!
//! ```ignore
//! let timer = Timer::shared();
//! let mut chart = TransitionOrchestrator::new(props, Some(timer.clone()));
//! chart.on_mount();
//! loop {
//!     timer.borrow_mut().tick();
//!     let Some(child) = chart.frame() else { break };
//!     draw(&child);
//! }
//! ```
//!
//! Phase completion is reported by the driver draining its queue; the pending
//! [`TransitionEvent`] of the last render is then applied and the child is
//! rendered again for the next phase.

use std::sync::Arc;

use blinc_animation::{
    props, AnimValue, AnimationConfig, AnimationDriver, PropMap, Timer, TimerHandle,
};
use tracing::{debug, trace};

use crate::config::AnimateConfig;
use crate::domain::{resolve_domain, Axis};
use crate::element::{ChildDescriptor, ClipContext};
use crate::factory::{TransitionEvent, TransitionPropSet, TransitionPropsFactory};
use crate::merge::{merge_layers, pick_whitelist};
use crate::state::{
    compute_transition_state, OrchestratorState, PropsSnapshot, StateUpdate, TransitionProps,
    TransitionState,
};

/// Props continuous children always animate
const CLIP_KEYS: [&str; 3] = ["clipWidth", "clipHeight", "translateX"];

/// Mount lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Created,
    Mounted,
    Unmounted,
}

/// Result of one render
#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// The child the frame is cloned from (old props while nodes exit)
    pub child: ChildDescriptor,
    /// Domain, clip, transition and child props merged
    pub combined: PropMap,
    /// Animate config the driver timing came from
    pub animate: Option<AnimateConfig>,
    /// The subset of `combined` handed to the driver
    pub props_to_animate: PropMap,
    /// Applied once the driver reaches `props_to_animate`
    pub on_end: Option<TransitionEvent>,
}

/// Drives transitions for a single chart child
#[derive(Debug)]
pub struct TransitionOrchestrator {
    props: PropsSnapshot,
    state: OrchestratorState,
    continuous: bool,
    timer: TimerHandle,
    driver: AnimationDriver,
    output: RenderOutput,
    lifecycle: Lifecycle,
}

impl TransitionOrchestrator {
    /// Create an orchestrator and run its first (pre-load) render.
    ///
    /// Pass the timer of an enclosing chart to share bypass and stop with
    /// it; `None` gives this orchestrator a private timer.
    pub fn new(props: TransitionProps, timer: Option<TimerHandle>) -> Self {
        let props = Arc::new(props);
        let state = OrchestratorState::default();
        let continuous = props.child.is_continuous();
        let output = compose(&props, &state, continuous);
        let driver = AnimationDriver::new(driver_config(&output), output.props_to_animate.clone());
        debug!(
            child = props.child.element_name(),
            continuous,
            animated = props.animate.is_some(),
            "transition orchestrator created"
        );
        Self {
            props,
            state,
            continuous,
            timer: timer.unwrap_or_else(Timer::shared),
            driver,
            output,
            lifecycle: Lifecycle::Created,
        }
    }

    pub fn on_mount(&mut self) {
        if self.lifecycle != Lifecycle::Created {
            return;
        }
        debug!(child = self.props.child.element_name(), "mount");
        self.lifecycle = Lifecycle::Mounted;
        self.state.apply(StateUpdate::Mounted);
        self.render();
    }

    /// Stop the timer; no frames are produced afterwards.
    pub fn on_unmount(&mut self) {
        debug!(child = self.props.child.element_name(), "unmount");
        self.timer.borrow_mut().stop();
        self.lifecycle = Lifecycle::Unmounted;
    }

    pub fn on_props_changed(&mut self, next: TransitionProps) {
        if self.lifecycle == Lifecycle::Unmounted {
            return;
        }
        let next = Arc::new(next);
        self.timer.borrow_mut().bypass_animation();

        let transition = compute_transition_state(&self.props, &next);
        debug!(
            mode = ?transition.mode,
            nodes_will_enter = transition.nodes_will_enter,
            nodes_will_exit = transition.nodes_will_exit,
            "props changed"
        );
        self.state.apply(StateUpdate::Replace(transition));
        self.props = next;
        self.render();

        self.timer.borrow_mut().resume_animation();
    }

    /// Recompute the combined props and queue them on the driver
    pub fn render(&mut self) -> &RenderOutput {
        self.output = compose(&self.props, &self.state, self.continuous);
        let config = driver_config(&self.output);
        let data = self.output.props_to_animate.clone();
        self.driver.update(config, data, &mut self.timer.borrow_mut());
        &self.output
    }

    /// Produce the child for the current frame.
    ///
    /// Returns `None` once unmounted. Before mount the static first render is
    /// returned and the driver is not stepped.
    pub fn frame(&mut self) -> Option<ChildDescriptor> {
        match self.lifecycle {
            Lifecycle::Unmounted => return None,
            Lifecycle::Created => return Some(self.compose_child(&self.output.props_to_animate)),
            Lifecycle::Mounted => {}
        }

        let drained = self.driver.step(&mut self.timer.borrow_mut());
        trace!(info = ?self.driver.info(), drained, "frame");
        if drained {
            if let Some(event) = self.output.on_end {
                self.dispatch(event);
            }
        }
        Some(self.compose_child(self.driver.data()))
    }

    fn dispatch(&mut self, event: TransitionEvent) {
        debug!(?event, "transition phase finished");
        self.state.apply(StateUpdate::Event(event));
        self.render();
    }

    fn compose_child(&self, interpolated: &PropMap) -> ChildDescriptor {
        let props = merge_layers(&[interpolated, &self.output.combined]);
        let clip = self.continuous.then(|| ClipContext::from_props(&props));
        self.output.child.rerender(props, clip)
    }

    pub fn props(&self) -> &TransitionProps {
        &self.props
    }

    pub fn state(&self) -> &OrchestratorState {
        &self.state
    }

    pub fn transition(&self) -> &TransitionState {
        &self.state.transition
    }

    pub fn last_render(&self) -> &RenderOutput {
        &self.output
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn timer(&self) -> &TimerHandle {
        &self.timer
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Whether the driver still has targets to reach
    pub fn is_animating(&self) -> bool {
        self.driver.is_pending()
    }
}

fn driver_config(output: &RenderOutput) -> AnimationConfig {
    output
        .animate
        .as_ref()
        .map_or_else(AnimationConfig::immediate, AnimateConfig::animation_config)
}

/// Props the child renders from: the pre-update snapshot while nodes exit
pub fn pick_props<'a>(props: &'a PropsSnapshot, state: &'a TransitionState) -> &'a PropsSnapshot {
    if state.nodes_will_exit {
        state.old_props.as_ref().unwrap_or(props)
    } else {
        props
    }
}

/// Props the x domain is resolved from.
///
/// Continuous children take their x domain from the incoming props while
/// nodes exit, so the clip animates against the final axis.
pub fn pick_domain_props<'a>(
    props: &'a PropsSnapshot,
    state: &'a TransitionState,
    continuous: bool,
) -> &'a PropsSnapshot {
    if let Some(parent) = props.parent_state() {
        if parent.nodes_will_exit {
            if continuous || parent.continuous {
                return parent
                    .next_props
                    .as_ref()
                    .or(state.next_props.as_ref())
                    .unwrap_or(props);
            }
            return props;
        }
    }
    if continuous && state.nodes_will_exit {
        state.next_props.as_ref().unwrap_or(props)
    } else {
        props
    }
}

/// Clip geometry for continuous children
pub fn clip_props(
    child: &ChildDescriptor,
    transition: &TransitionPropSet,
    continuous: bool,
) -> PropMap {
    let mut out = PropMap::new();
    if !continuous {
        return out;
    }
    let width = transition
        .clip_width
        .map(AnimValue::Number)
        .or_else(|| child.prop("width").cloned());
    if let Some(width) = width {
        out.insert("clipWidth".into(), width);
    }
    if let Some(height) = child.prop("height") {
        out.insert("clipHeight".into(), height.clone());
    }
    out
}

fn compose(current: &PropsSnapshot, state: &OrchestratorState, continuous: bool) -> RenderOutput {
    let props = pick_props(current, &state.transition);
    let child = &props.child;

    let transition = match props.animate.as_ref() {
        None => TransitionPropSet::empty(),
        Some(_) => match current.animate.as_ref().and_then(|a| a.get_transitions.as_ref()) {
            Some(custom) => custom.call(child, 0),
            None => TransitionPropsFactory::new(props, state).props_for(child, 0),
        },
    };
    // The custom hook may return no timing; fall back to the props' own.
    let animate = props
        .animate
        .as_ref()
        .map(|own| transition.animate.clone().unwrap_or_else(|| own.clone()));

    let x_props = pick_domain_props(props, &state.transition, continuous);
    let domain = props! {
        "domain" => props! {
            "x" => resolve_domain(&x_props.child, Axis::X).to_value(),
            "y" => resolve_domain(child, Axis::Y).to_value(),
        }
    };
    let clip = clip_props(child, &transition, continuous);
    let combined = merge_layers(&[&domain, &clip, &transition.to_props(), child.props()]);

    let mut whitelist = props.animation_whitelist.clone().unwrap_or_default();
    if continuous {
        whitelist.extend(CLIP_KEYS.iter().map(|k| k.to_string()));
    }
    let props_to_animate = pick_whitelist(&combined, &whitelist);

    RenderOutput {
        child: child.clone(),
        combined,
        animate,
        props_to_animate,
        on_end: transition.on_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Line, Scatter};
    use crate::state::ParentState;

    fn line(width: f32, xs: &[f32]) -> ChildDescriptor {
        ChildDescriptor::new(Line)
            .with_prop("width", width)
            .with_prop("height", 200.0)
            .with_data(xs.iter().map(|&x| props! { "x" => x, "y" => 1.0 }).collect())
    }

    #[test]
    fn merge_priority_is_domain_clip_transition_child() {
        let child = line(300.0, &[0.0, 5.0]).with_prop("domain", AnimValue::pair(-1.0, 1.0));
        let props = TransitionProps::new(child).with_animate(AnimateConfig::new(100.0));
        let chart = TransitionOrchestrator::new(props, None);
        let out = chart.last_render();

        // Pre-load render: clip width comes from the transition, not the child width.
        assert_eq!(out.combined["clipWidth"], AnimValue::Number(0.0));
        assert_eq!(out.combined["clipHeight"], AnimValue::Number(200.0));
        assert_eq!(out.combined["width"], AnimValue::Number(300.0));
        let domain = out.combined["domain"].as_map().unwrap();
        assert_eq!(domain["x"], AnimValue::pair(-1.0, 1.0));
    }

    #[test]
    fn continuous_children_animate_clip_keys_only() {
        let props = TransitionProps::new(line(300.0, &[0.0, 5.0]))
            .with_animate(AnimateConfig::new(100.0))
            .with_whitelist(["x"]);
        let chart = TransitionOrchestrator::new(props, None);
        let keys: Vec<&str> = chart
            .last_render()
            .props_to_animate
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, ["clipWidth", "clipHeight"]);
    }

    #[test]
    fn continuous_x_domain_follows_next_props_while_exiting() {
        let animated = |child| {
            Arc::new(TransitionProps::new(child).with_animate(AnimateConfig::new(100.0)))
        };
        let prev = animated(line(300.0, &[0.0, 5.0, 9.0]));
        let next = animated(line(300.0, &[0.0, 5.0]));
        let state = compute_transition_state(&prev, &next);
        assert!(state.nodes_will_exit);

        assert!(Arc::ptr_eq(pick_props(&next, &state), &prev));
        assert!(Arc::ptr_eq(pick_domain_props(&prev, &state, true), &next));
        assert!(Arc::ptr_eq(pick_domain_props(&prev, &state, false), &prev));
    }

    #[test]
    fn parent_exit_uses_parent_next_props_for_continuous() {
        let parent_next = Arc::new(TransitionProps::new(line(100.0, &[3.0])));
        let parent = ParentState {
            nodes_will_exit: true,
            continuous: true,
            next_props: Some(Arc::clone(&parent_next)),
        };
        let props = Arc::new(
            TransitionProps::new(ChildDescriptor::new(Scatter))
                .with_animate(AnimateConfig::default().with_parent_state(parent)),
        );
        let state = TransitionState::empty();
        assert!(Arc::ptr_eq(pick_domain_props(&props, &state, false), &parent_next));
    }

    #[test]
    fn delegated_exit_renders_incoming_props() {
        let parent = ParentState {
            nodes_will_exit: true,
            ..ParentState::default()
        };
        let delegated = |xs: &[f32]| {
            let animate = AnimateConfig::new(100.0).with_parent_state(parent.clone());
            Arc::new(TransitionProps::new(line(300.0, xs)).with_animate(animate))
        };
        let prev = delegated(&[0.0, 5.0]);
        let next = delegated(&[0.0]);
        let state = compute_transition_state(&prev, &next);

        assert!(Arc::ptr_eq(state.old_props.as_ref().unwrap(), &prev));
        assert!(Arc::ptr_eq(pick_props(&next, &state), &next));
    }

    #[test]
    fn clip_props_are_empty_for_discrete_children() {
        let child = line(300.0, &[]);
        let set = TransitionPropSet::empty();
        assert!(clip_props(&child, &set, false).is_empty());
        assert_eq!(clip_props(&child, &set, true)["clipWidth"], AnimValue::Number(300.0));
    }

    #[test]
    fn frames_stop_after_unmount() {
        let props =
            TransitionProps::new(line(300.0, &[0.0])).with_animate(AnimateConfig::new(100.0));
        let mut chart = TransitionOrchestrator::new(props, None);
        assert!(chart.frame().is_some());
        chart.on_mount();
        assert!(chart.frame().is_some());
        chart.on_unmount();
        assert!(chart.frame().is_none());
        assert_eq!(chart.timer().borrow().subscription_count(), 0);
    }
}
