//! blinc_chart_transition
//!
//! Load, enter and exit transitions for chart elements.
//!
//! A [`TransitionOrchestrator`] wraps one chart child. When its props change
//! it diffs the old and new data to find entering and exiting nodes, derives
//! per-phase props (timing, transformed data, clip width), and drives the
//! animatable subset through a [`blinc_animation::AnimationDriver`] on a
//! shared [`Timer`].
//!
//! - [`resolve_domain`]: axis domain of a child tree
//! - [`compute_transition_state`]: entering/exiting nodes between two prop snapshots
//! - [`TransitionPropsFactory`]: per-phase props for a child
//! - [`TransitionOrchestrator`]: lifecycle and per-frame composition

mod merge;

pub mod config;
pub mod domain;
pub mod element;
pub mod elements;
pub mod error;
pub mod factory;
pub mod orchestrator;
pub mod state;

pub use blinc_animation::{props, AnimValue, Easing, PropMap, Timer, TimerHandle};
pub use config::{AnimateConfig, DatumTransform, GetTransitions, Phase, PhaseConfig};
pub use domain::{resolve_domain, Axis, Domain, DomainProp};
pub use element::{
    datum_key, ChartElement, ChildDescriptor, ClipContext, DomainProvider, TransitionDefaults,
};
pub use error::{Result, TransitionError};
pub use factory::{TransitionEvent, TransitionPropSet, TransitionPropsFactory};
pub use merge::{merge_layers, pick_whitelist};
pub use orchestrator::{
    clip_props, pick_domain_props, pick_props, Lifecycle, RenderOutput, TransitionOrchestrator,
};
pub use state::{
    compute_transition_state, ChildKey, ChildTransition, NodeClass, NodeSet, OrchestratorState,
    ParentState, PropsSnapshot, StateUpdate, TransitionMode, TransitionProps, TransitionState,
};

/// Common imports for transition users.
pub mod prelude {
    pub use crate::config::{AnimateConfig, DatumTransform, Phase, PhaseConfig};
    pub use crate::element::{ChartElement, ChildDescriptor};
    pub use crate::orchestrator::TransitionOrchestrator;
    pub use crate::state::TransitionProps;
    pub use blinc_animation::{props, AnimValue, PropMap, Timer};
}
