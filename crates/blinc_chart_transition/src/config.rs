//! Animate configuration
//!
//! The `animate` block accepted by [`TransitionProps`](crate::TransitionProps)
//! and by each chart child. Timing and datum transforms can be loaded from
//! TOML or JSON:
//!
//! ```toml
//! duration = 400
//! easing = "ease_out_cubic"
//!
//! [on_enter]
//! duration = 300
//! before = { opacity = 0 }
//! after = { opacity = 1 }
//! ```
//!
//! `parent_state` and `get_transitions` are runtime-only and never read from
//! config files.

use std::fmt;
use std::sync::Arc;

use blinc_animation::{AnimationConfig, Easing, PropMap, DEFAULT_DURATION_MS};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::element::ChildDescriptor;
use crate::error::{Result, TransitionError};
use crate::factory::TransitionPropSet;
use crate::state::ParentState;

/// Custom datum transform: `(datum, index, all data) -> props to merge`
pub type DatumFn = dyn Fn(&PropMap, usize, &[PropMap]) -> PropMap;

/// Props merged over a datum when a phase starts or ends
#[derive(Clone)]
pub enum DatumTransform {
    /// Merge a fixed set of props
    Set(PropMap),
    /// Compute the props to merge from the datum
    Custom(Arc<DatumFn>),
}

impl DatumTransform {
    pub fn custom(f: impl Fn(&PropMap, usize, &[PropMap]) -> PropMap + 'static) -> Self {
        DatumTransform::Custom(Arc::new(f))
    }

    /// Return `datum` with the transform's props merged over it
    pub fn apply(&self, datum: &PropMap, index: usize, data: &[PropMap]) -> PropMap {
        let patch = match self {
            DatumTransform::Set(props) => props.clone(),
            DatumTransform::Custom(f) => f(datum, index, data),
        };
        let mut out = datum.clone();
        out.extend(patch);
        out
    }
}

impl fmt::Debug for DatumTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatumTransform::Set(props) => f.debug_tuple("Set").field(props).finish(),
            DatumTransform::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Serialize for DatumTransform {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DatumTransform::Set(props) => props.serialize(serializer),
            DatumTransform::Custom(_) => Err(serde::ser::Error::custom(
                "custom datum transforms cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for DatumTransform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        PropMap::deserialize(deserializer).map(DatumTransform::Set)
    }
}

/// Caller-supplied replacement for the transition prop factory
#[derive(Clone)]
pub struct GetTransitions(Arc<dyn Fn(&ChildDescriptor, usize) -> TransitionPropSet>);

impl GetTransitions {
    pub fn new(f: impl Fn(&ChildDescriptor, usize) -> TransitionPropSet + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, child: &ChildDescriptor, index: usize) -> TransitionPropSet {
        (self.0)(child, index)
    }
}

impl fmt::Debug for GetTransitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GetTransitions(..)")
    }
}

/// Timing and datum transforms for one transition phase
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseConfig {
    /// Phase duration in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    /// Applied to affected nodes at the start of the phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<DatumTransform>,
    /// Applied to affected nodes at the end of the phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<DatumTransform>,
}

impl PhaseConfig {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn before(mut self, transform: DatumTransform) -> Self {
        self.before = Some(transform);
        self
    }

    pub fn after(mut self, transform: DatumTransform) -> Self {
        self.after = Some(transform);
        self
    }

    /// Field-wise `primary` over `fallback`
    pub fn layered(primary: Option<&PhaseConfig>, fallback: Option<&PhaseConfig>) -> Option<Self> {
        match (primary, fallback) {
            (None, None) => None,
            (Some(p), None) => Some(p.clone()),
            (None, Some(f)) => Some(f.clone()),
            (Some(p), Some(f)) => Some(PhaseConfig {
                duration: p.duration.or(f.duration),
                before: p.before.clone().or_else(|| f.before.clone()),
                after: p.after.clone().or_else(|| f.after.clone()),
            }),
        }
    }

    fn validate(&self, phase: &'static str) -> Result<()> {
        check_timing(phase, "duration", self.duration)
    }
}

/// Transition phases with their own timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Load,
    Enter,
    Exit,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Load => "on_load",
            Phase::Enter => "on_enter",
            Phase::Exit => "on_exit",
        }
    }
}

/// The `animate` prop
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimateConfig {
    /// Duration of moves between successive data, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub easing: Option<Easing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_load: Option<PhaseConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_enter: Option<PhaseConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_exit: Option<PhaseConfig>,
    /// Transition state handed down by an enclosing chart
    #[serde(skip)]
    pub parent_state: Option<ParentState>,
    /// Replaces the built-in transition prop factory
    #[serde(skip)]
    pub get_transitions: Option<GetTransitions>,
}

impl AnimateConfig {
    pub fn new(duration: f32) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: AnimateConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let config: AnimateConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject negative or non-finite timings
    pub fn validate(&self) -> Result<()> {
        check_timing("animate", "duration", self.duration)?;
        check_timing("animate", "delay", self.delay)?;
        for phase in [Phase::Load, Phase::Enter, Phase::Exit] {
            if let Some(config) = self.phase(phase) {
                config.validate(phase.name())?;
            }
        }
        Ok(())
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn with_phase(mut self, phase: Phase, config: PhaseConfig) -> Self {
        *self.phase_mut(phase) = Some(config);
        self
    }

    pub fn with_parent_state(mut self, state: ParentState) -> Self {
        self.parent_state = Some(state);
        self
    }

    pub fn with_get_transitions(mut self, get_transitions: GetTransitions) -> Self {
        self.get_transitions = Some(get_transitions);
        self
    }

    pub fn phase(&self, phase: Phase) -> Option<&PhaseConfig> {
        match phase {
            Phase::Load => self.on_load.as_ref(),
            Phase::Enter => self.on_enter.as_ref(),
            Phase::Exit => self.on_exit.as_ref(),
        }
    }

    pub fn phase_mut(&mut self, phase: Phase) -> &mut Option<PhaseConfig> {
        match phase {
            Phase::Load => &mut self.on_load,
            Phase::Enter => &mut self.on_enter,
            Phase::Exit => &mut self.on_exit,
        }
    }

    pub fn phase_duration(&self, phase: Phase) -> Option<f32> {
        self.phase(phase).and_then(|p| p.duration)
    }

    /// Field-wise `self` over `fallback`
    pub fn layered_over(&self, fallback: Option<&AnimateConfig>) -> AnimateConfig {
        let Some(fallback) = fallback else {
            return self.clone();
        };
        AnimateConfig {
            duration: self.duration.or(fallback.duration),
            delay: self.delay.or(fallback.delay),
            easing: self.easing.or(fallback.easing),
            on_load: PhaseConfig::layered(self.on_load.as_ref(), fallback.on_load.as_ref()),
            on_enter: PhaseConfig::layered(self.on_enter.as_ref(), fallback.on_enter.as_ref()),
            on_exit: PhaseConfig::layered(self.on_exit.as_ref(), fallback.on_exit.as_ref()),
            parent_state: self
                .parent_state
                .clone()
                .or_else(|| fallback.parent_state.clone()),
            get_transitions: self
                .get_transitions
                .clone()
                .or_else(|| fallback.get_transitions.clone()),
        }
    }

    /// Timing handed to the animation driver
    pub fn animation_config(&self) -> AnimationConfig {
        let defaults = AnimationConfig::default();
        AnimationConfig {
            duration_ms: self.duration.unwrap_or(DEFAULT_DURATION_MS),
            delay_ms: self.delay.unwrap_or(0.0),
            easing: self.easing.unwrap_or(defaults.easing),
        }
    }
}

fn check_timing(phase: &'static str, field: &'static str, value: Option<f32>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(TransitionError::InvalidTiming {
            phase,
            field,
            value: v,
        }),
        _ => Ok(()),
    }
}
