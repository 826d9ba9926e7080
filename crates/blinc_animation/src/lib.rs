//! Blinc Animation System
//!
//! Frame-driven prop animation for chart transitions.
//!
//! # Features
//!
//! - **Easing**: standard curves plus CSS-style cubic bezier
//! - **Prop values**: a dynamic [`PropMap`] that can be interpolated structurally
//! - **Timer**: a shared clock with bypass/resume for interrupting animations
//! - **Driver**: queues prop targets and interpolates towards them frame by frame

pub mod driver;
pub mod easing;
pub mod interpolate;
pub mod timer;
pub mod value;

pub use driver::{AnimationConfig, AnimationDriver, AnimationInfo, DEFAULT_DURATION_MS};
pub use easing::Easing;
pub use interpolate::{interpolate_props, interpolate_value, lerp_f32};
pub use timer::{SubscriptionId, Timer, TimerHandle};
pub use value::{AnimValue, PropMap};
