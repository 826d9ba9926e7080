//! Chart children and the capabilities their element kinds expose

use std::fmt;
use std::sync::Arc;

use blinc_animation::{AnimValue, PropMap};

use crate::config::{AnimateConfig, Phase, PhaseConfig};
use crate::domain::{Axis, Domain};

/// Reports a domain for an element from its props
pub trait DomainProvider {
    fn domain(&self, props: &PropMap, axis: Axis) -> Option<Domain>;
}

/// Default timing and datum transforms of an element kind
#[derive(Clone, Debug, Default)]
pub struct TransitionDefaults {
    pub on_load: Option<PhaseConfig>,
    pub on_enter: Option<PhaseConfig>,
    pub on_exit: Option<PhaseConfig>,
}

impl TransitionDefaults {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseConfig> {
        match phase {
            Phase::Load => self.on_load.as_ref(),
            Phase::Enter => self.on_enter.as_ref(),
            Phase::Exit => self.on_exit.as_ref(),
        }
    }
}

/// A kind of chart element (line, scatter, group, ...)
pub trait ChartElement: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Continuous elements (lines, areas) render as one shape and animate
    /// through a clip region rather than per node.
    fn continuous(&self) -> bool {
        false
    }

    /// `None` means the element reports no domain itself; its children are
    /// inspected instead.
    fn domain_provider(&self) -> Option<&dyn DomainProvider> {
        None
    }

    fn default_transitions(&self) -> Option<TransitionDefaults> {
        None
    }
}

/// Clip/translation override passed to a continuous child's render group
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipContext {
    pub clip_width: Option<f32>,
    pub clip_height: Option<f32>,
    pub translate_x: Option<f32>,
    pub padding: Option<AnimValue>,
}

impl ClipContext {
    /// Read the clip values out of an interpolated prop map
    pub fn from_props(props: &PropMap) -> Self {
        let number = |key: &str| props.get(key).and_then(AnimValue::as_number);
        Self {
            clip_width: number("clipWidth"),
            clip_height: number("clipHeight"),
            translate_x: number("translateX"),
            padding: props.get("padding").cloned(),
        }
    }
}

/// One visual child: an element kind plus its props
#[derive(Clone, Debug)]
pub struct ChildDescriptor {
    element: Arc<dyn ChartElement>,
    props: PropMap,
    animate: Option<AnimateConfig>,
    children: Vec<ChildDescriptor>,
    clip: Option<ClipContext>,
}

impl ChildDescriptor {
    pub fn new(element: impl ChartElement + 'static) -> Self {
        Self::from_element(Arc::new(element))
    }

    pub fn from_element(element: Arc<dyn ChartElement>) -> Self {
        Self {
            element,
            props: PropMap::new(),
            animate: None,
            children: Vec::new(),
            clip: None,
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<AnimValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn with_props(mut self, props: PropMap) -> Self {
        self.props.extend(props);
        self
    }

    /// Set the `data` prop from a list of datums
    pub fn with_data(self, data: Vec<PropMap>) -> Self {
        self.with_prop("data", AnimValue::List(data.into_iter().map(AnimValue::Map).collect()))
    }

    pub fn with_animate(mut self, animate: AnimateConfig) -> Self {
        self.animate = Some(animate);
        self
    }

    pub fn with_children(mut self, children: Vec<ChildDescriptor>) -> Self {
        self.children = children;
        self
    }

    pub fn element(&self) -> &dyn ChartElement {
        self.element.as_ref()
    }

    pub fn element_name(&self) -> &'static str {
        self.element.name()
    }

    pub fn is_continuous(&self) -> bool {
        self.element.continuous()
    }

    /// Same element kind as `other`
    pub fn same_kind(&self, other: &ChildDescriptor) -> bool {
        self.element.name() == other.element.name()
    }

    pub fn props(&self) -> &PropMap {
        &self.props
    }

    pub fn prop(&self, key: &str) -> Option<&AnimValue> {
        self.props.get(key)
    }

    pub fn number(&self, key: &str) -> Option<f32> {
        self.prop(key).and_then(AnimValue::as_number)
    }

    pub fn animate(&self) -> Option<&AnimateConfig> {
        self.animate.as_ref()
    }

    pub fn children(&self) -> &[ChildDescriptor] {
        &self.children
    }

    pub fn clip(&self) -> Option<&ClipContext> {
        self.clip.as_ref()
    }

    /// The datums of the `data` prop; `None` when the child has no data list.
    ///
    /// Entries that are not maps are skipped.
    pub fn data(&self) -> Option<Vec<PropMap>> {
        let items = self.prop("data")?.as_list()?;
        Some(items.iter().filter_map(|item| item.as_map().cloned()).collect())
    }

    /// Clone this child with new props, animation disabled and an optional
    /// clip override.
    pub(crate) fn rerender(&self, props: PropMap, clip: Option<ClipContext>) -> Self {
        Self {
            element: Arc::clone(&self.element),
            props,
            animate: None,
            children: self.children.clone(),
            clip: clip.or_else(|| self.clip.clone()),
        }
    }
}

/// Key of a datum: its `key` entry, else its index
pub fn datum_key(datum: &PropMap, index: usize) -> String {
    match datum.get("key") {
        Some(AnimValue::Text(key)) => key.clone(),
        Some(AnimValue::Number(n)) => n.to_string(),
        _ => index.to_string(),
    }
}
