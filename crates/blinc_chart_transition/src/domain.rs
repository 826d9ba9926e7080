//! Domain inference from a child tree

use blinc_animation::{AnimValue, PropMap};

use crate::element::ChildDescriptor;

/// Chart axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Prop/datum field name for this axis
    pub fn key(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// Numeric domain along one axis. `min <= max` always holds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub min: f32,
    pub max: f32,
}

impl Domain {
    /// Fallback when nothing in the tree reports a domain
    pub const UNIT: Domain = Domain { min: 0.0, max: 1.0 };

    /// Build a domain from two bounds in either order
    pub fn new(a: f32, b: f32) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    pub fn union(self, other: Domain) -> Domain {
        Domain {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Read a `[min, max]` list
    pub fn from_value(value: &AnimValue) -> Option<Self> {
        let (a, b) = value.as_pair()?;
        (a.is_finite() && b.is_finite()).then(|| Domain::new(a, b))
    }

    pub fn to_value(self) -> AnimValue {
        AnimValue::pair(self.min, self.max)
    }
}

/// An explicit `domain` prop
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DomainProp {
    /// `[min, max]`, used for both axes
    Shared(Domain),
    /// `{ x: [min, max], y: [min, max] }`, either side optional
    PerAxis { x: Option<Domain>, y: Option<Domain> },
}

impl DomainProp {
    pub fn from_value(value: &AnimValue) -> Option<Self> {
        match value {
            AnimValue::List(_) => Domain::from_value(value).map(DomainProp::Shared),
            AnimValue::Map(map) => Some(DomainProp::PerAxis {
                x: map.get("x").and_then(Domain::from_value),
                y: map.get("y").and_then(Domain::from_value),
            }),
            _ => None,
        }
    }

    /// Read the `domain` entry of a prop map
    pub fn from_props(props: &PropMap) -> Option<Self> {
        props.get("domain").and_then(Self::from_value)
    }

    pub fn for_axis(&self, axis: Axis) -> Option<Domain> {
        match (self, axis) {
            (DomainProp::Shared(domain), _) => Some(*domain),
            (DomainProp::PerAxis { x, .. }, Axis::X) => *x,
            (DomainProp::PerAxis { y, .. }, Axis::Y) => *y,
        }
    }
}

/// Resolve the domain of `child` along `axis`.
///
/// An explicit `domain` prop wins when the child has no nested children.
/// Otherwise every domain reported by the subtree is unioned; a subtree that
/// reports nothing resolves to [`Domain::UNIT`].
pub fn resolve_domain(child: &ChildDescriptor, axis: Axis) -> Domain {
    if child.children().is_empty() {
        if let Some(domain) = DomainProp::from_props(child.props()).and_then(|d| d.for_axis(axis)) {
            return domain;
        }
    }

    let mut found = Vec::new();
    collect_domains(child, axis, &mut found);
    found
        .into_iter()
        .reduce(Domain::union)
        .unwrap_or(Domain::UNIT)
}

fn collect_domains(node: &ChildDescriptor, axis: Axis, found: &mut Vec<Domain>) {
    if let Some(provider) = node.element().domain_provider() {
        if let Some(domain) = provider.domain(node.props(), axis) {
            found.push(domain);
        }
        return;
    }
    for child in node.children() {
        collect_domains(child, axis, found);
    }
}
