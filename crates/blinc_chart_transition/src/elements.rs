//! Reference chart elements
//!
//! Minimal element kinds covering each capability combination: continuous
//! data elements (`Line`, `Area`), a discrete data element (`Scatter`), a
//! container (`Group`) and an element with no domain at all (`Label`).

use blinc_animation::{props, AnimValue, PropMap};

use crate::config::{DatumTransform, PhaseConfig};
use crate::domain::{Axis, Domain, DomainProp};
use crate::element::{ChartElement, DomainProvider, TransitionDefaults};

/// Domain from an explicit `domain` prop, else from the min/max of the
/// axis field over `data`
#[derive(Clone, Copy, Debug, Default)]
pub struct DataDomain;

impl DomainProvider for DataDomain {
    fn domain(&self, props: &PropMap, axis: Axis) -> Option<Domain> {
        if let Some(domain) = DomainProp::from_props(props).and_then(|d| d.for_axis(axis)) {
            return Some(domain);
        }

        props
            .get("data")?
            .as_list()?
            .iter()
            .filter_map(|datum| datum.as_map()?.get(axis.key())?.as_number())
            .filter(|v| v.is_finite())
            .map(|v| Domain::new(v, v))
            .reduce(Domain::union)
    }
}

static DATA_DOMAIN: DataDomain = DataDomain;

fn continuous_defaults() -> TransitionDefaults {
    TransitionDefaults {
        on_load: Some(PhaseConfig::new(2000.0)),
        on_enter: Some(PhaseConfig::new(500.0)),
        on_exit: Some(PhaseConfig::new(500.0)),
    }
}

/// Line series
#[derive(Clone, Copy, Debug, Default)]
pub struct Line;

impl ChartElement for Line {
    fn name(&self) -> &'static str {
        "line"
    }

    fn continuous(&self) -> bool {
        true
    }

    fn domain_provider(&self) -> Option<&dyn DomainProvider> {
        Some(&DATA_DOMAIN)
    }

    fn default_transitions(&self) -> Option<TransitionDefaults> {
        Some(continuous_defaults())
    }
}

/// Filled area series
#[derive(Clone, Copy, Debug, Default)]
pub struct Area;

impl ChartElement for Area {
    fn name(&self) -> &'static str {
        "area"
    }

    fn continuous(&self) -> bool {
        true
    }

    fn domain_provider(&self) -> Option<&dyn DomainProvider> {
        Some(&DATA_DOMAIN)
    }

    fn default_transitions(&self) -> Option<TransitionDefaults> {
        Some(continuous_defaults())
    }
}

/// Point series; nodes fade in and out
#[derive(Clone, Copy, Debug, Default)]
pub struct Scatter;

impl ChartElement for Scatter {
    fn name(&self) -> &'static str {
        "scatter"
    }

    fn domain_provider(&self) -> Option<&dyn DomainProvider> {
        Some(&DATA_DOMAIN)
    }

    fn default_transitions(&self) -> Option<TransitionDefaults> {
        let hidden = DatumTransform::Set(props! { "opacity" => 0.0 });
        let shown = DatumTransform::custom(|datum, _, _| {
            let opacity = datum
                .get("opacity")
                .and_then(AnimValue::as_number)
                .filter(|o| *o > 0.0)
                .unwrap_or(1.0);
            props! { "opacity" => opacity }
        });
        Some(TransitionDefaults {
            on_load: Some(
                PhaseConfig::new(2000.0)
                    .before(hidden.clone())
                    .after(shown.clone()),
            ),
            on_enter: Some(PhaseConfig::new(600.0).before(hidden.clone()).after(shown)),
            on_exit: Some(PhaseConfig::new(600.0).before(hidden)),
        })
    }
}

/// Container for nested children
#[derive(Clone, Copy, Debug, Default)]
pub struct Group;

impl ChartElement for Group {
    fn name(&self) -> &'static str {
        "group"
    }
}

/// Text annotation; contributes no domain
#[derive(Clone, Copy, Debug, Default)]
pub struct Label;

impl ChartElement for Label {
    fn name(&self) -> &'static str {
        "label"
    }
}
