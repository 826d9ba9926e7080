//! Layered prop merging

use blinc_animation::{AnimValue, PropMap};

/// Merge prop layers, highest priority first.
///
/// A key takes its value from the first layer that has it. Where two layers
/// both hold a map under the same key, the maps are merged the same way.
pub fn merge_layers(layers: &[&PropMap]) -> PropMap {
    let mut out = PropMap::new();
    for layer in layers {
        fill_absent(&mut out, layer);
    }
    out
}

fn fill_absent(target: &mut PropMap, source: &PropMap) {
    for (key, value) in source {
        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), value.clone());
            }
            Some(existing) => {
                if let (AnimValue::Map(existing), AnimValue::Map(incoming)) = (existing, value) {
                    fill_absent(existing, incoming);
                }
            }
        }
    }
}

/// Keep only the whitelisted keys; an empty whitelist keeps everything.
pub fn pick_whitelist(props: &PropMap, whitelist: &[String]) -> PropMap {
    if whitelist.is_empty() {
        return props.clone();
    }
    props
        .iter()
        .filter(|(key, _)| whitelist.iter().any(|w| w == *key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
