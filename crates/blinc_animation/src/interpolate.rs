//! Structural interpolation between prop values

use crate::value::{AnimValue, PropMap};

pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Interpolate between two values at progress `t` (0.0 to 1.0).
///
/// - numbers lerp
/// - lists interpolate index-wise and take the length of `b`
/// - maps interpolate shared keys; keys only in `b` take `b`'s value and keys
///   only in `a` are dropped
/// - anything else (text, bools, mismatched kinds) takes `b`
pub fn interpolate_value(a: &AnimValue, b: &AnimValue, t: f32) -> AnimValue {
    match (a, b) {
        (AnimValue::Number(x), AnimValue::Number(y)) => AnimValue::Number(lerp_f32(*x, *y, t)),
        (AnimValue::List(xs), AnimValue::List(ys)) => AnimValue::List(
            ys.iter()
                .enumerate()
                .map(|(i, y)| match xs.get(i) {
                    Some(x) => interpolate_value(x, y, t),
                    None => y.clone(),
                })
                .collect(),
        ),
        (AnimValue::Map(xs), AnimValue::Map(ys)) => AnimValue::Map(interpolate_props(xs, ys, t)),
        _ => b.clone(),
    }
}

/// Interpolate two prop maps key by key (see [`interpolate_value`]).
pub fn interpolate_props(a: &PropMap, b: &PropMap, t: f32) -> PropMap {
    b.iter()
        .map(|(key, y)| {
            let value = match a.get(key) {
                Some(x) => interpolate_value(x, y, t),
                None => y.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}
