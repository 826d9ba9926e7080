//! Dynamic prop values
//!
//! Chart children describe their animatable state as a loosely typed prop map
//! (`data`, `width`, `clipWidth`, `domain`, ...). [`AnimValue`] is the value
//! type of that map; it is what the [`AnimationDriver`](crate::AnimationDriver)
//! interpolates between frames.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered prop mapping. Equality ignores order.
pub type PropMap = IndexMap<String, AnimValue>;

/// A single animatable prop value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnimValue {
    Bool(bool),
    Number(f32),
    Text(String),
    List(Vec<AnimValue>),
    Map(PropMap),
}

impl AnimValue {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            AnimValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnimValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnimValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AnimValue]> {
        match self {
            AnimValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&PropMap> {
        match self {
            AnimValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Read a two-element numeric list as `(first, second)`.
    pub fn as_pair(&self) -> Option<(f32, f32)> {
        match self.as_list()? {
            [a, b] => Some((a.as_number()?, b.as_number()?)),
            _ => None,
        }
    }

    pub fn pair(a: f32, b: f32) -> Self {
        AnimValue::List(vec![AnimValue::Number(a), AnimValue::Number(b)])
    }
}

impl From<f32> for AnimValue {
    fn from(value: f32) -> Self {
        AnimValue::Number(value)
    }
}

impl From<f64> for AnimValue {
    fn from(value: f64) -> Self {
        AnimValue::Number(value as f32)
    }
}

impl From<bool> for AnimValue {
    fn from(value: bool) -> Self {
        AnimValue::Bool(value)
    }
}

impl From<&str> for AnimValue {
    fn from(value: &str) -> Self {
        AnimValue::Text(value.to_string())
    }
}

impl From<String> for AnimValue {
    fn from(value: String) -> Self {
        AnimValue::Text(value)
    }
}

impl From<PropMap> for AnimValue {
    fn from(value: PropMap) -> Self {
        AnimValue::Map(value)
    }
}

impl<T: Into<AnimValue>> From<Vec<T>> for AnimValue {
    fn from(value: Vec<T>) -> Self {
        AnimValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// Build a [`PropMap`] from `key => value` pairs.
///
/// ```
/// use blinc_animation::props;
///
/// let p = props! { "x" => 1.0, "label" => "a" };
/// assert_eq!(p.len(), 2);
/// ```
#[macro_export]
macro_rules! props {
    () => { $crate::PropMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::PropMap::new();
        $(map.insert(::std::string::String::from($key), $crate::AnimValue::from($value));)+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_accessor_requires_two_numbers() {
        assert_eq!(AnimValue::pair(1.0, 4.0).as_pair(), Some((1.0, 4.0)));
        assert_eq!(AnimValue::from(vec![1.0]).as_pair(), None);
        assert_eq!(AnimValue::from(vec!["a", "b"]).as_pair(), None);
    }

    #[test]
    fn untagged_values_parse_from_json() {
        let value: AnimValue =
            serde_json::from_str(r#"{"opacity": 0, "label": "a", "data": [1, 2.5], "on": true}"#)
                .unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map["opacity"], AnimValue::Number(0.0));
        assert_eq!(map["label"], AnimValue::from("a"));
        assert_eq!(map["data"], AnimValue::from(vec![1.0, 2.5]));
        assert_eq!(map["on"], AnimValue::Bool(true));
    }

    #[test]
    fn prop_map_equality_ignores_insertion_order() {
        let a = props! { "x" => 1.0, "y" => 2.0 };
        let b = props! { "y" => 2.0, "x" => 1.0 };
        assert_eq!(a, b);
    }
}
