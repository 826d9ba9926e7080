//! Easing functions for animations
//!
//! Curves are addressed by snake_case name in config files, e.g.
//! `easing = "ease_in_out_quad"` or `easing = { cubic_bezier = [0.25, 0.1, 0.25, 1.0] }`.

use serde::{Deserialize, Serialize};

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Eased progress for linear progress `t`.
    ///
    /// Progress outside the unit interval is clamped first.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::EaseInQuad => ease_in(t, 2),
            Easing::EaseOutQuad => ease_out(t, 2),
            Easing::EaseInOutQuad => ease_in_out(t, 2),
            Easing::EaseIn | Easing::EaseInCubic => ease_in(t, 3),
            Easing::EaseOut | Easing::EaseOutCubic => ease_out(t, 3),
            Easing::EaseInOut | Easing::EaseInOutCubic => ease_in_out(t, 3),
            Easing::EaseInQuart => ease_in(t, 4),
            Easing::EaseOutQuart => ease_out(t, 4),
            Easing::EaseInOutQuart => ease_in_out(t, 4),
            Easing::CubicBezier(x1, y1, x2, y2) => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                Bezier::new(x1, y1, x2, y2).solve(f64::from(t)) as f32
            }
        }
    }
}

fn ease_in(t: f32, power: i32) -> f32 {
    t.powi(power)
}

fn ease_out(t: f32, power: i32) -> f32 {
    1.0 - (1.0 - t).powi(power)
}

fn ease_in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        (2.0 * t).powi(power) / 2.0
    } else {
        1.0 - (2.0 - 2.0 * t).powi(power) / 2.0
    }
}

const BEZIER_EPSILON: f64 = 1e-7;

/// CSS `cubic-bezier()` curve in polynomial form, evaluated in f64
struct Bezier {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl Bezier {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let (ax, bx, cx) = coefficients(f64::from(x1), f64::from(x2));
        let (ay, by, cy) = coefficients(f64::from(y1), f64::from(y2));
        Self { ax, bx, cx, ay, by, cy }
    }

    fn x(&self, p: f64) -> f64 {
        ((self.ax * p + self.bx) * p + self.cx) * p
    }

    fn y(&self, p: f64) -> f64 {
        ((self.ay * p + self.by) * p + self.cy) * p
    }

    fn dx(&self, p: f64) -> f64 {
        (3.0 * self.ax * p + 2.0 * self.bx) * p + self.cx
    }

    /// `y` at the curve parameter whose `x` equals `x`.
    ///
    /// Newton steps first; bisection when the slope flattens out.
    fn solve(&self, x: f64) -> f64 {
        let mut p = x;
        for _ in 0..8 {
            let err = self.x(p) - x;
            if err.abs() < BEZIER_EPSILON {
                return self.y(p);
            }
            let slope = self.dx(p);
            if slope.abs() < BEZIER_EPSILON {
                break;
            }
            p -= err / slope;
        }

        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        p = x;
        for _ in 0..32 {
            let value = self.x(p);
            if (value - x).abs() < BEZIER_EPSILON {
                break;
            }
            if value < x {
                lo = p;
            } else {
                hi = p;
            }
            p = (lo + hi) / 2.0;
        }
        self.y(p)
    }
}

/// `(a, b, c)` of `a*p^3 + b*p^2 + c*p` for control points `p1`, `p2`
fn coefficients(p1: f64, p2: f64) -> (f64, f64, f64) {
    let c = 3.0 * p1;
    let b = 3.0 * (p2 - p1) - c;
    let a = 1.0 - c - b;
    (a, b, c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 13] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
    ];

    #[test]
    fn curves_hit_both_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
        }
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        assert_eq!(Easing::EaseInQuad.apply(-0.5), 0.0);
        assert_eq!(Easing::EaseInQuad.apply(3.0), 1.0);
    }

    #[test]
    fn in_out_quad_is_symmetric_at_midpoint() {
        assert!((Easing::EaseInOutQuad.apply(0.5) - 0.5).abs() < 1e-6);
        assert!(Easing::EaseInOutQuad.apply(0.25) < 0.25);
    }

    #[test]
    fn cubic_bezier_linear_control_points_track_identity() {
        let easing = Easing::CubicBezier(0.25, 0.25, 0.75, 0.75);
        assert!((easing.apply(0.3) - 0.3).abs() < 1e-3);
    }

    #[test]
    fn css_ease_matches_browser_midpoint() {
        // cubic-bezier(0.25, 0.1, 0.25, 1.0) is about 0.8024 at x = 0.5
        let ease = Easing::CubicBezier(0.25, 0.1, 0.25, 1.0);
        assert!((ease.apply(0.5) - 0.8024).abs() < 1e-3);
        assert_eq!(ease.apply(1.0), 1.0);
    }

    #[test]
    fn easing_deserializes_from_snake_case_names() {
        let easing: Easing = serde_json::from_str("\"ease_in_out_quad\"").unwrap();
        assert_eq!(easing, Easing::EaseInOutQuad);

        let bezier: Easing = serde_json::from_str(r#"{"cubic_bezier":[0.1,0.2,0.3,0.4]}"#).unwrap();
        assert_eq!(bezier, Easing::CubicBezier(0.1, 0.2, 0.3, 0.4));
    }
}
