//! Easing functions for animations

use serde::{Deserialize, Deserializer};
use std::f64::consts::PI;
use std::str::FromStr;
use thiserror::Error;

/// Easing function type
#[derive(Clone, Copy, Debug, Default)]
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
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    EaseInCirc,
    EaseOutCirc,
    EaseInOutCirc,
    EaseInElastic,
    EaseOutElastic,
    EaseInOutElastic,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
    /// `t^power`, power clamped to `[f64::EPSILON, 10000]`
    PowIn(f64),
    PowOut(f64),
    PowInOut(f64),
    CubicBezier(f64, f64, f64, f64),
    Custom(fn(f64) -> f64),
}

const BACK: f64 = 1.70158;

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::EaseInQuint => t.powi(5),
            Easing::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            Easing::EaseInOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
            Easing::EaseInSine => 1.0 - ((1.0 - t) * PI / 2.0).sin(),
            Easing::EaseOutSine => (t * PI / 2.0).sin(),
            Easing::EaseInOutSine => 0.5 * (1.0 - (PI * (0.5 - t)).sin()),
            Easing::EaseInExpo => {
                if t == 0.0 {
                    0.0
                } else {
                    1024f64.powf(t - 1.0)
                }
            }
            Easing::EaseOutExpo => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Easing::EaseInOutExpo => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * 1024f64.powf(t - 1.0)
                } else {
                    0.5 * (2.0 - 2f64.powf(-10.0 * (t - 1.0)))
                }
            }
            Easing::EaseInCirc => 1.0 - (1.0 - t * t).sqrt(),
            Easing::EaseOutCirc => {
                let t = t - 1.0;
                (1.0 - t * t).sqrt()
            }
            Easing::EaseInOutCirc => {
                let t = t * 2.0;
                if t < 1.0 {
                    -0.5 * ((1.0 - t * t).sqrt() - 1.0)
                } else {
                    let t = t - 2.0;
                    0.5 * ((1.0 - t * t).sqrt() + 1.0)
                }
            }
            Easing::EaseInElastic => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                -(2f64.powf(10.0 * (t - 1.0))) * ((t - 1.1) * 5.0 * PI).sin()
            }
            Easing::EaseOutElastic => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                2f64.powf(-10.0 * t) * ((t - 0.1) * 5.0 * PI).sin() + 1.0
            }
            Easing::EaseInOutElastic => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let t = t * 2.0;
                if t < 1.0 {
                    -0.5 * 2f64.powf(10.0 * (t - 1.0)) * ((t - 1.1) * 5.0 * PI).sin()
                } else {
                    0.5 * 2f64.powf(-10.0 * (t - 1.0)) * ((t - 1.1) * 5.0 * PI).sin() + 1.0
                }
            }
            Easing::EaseInBack => {
                if t == 1.0 {
                    return 1.0;
                }
                t * t * ((BACK + 1.0) * t - BACK)
            }
            Easing::EaseOutBack => {
                if t == 0.0 {
                    return 0.0;
                }
                let t = t - 1.0;
                t * t * ((BACK + 1.0) * t + BACK) + 1.0
            }
            Easing::EaseInOutBack => {
                let s = BACK * 1.525;
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * (t * t * ((s + 1.0) * t - s))
                } else {
                    let t = t - 2.0;
                    0.5 * (t * t * ((s + 1.0) * t + s) + 2.0)
                }
            }
            Easing::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Easing::EaseOutBounce => bounce_out(t),
            Easing::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - t * 2.0)) * 0.5
                } else {
                    bounce_out(t * 2.0 - 1.0) * 0.5 + 0.5
                }
            }
            Easing::PowIn(power) => t.powf(clamp_power(*power)),
            Easing::PowOut(power) => 1.0 - (1.0 - t).powf(clamp_power(*power)),
            Easing::PowInOut(power) => {
                let power = clamp_power(*power);
                if t < 0.5 {
                    (t * 2.0).powf(power) / 2.0
                } else {
                    (1.0 - (2.0 - t * 2.0).powf(power)) / 2.0 + 0.5
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
            Easing::Custom(f) => f(t),
        }
    }
}

#[inline]
fn clamp_power(power: f64) -> f64 {
    power.clamp(f64::EPSILON, 10000.0)
}

fn bounce_out(t: f64) -> f64 {
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        7.5625 * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        7.5625 * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        7.5625 * t * t + 0.984375
    }
}

/// Cubic bezier easing calculation (matches the CSS `cubic-bezier()` timing function).
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
fn cubic_bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    // Endpoints are always exact
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let x = t;

    // Solve for parameter `p` where bezier_x(p) == x using Newton-Raphson,
    // falling back to binary search if the slope is too flat.
    let mut p = x;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2);
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    // Binary search fallback (always converges)
    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = x;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2)
}

/// Evaluate cubic bezier at parameter t: B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

/// Derivative of cubic bezier: B'(t) = 3(1-t)²·p1 + 6(1-t)t·(p2-p1) + 3t²·(1-p2)
#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

/// Unrecognized easing name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown easing \"{0}\"")]
pub struct ParseEasingError(pub String);

impl FromStr for Easing {
    type Err = ParseEasingError;

    /// Parse kebab-case names (`"ease-out-bounce"`) and
    /// `cubic-bezier(x1, y1, x2, y2)`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let easing = match name {
            "linear" => Easing::Linear,
            "ease-in" => Easing::EaseIn,
            "ease-out" => Easing::EaseOut,
            "ease-in-out" => Easing::EaseInOut,
            "ease-in-quad" => Easing::EaseInQuad,
            "ease-out-quad" => Easing::EaseOutQuad,
            "ease-in-out-quad" => Easing::EaseInOutQuad,
            "ease-in-cubic" => Easing::EaseInCubic,
            "ease-out-cubic" => Easing::EaseOutCubic,
            "ease-in-out-cubic" => Easing::EaseInOutCubic,
            "ease-in-quart" => Easing::EaseInQuart,
            "ease-out-quart" => Easing::EaseOutQuart,
            "ease-in-out-quart" => Easing::EaseInOutQuart,
            "ease-in-quint" => Easing::EaseInQuint,
            "ease-out-quint" => Easing::EaseOutQuint,
            "ease-in-out-quint" => Easing::EaseInOutQuint,
            "ease-in-sine" => Easing::EaseInSine,
            "ease-out-sine" => Easing::EaseOutSine,
            "ease-in-out-sine" => Easing::EaseInOutSine,
            "ease-in-expo" => Easing::EaseInExpo,
            "ease-out-expo" => Easing::EaseOutExpo,
            "ease-in-out-expo" => Easing::EaseInOutExpo,
            "ease-in-circ" => Easing::EaseInCirc,
            "ease-out-circ" => Easing::EaseOutCirc,
            "ease-in-out-circ" => Easing::EaseInOutCirc,
            "ease-in-elastic" => Easing::EaseInElastic,
            "ease-out-elastic" => Easing::EaseOutElastic,
            "ease-in-out-elastic" => Easing::EaseInOutElastic,
            "ease-in-back" => Easing::EaseInBack,
            "ease-out-back" => Easing::EaseOutBack,
            "ease-in-out-back" => Easing::EaseInOutBack,
            "ease-in-bounce" => Easing::EaseInBounce,
            "ease-out-bounce" => Easing::EaseOutBounce,
            "ease-in-out-bounce" => Easing::EaseInOutBounce,
            _ => return parse_cubic_bezier(name).ok_or_else(|| ParseEasingError(s.to_owned())),
        };
        Ok(easing)
    }
}

fn parse_cubic_bezier(s: &str) -> Option<Easing> {
    let args = s.strip_prefix("cubic-bezier(")?.strip_suffix(')')?;
    let mut values = args.split(',').map(|v| v.trim().parse::<f64>().ok());
    let easing = Easing::CubicBezier(
        values.next()??,
        values.next()??,
        values.next()??,
        values.next()??,
    );
    values.next().is_none().then_some(easing)
}

impl<'de> Deserialize<'de> for Easing {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
