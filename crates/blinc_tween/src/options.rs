//! Serializable animation presets
//!
//! Hosts can keep tween and timeline settings in JSON or TOML and apply them
//! with `Tween::configure` / `Timeline::configure`. Durations are in seconds.

use crate::easing::Easing;
use serde::Deserialize;

/// Tween settings; missing fields take the defaults
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct TweenOptions {
    pub duration: f64,
    pub delay: f64,
    pub repeat: u32,
    /// Repeat forever, overrides `repeat`
    pub repeat_forever: bool,
    pub repeat_delay: f64,
    pub yoyo: bool,
    pub easing: Easing,
}

impl Default for TweenOptions {
    fn default() -> Self {
        Self {
            duration: 1.0,
            delay: 0.0,
            repeat: 0,
            repeat_forever: false,
            repeat_delay: 0.0,
            yoyo: false,
            easing: Easing::Linear,
        }
    }
}

/// Timeline settings; segment durations and easings live in each `to()`
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    pub repeat: u32,
    /// Repeat forever, overrides `repeat`
    pub repeat_forever: bool,
    pub repeat_delay: f64,
    pub yoyo: bool,
}
