//! Per-activation interpolation channels
//!
//! When a tween starts or a timeline segment activates, every animated
//! property gets a [`Channel`] holding its slot in the live state and its
//! start/end values. Frames only walk these channels, so a running animation
//! never allocates or looks up keys.

use crate::easing::Easing;
use crate::registry::InterpolateFn;
use crate::value::{State, Value};

#[derive(Clone, Debug)]
enum ChannelKind {
    Number {
        start: f64,
        end: f64,
    },
    Extended {
        interpolate: InterpolateFn,
        start: Value,
        end: Value,
    },
}

/// One animated property
#[derive(Clone, Debug)]
pub(crate) struct Channel {
    slot: usize,
    kind: ChannelKind,
}

impl Channel {
    /// Build a channel for the property at `slot`
    ///
    /// Returns `None` when the values cannot be interpolated: non-numeric
    /// values without an interpolator, or mismatched shapes.
    pub(crate) fn new(
        slot: usize,
        start: Value,
        end: Value,
        interpolate: Option<InterpolateFn>,
    ) -> Option<Self> {
        if start.kind() != end.kind() {
            return None;
        }
        let kind = match (start, end, interpolate) {
            (Value::Number(start), Value::Number(end), _) => ChannelKind::Number { start, end },
            (start, end, Some(interpolate)) => ChannelKind::Extended {
                interpolate,
                start,
                end,
            },
            _ => return None,
        };
        Some(Self { slot, kind })
    }

    /// Build a channel starting from the live value of `key`
    pub(crate) fn from_live(
        state: &State,
        key: &str,
        end: &Value,
        interpolate: Option<InterpolateFn>,
    ) -> Option<Self> {
        let slot = state.slot_of(key)?;
        let start = state.slot(slot)?.clone();
        Self::new(slot, start, end.clone(), interpolate)
    }

    /// Write the value at eased progress `t` into the live state
    ///
    /// Reversed playback swaps start and end.
    pub(crate) fn apply(&self, state: &mut State, t: f64, reversed: bool) {
        let Some(target) = state.slot_mut(self.slot) else {
            return;
        };
        match &self.kind {
            ChannelKind::Number { start, end } => {
                if let Value::Number(value) = target {
                    let (a, b) = if reversed { (end, start) } else { (start, end) };
                    *value = a + (b - a) * t;
                }
            }
            ChannelKind::Extended {
                interpolate,
                start,
                end,
            } => {
                let (a, b) = if reversed { (end, start) } else { (start, end) };
                interpolate(target, a, b, t);
            }
        }
    }
}

/// Eased progress for a linear `progress`, honoring playback direction
///
/// Reversed playback mirrors both the input and the output so the easing
/// curve keeps its shape when played backwards.
pub(crate) fn eased_progress(easing: &Easing, progress: f64, reversed: bool) -> f64 {
    if reversed {
        1.0 - easing.apply(1.0 - progress)
    } else {
        easing.apply(progress)
    }
}

/// Apply every channel at `progress`
pub(crate) fn render(
    channels: &[Channel],
    state: &mut State,
    easing: &Easing,
    progress: f64,
    reversed: bool,
) {
    let t = eased_progress(easing, progress, reversed);
    for channel in channels {
        channel.apply(state, t, reversed);
    }
}
