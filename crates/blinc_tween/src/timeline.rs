//! Timeline orchestration for multiple tween segments
//!
//! A [`Timeline`] plays a list of segments over one shared [`State`]. Each
//! segment animates some properties over its own duration, starting at a
//! position on the timeline. Positions default to "after everything added so
//! far", so chained `to()` calls play in sequence:
//!
//! ```ignore
//! let timeline = Timeline::new(json!({ "x": 0, "y": 0 }));
//! timeline
//!     .to(json!({ "x": 100, "duration": 1 }))
//!     .to_at(json!({ "y": 100, "duration": 1 }), "-=0.5")
//!     .label("end", Position::Append)
//!     .play();
//! ```
//!
//! Unlike a [`Tween`](crate::Tween), a timeline keeps its own playhead and
//! advances it by frame deltas, which makes `seek()` and `reverse()` cheap.

use crate::clock;
use crate::easing::Easing;
use crate::options::TimelineOptions;
use crate::registry::{Extension, Registry};
use crate::runtime::{self, Channel};
use crate::scheduler::{self, Animation, AnimationId};
use crate::tween::{ProgressCallback, REPEAT_INFINITE};
use crate::validation::{ErrorMap, StateGuard, ValidationError, INIT_KEY};
use crate::value::{json_kind, SharedState, State, Value};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde_json::Value as Json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Where a segment or label sits on the timeline
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Position {
    /// At the current end of the timeline
    #[default]
    Append,
    /// Seconds from the start, clamped to the current duration
    At(f64),
    /// Seconds relative to the current end; negative values overlap
    Offset(f64),
    /// A registered label, or a `"+=1.5"` / `"-=0.5"` offset
    Label(String),
}

impl From<f64> for Position {
    fn from(seconds: f64) -> Self {
        Position::At(seconds)
    }
}

impl From<&str> for Position {
    fn from(label: &str) -> Self {
        Position::Label(label.to_owned())
    }
}

impl From<String> for Position {
    fn from(label: String) -> Self {
        Position::Label(label)
    }
}

/// A segment in a timeline
struct TimelineEntry {
    to: IndexMap<String, Value>,
    /// Bound on first activation, from the live state at that moment
    channels: Vec<Channel>,
    /// Offset in milliseconds from timeline start
    start_time: f64,
    duration: f64,
    easing: Easing,
    active: bool,
    finished: bool,
}

impl TimelineEntry {
    /// Local progress at `playhead`, mirrored when the timeline is reversed
    fn elapsed(&self, playhead: f64, total: f64, reversed: bool) -> f64 {
        let start = if reversed {
            total - self.start_time - self.duration
        } else {
            self.start_time
        };
        if self.duration <= 0.0 {
            return if playhead >= start { 1.0 } else { 0.0 };
        }
        ((playhead - start) / self.duration).clamp(0.0, 1.0)
    }

    fn bind(&mut self, state: &State, registry: &Registry) {
        self.channels = self
            .to
            .iter()
            .filter_map(|(key, end)| Channel::from_live(state, key, end, registry.interpolator(key)))
            .collect();
    }

    fn reset(&mut self) {
        self.active = false;
        self.finished = false;
    }
}

#[derive(Clone, Copy)]
enum Hook {
    Start,
    Update,
    Complete,
    Stop,
    Pause,
    Resume,
    Repeat,
}

#[derive(Default)]
struct TimelineCallbacks {
    on_start: Option<ProgressCallback>,
    on_update: Option<ProgressCallback>,
    on_complete: Option<ProgressCallback>,
    on_stop: Option<ProgressCallback>,
    on_pause: Option<ProgressCallback>,
    on_resume: Option<ProgressCallback>,
    on_repeat: Option<ProgressCallback>,
}

impl TimelineCallbacks {
    fn slot(&mut self, hook: Hook) -> &mut Option<ProgressCallback> {
        match hook {
            Hook::Start => &mut self.on_start,
            Hook::Update => &mut self.on_update,
            Hook::Complete => &mut self.on_complete,
            Hook::Stop => &mut self.on_stop,
            Hook::Pause => &mut self.on_pause,
            Hook::Resume => &mut self.on_resume,
            Hook::Repeat => &mut self.on_repeat,
        }
    }
}

struct TimelineCore {
    guard: StateGuard,
    entries: Vec<TimelineEntry>,
    labels: FxHashMap<String, f64>,
    progress: f64,
    /// Milliseconds
    duration: f64,
    playhead: f64,
    last_time: f64,
    pause_time: Option<f64>,
    playing: bool,
    started: bool,
    yoyo: bool,
    reversed: bool,
    repeat: u32,
    initial_repeat: u32,
    repeat_delay: f64,
    repeat_delay_start: Option<f64>,
    /// Bumped by every play and stop
    activation: u64,
    /// Base state still has to be written back
    restore_pending: bool,
}

impl TimelineCore {
    fn new(guard: StateGuard) -> Self {
        Self {
            guard,
            entries: Vec::new(),
            labels: FxHashMap::default(),
            progress: 0.0,
            duration: 0.0,
            playhead: 0.0,
            last_time: 0.0,
            pause_time: None,
            playing: false,
            started: false,
            yoyo: false,
            reversed: false,
            repeat: 0,
            initial_repeat: 0,
            repeat_delay: 0.0,
            repeat_delay_start: None,
            activation: 0,
            restore_pending: false,
        }
    }

    /// Write the base state back if a restore is pending
    ///
    /// Returns false while a callback still holds the state.
    fn restore_base(&mut self, state: &RefCell<State>) -> bool {
        if !self.restore_pending {
            return true;
        }
        let Ok(mut state) = state.try_borrow_mut() else {
            return false;
        };
        state.assign_from(self.guard.base());
        self.restore_pending = false;
        true
    }

    /// Resolve a position to milliseconds
    fn resolve(&self, position: &Position) -> f64 {
        match position {
            Position::Append => self.duration,
            Position::At(seconds) => (seconds * 1000.0).max(0.0).min(self.duration),
            Position::Offset(seconds) => (self.duration + seconds * 1000.0).max(0.0),
            Position::Label(name) => {
                if let Some(time) = self.labels.get(name) {
                    return *time;
                }
                let offset = |rest: &str| rest.trim().parse::<f64>().unwrap_or(0.0) * 1000.0;
                if let Some(rest) = name.strip_prefix("+=") {
                    self.duration + offset(rest)
                } else if let Some(rest) = name.strip_prefix("-=") {
                    (self.duration - offset(rest)).max(0.0)
                } else {
                    self.duration
                }
            }
        }
    }

    fn reset_entries(&mut self) {
        for entry in &mut self.entries {
            entry.reset();
        }
    }

    /// Render every segment at the current playhead
    fn advance(&mut self, state: &mut State) {
        let TimelineCore {
            guard,
            entries,
            playhead,
            duration,
            reversed,
            ..
        } = self;

        for entry in entries.iter_mut() {
            let elapsed = entry.elapsed(*playhead, *duration, *reversed);
            if !entry.active && !entry.finished && elapsed > 0.0 {
                if entry.channels.is_empty() {
                    entry.bind(state, guard.registry());
                }
                entry.active = true;
            }
            if entry.active {
                runtime::render(&entry.channels, state, &entry.easing, elapsed, *reversed);
                if elapsed >= 1.0 {
                    entry.active = false;
                    entry.finished = true;
                }
            }
        }
    }

    fn finish(&mut self) {
        self.playing = false;
        self.repeat = self.initial_repeat;
        self.reversed = false;
        self.reset_entries();
    }

    fn next_cycle(&mut self, time: f64) {
        if self.repeat != REPEAT_INFINITE {
            self.repeat -= 1;
        }
        if self.yoyo {
            self.reversed = !self.reversed;
        }
        self.playhead = 0.0;
        self.reset_entries();
        self.restore_pending = true;
        if self.repeat_delay > 0.0 {
            self.repeat_delay_start = Some(time);
        }
    }

    /// Validate and append a segment
    fn push(&mut self, values: Json, easing: Option<Easing>, position: &Position, state: &State) {
        let Json::Object(mut map) = values else {
            self.guard.reject(INIT_KEY, ValidationError::Empty);
            return;
        };

        let duration = match map.shift_remove("duration") {
            None => Some(1.0),
            Some(value) => value.as_f64().filter(|d| *d >= 0.0),
        };
        let parsed_easing = match map.shift_remove("easing") {
            None => Ok(Easing::Linear),
            Some(Json::String(name)) => name
                .parse::<Easing>()
                .map_err(|_| ValidationError::UnknownEasing(name)),
            Some(other) => Err(ValidationError::Unsupported {
                prop: "easing".to_owned(),
                kind: json_kind(&other),
            }),
        };

        let accepted = self.guard.accept(&Json::Object(map), state);
        if duration.is_none() {
            self.guard
                .record("duration", ValidationError::NotANumber("duration".to_owned()));
        }
        if let Err(error) = &parsed_easing {
            if easing.is_none() {
                self.guard.record("easing", error.clone());
            }
        }
        if !self.guard.is_valid() {
            return;
        }
        let (Some(to), Some(seconds)) = (accepted, duration) else {
            return;
        };

        let start_time = self.resolve(position);
        let duration = seconds * 1000.0;
        self.entries.push(TimelineEntry {
            to,
            channels: Vec::new(),
            start_time,
            duration,
            easing: easing.or(parsed_easing.ok()).unwrap_or_default(),
            active: false,
            finished: false,
        });
        self.duration = self.duration.max(start_time + duration);
    }
}

struct TimelineInner {
    state: SharedState,
    core: RefCell<TimelineCore>,
    callbacks: RefCell<TimelineCallbacks>,
    slot: Cell<Option<AnimationId>>,
}

impl TimelineInner {
    fn emit(&self, hook: Hook, progress: f64) {
        let taken = self.callbacks.borrow_mut().slot(hook).take();
        if let Some(mut callback) = taken {
            match hook {
                Hook::Update => callback(&self.state.borrow(), progress),
                // Lifecycle callbacks may replay the timeline
                _ => {
                    let snapshot = self.state.borrow().clone();
                    callback(&snapshot, progress);
                }
            }
            let mut callbacks = self.callbacks.borrow_mut();
            let slot = callbacks.slot(hook);
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
    }

    fn unschedule(&self) {
        if let Some(id) = self.slot.take() {
            scheduler::dequeue(id);
        }
    }
}

impl Animation for TimelineInner {
    fn update(&self, time: f64) -> bool {
        let (progress, activation) = {
            let mut core = self.core.borrow_mut();
            if !core.playing {
                return core.pause_time.is_some();
            }
            if !core.restore_base(&self.state) {
                return true;
            }
            if let Some(delay_start) = core.repeat_delay_start {
                if time - delay_start < core.repeat_delay {
                    core.last_time = time;
                    return true;
                }
                core.repeat_delay_start = None;
            }

            let Ok(mut state) = self.state.try_borrow_mut() else {
                return true;
            };
            let delta = time - core.last_time;
            core.last_time = time;
            core.playhead += delta;
            core.progress = if core.duration <= 0.0 || core.playhead >= core.duration {
                1.0
            } else {
                (core.playhead / core.duration).max(0.0)
            };

            core.advance(&mut state);
            (core.progress, core.activation)
        };

        self.emit(Hook::Update, progress);
        if progress < 1.0 {
            return self.core.borrow().playing;
        }

        let completed = {
            let mut core = self.core.borrow_mut();
            // on_update stopped, paused or replayed the timeline
            if !core.playing || core.activation != activation {
                return core.playing || core.pause_time.is_some();
            }
            if core.repeat == 0 {
                core.finish();
                true
            } else {
                core.next_cycle(time);
                core.restore_base(&self.state);
                false
            }
        };

        if completed {
            self.emit(Hook::Complete, 1.0);
        } else {
            self.emit(Hook::Repeat, progress);
        }
        self.core.borrow().playing
    }
}

/// A sequence of tween segments over a shared [`State`]
#[derive(Clone)]
pub struct Timeline {
    inner: Rc<TimelineInner>,
}

impl Timeline {
    /// Create a timeline owning a new state built from `initial`
    pub fn new(initial: Json) -> Self {
        Self::build(State::new().into_shared(), initial)
    }

    /// Create a timeline animating a caller-owned state
    pub fn with_state(state: SharedState) -> Self {
        let initial = state.borrow().to_json();
        Self::build(state, initial)
    }

    fn build(state: SharedState, initial: Json) -> Self {
        let guard = StateGuard::new(initial, &mut state.borrow_mut());
        Self {
            inner: Rc::new(TimelineInner {
                state,
                core: RefCell::new(TimelineCore::new(guard)),
                callbacks: RefCell::new(TimelineCallbacks::default()),
                slot: Cell::new(None),
            }),
        }
    }

    pub fn state(&self) -> SharedState {
        self.inner.state.clone()
    }

    /// Overall progress of the current cycle (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        self.inner.core.borrow().progress
    }

    /// Length of one cycle in seconds
    pub fn get_duration(&self) -> f64 {
        self.inner.core.borrow().duration / 1000.0
    }

    /// Every cycle plus repeat delays, in seconds
    pub fn total_duration(&self) -> f64 {
        let core = self.inner.core.borrow();
        if core.initial_repeat == REPEAT_INFINITE {
            return f64::INFINITY;
        }
        let repeat = core.initial_repeat as f64;
        (core.duration * (repeat + 1.0) + core.repeat_delay * repeat) / 1000.0
    }

    pub fn is_playing(&self) -> bool {
        self.inner.core.borrow().playing
    }

    pub fn is_paused(&self) -> bool {
        let core = self.inner.core.borrow();
        !core.playing && core.pause_time.is_some()
    }

    pub fn is_valid_state(&self) -> bool {
        self.inner.core.borrow().guard.is_initialized()
    }

    pub fn is_valid(&self) -> bool {
        self.inner.core.borrow().guard.is_valid()
    }

    pub fn errors(&self) -> ErrorMap {
        self.inner.core.borrow().guard.errors().clone()
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.inner.core.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of a label in seconds
    pub fn label_position(&self, name: &str) -> Option<f64> {
        self.inner
            .core
            .borrow()
            .labels
            .get(name)
            .map(|time| time / 1000.0)
    }

    pub fn play(&self) -> &Self {
        self.play_at(clock::now())
    }

    /// Play from the start, or continue if paused
    pub fn play_at(&self, time: f64) -> &Self {
        {
            let core = self.inner.core.borrow();
            if core.pause_time.is_some() {
                drop(core);
                return self.resume_at(time);
            }
            if core.playing {
                return self;
            }
            if !core.guard.is_valid() || !core.guard.is_initialized() {
                core.guard.report("timeline");
                return self;
            }
        }

        {
            let mut core = self.inner.core.borrow_mut();
            let core = &mut *core;
            if core.started {
                // Deferred to the next frame if an update callback holds the state
                core.restore_pending = true;
                core.restore_base(&self.inner.state);
            }
            core.reset_entries();
            core.activation += 1;
            core.started = true;
            core.playing = true;
            core.last_time = time;
            core.playhead = 0.0;
            core.progress = 0.0;
            core.repeat_delay_start = None;
        }

        self.inner.emit(Hook::Start, 0.0);
        self.schedule();
        self
    }

    fn schedule(&self) {
        let id = scheduler::enqueue(self.inner.clone(), self.inner.slot.get());
        self.inner.slot.set(Some(id));
    }

    pub fn pause(&self) -> &Self {
        self.pause_at(clock::now())
    }

    pub fn pause_at(&self, time: f64) -> &Self {
        let progress = {
            let mut core = self.inner.core.borrow_mut();
            if !core.playing {
                return self;
            }
            core.playing = false;
            core.pause_time = Some(time);
            core.progress
        };
        self.inner.unschedule();
        self.inner.emit(Hook::Pause, progress);
        self
    }

    pub fn resume(&self) -> &Self {
        self.resume_at(clock::now())
    }

    pub fn resume_at(&self, time: f64) -> &Self {
        let progress = {
            let mut core = self.inner.core.borrow_mut();
            let Some(paused_at) = core.pause_time.take() else {
                return self;
            };
            core.last_time += time - paused_at;
            core.playing = true;
            core.progress
        };
        self.schedule();
        self.inner.emit(Hook::Resume, progress);
        self
    }

    /// Flip the playback direction, mirroring the playhead
    pub fn reverse(&self) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        if !core.playing {
            return self;
        }
        core.reversed = !core.reversed;
        core.playhead = core.duration - core.playhead;
        if core.initial_repeat > 0 && core.initial_repeat != REPEAT_INFINITE {
            core.repeat = core.initial_repeat - core.repeat;
        }
        for entry in &mut core.entries {
            entry.finished = false;
        }
        self
    }

    /// Move the playhead; the next update renders it
    pub fn seek(&self, position: impl Into<Position>) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        core.playhead = core.resolve(&position.into());
        for entry in &mut core.entries {
            entry.finished = false;
        }
        self
    }

    /// Stop playback, keeping the current values
    pub fn stop(&self) -> &Self {
        let progress = {
            let mut core = self.inner.core.borrow_mut();
            if !core.playing && core.pause_time.is_none() {
                return self;
            }
            core.playing = false;
            core.activation += 1;
            core.playhead = 0.0;
            core.pause_time = None;
            core.repeat = core.initial_repeat;
            core.reversed = false;
            core.repeat_delay_start = None;
            core.progress
        };
        self.inner.unschedule();
        self.inner.emit(Hook::Stop, progress);
        self
    }

    /// Number of extra cycles after the first
    pub fn repeat(&self, count: u32) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        core.repeat = count;
        core.initial_repeat = count;
        self
    }

    pub fn repeat_infinite(&self) -> &Self {
        self.repeat(REPEAT_INFINITE)
    }

    /// Pause between cycles, in seconds
    pub fn repeat_delay(&self, seconds: f64) -> &Self {
        self.inner.core.borrow_mut().repeat_delay = seconds * 1000.0;
        self
    }

    pub fn yoyo(&self, yoyo: bool) -> &Self {
        self.inner.core.borrow_mut().yoyo = yoyo;
        self
    }

    pub fn configure(&self, options: &TimelineOptions) -> &Self {
        self.repeat_delay(options.repeat_delay).yoyo(options.yoyo);
        if options.repeat_forever {
            self.repeat_infinite()
        } else {
            self.repeat(options.repeat)
        }
    }

    /// Record a named position
    pub fn label(&self, name: &str, position: impl Into<Position>) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        let time = core.resolve(&position.into());
        core.labels.insert(name.to_owned(), time);
        self
    }

    /// Append a segment after everything added so far
    ///
    /// Besides the animated properties, `values` may carry `"duration"`
    /// (seconds, default 1) and `"easing"` (an easing name).
    pub fn to(&self, values: Json) -> &Self {
        self.add(values, None, &Position::Append)
    }

    /// Add a segment at `position`
    pub fn to_at(&self, values: Json, position: impl Into<Position>) -> &Self {
        self.add(values, None, &position.into())
    }

    /// Add a segment with an explicit easing
    pub fn to_eased(&self, values: Json, easing: Easing, position: impl Into<Position>) -> &Self {
        self.add(values, Some(easing), &position.into())
    }

    fn add(&self, values: Json, easing: Option<Easing>, position: &Position) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        if !core.guard.is_initialized() || core.playing {
            return self;
        }
        core.push(values, easing, position, &self.inner.state.borrow());
        self
    }

    pub fn on_start(&self, callback: impl FnMut(&State, f64) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_start = Some(Box::new(callback));
        self
    }

    pub fn on_update(&self, callback: impl FnMut(&State, f64) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_update = Some(Box::new(callback));
        self
    }

    pub fn on_complete(&self, callback: impl FnMut(&State, f64) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_complete = Some(Box::new(callback));
        self
    }

    pub fn on_stop(&self, callback: impl FnMut(&State, f64) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_stop = Some(Box::new(callback));
        self
    }

    pub fn on_pause(&self, callback: impl FnMut(&State, f64) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_pause = Some(Box::new(callback));
        self
    }

    pub fn on_resume(&self, callback: impl FnMut(&State, f64) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_resume = Some(Box::new(callback));
        self
    }

    pub fn on_repeat(&self, callback: impl FnMut(&State, f64) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_repeat = Some(Box::new(callback));
        self
    }

    /// Advance to `time` (milliseconds); false once finished or stopped
    pub fn update(&self, time: f64) -> bool {
        self.inner.update(time)
    }

    /// Register an extension for a non-numeric property
    pub fn use_extension(&self, property: &str, extension: Extension) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        core.guard
            .register(property, extension, &mut self.inner.state.borrow_mut());
        self
    }

    /// Drop every segment and label and reset timing
    pub fn clear(&self) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        core.entries.clear();
        core.labels.clear();
        core.duration = 0.0;
        core.playhead = 0.0;
        core.progress = 0.0;
        core.pause_time = None;
        core.last_time = 0.0;
        core.repeat_delay = 0.0;
        core.repeat = core.initial_repeat;
        core.repeat_delay_start = None;
        core.reversed = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positions() {
        let timeline = Timeline::new(json!({"x": 0}));
        timeline
            .to(json!({"x": 10, "duration": 2}))
            .label("a", Position::Append)
            .label("b", 0.5)
            .label("c", 5.0)
            .label("d", "-=0.5")
            .label("e", "+=1")
            .label("f", "-=n")
            .label("g", "a")
            .label("h", "nowhere")
            .label("i", Position::Offset(-3.0));

        assert_eq!(timeline.label_position("a"), Some(2.0));
        assert_eq!(timeline.label_position("b"), Some(0.5));
        assert_eq!(timeline.label_position("c"), Some(2.0));
        assert_eq!(timeline.label_position("d"), Some(1.5));
        assert_eq!(timeline.label_position("e"), Some(3.0));
        assert_eq!(timeline.label_position("f"), Some(2.0));
        assert_eq!(timeline.label_position("g"), Some(2.0));
        assert_eq!(timeline.label_position("h"), Some(2.0));
        assert_eq!(timeline.label_position("i"), Some(0.0));
    }

    #[test]
    fn test_duration_grows_with_segments() {
        let timeline = Timeline::new(json!({"x": 0, "y": 0}));
        assert_eq!(timeline.get_duration(), 0.0);

        timeline.to(json!({"x": 10, "duration": 2}));
        timeline.to_at(json!({"y": 10, "duration": 1}), "-=1.5");
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.get_duration(), 2.0);

        timeline.to_at(json!({"y": 0}), 1.5);
        assert_eq!(timeline.get_duration(), 2.5);
    }

    #[test]
    fn test_segment_config_validation() {
        let timeline = Timeline::new(json!({"x": 0}));
        timeline.to(json!({"x": 10, "easing": "bogus"}));
        assert!(!timeline.is_valid());
        assert!(timeline.errors().contains_key("easing"));
        assert!(timeline.is_empty());

        timeline.to(json!({"x": 10, "duration": "1s"}));
        assert!(timeline.errors().contains_key("duration"));

        timeline.to(json!({"x": 10, "easing": "ease-out-quad", "duration": 0.5}));
        assert!(timeline.is_valid());
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.get_duration(), 0.5);
    }

    #[test]
    fn test_explicit_easing_overrides_payload() {
        let timeline = Timeline::new(json!({"x": 0}));
        timeline.to_eased(json!({"x": 100, "easing": "bogus"}), Easing::EaseInQuad, Position::Append);
        assert!(timeline.is_valid());

        timeline.play_at(0.0);
        timeline.update(500.0);
        let x = timeline.state().borrow().number("x").unwrap();
        assert!((x - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_object_segment_replaces_errors() {
        let timeline = Timeline::new(json!({"x": 0}));
        timeline.to(json!({"x": "far"}));
        assert!(timeline.errors().contains_key("x"));

        timeline.to(json!(5));
        let errors = timeline.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key(INIT_KEY));
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_rejects_while_playing() {
        let timeline = Timeline::new(json!({"x": 0}));
        timeline.to(json!({"x": 10})).play_at(0.0);
        timeline.to(json!({"x": 20}));
        assert_eq!(timeline.len(), 1);
        timeline.stop();
    }
}
