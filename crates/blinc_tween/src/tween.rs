//! Single-segment tweens
//!
//! A [`Tween`] animates the properties of a [`State`] from start values to
//! end values over a duration, with optional delay, repeats, yoyo and
//! easing.
//!
//! ```ignore
//! let tween = Tween::new(json!({ "x": 0, "y": 0 }));
//! tween
//!     .to(json!({ "x": 100, "y": 50 }))
//!     .duration(0.5)
//!     .easing(Easing::EaseOutCubic)
//!     .on_update(|state, _| println!("{:?}", state.number("x")))
//!     .start();
//! ```
//!
//! Tweens are cheap handles: clones share the same animation. Time values
//! passed to the `*_at` methods and to [`Tween::update`] are milliseconds
//! from [`clock::now`]; configuration uses seconds.

use crate::clock;
use crate::easing::Easing;
use crate::options::TweenOptions;
use crate::registry::Extension;
use crate::runtime::{self, Channel};
use crate::scheduler::{self, Animation, AnimationId};
use crate::validation::{ErrorMap, StateGuard};
use crate::value::{SharedState, State, Value};
use indexmap::IndexMap;
use serde_json::Value as Json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Repeat count meaning "forever"
pub const REPEAT_INFINITE: u32 = u32::MAX;

/// Lifecycle callback receiving a snapshot of the state
pub type Callback = Box<dyn FnMut(&State)>;

/// Callback receiving the state and linear progress (0.0 to 1.0)
///
/// Update callbacks see the live state; lifecycle callbacks see a snapshot.
pub type ProgressCallback = Box<dyn FnMut(&State, f64)>;

#[derive(Clone, Copy)]
enum Hook {
    Start,
    Complete,
    Stop,
    Pause,
    Resume,
    Repeat,
}

#[derive(Default)]
struct TweenCallbacks {
    on_start: Option<Callback>,
    on_update: Option<ProgressCallback>,
    on_complete: Option<Callback>,
    on_stop: Option<Callback>,
    on_pause: Option<Callback>,
    on_resume: Option<Callback>,
    on_repeat: Option<Callback>,
}

impl TweenCallbacks {
    fn slot(&mut self, hook: Hook) -> &mut Option<Callback> {
        match hook {
            Hook::Start => &mut self.on_start,
            Hook::Complete => &mut self.on_complete,
            Hook::Stop => &mut self.on_stop,
            Hook::Pause => &mut self.on_pause,
            Hook::Resume => &mut self.on_resume,
            Hook::Repeat => &mut self.on_repeat,
        }
    }
}

enum Outcome {
    Running,
    Repeat,
    Complete,
}

/// State writes of a start that found the state borrowed
#[derive(Clone, Copy)]
struct Prepare {
    restore: bool,
    override_start: bool,
}

struct TweenCore {
    guard: StateGuard,
    props_start: IndexMap<String, Value>,
    props_end: IndexMap<String, Value>,
    start_is_set: bool,
    channels: Vec<Channel>,
    easing: Easing,
    /// Milliseconds
    duration: f64,
    delay: f64,
    repeat_delay: f64,
    repeat: u32,
    initial_repeat: u32,
    yoyo: bool,
    reversed: bool,
    playing: bool,
    pause_start: Option<f64>,
    start_time: f64,
    /// Set on the first start, used to restore the base state on restart
    started: bool,
    start_fired: bool,
    /// Bumped by every start and stop
    activation: u64,
    deferred: Option<Prepare>,
}

impl TweenCore {
    fn new(guard: StateGuard) -> Self {
        Self {
            guard,
            props_start: IndexMap::new(),
            props_end: IndexMap::new(),
            start_is_set: false,
            channels: Vec::new(),
            easing: Easing::Linear,
            duration: 1000.0,
            delay: 0.0,
            repeat_delay: 0.0,
            repeat: 0,
            initial_repeat: 0,
            yoyo: false,
            reversed: false,
            playing: false,
            pause_start: None,
            start_time: 0.0,
            started: false,
            start_fired: false,
            activation: 0,
            deferred: None,
        }
    }

    /// Restore the base state and capture start values for a new activation
    fn prepare(&mut self, state: &mut State, prepare: Prepare) {
        if prepare.restore {
            state.assign_from(self.guard.base());
        }
        if !self.start_is_set || prepare.override_start {
            self.start_is_set = true;
            self.capture(state, prepare.override_start);
        }
    }

    fn progress_at(&self, time: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((time - self.start_time) / self.duration).clamp(0.0, 1.0)
    }

    /// Snapshot start values and rebuild the channels
    fn capture(&mut self, state: &State, override_start: bool) {
        self.channels.clear();
        for (key, end) in &self.props_end {
            let Some(slot) = state.slot_of(key) else {
                continue;
            };
            if override_start || !self.props_start.contains_key(key) {
                if let Some(live) = state.slot(slot) {
                    self.props_start.insert(key.clone(), live.clone());
                }
            }
            let Some(start) = self.props_start.get(key) else {
                continue;
            };
            let interpolate = self.guard.registry().interpolator(key);
            if let Some(channel) = Channel::new(slot, start.clone(), end.clone(), interpolate) {
                self.channels.push(channel);
            }
        }
    }

    fn finish(&mut self) {
        self.playing = false;
        self.repeat = self.initial_repeat;
        self.reversed = false;
    }

    fn next_cycle(&mut self, time: f64) {
        if self.repeat != REPEAT_INFINITE {
            self.repeat -= 1;
        }
        if self.yoyo {
            self.reversed = !self.reversed;
        }
        self.start_time = time + self.repeat_delay;
    }
}

struct TweenInner {
    state: SharedState,
    core: RefCell<TweenCore>,
    callbacks: RefCell<TweenCallbacks>,
    slot: Cell<Option<AnimationId>>,
}

impl TweenInner {
    /// Lifecycle callbacks see a snapshot so they may restart the tween
    fn emit(&self, hook: Hook) {
        let taken = self.callbacks.borrow_mut().slot(hook).take();
        if let Some(mut callback) = taken {
            let snapshot = self.state.borrow().clone();
            callback(&snapshot);
            let mut callbacks = self.callbacks.borrow_mut();
            let slot = callbacks.slot(hook);
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
    }

    fn emit_update(&self, progress: f64) {
        let taken = self.callbacks.borrow_mut().on_update.take();
        if let Some(mut callback) = taken {
            callback(&self.state.borrow(), progress);
            let mut callbacks = self.callbacks.borrow_mut();
            if callbacks.on_update.is_none() {
                callbacks.on_update = Some(callback);
            }
        }
    }

    fn unschedule(&self) {
        if let Some(id) = self.slot.take() {
            scheduler::dequeue(id);
        }
    }
}

impl Animation for TweenInner {
    fn update(&self, time: f64) -> bool {
        let first_frame = {
            let mut core = self.core.borrow_mut();
            if !core.playing {
                return core.pause_start.is_some();
            }
            if let Some(prepare) = core.deferred {
                // Still borrowed by a callback; try again next frame
                let Ok(mut state) = self.state.try_borrow_mut() else {
                    return true;
                };
                core.deferred = None;
                core.prepare(&mut state, prepare);
            }
            if time < core.start_time {
                return true;
            }
            !std::mem::replace(&mut core.start_fired, true)
        };
        if first_frame {
            self.emit(Hook::Start);
        }

        let (progress, activation) = {
            let core = self.core.borrow();
            if !core.playing {
                return core.pause_start.is_some();
            }
            let Ok(mut state) = self.state.try_borrow_mut() else {
                return true;
            };
            let progress = core.progress_at(time);
            runtime::render(&core.channels, &mut state, &core.easing, progress, core.reversed);
            (progress, core.activation)
        };

        self.emit_update(progress);

        let outcome = {
            let mut core = self.core.borrow_mut();
            // on_update stopped, paused or restarted the tween
            if !core.playing || core.activation != activation {
                return core.playing || core.pause_start.is_some();
            }
            if progress < 1.0 {
                Outcome::Running
            } else if core.repeat == 0 {
                core.finish();
                Outcome::Complete
            } else {
                core.next_cycle(time);
                Outcome::Repeat
            }
        };

        match outcome {
            Outcome::Running => {}
            Outcome::Repeat => self.emit(Hook::Repeat),
            Outcome::Complete => self.emit(Hook::Complete),
        }

        // A callback may have stopped or restarted the tween
        self.core.borrow().playing
    }
}

/// A tween over a shared [`State`]
#[derive(Clone)]
pub struct Tween {
    inner: Rc<TweenInner>,
}

impl Tween {
    /// Create a tween owning a new state built from `initial`
    ///
    /// If `initial` does not validate the tween stays unusable (empty state,
    /// `is_valid_state() == false`) until the missing extensions are
    /// registered with [`Tween::use_extension`].
    pub fn new(initial: Json) -> Self {
        Self::build(State::new().into_shared(), initial)
    }

    /// Create a tween animating a caller-owned state
    pub fn with_state(state: SharedState) -> Self {
        let initial = state.borrow().to_json();
        Self::build(state, initial)
    }

    fn build(state: SharedState, initial: Json) -> Self {
        let guard = StateGuard::new(initial, &mut state.borrow_mut());
        Self {
            inner: Rc::new(TweenInner {
                state,
                core: RefCell::new(TweenCore::new(guard)),
                callbacks: RefCell::new(TweenCallbacks::default()),
                slot: Cell::new(None),
            }),
        }
    }

    /// The live state this tween writes to
    pub fn state(&self) -> SharedState {
        self.inner.state.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.core.borrow().playing
    }

    pub fn is_paused(&self) -> bool {
        self.inner.core.borrow().pause_start.is_some()
    }

    /// True once the initial state validated
    pub fn is_valid_state(&self) -> bool {
        self.inner.core.borrow().guard.is_initialized()
    }

    /// True when no validation errors are recorded
    pub fn is_valid(&self) -> bool {
        self.inner.core.borrow().guard.is_valid()
    }

    /// Snapshot of the recorded validation errors
    pub fn errors(&self) -> ErrorMap {
        self.inner.core.borrow().guard.errors().clone()
    }

    /// Duration of one cycle in seconds
    pub fn get_duration(&self) -> f64 {
        self.inner.core.borrow().duration / 1000.0
    }

    /// Delay plus every cycle and repeat delay, in seconds
    pub fn total_duration(&self) -> f64 {
        let core = self.inner.core.borrow();
        if core.initial_repeat == REPEAT_INFINITE {
            return f64::INFINITY;
        }
        let repeat = core.initial_repeat as f64;
        (core.delay + core.duration * (repeat + 1.0) + core.repeat_delay * repeat) / 1000.0
    }

    pub fn start(&self) -> &Self {
        self.start_with(clock::now(), false)
    }

    pub fn start_at(&self, time: f64) -> &Self {
        self.start_with(time, false)
    }

    /// Start from the current live values instead of the recorded start
    /// values
    pub fn start_from_last(&self) -> &Self {
        self.start_with(clock::now(), true)
    }

    pub fn start_from_last_at(&self, time: f64) -> &Self {
        self.start_with(time, true)
    }

    fn start_with(&self, time: f64, override_start: bool) -> &Self {
        {
            let core = self.inner.core.borrow();
            if core.playing {
                return self;
            }
            if core.pause_start.is_some() {
                drop(core);
                return self.resume_at(time);
            }
            if !core.guard.is_valid() || !core.guard.is_initialized() {
                core.guard.report("tween");
                return self;
            }
        }

        {
            let mut core = self.inner.core.borrow_mut();
            let prepare = Prepare {
                restore: core.started && !override_start,
                override_start,
            };
            // An update callback may hold the state; the next frame applies it
            match self.inner.state.try_borrow_mut() {
                Ok(mut state) => {
                    core.deferred = None;
                    core.prepare(&mut state, prepare);
                }
                Err(_) => core.deferred = Some(prepare),
            }

            core.playing = true;
            core.started = true;
            core.start_fired = false;
            core.activation += 1;
            core.start_time = time + core.delay;
        }

        self.schedule();
        self
    }

    fn schedule(&self) {
        let id = scheduler::enqueue(self.inner.clone(), self.inner.slot.get());
        self.inner.slot.set(Some(id));
    }

    /// Stop playback, keeping the current values
    pub fn stop(&self) -> &Self {
        {
            let mut core = self.inner.core.borrow_mut();
            if !core.playing && core.pause_start.is_none() {
                return self;
            }
            core.pause_start = None;
            core.activation += 1;
            core.finish();
        }
        self.inner.unschedule();
        self.inner.emit(Hook::Stop);
        self
    }

    pub fn reverse(&self) -> &Self {
        self.reverse_at(clock::now())
    }

    /// Flip the playback direction, continuing from the current position
    pub fn reverse_at(&self, time: f64) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        if !core.playing {
            return self;
        }
        let elapsed = time - core.start_time;
        core.start_time = time - (core.duration - elapsed);
        core.reversed = !core.reversed;
        if core.initial_repeat > 0 && core.initial_repeat != REPEAT_INFINITE {
            core.repeat = core.initial_repeat - core.repeat;
        }
        self
    }

    pub fn pause(&self) -> &Self {
        self.pause_at(clock::now())
    }

    pub fn pause_at(&self, time: f64) -> &Self {
        {
            let mut core = self.inner.core.borrow_mut();
            if !core.playing {
                return self;
            }
            core.pause_start = Some(time);
            core.playing = false;
        }
        self.inner.unschedule();
        self.inner.emit(Hook::Pause);
        self
    }

    pub fn resume(&self) -> &Self {
        self.resume_at(clock::now())
    }

    /// Continue a paused tween; the paused time is not counted
    pub fn resume_at(&self, time: f64) -> &Self {
        {
            let mut core = self.inner.core.borrow_mut();
            let Some(paused_at) = core.pause_start.take() else {
                return self;
            };
            core.start_time += time - paused_at;
            core.playing = true;
        }
        self.schedule();
        self.inner.emit(Hook::Resume);
        self
    }

    /// Merge start values, used instead of the live values on start
    ///
    /// Ignored while playing. Invalid values are recorded as errors and not
    /// merged.
    pub fn from(&self, values: Json) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        if !core.guard.is_initialized() || core.playing {
            return self;
        }
        let accepted = core.guard.accept(&values, &self.inner.state.borrow());
        if let Some(values) = accepted {
            core.props_start.extend(values);
            core.start_is_set = false;
        }
        self
    }

    /// Replace the end values
    ///
    /// Ignored while playing. Invalid values are recorded as errors and the
    /// previous end values are kept.
    pub fn to(&self, values: Json) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        if !core.guard.is_initialized() || core.playing {
            return self;
        }
        let accepted = core.guard.accept(&values, &self.inner.state.borrow());
        if let Some(values) = accepted {
            core.props_end = values;
            core.start_is_set = false;
        }
        self
    }

    /// Cycle duration in seconds (default 1)
    pub fn duration(&self, seconds: f64) -> &Self {
        self.inner.core.borrow_mut().duration = seconds * 1000.0;
        self
    }

    /// Delay before the first cycle, in seconds
    pub fn delay(&self, seconds: f64) -> &Self {
        self.inner.core.borrow_mut().delay = seconds * 1000.0;
        self
    }

    /// Number of extra cycles after the first
    pub fn repeat(&self, times: u32) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        core.repeat = times;
        core.initial_repeat = times;
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

    /// Alternate direction on every repeat
    pub fn yoyo(&self, yoyo: bool) -> &Self {
        self.inner.core.borrow_mut().yoyo = yoyo;
        self
    }

    pub fn easing(&self, easing: Easing) -> &Self {
        self.inner.core.borrow_mut().easing = easing;
        self
    }

    /// Apply a preset
    pub fn configure(&self, options: &TweenOptions) -> &Self {
        self.duration(options.duration)
            .delay(options.delay)
            .repeat_delay(options.repeat_delay)
            .yoyo(options.yoyo)
            .easing(options.easing);
        if options.repeat_forever {
            self.repeat_infinite()
        } else {
            self.repeat(options.repeat)
        }
    }

    /// Called on the first frame after start (once the delay elapsed)
    pub fn on_start(&self, callback: impl FnMut(&State) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_start = Some(Box::new(callback));
        self
    }

    /// Called every frame with the linear progress
    ///
    /// The callback gets a shared borrow of the live state; it must not
    /// borrow the state mutably or restart the tween.
    pub fn on_update(&self, callback: impl FnMut(&State, f64) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_update = Some(Box::new(callback));
        self
    }

    pub fn on_complete(&self, callback: impl FnMut(&State) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_complete = Some(Box::new(callback));
        self
    }

    pub fn on_stop(&self, callback: impl FnMut(&State) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_stop = Some(Box::new(callback));
        self
    }

    pub fn on_pause(&self, callback: impl FnMut(&State) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_pause = Some(Box::new(callback));
        self
    }

    pub fn on_resume(&self, callback: impl FnMut(&State) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_resume = Some(Box::new(callback));
        self
    }

    pub fn on_repeat(&self, callback: impl FnMut(&State) + 'static) -> &Self {
        self.inner.callbacks.borrow_mut().on_repeat = Some(Box::new(callback));
        self
    }

    /// Advance to `time` (milliseconds)
    ///
    /// Returns false once the tween finished or was stopped. The scheduler
    /// calls this every frame; call it directly to drive a tween manually.
    pub fn update(&self, time: f64) -> bool {
        self.inner.update(time)
    }

    /// Register an extension for a non-numeric property
    ///
    /// The first extension registered for a property wins. If the initial
    /// state failed validation it is evaluated again.
    pub fn use_extension(&self, property: &str, extension: Extension) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        core.guard
            .register(property, extension, &mut self.inner.state.borrow_mut());
        self
    }

    /// Forget start/end values and reset timing and repeats
    pub fn clear(&self) -> &Self {
        let mut core = self.inner.core.borrow_mut();
        core.props_start.clear();
        core.props_end.clear();
        core.channels.clear();
        core.start_is_set = false;
        core.start_time = 0.0;
        core.started = false;
        core.start_fired = false;
        core.pause_start = None;
        core.deferred = None;
        core.repeat = 0;
        core.initial_repeat = 0;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn x(tween: &Tween) -> f64 {
        tween.state().borrow().number("x").unwrap_or(f64::NAN)
    }

    #[test]
    fn test_linear_progress() {
        let tween = Tween::new(json!({"x": 0}));
        tween.to(json!({"x": 100})).duration(1.0);
        tween.start_at(0.0);

        assert!(tween.update(250.0));
        assert!((x(&tween) - 25.0).abs() < 1e-9);
        assert!(tween.update(500.0));
        assert!((x(&tween) - 50.0).abs() < 1e-9);
        assert!(!tween.update(1000.0));
        assert_eq!(x(&tween), 100.0);
        assert!(!tween.is_playing());
    }

    #[test]
    fn test_delay_holds_values() {
        let tween = Tween::new(json!({"x": 0}));
        tween.to(json!({"x": 10})).delay(0.5);
        tween.start_at(0.0);

        assert!(tween.update(400.0));
        assert_eq!(x(&tween), 0.0);
        tween.update(1000.0);
        assert!((x(&tween) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let tween = Tween::new(json!({"x": 0}));
        tween.to(json!({"x": 10})).duration(0.0);
        tween.start_at(0.0);
        assert!(!tween.update(0.0));
        assert_eq!(x(&tween), 10.0);
    }

    #[test]
    fn test_invalid_to_keeps_state() {
        let tween = Tween::new(json!({"x": 0}));
        tween.to(json!({"x": "50"}));
        assert!(!tween.is_valid());
        assert_eq!(x(&tween), 0.0);

        tween.start_at(0.0);
        assert!(!tween.is_playing());
    }

    #[test]
    fn test_invalid_initial_state() {
        let tween = Tween::new(json!({"x": "0"}));
        assert!(!tween.is_valid_state());
        assert!(tween.state().borrow().is_empty());
        assert!(tween.errors().contains_key("x"));
    }

    #[test]
    fn test_total_duration() {
        let tween = Tween::new(json!({"x": 0}));
        tween.duration(1.0).delay(0.5).repeat(2).repeat_delay(0.25);
        assert!((tween.total_duration() - 4.0).abs() < 1e-9);

        tween.repeat_infinite();
        assert!(tween.total_duration().is_infinite());
        assert_eq!(tween.get_duration(), 1.0);
    }
}
