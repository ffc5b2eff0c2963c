//! Animation scheduler
//!
//! Keeps the active tweens and timelines of the current thread in a queue
//! and updates them each frame. The frame loop is driven either by a
//! [`FrameDriver`] (the host's display-refresh callback) or by the host
//! calling [`tick`] itself.
//!
//! The loop stops on its own once the queue drains, and restarts on the next
//! [`enqueue`].

use crate::clock;
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::rc::Rc;

new_key_type! {
    /// Queue slot of a scheduled tween or timeline
    pub struct AnimationId;
}

/// Anything the scheduler can drive
pub trait Animation {
    /// Advance to `time` (milliseconds)
    ///
    /// Returning false removes the animation from the queue.
    fn update(&self, time: f64) -> bool;
}

/// Handle of a requested frame, used to cancel it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host hook that calls [`tick`] on the next display refresh
pub trait FrameDriver {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Per-thread queue of active animations
struct AnimationScheduler {
    animations: SlotMap<AnimationId, Rc<dyn Animation>>,
    /// Update order; may hold ids removed mid-frame until the next compaction
    order: Vec<AnimationId>,
    driver: Option<Box<dyn FrameDriver>>,
    frame: Option<FrameHandle>,
    running: bool,
    ticking: bool,
}

impl AnimationScheduler {
    fn new() -> Self {
        Self {
            animations: SlotMap::with_key(),
            order: Vec::new(),
            driver: None,
            frame: None,
            running: false,
            ticking: false,
        }
    }

    /// Add an animation; returns its id and whether the loop must start
    fn insert(
        &mut self,
        animation: Rc<dyn Animation>,
        known: Option<AnimationId>,
    ) -> (AnimationId, bool) {
        if let Some(id) = known {
            let queued = self.animations.get(id);
            if queued.is_some_and(|queued| same_animation(queued, &animation)) {
                return (id, false);
            }
        }
        let id = self.animations.insert(animation);
        self.order.push(id);
        let start = !self.running;
        self.running = true;
        (id, start)
    }

    fn remove(&mut self, id: AnimationId) -> bool {
        let removed = self.animations.remove(id).is_some();
        if removed && !self.ticking {
            self.compact();
        }
        removed
    }

    fn compact(&mut self) {
        let animations = &self.animations;
        self.order.retain(|id| animations.contains_key(*id));
    }

    fn entry_at(&self, index: usize) -> Option<(AnimationId, Option<Rc<dyn Animation>>)> {
        self.order
            .get(index)
            .map(|id| (*id, self.animations.get(*id).cloned()))
    }
}

/// Compare data pointers only; vtables may differ across codegen units
fn same_animation(a: &Rc<dyn Animation>, b: &Rc<dyn Animation>) -> bool {
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

thread_local! {
    static SCHEDULER: RefCell<AnimationScheduler> = RefCell::new(AnimationScheduler::new());
}

/// Run `f` on the installed driver without holding the scheduler borrow
fn with_driver<R>(f: impl FnOnce(&mut dyn FrameDriver) -> R) -> Option<R> {
    let mut driver = SCHEDULER.with(|s| s.borrow_mut().driver.take())?;
    let result = f(driver.as_mut());
    SCHEDULER.with(|s| {
        let mut s = s.borrow_mut();
        if s.driver.is_none() {
            s.driver = Some(driver);
        }
    });
    Some(result)
}

fn request_frame() {
    if let Some(handle) = with_driver(|driver| driver.request_frame()) {
        SCHEDULER.with(|s| s.borrow_mut().frame = Some(handle));
    }
}

fn cancel_frame() {
    let Some(handle) = SCHEDULER.with(|s| s.borrow_mut().frame.take()) else {
        return;
    };
    with_driver(|driver| driver.cancel_frame(handle));
}

/// Add an animation to the queue
///
/// `known` is the id the caller got from a previous `enqueue`. If that slot
/// still holds the same animation, its id is returned and nothing is added.
/// The first animation added to an idle queue starts the frame loop.
pub fn enqueue(animation: Rc<dyn Animation>, known: Option<AnimationId>) -> AnimationId {
    let (id, start) = SCHEDULER.with(|s| s.borrow_mut().insert(animation, known));
    tracing::trace!(?id, "enqueued animation");
    if start {
        tracing::debug!("starting animation frame loop");
        request_frame();
    }
    id
}

/// Remove an animation from the queue; unknown ids are ignored
pub fn dequeue(id: AnimationId) -> bool {
    let removed = SCHEDULER.with(|s| s.borrow_mut().remove(id));
    if removed {
        tracing::trace!(?id, "dequeued animation");
    }
    removed
}

/// Run one frame at the current clock time
pub fn tick() {
    tick_at(clock::now());
}

/// Run one frame at `time` (milliseconds)
///
/// Animations are updated in queue order. Each one may add or remove
/// animations, including itself, while it runs.
pub fn tick_at(time: f64) {
    SCHEDULER.with(|s| {
        let mut s = s.borrow_mut();
        s.frame = None;
        s.ticking = true;
    });

    let mut index = 0;
    while let Some((id, animation)) = SCHEDULER.with(|s| s.borrow().entry_at(index)) {
        index += 1;
        let Some(animation) = animation else {
            continue;
        };
        if !animation.update(time) {
            dequeue(id);
        }
    }

    let idle = SCHEDULER.with(|s| {
        let mut s = s.borrow_mut();
        s.ticking = false;
        s.compact();
        if s.animations.is_empty() {
            s.running = false;
        }
        !s.running
    });

    if idle {
        tracing::debug!("animation queue drained, stopping frame loop");
        cancel_frame();
    } else {
        request_frame();
    }
}

/// Number of queued animations
pub fn len() -> usize {
    SCHEDULER.with(|s| s.borrow().animations.len())
}

pub fn is_empty() -> bool {
    len() == 0
}

/// Check if any animations are still active
pub fn has_active_animations() -> bool {
    !is_empty()
}

/// True while the frame loop is active
pub fn is_running() -> bool {
    SCHEDULER.with(|s| s.borrow().running)
}

/// True if `id` is still queued
pub fn contains(id: AnimationId) -> bool {
    SCHEDULER.with(|s| s.borrow().animations.contains_key(id))
}

/// Install the host frame driver for this thread
pub fn set_frame_driver(driver: impl FrameDriver + 'static) {
    SCHEDULER.with(|s| s.borrow_mut().driver = Some(Box::new(driver)));
}

/// Drop every queued animation and the frame driver
pub fn reset() {
    cancel_frame();
    SCHEDULER.with(|s| *s.borrow_mut() = AnimationScheduler::new());
}
