//! Time source
//!
//! Every tween and timeline reads the current time through [`now`], in
//! milliseconds. The source can be swapped with [`set_time`] to drive
//! animations from a host clock or from a deterministic test clock.
//!
//! The override is per thread, like the rest of the runtime: animations live
//! on the thread that owns their state.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Instant;

/// A replacement time source returning milliseconds
pub type TimeSource = Rc<dyn Fn() -> f64>;

/// Reference instant for the default clock
static START_TIME: OnceLock<Instant> = OnceLock::new();

thread_local! {
    static TIME_SOURCE: RefCell<Option<TimeSource>> = const { RefCell::new(None) };
}

/// Milliseconds elapsed since the first call on any thread
fn default_now() -> f64 {
    let start = START_TIME.get_or_init(Instant::now);
    start.elapsed().as_secs_f64() * 1000.0
}

/// Current time in milliseconds
///
/// Monotonic for the default source. A source installed with [`set_time`]
/// is trusted as-is.
pub fn now() -> f64 {
    let source = TIME_SOURCE.with(|cell| cell.borrow().clone());
    match source {
        Some(source) => source(),
        None => default_now(),
    }
}

/// Replace the time source for the current thread
pub fn set_time<F>(source: F)
where
    F: Fn() -> f64 + 'static,
{
    TIME_SOURCE.with(|cell| *cell.borrow_mut() = Some(Rc::new(source)));
}

/// Restore the default monotonic source
pub fn reset_time() {
    TIME_SOURCE.with(|cell| *cell.borrow_mut() = None);
}
