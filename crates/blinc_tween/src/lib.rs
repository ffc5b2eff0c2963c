//! Blinc Tween Engine
//!
//! Frame-driven tweens and timelines over a shared, ordered property state.
//!
//! # Features
//!
//! - **Tweens**: animate properties from start to end values with delay,
//!   repeat, yoyo, reverse, pause/resume and easing
//! - **Timelines**: sequence and overlap segments with positions and labels,
//!   seek and reverse a whole sequence
//! - **Extensions**: interpolate arrays, records, path segments and transform
//!   steps, or plug in your own interpolator/validator pair
//! - **Validation**: configuration is checked against the live state and
//!   problems are recorded per property instead of panicking
//! - **Scheduler**: one frame loop per thread updates every active animation
//!   and stops itself when the queue drains
//!
//! # Example
//!
//! ```ignore
//! use blinc_tween::{extend, Easing, Tween};
//! use serde_json::json;
//!
//! let tween = Tween::new(json!({ "x": 0, "rgb": [255, 0, 0] }));
//! tween
//!     .use_extension("rgb", extend::ARRAY)
//!     .to(json!({ "x": 100, "rgb": [0, 0, 255] }))
//!     .duration(0.4)
//!     .easing(Easing::EaseOutCubic)
//!     .start();
//!
//! // In the host's frame callback:
//! blinc_tween::scheduler::tick();
//! ```

pub mod clock;
pub mod easing;
pub mod extend;
pub mod options;
pub mod registry;
pub mod scheduler;
pub mod timeline;
pub mod tween;
pub mod validation;
pub mod value;

mod runtime;

pub use easing::{Easing, ParseEasingError};
pub use options::{TimelineOptions, TweenOptions};
pub use registry::{Extension, InterpolateFn, Registry, ValidateFn};
pub use scheduler::{Animation, AnimationId, FrameDriver, FrameHandle};
pub use timeline::{Position, Timeline};
pub use tween::{Callback, ProgressCallback, Tween, REPEAT_INFINITE};
pub use validation::{ErrorMap, ValidationError};
pub use value::{SharedState, State, Step, Value, ValueKind};
