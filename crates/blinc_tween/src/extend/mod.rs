//! Built-in value extensions
//!
//! Register these with `use_extension` on a tween or timeline to animate
//! non-numeric properties:
//!
//! | Extension     | Value shape                              |
//! |---------------|------------------------------------------|
//! | [`ARRAY`]     | `[r, g, b]`                              |
//! | [`RECORD`]    | `{ "x": 0, "y": 0 }`                     |
//! | [`PATH`]      | `[["M", 0, 0], ["L", 50, 50], ["Z"]]`    |
//! | [`TRANSFORM`] | `[["translate", 10, 0], ["rotate", 45]]` |

pub mod array;
pub mod path;
pub mod record;
pub mod transform;

use crate::registry::Extension;
use serde_json::Value as Json;

pub use path::path_to_string;
pub use transform::transform_to_string;

/// Flat numeric arrays of a fixed length
pub const ARRAY: Extension = Extension::new(array::interpolate_array, array::validate_array);

/// Single-level records of numbers
pub const RECORD: Extension = Extension::new(record::interpolate_record, record::validate_record);

/// Path segment arrays (`M`, `L`, `C`, `Z`)
pub const PATH: Extension = Extension::new(path::interpolate_path, path::validate_path);

/// Transform step arrays
pub const TRANSFORM: Extension =
    Extension::new(transform::interpolate_transform, transform::validate_transform);

#[inline]
pub(crate) fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

/// Round `n` to `round` decimals, halves rounding up
pub fn round_to(n: f64, round: u32) -> f64 {
    if round == 0 {
        return (n + 0.5).floor();
    }
    let pow = 10f64.powi(round as i32);
    (n * pow + 0.5).floor() / pow
}

/// Comma separated rendering of tuple arguments for error messages
pub(crate) fn join_args(values: &[Json]) -> String {
    values
        .iter()
        .map(|value| match value {
            Json::String(s) => s.clone(),
            Json::Null => String::new(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Split `["tag", ...args]` into its parts
pub(crate) fn split_tagged(value: &Json) -> Option<(&str, &[Json])> {
    let items = value.as_array()?;
    let (tag, args) = items.split_first()?;
    Some((tag.as_str()?, args))
}
