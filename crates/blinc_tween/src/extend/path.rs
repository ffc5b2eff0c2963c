//! Path segment arrays
//!
//! Only absolute `M`, `L`, `C` and `Z` commands are handled. Two paths can be
//! interpolated when they have the same segments in the same order; morphing
//! between different structures needs preprocessing outside this crate.

use super::{join_args, lerp, round_to, split_tagged};
use crate::value::{Step, Value};
use serde_json::Value as Json;
use std::fmt::Write;

/// Number of arguments for a supported command
fn command_arity(command: &str) -> Option<usize> {
    match command {
        "M" | "L" => Some(2),
        "C" => Some(6),
        "Z" => Some(0),
        _ => None,
    }
}

/// Interpolate segment coordinates, skipping `Z`
pub fn interpolate_path(target: &mut Value, start: &Value, end: &Value, t: f64) {
    let (Value::Steps(target), Value::Steps(start), Value::Steps(end)) = (target, start, end)
    else {
        return;
    };
    for ((segment, a), b) in target.iter_mut().zip(start).zip(end) {
        if segment.tag == "Z" {
            continue;
        }
        for ((slot, a), b) in segment.args.iter_mut().zip(&a.args).zip(&b.args) {
            *slot = lerp(*a, *b, t);
        }
    }
}

fn is_valid_segment(segment: &Json) -> bool {
    match split_tagged(segment) {
        Some((command, args)) => {
            command_arity(command) == Some(args.len()) && args.iter().all(Json::is_number)
        }
        None => false,
    }
}

fn is_valid_path(value: &Json) -> bool {
    match value.as_array() {
        Some(segments) => segments.len() > 1 && segments.iter().all(is_valid_segment),
        None => false,
    }
}

/// Accept well formed paths matching the reference segment by segment
pub fn validate_path(prop: &str, value: &Json, reference: Option<&Json>) -> Result<(), String> {
    if !is_valid_path(value) {
        return Err(format!("Property \"{prop}\" is not a valid PathArray."));
    }
    let Some(expected) = reference.and_then(Json::as_array) else {
        return Ok(());
    };
    let segments = value.as_array().map(Vec::as_slice).unwrap_or_default();

    if expected.len() != segments.len() {
        return Err(format!(
            "Property \"{prop}\" is expecting an array of {} path segments, got {}.",
            expected.len(),
            segments.len()
        ));
    }

    for (index, (segment, reference)) in segments.iter().zip(expected).enumerate() {
        let (command, args) = split_tagged(segment).unwrap_or_default();
        let (ref_command, ref_args) = split_tagged(reference).unwrap_or_default();
        if command != ref_command || args.len() != ref_args.len() {
            return Err(format!(
                "Property \"{prop}\" mismatch at index {index}. Segments don't match:\n\
                 > segment: \"[{command}, {}]\"\n\
                 > reference: \"[{ref_command}, {}]\"",
                join_args(args),
                join_args(ref_args)
            ));
        }
    }
    Ok(())
}

/// Concatenate segments into an SVG path string
///
/// Values are rounded to `round` decimals; 4 is a good default for display.
pub fn path_to_string(path: &[Step], round: u32) -> String {
    let mut out = String::new();
    for segment in path {
        out.push_str(&segment.tag);
        for (index, value) in segment.args.iter().enumerate() {
            if index > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{}", round_to(*value, round));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn steps(json: Json) -> Value {
        Value::from_json(&json).unwrap()
    }

    #[test]
    fn test_interpolate_path() {
        let start = steps(json!([["M", 0, 0], ["C", 0, 0, 0, 0, 0, 0], ["Z"]]));
        let end = steps(json!([["M", 10, 20], ["C", 2, 4, 6, 8, 10, 12], ["Z"]]));
        let mut target = start.clone();

        interpolate_path(&mut target, &start, &end, 0.5);
        assert_eq!(
            target,
            steps(json!([["M", 5, 10], ["C", 1, 2, 3, 4, 5, 6], ["Z"]]))
        );
    }

    #[test]
    fn test_validate_path_shape() {
        assert!(validate_path("d", &json!([["M", 0, 0], ["L", 5, 5]]), None).is_ok());

        let invalid = "Property \"d\" is not a valid PathArray.".to_owned();
        assert_eq!(validate_path("d", &json!([["M", 0, 0]]), None), Err(invalid.clone()));
        assert_eq!(validate_path("d", &json!([["M", 0], ["L", 1, 1]]), None), Err(invalid.clone()));
        assert_eq!(validate_path("d", &json!([["Q", 0, 0], ["L", 1, 1]]), None), Err(invalid.clone()));
        assert_eq!(validate_path("d", &json!("M0 0"), None), Err(invalid));
    }

    #[test]
    fn test_validate_path_against_reference() {
        let reference = json!([["M", 0, 0], ["L", 5, 5], ["Z"]]);

        assert_eq!(
            validate_path("d", &json!([["M", 0, 0], ["L", 5, 5]]), Some(&reference)),
            Err("Property \"d\" is expecting an array of 3 path segments, got 2.".to_owned())
        );
        assert_eq!(
            validate_path(
                "d",
                &json!([["M", 0, 0], ["C", 1, 1, 2, 2, 3, 3], ["Z"]]),
                Some(&reference)
            ),
            Err("Property \"d\" mismatch at index 1. Segments don't match:\n\
                 > segment: \"[C, 1,1,2,2,3,3]\"\n\
                 > reference: \"[L, 5,5]\""
                .to_owned())
        );
        assert!(validate_path("d", &json!([["M", 1, 1], ["L", 2, 2], ["Z"]]), Some(&reference)).is_ok());
    }

    #[test]
    fn test_path_to_string() {
        let path = vec![
            Step::new("M", &[0.0, 0.0]),
            Step::new("L", &[10.123456, 20.5]),
            Step::new("Z", &[]),
        ];
        assert_eq!(path_to_string(&path, 4), "M0 0L10.1235 20.5Z");
        assert_eq!(path_to_string(&path, 0), "M0 0L10 21Z");
    }
}
