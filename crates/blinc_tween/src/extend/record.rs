//! Single-level numeric records

use super::lerp;
use crate::value::{json_kind, Value};
use serde_json::Value as Json;

/// Interpolate every key present in `end`
///
/// Keys missing from `target` or `start` are left alone.
pub fn interpolate_record(target: &mut Value, start: &Value, end: &Value, t: f64) {
    let (Value::Record(target), Value::Record(start), Value::Record(end)) = (target, start, end)
    else {
        return;
    };
    for (key, b) in end {
        if let (Some(slot), Some(a)) = (target.get_mut(key), start.get(key)) {
            *slot = lerp(*a, *b, t);
        }
    }
}

/// Accept flat records of numbers whose keys exist in the reference
pub fn validate_record(prop: &str, value: &Json, reference: Option<&Json>) -> Result<(), String> {
    let Some(map) = value.as_object() else {
        return Err(format!("Property \"{prop}\" must be a plain object."));
    };

    for (key, item) in map {
        if item.is_null() {
            return Err(format!("Property \"{key}\" from \"{prop}\" is null/undefined."));
        }
        if !item.is_number() {
            let detail = if item.is_object() {
                " Deeper nested objects are not supported.".to_owned()
            } else {
                format!(" Unsupported value: \"{}\".", json_kind(item))
            };
            return Err(format!("Property \"{key}\" from \"{prop}\" must be a number.{detail}"));
        }
        if let Some(reference) = reference {
            if reference.get(key).is_none() {
                return Err(format!(
                    "Property \"{key}\" in \"{prop}\" doesn't exist in the reference object."
                ));
            }
        }
    }
    Ok(())
}
