//! Flat numeric arrays

use super::lerp;
use crate::value::Value;
use serde_json::Value as Json;

/// Interpolate every element of two equally long arrays
pub fn interpolate_array(target: &mut Value, start: &Value, end: &Value, t: f64) {
    let (Value::Array(target), Value::Array(start), Value::Array(end)) = (target, start, end)
    else {
        return;
    };
    for ((slot, a), b) in target.iter_mut().zip(start).zip(end) {
        *slot = lerp(*a, *b, t);
    }
}

/// Accept arrays of numbers matching the reference length
pub fn validate_array(prop: &str, value: &Json, reference: Option<&Json>) -> Result<(), String> {
    let Some(items) = value.as_array() else {
        return Err(format!("Property \"{prop}\" is not Array."));
    };
    if !items.iter().all(Json::is_number) {
        return Err(format!("Property \"{prop}\" is not a valid Array<number>."));
    }
    if let Some(expected) = reference.and_then(Json::as_array) {
        if expected.len() != items.len() {
            return Err(format!(
                "Property \"{prop}\" is expecting an array of {} numbers.",
                expected.len()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_interpolate_array() {
        let start = Value::Array(vec![0.0, 0.0, 0.0]);
        let end = Value::Array(vec![255.0, 128.0, 10.0]);
        let mut target = start.clone();

        interpolate_array(&mut target, &start, &end, 0.5);
        assert_eq!(target, Value::Array(vec![127.5, 64.0, 5.0]));

        interpolate_array(&mut target, &start, &end, 1.0);
        assert_eq!(target, end);
    }

    #[test]
    fn test_validate_array() {
        assert!(validate_array("rgb", &json!([1, 2, 3]), None).is_ok());
        assert!(validate_array("rgb", &json!([1, 2, 3]), Some(&json!([0, 0, 0]))).is_ok());

        assert_eq!(
            validate_array("rgb", &json!(5), None),
            Err("Property \"rgb\" is not Array.".to_owned())
        );
        assert_eq!(
            validate_array("rgb", &json!([1, "2"]), None),
            Err("Property \"rgb\" is not a valid Array<number>.".to_owned())
        );
        assert_eq!(
            validate_array("rgb", &json!([1, 2]), Some(&json!([0, 0, 0]))),
            Err("Property \"rgb\" is expecting an array of 3 numbers.".to_owned())
        );
    }
}
