//! Transform step arrays
//!
//! A transform is a list of steps such as `["translate", 10, 20]` or
//! `["rotate", 45]`. Like paths, two transforms interpolate when they have the
//! same steps in the same order with the same argument counts.

use super::{join_args, lerp, split_tagged};
use crate::value::{Step, Value};
use serde_json::Value as Json;
use std::fmt::Write;

/// Accepted argument counts for a supported step
fn step_arity(function: &str) -> Option<(usize, usize)> {
    match function {
        "translate" | "rotate" | "scale" => Some((1, 3)),
        "rotateAxisAngle" => Some((4, 4)),
        "skewX" | "skewY" | "perspective" => Some((1, 1)),
        _ => None,
    }
}

/// Interpolate the arguments of every supported step
pub fn interpolate_transform(target: &mut Value, start: &Value, end: &Value, t: f64) {
    let (Value::Steps(target), Value::Steps(start), Value::Steps(end)) = (target, start, end)
    else {
        return;
    };
    for ((step, a), b) in target.iter_mut().zip(start).zip(end) {
        if step_arity(&step.tag).is_none() {
            continue;
        }
        for ((slot, a), b) in step.args.iter_mut().zip(&a.args).zip(&b.args) {
            *slot = lerp(*a, *b, t);
        }
    }
}

fn is_valid_step(step: &Json) -> bool {
    let Some((function, args)) = split_tagged(step) else {
        return false;
    };
    match step_arity(function) {
        Some((min, max)) => {
            (min..=max).contains(&args.len()) && args.iter().all(Json::is_number)
        }
        None => false,
    }
}

/// Accept well formed transforms matching the reference step by step
pub fn validate_transform(
    prop: &str,
    value: &Json,
    reference: Option<&Json>,
) -> Result<(), String> {
    let steps = match value.as_array() {
        Some(steps) if !steps.is_empty() && steps.iter().all(is_valid_step) => steps,
        _ => return Err(format!("Property \"{prop}\" must be an array of TransformStep.")),
    };
    let Some(expected) = reference.and_then(Json::as_array) else {
        return Ok(());
    };

    if expected.len() != steps.len() {
        return Err(format!(
            "Property \"{prop}\" is expecting an array of {} transform steps, got {}.",
            expected.len(),
            steps.len()
        ));
    }

    for (index, (step, reference)) in steps.iter().zip(expected).enumerate() {
        let (function, args) = split_tagged(step).unwrap_or_default();
        let (ref_function, ref_args) = split_tagged(reference).unwrap_or_default();
        if function != ref_function || args.len() != ref_args.len() {
            return Err(format!(
                "Property \"{prop}\" mismatch at index {index}:\n\
                 > step: [\"{function}\", {}]\n\
                 > reference: [\"{ref_function}\", {}]",
                join_args(args),
                join_args(ref_args)
            ));
        }
    }
    Ok(())
}

/// Render steps as a CSS `transform` value
///
/// Translations and perspective are in pixels, angles in degrees.
pub fn transform_to_string(steps: &[Step]) -> String {
    let mut out = String::new();
    for step in steps {
        let args = &step.args;
        let arg = |index: usize, fallback: f64| args.get(index).copied().unwrap_or(fallback);
        let first = arg(0, 0.0);

        let _ = match step.tag.as_str() {
            "perspective" => write!(out, " perspective({first}px)"),
            "translate" => write!(
                out,
                " translate3d({first}px, {}px, {}px)",
                arg(1, 0.0),
                arg(2, 0.0)
            ),
            "rotate" if args.len() == 1 => write!(out, " rotate({first}deg)"),
            "rotate" => {
                let _ = write!(out, " rotateX({first}deg)");
                if let Some(y) = args.get(1) {
                    let _ = write!(out, " rotateY({y}deg)");
                }
                match args.get(2) {
                    Some(z) => write!(out, " rotateZ({z}deg)"),
                    None => Ok(()),
                }
            }
            "rotateAxisAngle" => write!(
                out,
                " rotate3d({first}, {}, {}, {}deg)",
                arg(1, 0.0),
                arg(2, 0.0),
                arg(3, 0.0)
            ),
            "scale" => write!(
                out,
                " scale({first}, {}, {})",
                arg(1, first),
                arg(2, 1.0)
            ),
            "skewX" => write!(out, " skewX({first}deg)"),
            "skewY" => write!(out, " skewY({first}deg)"),
            _ => Ok(()),
        };
    }
    out.trim_start().to_owned()
}

/// Convert euler angles (radians) into `[x, y, z, angle]` for a
/// `rotateAxisAngle` step
pub fn euler_to_axis_angle(x: f64, y: f64, z: f64) -> [f64; 4] {
    let (sx, cx) = (x / 2.0).sin_cos();
    let (sy, cy) = (y / 2.0).sin_cos();
    let (sz, cz) = (z / 2.0).sin_cos();

    let w = cx * cy * cz + sx * sy * sz;
    let qx = sx * cy * cz - cx * sy * sz;
    let qy = cx * sy * cz + sx * cy * sz;
    let qz = cx * cy * sz - sx * sy * cz;

    let len = (qx * qx + qy * qy + qz * qz).sqrt();
    if len < 1e-4 {
        return [0.0, 0.0, 1.0, 0.0];
    }
    let angle = 2.0 * w.clamp(-1.0, 1.0).acos();
    [qx / len, qy / len, qz / len, angle]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_interpolate_transform() {
        let start = Value::from_json(&json!([["translate", 0, 0], ["rotate", 0], ["scale", 1]])).unwrap();
        let end = Value::from_json(&json!([["translate", 50, 10], ["rotate", 90], ["scale", 2]])).unwrap();
        let mut target = start.clone();

        interpolate_transform(&mut target, &start, &end, 0.5);
        let steps = target.as_steps().unwrap();
        assert_eq!(steps[0].args.as_slice(), &[25.0, 5.0]);
        assert_eq!(steps[1].args.as_slice(), &[45.0]);
        assert_eq!(steps[2].args.as_slice(), &[1.5]);
    }

    #[test]
    fn test_validate_transform_shape() {
        let invalid = "Property \"transform\" must be an array of TransformStep.".to_owned();
        assert!(validate_transform("transform", &json!([["rotate", 1, 2, 3]]), None).is_ok());
        assert!(validate_transform("transform", &json!([["rotateAxisAngle", 0, 0, 1, 45]]), None).is_ok());

        assert_eq!(validate_transform("transform", &json!([]), None), Err(invalid.clone()));
        assert_eq!(
            validate_transform("transform", &json!([["rotate", 1, 2, 3, 4]]), None),
            Err(invalid.clone())
        );
        assert_eq!(
            validate_transform("transform", &json!([["skewX", 1, 2]]), None),
            Err(invalid.clone())
        );
        assert_eq!(
            validate_transform("transform", &json!([["matrix", 1]]), None),
            Err(invalid)
        );
    }

    #[test]
    fn test_validate_transform_against_reference() {
        let reference = json!([["translate", 0, 0], ["rotate", 0]]);
        assert_eq!(
            validate_transform("transform", &json!([["translate", 1, 1]]), Some(&reference)),
            Err("Property \"transform\" is expecting an array of 2 transform steps, got 1.".to_owned())
        );
        assert_eq!(
            validate_transform(
                "transform",
                &json!([["translate", 1], ["rotate", 45]]),
                Some(&reference)
            ),
            Err("Property \"transform\" mismatch at index 0:\n\
                 > step: [\"translate\", 1]\n\
                 > reference: [\"translate\", 0,0]"
                .to_owned())
        );
    }

    #[test]
    fn test_transform_to_string() {
        let steps = vec![
            Step::new("perspective", &[400.0]),
            Step::new("translate", &[10.0]),
            Step::new("rotate", &[45.0]),
            Step::new("rotate", &[10.0, 20.0]),
            Step::new("scale", &[1.5]),
            Step::new("skewX", &[5.0]),
        ];
        assert_eq!(
            transform_to_string(&steps),
            "perspective(400px) translate3d(10px, 0px, 0px) rotate(45deg) \
             rotateX(10deg) rotateY(20deg) scale(1.5, 1.5, 1) skewX(5deg)"
        );
    }

    #[test]
    fn test_euler_to_axis_angle() {
        assert_eq!(euler_to_axis_angle(0.0, 0.0, 0.0), [0.0, 0.0, 1.0, 0.0]);

        let [x, y, z, angle] = euler_to_axis_angle(FRAC_PI_2, 0.0, 0.0);
        assert!((x - 1.0).abs() < 1e-9);
        assert!(y.abs() < 1e-9 && z.abs() < 1e-9);
        assert!((angle - FRAC_PI_2).abs() < 1e-9);
    }
}
