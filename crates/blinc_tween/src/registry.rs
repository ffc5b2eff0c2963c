//! Per-animation extension registry
//!
//! Properties that are not plain numbers need an [`Extension`]: a pair of
//! functions that interpolate and validate values of that property. Each
//! tween or timeline owns its own registry, keyed by property name.

use crate::value::Value;
use rustc_hash::FxHashMap;
use serde_json::Value as Json;

/// Write the value at `t` between `start` and `end` into `target`
///
/// `target`, `start` and `end` share a shape once validation passed, so an
/// implementation may ignore mismatched input.
pub type InterpolateFn = fn(target: &mut Value, start: &Value, end: &Value, t: f64);

/// Check a candidate value against the property's existing value
///
/// `reference` is `None` while the initial state is validated. The error is
/// a human readable message naming the property.
pub type ValidateFn = fn(prop: &str, value: &Json, reference: Option<&Json>) -> Result<(), String>;

/// Interpolator and validator pair for one kind of value
#[derive(Clone, Copy, Debug)]
pub struct Extension {
    pub interpolate: InterpolateFn,
    pub validate: ValidateFn,
}

impl Extension {
    pub const fn new(interpolate: InterpolateFn, validate: ValidateFn) -> Self {
        Self {
            interpolate,
            validate,
        }
    }
}

/// Property name to extension map
#[derive(Clone, Debug, Default)]
pub struct Registry {
    extensions: FxHashMap<String, Extension>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension for `property`
    ///
    /// The first registration wins. Returns false if the property already
    /// had one.
    pub fn register(&mut self, property: &str, extension: Extension) -> bool {
        if self.extensions.contains_key(property) {
            return false;
        }
        self.extensions.insert(property.to_owned(), extension);
        true
    }

    pub fn get(&self, property: &str) -> Option<&Extension> {
        self.extensions.get(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.extensions.contains_key(property)
    }

    pub fn interpolator(&self, property: &str) -> Option<InterpolateFn> {
        self.get(property).map(|ext| ext.interpolate)
    }

    pub fn validator(&self, property: &str) -> Option<ValidateFn> {
        self.get(property).map(|ext| ext.validate)
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn clear(&mut self) {
        self.extensions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lerp_nothing(_: &mut Value, _: &Value, _: &Value, _: f64) {}

    fn accept(_: &str, _: &Json, _: Option<&Json>) -> Result<(), String> {
        Ok(())
    }

    fn reject(prop: &str, _: &Json, _: Option<&Json>) -> Result<(), String> {
        Err(format!("Property \"{prop}\" rejected."))
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = Registry::new();
        assert!(registry.register("rgb", Extension::new(lerp_nothing, accept)));
        assert!(!registry.register("rgb", Extension::new(lerp_nothing, reject)));

        let validate = registry.validator("rgb").unwrap();
        assert!(validate("rgb", &Json::Null, None).is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_missing() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.get("x").is_none());
        assert!(registry.interpolator("x").is_none());
    }
}
