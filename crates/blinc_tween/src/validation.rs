//! Configuration validation
//!
//! Every payload handed to a tween or timeline is checked against the live
//! state before it is converted into [`Value`]s. Problems are recorded per
//! property in an [`ErrorMap`] and never raised: the entity refuses the
//! operation and the caller polls `is_valid()` / `errors()`.

use crate::registry::{Extension, Registry};
use crate::value::{json_kind, State, Value};
use indexmap::IndexMap;
use serde_json::Value as Json;
use thiserror::Error;

/// Key used for errors about the payload as a whole
pub const INIT_KEY: &str = "init";

/// Validation failures, keyed by property in an [`ErrorMap`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Payload is empty or not an object
    #[error("Initialization value is empty or not an object.")]
    Empty,

    /// Property is null
    #[error("Property \"{0}\" is null/undefined.")]
    Missing(String),

    /// Property was never part of the initial state
    #[error("Property \"{0}\" doesn't exist in state yet.")]
    NotInState(String),

    /// Numeric property received something else
    #[error("Property \"{0}\" is not a number.")]
    NotANumber(String),

    /// No extension handles this kind of value
    #[error("Property \"{prop}\" of type \"{kind}\" is not supported yet.")]
    Unsupported { prop: String, kind: &'static str },

    /// Segment easing name could not be parsed
    #[error("Easing \"{0}\" is not recognized.")]
    UnknownEasing(String),

    /// Reason returned by an extension validator
    #[error("{0}")]
    Rejected(String),
}

/// Property name to error, in order of discovery
pub type ErrorMap = IndexMap<String, ValidationError>;

/// Validate `target` and record problems in `errors`
///
/// With a `reference`, properties must already exist in it and keep their
/// kind. Without one (initial state) only the value shapes are checked.
pub fn validate_values(
    errors: &mut ErrorMap,
    registry: &Registry,
    target: &Json,
    reference: Option<&State>,
) {
    let map = match target.as_object() {
        Some(map) if !map.is_empty() => map,
        _ => {
            errors.insert(INIT_KEY.to_owned(), ValidationError::Empty);
            return;
        }
    };

    for (prop, value) in map {
        match check_property(registry, prop, value, reference) {
            Ok(()) => {
                errors.shift_remove(prop);
            }
            Err(error) => {
                errors.insert(prop.clone(), error);
            }
        }
    }
    errors.shift_remove(INIT_KEY);
}

fn check_property(
    registry: &Registry,
    prop: &str,
    value: &Json,
    reference: Option<&State>,
) -> Result<(), ValidationError> {
    if value.is_number() {
        return Ok(());
    }
    if value.is_null() {
        return Err(ValidationError::Missing(prop.to_owned()));
    }

    let ref_value = match reference {
        Some(state) => match state.get(prop) {
            Some(value) => Some(value),
            None => return Err(ValidationError::NotInState(prop.to_owned())),
        },
        None => None,
    };

    if let Some(validate) = registry.validator(prop) {
        let ref_json = ref_value.map(Value::to_json);
        return validate(prop, value, ref_json.as_ref()).map_err(ValidationError::Rejected);
    }

    if let Some(Value::Number(_)) = ref_value {
        return Err(ValidationError::NotANumber(prop.to_owned()));
    }

    Err(ValidationError::Unsupported {
        prop: prop.to_owned(),
        kind: json_kind(value),
    })
}

/// Validation state shared by tweens and timelines
///
/// Holds the registry, the error map, the base snapshot and, until the
/// initial state validates, the pending initial payload. Registering an
/// extension re-evaluates the pending payload, which is how an entity built
/// with non-numeric values becomes valid.
#[derive(Debug)]
pub(crate) struct StateGuard {
    registry: Registry,
    errors: ErrorMap,
    pending: Option<Json>,
    base: State,
}

impl StateGuard {
    /// Validate `initial` and, if it passes, adopt it into `live`
    pub(crate) fn new(initial: Json, live: &mut State) -> Self {
        let mut guard = Self {
            registry: Registry::new(),
            errors: ErrorMap::new(),
            pending: Some(initial),
            base: State::new(),
        };
        guard.evaluate_pending(live);
        guard
    }

    /// True once the initial state validated
    pub(crate) fn is_initialized(&self) -> bool {
        self.pending.is_none()
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Snapshot of the state taken when it was adopted
    pub(crate) fn base(&self) -> &State {
        &self.base
    }

    pub(crate) fn record(&mut self, prop: &str, error: ValidationError) {
        self.errors.insert(prop.to_owned(), error);
    }

    /// Replace every recorded error with `error`
    pub(crate) fn reject(&mut self, prop: &str, error: ValidationError) {
        self.errors.clear();
        self.record(prop, error);
    }

    /// Register an extension and re-evaluate the pending initial state
    pub(crate) fn register(&mut self, property: &str, extension: Extension, live: &mut State) {
        if self.registry.register(property, extension) {
            tracing::debug!(property, "registered value extension");
        }
        self.evaluate_pending(live);
    }

    fn evaluate_pending(&mut self, live: &mut State) {
        let Some(pending) = self.pending.as_ref() else {
            return;
        };

        self.errors.clear();
        validate_values(&mut self.errors, &self.registry, pending, None);
        if !self.errors.is_empty() {
            return;
        }

        match State::from_json(pending) {
            Ok(parsed) => {
                if live.is_empty() {
                    *live = parsed;
                }
                self.base = live.clone();
                self.pending = None;
            }
            Err(error) => {
                let key = match &error {
                    ValidationError::Unsupported { prop, .. } => prop.clone(),
                    _ => INIT_KEY.to_owned(),
                };
                self.errors.insert(key, error);
            }
        }
    }

    /// Validate a `to()` / `from()` payload against the live state and
    /// convert it
    ///
    /// Returns `None` and keeps the errors if anything is wrong.
    pub(crate) fn accept(
        &mut self,
        values: &Json,
        live: &State,
    ) -> Option<IndexMap<String, Value>> {
        self.errors.clear();
        validate_values(&mut self.errors, &self.registry, values, Some(live));
        if !self.errors.is_empty() {
            tracing::debug!(errors = self.errors.len(), "rejected animation payload");
            return None;
        }

        let map = values.as_object()?;
        let mut converted = IndexMap::with_capacity(map.len());
        for (prop, value) in map {
            match Value::from_json(value) {
                Some(parsed) => {
                    converted.insert(prop.clone(), parsed);
                }
                None => {
                    self.errors.insert(
                        prop.clone(),
                        ValidationError::Unsupported {
                            prop: prop.clone(),
                            kind: json_kind(value),
                        },
                    );
                }
            }
        }

        if self.errors.is_empty() {
            Some(converted)
        } else {
            tracing::debug!(errors = self.errors.len(), "rejected animation payload");
            None
        }
    }

    /// Log every recorded reason
    pub(crate) fn report(&self, entity: &'static str) {
        let reasons = self
            .errors
            .values()
            .map(|error| format!("- {error}"))
            .collect::<Vec<_>>()
            .join("\n");
        tracing::warn!(entity, "failed validation:\n{reasons}");
    }
}
