//! Animatable values and the live state they live in
//!
//! A [`State`] is an ordered record of property names to [`Value`]s. Values
//! come in four shapes: plain numbers, flat numeric arrays, single-level
//! numeric records, and arrays of tagged steps (path segments, transform
//! functions). The shape is fixed once a property is validated, so the
//! per-frame code dispatches on the enum tag instead of inspecting data.
//!
//! Configuration arrives as JSON ([`serde_json::Value`]) and is converted into
//! these types exactly once, after validation.

use crate::validation::ValidationError;
use indexmap::IndexMap;
use serde_json::Value as Json;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

/// Numeric arguments of a [`Step`]; cubic segments need six
pub type StepArgs = SmallVec<[f64; 6]>;

/// Live state shared between the caller and the animations driving it
pub type SharedState = Rc<RefCell<State>>;

/// A tagged tuple such as `["C", 0, 0, 10, 10, 20, 20]` or `["rotate", 45]`
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    /// Command letter or transform function name
    pub tag: String,
    /// Numeric arguments following the tag
    pub args: StepArgs,
}

impl Step {
    /// Create a step from a tag and its arguments
    pub fn new(tag: impl Into<String>, args: &[f64]) -> Self {
        Self {
            tag: tag.into(),
            args: SmallVec::from_slice(args),
        }
    }

    fn from_json(json: &Json) -> Option<Self> {
        let items = json.as_array()?;
        let (tag, rest) = items.split_first()?;
        let tag = tag.as_str()?;
        let args = rest.iter().map(Json::as_f64).collect::<Option<StepArgs>>()?;
        Some(Self {
            tag: tag.to_owned(),
            args,
        })
    }

    fn to_json(&self) -> Json {
        let mut items = Vec::with_capacity(self.args.len() + 1);
        items.push(Json::from(self.tag.as_str()));
        items.extend(self.args.iter().map(|v| Json::from(*v)));
        Json::Array(items)
    }
}

/// Shape of a [`Value`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Array,
    Record,
    Steps,
}

/// An animatable property value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Plain number
    Number(f64),
    /// Flat numeric array (colors, points)
    Array(Vec<f64>),
    /// Single-level record of numbers (`{ x: 0, y: 0 }`)
    Record(IndexMap<String, f64>),
    /// Tagged steps (path segments, transform functions)
    Steps(Vec<Step>),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Array(_) => ValueKind::Array,
            Value::Record(_) => ValueKind::Record,
            Value::Steps(_) => ValueKind::Steps,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[f64]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&IndexMap<String, f64>> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_steps(&self) -> Option<&[Step]> {
        match self {
            Value::Steps(steps) => Some(steps),
            _ => None,
        }
    }

    /// Convert a JSON value into one of the four supported shapes
    ///
    /// Returns `None` for anything else (strings, booleans, null, nested
    /// records, mixed arrays).
    pub fn from_json(json: &Json) -> Option<Self> {
        match json {
            Json::Number(n) => n.as_f64().map(Value::Number),
            Json::Array(items) => {
                if let Some(numbers) = items.iter().map(Json::as_f64).collect::<Option<Vec<_>>>() {
                    return Some(Value::Array(numbers));
                }
                items
                    .iter()
                    .map(Step::from_json)
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Steps)
            }
            Json::Object(map) => map
                .iter()
                .map(|(key, value)| value.as_f64().map(|n| (key.clone(), n)))
                .collect::<Option<IndexMap<_, _>>>()
                .map(Value::Record),
            _ => None,
        }
    }

    /// Convert back to JSON, used to validate against existing state
    pub fn to_json(&self) -> Json {
        match self {
            Value::Number(n) => Json::from(*n),
            Value::Array(values) => values.iter().map(|v| Json::from(*v)).collect(),
            Value::Record(record) => Json::Object(
                record
                    .iter()
                    .map(|(key, value)| (key.clone(), Json::from(*value)))
                    .collect(),
            ),
            Value::Steps(steps) => steps.iter().map(Step::to_json).collect(),
        }
    }

    /// Copy `source` into `self`, reusing existing allocations where the
    /// shapes line up
    pub fn assign_from(&mut self, source: &Value) {
        match (self, source) {
            (Value::Number(target), Value::Number(source)) => *target = *source,
            (Value::Array(target), Value::Array(source)) => {
                if target.len() == source.len() {
                    target.copy_from_slice(source);
                } else {
                    target.clone_from(source);
                }
            }
            (Value::Record(target), Value::Record(source)) => {
                for (key, value) in source {
                    match target.get_mut(key) {
                        Some(slot) => *slot = *value,
                        None => {
                            target.insert(key.clone(), *value);
                        }
                    }
                }
            }
            (Value::Steps(target), Value::Steps(source)) => {
                let same_layout = target.len() == source.len()
                    && target
                        .iter()
                        .zip(source)
                        .all(|(a, b)| a.tag == b.tag && a.args.len() == b.args.len());
                if same_layout {
                    for (step, src) in target.iter_mut().zip(source) {
                        step.args.copy_from_slice(&src.args);
                    }
                } else {
                    target.clone_from(source);
                }
            }
            (target, source) => *target = source.clone(),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::Array(values)
    }
}

impl From<IndexMap<String, f64>> for Value {
    fn from(record: IndexMap<String, f64>) -> Self {
        Value::Record(record)
    }
}

impl From<Vec<Step>> for Value {
    fn from(steps: Vec<Step>) -> Self {
        Value::Steps(steps)
    }
}

/// JavaScript-style type name used in validation messages
pub(crate) fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Ordered record of animated properties
///
/// Property order is insertion order and is the order in which animations
/// update them. Properties are never removed by the engine, which keeps the
/// slot indices cached by running animations stable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct State {
    values: IndexMap<String, Value>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a property
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Parse a state from a JSON object
    ///
    /// Fails with the first property whose value has no supported shape.
    pub fn from_json(json: &Json) -> Result<Self, ValidationError> {
        let map = match json.as_object() {
            Some(map) if !map.is_empty() => map,
            _ => return Err(ValidationError::Empty),
        };

        let mut values = IndexMap::with_capacity(map.len());
        for (key, value) in map {
            let parsed = Value::from_json(value).ok_or_else(|| ValidationError::Unsupported {
                prop: key.clone(),
                kind: json_kind(value),
            })?;
            values.insert(key.clone(), parsed);
        }
        Ok(Self { values })
    }

    pub fn to_json(&self) -> Json {
        Json::Object(
            self.values
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Wrap into a shared handle
    pub fn into_shared(self) -> SharedState {
        Rc::new(RefCell::new(self))
    }

    /// Insert or replace a property, keeping its position if it exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.values.get_mut(key)
    }

    /// Shortcut for numeric properties
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_number)
    }

    pub fn array(&self, key: &str) -> Option<&[f64]> {
        self.get(key).and_then(Value::as_array)
    }

    pub fn record(&self, key: &str) -> Option<&IndexMap<String, f64>> {
        self.get(key).and_then(Value::as_record)
    }

    pub fn steps(&self, key: &str) -> Option<&[Step]> {
        self.get(key).and_then(Value::as_steps)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Slot index of a property, stable for the lifetime of the state
    pub(crate) fn slot_of(&self, key: &str) -> Option<usize> {
        self.values.get_index_of(key)
    }

    pub(crate) fn slot(&self, slot: usize) -> Option<&Value> {
        self.values.get_index(slot).map(|(_, value)| value)
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> Option<&mut Value> {
        self.values.get_index_mut(slot).map(|(_, value)| value)
    }

    /// Deep-assign every property of `source` onto this state in place
    pub fn assign_from(&mut self, source: &State) {
        for (key, value) in &source.values {
            match self.values.get_mut(key) {
                Some(target) => target.assign_from(value),
                None => {
                    self.values.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for State
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
