//! Catalog field groups
//!
//! A catalog object is a `Hash` of named fields. Values are deserialized
//! straight from JSON; accessors return `None` when a key is absent or has
//! the wrong shape.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tagged catalog value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Hash(Hash),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Hash(_) => "property group",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&Hash> {
        match self {
            Value::Hash(hash) => Some(hash),
            _ => None,
        }
    }

    /// Three numeric array elements
    pub fn as_vector(&self) -> Option<Vector3<f64>> {
        match self.as_array()? {
            [x, y, z] => Some(Vector3::new(x.as_number()?, y.as_number()?, z.as_number()?)),
            _ => None,
        }
    }

    /// Array of numbers of any length
    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        self.as_array()?.iter().map(Value::as_number).collect()
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Hash> for Value {
    fn from(hash: Hash) -> Self {
        Value::Hash(hash)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// RGBA color, components in [0, 1]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Named field group
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hash {
    fields: BTreeMap<String, Value>,
}

impl Hash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get_value(key)?.as_number()
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get_value(key)?.as_str()
    }

    pub fn get_boolean(&self, key: &str) -> Option<bool> {
        self.get_value(key)?.as_bool()
    }

    pub fn get_vector(&self, key: &str) -> Option<Vector3<f64>> {
        self.get_value(key)?.as_vector()
    }

    pub fn get_hash(&self, key: &str) -> Option<&Hash> {
        self.get_value(key)?.as_hash()
    }

    pub fn get_array(&self, key: &str) -> Option<&[Value]> {
        self.get_value(key)?.as_array()
    }

    /// Angle stored in degrees, returned in radians
    pub fn get_angle(&self, key: &str) -> Option<f64> {
        self.get_number(key).map(f64::to_radians)
    }

    /// Color as [r, g, b] or [r, g, b, a]
    pub fn get_color(&self, key: &str) -> Option<Color> {
        let c = self.get_value(key)?.as_numbers()?;
        match c.as_slice() {
            [r, g, b] => Some(Color::new(*r as f32, *g as f32, *b as f32, 1.0)),
            [r, g, b, a] => Some(Color::new(*r as f32, *g as f32, *b as f32, *a as f32)),
            _ => None,
        }
    }
}
