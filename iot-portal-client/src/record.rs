//! Entity records exchanged with the backend.
//!
//! A record is an open JSON object. The only field the portal interprets is
//! `id`; everything else is passed through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the identifier field in every backend record.
///
/// Backend ids are auto-assigned positive integers, so only a positive
/// integer (or a string holding one) marks a record as saved. A negative or
/// fractional value is treated like a missing id and the record is created.
pub const ID_FIELD: &str = "id";

/// A backend resource payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRecord(Map<String, Value>);

impl EntityRecord {
    /// Create an empty record (no identifier, so a create target).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from an arbitrary JSON value.
    ///
    /// Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// The record's identifier, if it holds a usable one.
    ///
    /// Positive integers and strings holding a positive integer count as an
    /// identifier. Absent, `null`, `0`, `""`, `false` and anything
    /// non-numeric mean the record has not been created yet.
    pub fn id(&self) -> Option<u64> {
        match self.0.get(ID_FIELD)? {
            Value::Number(n) => n.as_u64().filter(|id| *id > 0),
            Value::String(s) => s.trim().parse::<u64>().ok().filter(|id| *id > 0),
            _ => None,
        }
    }

    /// Set the identifier field.
    pub fn set_id(&mut self, id: u64) {
        self.0.insert(ID_FIELD.to_string(), Value::from(id));
    }

    /// Read one field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Replace one field, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Copy of this record with the identifier field stripped (POST body).
    pub fn without_id(&self) -> EntityRecord {
        let mut copy = self.clone();
        copy.0.remove(ID_FIELD);
        copy
    }

    /// Convert into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
