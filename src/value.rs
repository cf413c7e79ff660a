//! Values, records, and row shapes
//!
//! This module provides:
//! - [`Value`], the scalar vocabulary flowing through binds and fetches
//! - [`Record`], the generic object shape for object-mode fetches
//! - [`FetchedRow`], the row shapes a fetch call can return
//!
//! Values are deliberately lenient: the declared parameter type coerces at
//! bind time and never rejects (an integer bound as a string becomes its text
//! form). See [`Value::coerce`].

use std::fmt;

use indexmap::IndexMap;

use crate::constants::ParamType;

/// A value bound to a parameter or fetched from a column.
///
/// # Example
///
/// ```rust
/// use oracle_dbal::Value;
///
/// fn describe(value: &Value) -> String {
///     match value {
///         Value::Null => "NULL".to_string(),
///         Value::String(s) => format!("text: {}", s),
///         Value::Integer(i) => format!("int: {}", i),
///         _ => "other".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// String value (VARCHAR2, CHAR, CLOB as string)
    String(String),
    /// Integer value (NUMBER that fits in i64)
    Integer(i64),
    /// Floating point value (NUMBER, BINARY_FLOAT, BINARY_DOUBLE)
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Byte array (RAW, BLOB as bytes)
    Bytes(Vec<u8>),
    /// A sequence of values. Only meaningful as a bind source, where it selects
    /// the array-bind (bulk) path; never produced by a fetch.
    Array(Vec<Value>),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a sequence (selects the array-bind path)
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Try to get as a string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) => Some(*f as i64),
            Value::Boolean(b) => Some(i64::from(*b)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to get as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to get as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            Value::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }

    /// Try to get as bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            Value::String(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Try to get as a sequence
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// Coerce toward a declared parameter type.
    ///
    /// Lenient on purpose: a mismatch falls back to the value unchanged rather
    /// than failing, so integers bound into text columns (and text into
    /// numeric columns the server can convert) survive the trip. NULL is never
    /// coerced, and sequences coerce element-wise.
    pub fn coerce(&self, ptype: ParamType) -> Value {
        match (ptype, self) {
            (_, Value::Null) => Value::Null,
            (_, Value::Array(values)) => {
                Value::Array(values.iter().map(|v| v.coerce(ptype)).collect())
            }
            (ParamType::Str, Value::String(_)) => self.clone(),
            (ParamType::Str, Value::Bytes(_)) => self.clone(),
            (ParamType::Str, other) => Value::String(other.display_text()),
            (ParamType::Int, Value::Integer(_)) => self.clone(),
            (ParamType::Int, other) => match other.as_i64() {
                Some(i) => Value::Integer(i),
                None => other.clone(),
            },
            (ParamType::Bool, other) => match other.as_bool() {
                Some(b) => Value::Boolean(b),
                None => other.clone(),
            },
            _ => self.clone(),
        }
    }

    /// The byte length of this value's text form.
    ///
    /// This is the default bind length when the caller supplies none, and it is
    /// recomputed from the slot's current value on every execute.
    pub fn display_length(&self) -> usize {
        match self {
            Value::Null => 0,
            Value::String(s) => s.len(),
            Value::Bytes(b) => b.len(),
            Value::Array(values) => values.len(),
            other => other.display_text().len(),
        }
    }

    fn display_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Value::Array(_) => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::String(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Array(values) => write!(f, "<{} elements>", values.len()),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// A generic record: the object shape of an object-mode fetch.
///
/// Fields keep result-set order, so positional access (used by bound-column
/// population) and named access both work.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record from ordered (name, value) pairs
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            fields: pairs.into_iter().collect(),
        }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field by name (case-insensitive, Oracle folds unquoted names)
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Get a field by result-set position (0-based)
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.fields.get_index(index).map(|(_, v)| v)
    }

    /// Set a field, preserving insertion order
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Iterate fields in result-set order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}

/// Build a typed object from a fetched [`Record`] by copying every field.
///
/// Implement this to give [`Statement::fetch_object_as`]
/// (crate::Statement::fetch_object_as) a concrete target kind.
pub trait FromRecord: Sized {
    /// Construct `Self` from the record's fields
    fn from_record(record: Record) -> Self;
}

impl FromRecord for Record {
    fn from_record(record: Record) -> Self {
        record
    }
}

/// One fetched row, in the shape the caller requested.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchedRow {
    /// Column-name-keyed mapping, in result-set order
    Assoc(IndexMap<String, Value>),
    /// Index-keyed sequence
    Num(Vec<Value>),
    /// A single column's value
    Column(Value),
    /// Generic record object
    Object(Record),
}

impl FetchedRow {
    /// The value at a result-set position (0-based), regardless of shape
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        match self {
            FetchedRow::Assoc(map) => map.get_index(index).map(|(_, v)| v),
            FetchedRow::Num(values) => values.get(index),
            FetchedRow::Column(value) => (index == 0).then_some(value),
            FetchedRow::Object(record) => record.get_index(index),
        }
    }

    /// The value under a column name, where the shape carries names
    pub fn value_named(&self, name: &str) -> Option<&Value> {
        match self {
            FetchedRow::Assoc(map) => map
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v),
            FetchedRow::Object(record) => record.get(name),
            _ => None,
        }
    }
}
