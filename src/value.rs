use std::{collections::HashMap, fmt};

use derive_more::From;
use serde::{Deserialize, Serialize};

/// A generic flag or context value.
///
/// Conveniently implements `From` conversions for the common Rust types.
///
/// ```
/// # use flipt_provider::Value;
/// let string_value: Value = "gold".into();
/// let integer_value: Value = 42.into();
/// let float_value: Value = 0.5.into();
/// let bool_value: Value = true.into();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, From)]
#[serde(untagged)]
pub enum Value {
    /// A null value or absence of value.
    Null,
    /// A boolean value.
    Boolean(bool),
    /// An integer value.
    Integer(i64),
    /// A floating point value.
    Float(f64),
    /// A string value.
    String(String),
    /// A list of values.
    List(Vec<Value>),
    /// A nested key-value structure.
    Structure(HashMap<String, Value>),
}

impl Value {
    /// Return the string if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Return the boolean if this is a [`Value::Boolean`].
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the integer if this is a [`Value::Integer`].
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Return the float if this is a [`Value::Float`].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Return the structure if this is a [`Value::Structure`].
    pub fn as_structure(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }

    /// Return `true` if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert into a string, rendering non-string values with their [`Display`](fmt::Display)
    /// form.
    pub fn into_string(self) -> String {
        match self {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}

/// Strings render verbatim, scalars with their natural formatting, lists and structures as JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::List(_) | Value::Structure(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}
