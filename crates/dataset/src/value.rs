//! Cell Values and Casting

use crate::schema::ColumnType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
    /// Fixed-length dense vector produced by the encoders
    Vector(Vec<f64>),
}

impl Value {
    /// Whether the cell is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of integer and float cells
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view (integers only, floats are not truncated here)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// String view
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Vector view
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Vector(_) => "vector",
        }
    }

    /// Whether the cell may live in a column of `dtype`. Null fits anywhere.
    pub fn conforms_to(&self, dtype: ColumnType) -> bool {
        match (self, dtype) {
            (Value::Null, _) => true,
            (Value::Int(_), ColumnType::Int) => true,
            (Value::Float(_), ColumnType::Float) => true,
            (Value::Str(_), ColumnType::Str) => true,
            (Value::Vector(v), ColumnType::Vector(len)) => v.len() == len,
            _ => false,
        }
    }

    /// Cast with SQL semantics: anything that cannot be represented becomes null.
    ///
    /// Floats truncate toward zero when cast to integers, strings are parsed
    /// after trimming, and every value renders to its display form as a string.
    pub fn cast(&self, to: ColumnType) -> Value {
        match (self, to) {
            (Value::Null, _) => Value::Null,

            (Value::Int(v), ColumnType::Int) => Value::Int(*v),
            (Value::Float(v), ColumnType::Int) => float_to_int(*v),
            (Value::Str(s), ColumnType::Int) => {
                let s = s.trim();
                match s.parse::<i64>() {
                    Ok(v) => Value::Int(v),
                    Err(_) => s.parse::<f64>().map(float_to_int).unwrap_or(Value::Null),
                }
            }

            (Value::Int(v), ColumnType::Float) => Value::Float(*v as f64),
            (Value::Float(v), ColumnType::Float) => Value::Float(*v),
            (Value::Str(s), ColumnType::Float) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or(Value::Null),

            (Value::Vector(v), ColumnType::Vector(len)) if v.len() == len => {
                Value::Vector(v.clone())
            }

            (value, ColumnType::Str) => Value::Str(value.to_string()),

            _ => Value::Null,
        }
    }
}

/// Truncate toward zero; null when the result does not fit in an `i64`
fn float_to_int(v: f64) -> Value {
    let t = v.trunc();
    // i64::MIN is exactly -2^63, the upper bound 2^63 itself is out of range
    if t >= i64::MIN as f64 && t < -(i64::MIN as f64) {
        Value::Int(t as i64)
    } else {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
            Value::Vector(v) => {
                write!(f, "[")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
