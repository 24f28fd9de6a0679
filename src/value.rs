//! Parameter and column value types for the wrapper.

use std::os::raw::c_int;

use crate::ffi;

/// A value that can be bound to a prepared statement parameter or read from
/// a result column.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Binary blob.
    Blob(Vec<u8>),
    /// SQL NULL.
    Null,
}

impl Value {
    /// Renders the value as a standalone SQL literal with proper escaping.
    ///
    /// Used by formatted execution and ATTACH; non-finite floats render as
    /// NULL because the SQL grammar has no literal for them.
    pub(crate) fn to_sql_literal(&self) -> String {
        match self {
            Self::Integer(v) => v.to_string(),
            Self::Real(v) if v.is_finite() => v.to_string(),
            Self::Real(_) | Self::Null => "NULL".to_string(),
            Self::Text(v) => {
                let mut out = String::with_capacity(v.len() + 2);
                out.push('\'');
                for ch in v.chars() {
                    if ch == '\'' {
                        out.push('\'');
                    }
                    out.push(ch);
                }
                out.push('\'');
                out
            }
            Self::Blob(v) => format!("X'{}'", hex::encode(v)),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Blob(v.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Storage class of a result column, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Integer storage.
    Integer,
    /// Floating-point storage.
    Real,
    /// Text storage.
    Text,
    /// Blob storage.
    Blob,
    /// SQL NULL.
    Null,
}

impl ValueType {
    pub(crate) fn from_code(code: c_int) -> Self {
        match code {
            ffi::SQLITE_INTEGER => Self::Integer,
            ffi::SQLITE_FLOAT => Self::Real,
            ffi::SQLITE_TEXT => Self::Text,
            ffi::SQLITE_BLOB => Self::Blob,
            _ => Self::Null,
        }
    }
}

/// Convenience macro for building parameter lists.
///
/// Usage: `params![1_i64, blob.as_slice(), "text"]`
#[macro_export]
macro_rules! params {
    ($($val:expr),* $(,)?) => {
        &[$($crate::Value::from($val)),*][..]
    };
}
