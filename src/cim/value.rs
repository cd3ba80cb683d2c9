//! CIM Values
//!
//! Typed property and parameter values as carried by CIM-XML.

use crate::cim::path::ObjectPath;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single CIM value
///
/// Arrays are homogeneous on the wire; the model does not enforce it, but
/// the decoder rejects arrays whose elements do not match the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CimValue {
    Null,
    Boolean(bool),
    String(String),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Sint8(i8),
    Sint16(i16),
    Sint32(i32),
    Sint64(i64),
    /// CIM datetime in its interval or timestamp string form
    DateTime(String),
    Reference(ObjectPath),
    Array(Vec<CimValue>),
}

impl CimValue {
    /// CIM type name of this value, e.g. `uint16` or `string[]`
    pub fn type_name(&self) -> String {
        match self {
            CimValue::Null => "null".to_string(),
            CimValue::Boolean(_) => "boolean".to_string(),
            CimValue::String(_) => "string".to_string(),
            CimValue::Uint8(_) => "uint8".to_string(),
            CimValue::Uint16(_) => "uint16".to_string(),
            CimValue::Uint32(_) => "uint32".to_string(),
            CimValue::Uint64(_) => "uint64".to_string(),
            CimValue::Sint8(_) => "sint8".to_string(),
            CimValue::Sint16(_) => "sint16".to_string(),
            CimValue::Sint32(_) => "sint32".to_string(),
            CimValue::Sint64(_) => "sint64".to_string(),
            CimValue::DateTime(_) => "datetime".to_string(),
            CimValue::Reference(_) => "reference".to_string(),
            CimValue::Array(items) => match items.first() {
                Some(first) => format!("{}[]", first.type_name()),
                None => "array".to_string(),
            },
        }
    }

    /// Check for the NULL value
    pub fn is_null(&self) -> bool {
        matches!(self, CimValue::Null)
    }

    /// Build a string array value
    pub fn string_array<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CimValue::Array(items.into_iter().map(|s| CimValue::String(s.into())).collect())
    }

    /// Build a uint16 array value
    pub fn uint16_array<I>(items: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        CimValue::Array(items.into_iter().map(CimValue::Uint16).collect())
    }
}

impl fmt::Display for CimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CimValue::Null => Ok(()),
            CimValue::Boolean(true) => write!(f, "TRUE"),
            CimValue::Boolean(false) => write!(f, "FALSE"),
            CimValue::String(s) | CimValue::DateTime(s) => write!(f, "{}", s),
            CimValue::Uint8(v) => write!(f, "{}", v),
            CimValue::Uint16(v) => write!(f, "{}", v),
            CimValue::Uint32(v) => write!(f, "{}", v),
            CimValue::Uint64(v) => write!(f, "{}", v),
            CimValue::Sint8(v) => write!(f, "{}", v),
            CimValue::Sint16(v) => write!(f, "{}", v),
            CimValue::Sint32(v) => write!(f, "{}", v),
            CimValue::Sint64(v) => write!(f, "{}", v),
            CimValue::Reference(path) => write!(f, "{}", path),
            CimValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for CimValue {
    fn from(value: &str) -> Self {
        CimValue::String(value.to_string())
    }
}

impl From<String> for CimValue {
    fn from(value: String) -> Self {
        CimValue::String(value)
    }
}

impl From<bool> for CimValue {
    fn from(value: bool) -> Self {
        CimValue::Boolean(value)
    }
}

impl From<u16> for CimValue {
    fn from(value: u16) -> Self {
        CimValue::Uint16(value)
    }
}

impl From<u32> for CimValue {
    fn from(value: u32) -> Self {
        CimValue::Uint32(value)
    }
}

impl From<u64> for CimValue {
    fn from(value: u64) -> Self {
        CimValue::Uint64(value)
    }
}

impl From<ObjectPath> for CimValue {
    fn from(value: ObjectPath) -> Self {
        CimValue::Reference(value)
    }
}

impl From<Vec<String>> for CimValue {
    fn from(value: Vec<String>) -> Self {
        CimValue::string_array(value)
    }
}

impl From<Vec<u16>> for CimValue {
    fn from(value: Vec<u16>) -> Self {
        CimValue::uint16_array(value)
    }
}
