//! CIM Object Paths
//!
//! An object path names one instance: optional namespace, class name and
//! the ordered key bindings. The canonical string form is
//! `root/cimv2:CIM_ConcreteJob.InstanceID="J1",Other="x"`. Host-qualified
//! references (`//host/root/cimv2:...`) parse too; the host is dropped.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference to a single CIM instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectPath {
    /// Namespace (e.g. `root/cimv2`), if qualified
    pub namespace: Option<String>,
    /// Class name
    pub class_name: String,
    /// Key bindings in declaration order
    pub keys: Vec<(String, String)>,
}

impl ObjectPath {
    /// Create an unqualified path with no key bindings
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            class_name: class_name.into(),
            keys: Vec::new(),
        }
    }

    /// Qualify the path with a namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Append a key binding
    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.push((name.into(), value.into()));
        self
    }

    /// Look up a key binding (case-insensitive, like CIM names)
    pub fn key(&self, name: &str) -> Option<&str> {
        self.keys
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{}:", ns)?;
        }
        write!(f, "{}", self.class_name)?;
        for (i, (name, value)) in self.keys.iter().enumerate() {
            let sep = if i == 0 { '.' } else { ',' };
            write!(f, "{}{}=\"", sep, name)?;
            for c in value.chars() {
                if c == '"' || c == '\\' {
                    write!(f, "\\")?;
                }
                write!(f, "{}", c)?;
            }
            write!(f, "\"")?;
        }
        Ok(())
    }
}

impl FromStr for ObjectPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fail = |reason: &str| Error::ObjectPathParse {
            path: s.to_string(),
            reason: reason.to_string(),
        };

        let mut rest = s.trim();

        // `//host/namespace:Class...`; the host is not kept
        if let Some(hosted) = rest.strip_prefix("//") {
            match hosted.find('/') {
                Some(idx) if idx > 0 => rest = &hosted[idx + 1..],
                _ => return Err(fail("host without namespace")),
            }
        }

        // Key values may contain ':' and '.', so the class name starts after
        // the last ':' ahead of the first '='.
        let before_keys = rest.find('=').map_or(rest, |idx| &rest[..idx]);
        let class_start = before_keys.rfind(':').map_or(0, |idx| idx + 1);
        let namespace = (class_start > 0).then(|| rest[..class_start - 1].to_string());

        let tail = &rest[class_start..];
        let (class_name, bindings) = match tail.find('.') {
            Some(idx) => (&tail[..idx], Some(&tail[idx + 1..])),
            None => (tail, None),
        };
        if class_name.is_empty() {
            return Err(fail("missing class name"));
        }

        let mut path = ObjectPath {
            namespace,
            class_name: class_name.to_string(),
            keys: Vec::new(),
        };

        let Some(bindings) = bindings else {
            return Ok(path);
        };

        let mut chars = bindings.chars().peekable();
        loop {
            let mut name = String::new();
            let mut assigned = false;
            for c in chars.by_ref() {
                if c == '=' {
                    assigned = true;
                    break;
                }
                name.push(c);
            }
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(fail("empty key name"));
            }
            if !assigned {
                return Err(fail("key binding without '='"));
            }

            let mut value = String::new();
            if chars.peek() == Some(&'"') {
                chars.next();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some(escaped) => value.push(escaped),
                            None => return Err(fail("dangling escape")),
                        },
                        '"' => {
                            closed = true;
                            break;
                        }
                        _ => value.push(c),
                    }
                }
                if !closed {
                    return Err(fail("unterminated quoted value"));
                }
            } else {
                while let Some(&c) = chars.peek() {
                    if c == ',' {
                        break;
                    }
                    value.push(c);
                    chars.next();
                }
            }
            path.keys.push((name, value));

            match chars.next() {
                None => break,
                Some(',') => continue,
                Some(_) => return Err(fail("expected ',' between key bindings")),
            }
        }

        Ok(path)
    }
}
