//! CIM Instances and Method Parameters

use crate::cim::path::ObjectPath;
use crate::cim::value::CimValue;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Instances
// =============================================================================

/// A named property value on an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CimProperty {
    pub name: String,
    pub value: CimValue,
}

/// A CIM instance: its object path plus the property bag returned by the
/// server, in server order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CimInstance {
    pub path: ObjectPath,
    pub properties: Vec<CimProperty>,
}

impl CimInstance {
    pub fn new(path: ObjectPath) -> Self {
        Self {
            path,
            properties: Vec::new(),
        }
    }

    /// Add or replace a property
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<CimValue>) -> Self {
        self.set_property(name, value);
        self
    }

    /// Add or replace a property in place
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<CimValue>) {
        let name = name.into();
        let value = value.into();
        match self
            .properties
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(&name))
        {
            Some(existing) => existing.value = value,
            None => self.properties.push(CimProperty { name, value }),
        }
    }

    /// Look up a property value; CIM names are case-insensitive
    pub fn property(&self, name: &str) -> Option<&CimValue> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| &p.value)
    }

    pub fn class_name(&self) -> &str {
        &self.path.class_name
    }
}

// =============================================================================
// Method Parameters
// =============================================================================

/// A named in/out method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamValue {
    pub name: String,
    pub value: CimValue,
}

impl ParamValue {
    pub fn new(name: impl Into<String>, value: impl Into<CimValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " ParamName:value({}:{})", self.name, self.value)
    }
}

/// Outcome of an extrinsic method call as returned by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodResult {
    /// Method return value (uint32 for SMI-S methods)
    pub return_value: CimValue,
    /// Output parameters in server order
    pub out_params: Vec<ParamValue>,
}

impl MethodResult {
    pub fn new(return_value: impl Into<CimValue>) -> Self {
        Self {
            return_value: return_value.into(),
            out_params: Vec::new(),
        }
    }

    pub fn with_out_param(mut self, name: impl Into<String>, value: impl Into<CimValue>) -> Self {
        self.out_params.push(ParamValue::new(name, value));
        self
    }

    /// Look up an output parameter by name
    pub fn out_param(&self, name: &str) -> Option<&CimValue> {
        self.out_params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| &p.value)
    }

    /// Render every output parameter for diagnostics
    pub fn render_out_params(&self) -> String {
        self.out_params.iter().map(|p| p.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_lookup_is_case_insensitive() {
        let inst = CimInstance::new(ObjectPath::new("CIM_StoragePool"))
            .with_property("ElementName", "pool-1");
        assert_eq!(inst.property("elementname"), Some(&CimValue::from("pool-1")));
        assert!(inst.property("PoolID").is_none());
    }

    #[test]
    fn test_set_property_replaces() {
        let mut inst = CimInstance::new(ObjectPath::new("CIM_ConcreteJob"))
            .with_property("PercentComplete", 10u16);
        inst.set_property("percentcomplete", 50u16);
        assert_eq!(inst.properties.len(), 1);
        assert_eq!(inst.property("PercentComplete"), Some(&CimValue::Uint16(50)));
    }

    #[test]
    fn test_render_out_params() {
        let result = MethodResult::new(4u32)
            .with_out_param("Job", CimValue::Null)
            .with_out_param("Size", 10u64);
        assert_eq!(
            result.render_out_params(),
            " ParamName:value(Job:) ParamName:value(Size:10)"
        );
    }
}
