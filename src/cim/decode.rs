//! Property Decoding
//!
//! Typed extraction of named properties from a [`CimInstance`]. Conversion
//! is strict: a `uint32` property does not decode as `u64`, and NULL never
//! decodes as a scalar.

use crate::cim::instance::CimInstance;
use crate::cim::path::ObjectPath;
use crate::cim::value::CimValue;
use crate::error::{Error, Result};

/// Conversion from a [`CimValue`] into a native type
pub trait FromCimValue: Sized {
    /// CIM type name used in decode diagnostics
    const CIM_TYPE: &'static str;

    /// Convert, returning `None` on a type mismatch
    fn from_cim(value: &CimValue) -> Option<Self>;
}

macro_rules! scalar_from_cim {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl FromCimValue for $ty {
            const CIM_TYPE: &'static str = $name;

            fn from_cim(value: &CimValue) -> Option<Self> {
                match value {
                    CimValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

scalar_from_cim!(bool, Boolean, "boolean");
scalar_from_cim!(String, String, "string");
scalar_from_cim!(u8, Uint8, "uint8");
scalar_from_cim!(u16, Uint16, "uint16");
scalar_from_cim!(u32, Uint32, "uint32");
scalar_from_cim!(u64, Uint64, "uint64");
scalar_from_cim!(ObjectPath, Reference, "reference");

macro_rules! array_from_cim {
    ($ty:ty, $name:literal) => {
        impl FromCimValue for Vec<$ty> {
            const CIM_TYPE: &'static str = $name;

            fn from_cim(value: &CimValue) -> Option<Self> {
                match value {
                    CimValue::Array(items) => items.iter().map(<$ty>::from_cim).collect(),
                    _ => None,
                }
            }
        }
    };
}

array_from_cim!(String, "string[]");
array_from_cim!(u16, "uint16[]");
array_from_cim!(u32, "uint32[]");
array_from_cim!(u64, "uint64[]");

/// Decode a required property
pub fn decode<T: FromCimValue>(instance: &CimInstance, property: &str) -> Result<T> {
    let value = instance
        .property(property)
        .ok_or_else(|| Error::PropertyNotFound {
            property: property.to_string(),
            path: instance.path.to_string(),
        })?;
    decode_value(property, value)
}

/// Decode a property that may be absent or NULL
pub fn decode_optional<T: FromCimValue>(
    instance: &CimInstance,
    property: &str,
) -> Result<Option<T>> {
    match instance.property(property) {
        None | Some(CimValue::Null) => Ok(None),
        Some(value) => decode_value(property, value).map(Some),
    }
}

/// Decode a free-standing value, e.g. a method return value
pub fn decode_value<T: FromCimValue>(name: &str, value: &CimValue) -> Result<T> {
    T::from_cim(value).ok_or_else(|| Error::Decode {
        property: name.to_string(),
        expected: T::CIM_TYPE.to_string(),
        found: value.type_name(),
    })
}

/// String rendering of a required property, as used for key matching
pub fn decode_string_form(instance: &CimInstance, property: &str) -> Result<String> {
    instance
        .property(property)
        .map(|v| v.to_string())
        .ok_or_else(|| Error::PropertyNotFound {
            property: property.to_string(),
            path: instance.path.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn volume() -> CimInstance {
        CimInstance::new(ObjectPath::new("CIM_StorageVolume").with_key("DeviceID", "0001"))
            .with_property("ElementName", "vol-A")
            .with_property("BlockSize", 512u64)
            .with_property("OperationalStatus", vec![2u16, 15])
            .with_property(
                "OtherIdentifyingInfo",
                vec!["600a0b80005ad1d7".to_string()],
            )
            .with_property("Caption", CimValue::Null)
    }

    #[test]
    fn test_decode_scalars_and_arrays() {
        let inst = volume();
        let name: String = decode(&inst, "ElementName").unwrap();
        let block: u64 = decode(&inst, "BlockSize").unwrap();
        let status: Vec<u16> = decode(&inst, "OperationalStatus").unwrap();
        let vpd: Vec<String> = decode(&inst, "OtherIdentifyingInfo").unwrap();

        assert_eq!(name, "vol-A");
        assert_eq!(block, 512);
        assert_eq!(status, vec![2, 15]);
        assert_eq!(vpd, vec!["600a0b80005ad1d7".to_string()]);
    }

    #[test]
    fn test_missing_property() {
        let err = decode::<u64>(&volume(), "NumberOfBlocks").unwrap_err();
        assert_matches!(err, Error::PropertyNotFound { ref property, .. } if property == "NumberOfBlocks");
    }

    #[test]
    fn test_type_mismatch_is_not_coerced() {
        let err = decode::<u32>(&volume(), "BlockSize").unwrap_err();
        assert_matches!(
            err,
            Error::Decode { ref expected, ref found, .. } if expected == "uint32" && found == "uint64"
        );

        let err = decode::<Vec<u32>>(&volume(), "OperationalStatus").unwrap_err();
        assert_matches!(err, Error::Decode { .. });
    }

    #[test]
    fn test_null_handling() {
        assert_matches!(decode::<String>(&volume(), "Caption"), Err(Error::Decode { .. }));
        assert_eq!(decode_optional::<String>(&volume(), "Caption").unwrap(), None);
        assert_eq!(decode_optional::<u16>(&volume(), "PercentComplete").unwrap(), None);
    }

    #[test]
    fn test_string_form() {
        assert_eq!(decode_string_form(&volume(), "BlockSize").unwrap(), "512");
        assert_matches!(
            decode_string_form(&volume(), "Name"),
            Err(Error::PropertyNotFound { .. })
        );
    }
}
