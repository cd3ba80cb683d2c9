//! Entity Listing
//!
//! Decodes pools, initiators and volumes from their CIM classes. A single
//! malformed instance fails the whole listing; there are no partial
//! results.

use crate::cim::{decode, CimInstance, InstanceResolver};
use crate::domain::model::{Initiator, InitiatorType, StoragePool, Volume, VolumeOpStatus};
use crate::error::{Error, Result};
use crate::smis::constants::{
    CLASS_STORAGE_HARDWARE_ID, CLASS_STORAGE_POOL, CLASS_STORAGE_VOLUME, PROP_ELEMENT_NAME,
    PROP_OPERATIONAL_STATUS,
};

/// Record decodable from one instance of its CIM class
pub trait FromCimInstance: Sized {
    const CLASS_NAME: &'static str;

    fn from_instance(instance: &CimInstance) -> Result<Self>;
}

impl FromCimInstance for StoragePool {
    const CLASS_NAME: &'static str = CLASS_STORAGE_POOL;

    fn from_instance(instance: &CimInstance) -> Result<Self> {
        Ok(StoragePool {
            id: decode(instance, "PoolID")?,
            name: decode(instance, PROP_ELEMENT_NAME)?,
            total_space: decode(instance, "TotalManagedSpace")?,
            free_space: decode(instance, "RemainingManagedSpace")?,
        })
    }
}

impl FromCimInstance for Initiator {
    const CLASS_NAME: &'static str = CLASS_STORAGE_HARDWARE_ID;

    fn from_instance(instance: &CimInstance) -> Result<Self> {
        let id = decode(instance, "StorageID")?;
        let id_type: u16 = decode(instance, "IDType")?;
        Ok(Initiator {
            init_type: InitiatorType::from_id_type(id_type),
            id,
        })
    }
}

impl FromCimInstance for Volume {
    const CLASS_NAME: &'static str = CLASS_STORAGE_VOLUME;

    fn from_instance(instance: &CimInstance) -> Result<Self> {
        let identifying: Vec<String> = decode(instance, "OtherIdentifyingInfo")?;
        let vpd83 = identifying
            .into_iter()
            .next()
            .ok_or_else(|| Error::Decode {
                property: "OtherIdentifyingInfo".into(),
                expected: "non-empty string[]".into(),
                found: "empty array".into(),
            })?;
        let status: Vec<u16> = decode(instance, PROP_OPERATIONAL_STATUS)?;

        Ok(Volume {
            id: decode(instance, "DeviceID")?,
            name: decode(instance, PROP_ELEMENT_NAME)?,
            vpd83,
            block_size: decode(instance, "BlockSize")?,
            number_of_blocks: decode(instance, "NumberOfBlocks")?,
            op_status: VolumeOpStatus::from_codes(&status),
        })
    }
}

/// Enumerate a class and decode every instance, in enumeration order
pub async fn list<T: FromCimInstance>(resolver: &InstanceResolver<'_>) -> Result<Vec<T>> {
    resolver
        .enumerate(T::CLASS_NAME)
        .await?
        .iter()
        .map(T::from_instance)
        .collect()
}
