//! SMI-S Wire Constants
//!
//! Class names, method names and value maps from the CIM/SMI-S MOF
//! schema. The numeric values are part of the wire contract.

// =============================================================================
// Classes
// =============================================================================

pub const CLASS_STORAGE_POOL: &str = "CIM_StoragePool";
pub const CLASS_STORAGE_VOLUME: &str = "CIM_StorageVolume";
pub const CLASS_STORAGE_HARDWARE_ID: &str = "CIM_StorageHardwareID";
pub const CLASS_STORAGE_CONFIGURATION_SERVICE: &str = "CIM_StorageConfigurationService";
pub const CLASS_CONTROLLER_CONFIGURATION_SERVICE: &str = "CIM_ControllerConfigurationService";
pub const CLASS_REPLICATION_SERVICE: &str = "CIM_ReplicationService";

// =============================================================================
// Methods
// =============================================================================

pub const METHOD_EXPOSE_PATHS: &str = "ExposePaths";
pub const METHOD_CREATE_OR_MODIFY_ELEMENT: &str = "CreateOrModifyElementFromStoragePool";
pub const METHOD_CREATE_ELEMENT_REPLICA: &str = "CreateElementReplica";
pub const METHOD_RETURN_TO_STORAGE_POOL: &str = "ReturnToStoragePool";

/// Output parameter carrying the job reference of an asynchronous call
pub const JOB_KEY: &str = "Job";

// =============================================================================
// Value Maps
// =============================================================================

/// Extrinsic method return codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ReturnCode {
    Completed = 0,
    /// Method parameters checked, job started
    JobStarted = 4096,
}

/// `CIM_ManagedSystemElement.OperationalStatus` codes used by the job poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum OperationalStatus {
    Ok = 2,
    Error = 6,
    Stopped = 10,
    Completed = 17,
}

impl OperationalStatus {
    pub const fn code(self) -> u16 {
        self as u16
    }
}

/// `CreateOrModifyElementFromStoragePool.ElementType`
pub const ELEMENT_TYPE_STORAGE_VOLUME: u16 = 2;

/// `CreateElementReplica.SyncType`
pub const SYNC_TYPE_SNAPSHOT: u16 = 7;

/// `CreateElementReplica.Mode`
pub const REPLICA_MODE_ASYNC: u16 = 3;

/// `ExposePaths.DeviceAccesses`
pub const DEVICE_ACCESS_READ_WRITE: u16 = 2;

// =============================================================================
// Properties
// =============================================================================

pub const PROP_ELEMENT_NAME: &str = "ElementName";
pub const PROP_NAME: &str = "Name";
pub const PROP_OPERATIONAL_STATUS: &str = "OperationalStatus";
pub const PROP_PERCENT_COMPLETE: &str = "PercentComplete";
pub const PROP_DELETE_ON_COMPLETION: &str = "DeleteOnCompletion";
