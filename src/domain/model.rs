//! Domain Records
//!
//! Array state as reported to the plugin host. Every record is an
//! immutable snapshot taken at enumeration time.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// =============================================================================
// Storage Pool
// =============================================================================

/// A storage pool on the array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoragePool {
    /// Array-assigned pool ID
    pub id: String,
    /// Human-readable pool name
    pub name: String,
    /// Total managed space in bytes
    pub total_space: u64,
    /// Remaining managed space in bytes
    pub free_space: u64,
}

impl StoragePool {
    /// Bytes already consumed
    pub fn used_space(&self) -> u64 {
        self.total_space.saturating_sub(self.free_space)
    }
}

// =============================================================================
// Initiator
// =============================================================================

/// Initiator identity type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitiatorType {
    Wwn,
    Iscsi,
}

impl InitiatorType {
    /// Map a `CIM_StorageHardwareID.IDType` code
    ///
    /// Only PortWWN (2) is distinguished; every other code reports iSCSI.
    pub fn from_id_type(id_type: u16) -> Self {
        match id_type {
            2 => InitiatorType::Wwn,
            _ => InitiatorType::Iscsi,
        }
    }
}

impl std::fmt::Display for InitiatorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitiatorType::Wwn => write!(f, "wwn"),
            InitiatorType::Iscsi => write!(f, "iscsi"),
        }
    }
}

/// A host initiator known to the array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Initiator {
    pub init_type: InitiatorType,
    /// WWN or IQN
    pub id: String,
}

// =============================================================================
// Volume
// =============================================================================

bitflags! {
    /// Volume operational status flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct VolumeOpStatus: u32 {
        const OK = 0x0000_0001;
        const DEGRADED = 0x0000_0002;
        const ERROR = 0x0000_0004;
        const STARTING = 0x0000_0008;
        const DORMANT = 0x0000_0010;
    }
}

impl VolumeOpStatus {
    /// No recognised status
    pub const UNKNOWN: Self = Self::empty();

    /// Union of the flags for each recognised `OperationalStatus` code
    ///
    /// Unrecognised codes are dropped, so a volume reporting only unknown
    /// codes decodes as [`VolumeOpStatus::UNKNOWN`].
    pub fn from_codes(codes: &[u16]) -> Self {
        codes.iter().fold(Self::UNKNOWN, |acc, code| {
            acc | match code {
                2 => Self::OK,
                3 => Self::DEGRADED,
                6 => Self::ERROR,
                8 => Self::STARTING,
                15 => Self::DORMANT,
                _ => Self::UNKNOWN,
            }
        })
    }

    pub fn is_unknown(&self) -> bool {
        self.is_empty()
    }
}

impl Default for VolumeOpStatus {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// A storage volume (LUN)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Array device ID
    pub id: String,
    /// Element name
    pub name: String,
    /// SCSI VPD page 0x83 identifier
    pub vpd83: String,
    /// Block size in bytes
    pub block_size: u64,
    /// Number of blocks
    pub number_of_blocks: u64,
    pub op_status: VolumeOpStatus,
}

impl Volume {
    /// Capacity in bytes
    pub fn size_bytes(&self) -> u64 {
        self.block_size.saturating_mul(self.number_of_blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiator_type_collapse() {
        assert_eq!(InitiatorType::from_id_type(2), InitiatorType::Wwn);
        assert_eq!(InitiatorType::from_id_type(5), InitiatorType::Iscsi);
        assert_eq!(InitiatorType::from_id_type(3), InitiatorType::Iscsi);
        assert_eq!(InitiatorType::from_id_type(0), InitiatorType::Iscsi);
        assert_eq!(format!("{}", InitiatorType::Wwn), "wwn");
    }

    #[test]
    fn test_op_status_union() {
        let status = VolumeOpStatus::from_codes(&[15, 2]);
        assert_eq!(status, VolumeOpStatus::OK | VolumeOpStatus::DORMANT);

        let status = VolumeOpStatus::from_codes(&[3, 6, 8]);
        assert_eq!(
            status,
            VolumeOpStatus::DEGRADED | VolumeOpStatus::ERROR | VolumeOpStatus::STARTING
        );
    }

    #[test]
    fn test_op_status_unrecognised_codes_drop() {
        assert_eq!(VolumeOpStatus::from_codes(&[2, 4, 32768]), VolumeOpStatus::OK);
        assert!(VolumeOpStatus::from_codes(&[4, 10]).is_unknown());
        assert!(VolumeOpStatus::from_codes(&[]).is_unknown());
        assert_eq!(VolumeOpStatus::UNKNOWN.bits(), 0);
    }

    #[test]
    fn test_sizes() {
        let vol = Volume {
            id: "0001".into(),
            name: "vol-A".into(),
            vpd83: "600a".into(),
            block_size: 512,
            number_of_blocks: 2_097_152,
            op_status: VolumeOpStatus::OK,
        };
        assert_eq!(vol.size_bytes(), 1_073_741_824);

        let pool = StoragePool {
            id: "P1".into(),
            name: "pool-1".into(),
            total_space: 100,
            free_space: 30,
        };
        assert_eq!(pool.used_space(), 70);
    }
}
