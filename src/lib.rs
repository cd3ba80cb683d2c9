//! SMI-S Provider - Storage array adapter over CIM/WBEM
//!
//! Translates a storage-management API (pools, initiators, volumes,
//! snapshots, LUN mapping) into SMI-S operations, following asynchronous
//! array jobs to completion.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                        Plugin Host (StorageArray port)                       │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │                                 Smis session                                 │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────────┐  │
//! │  │ Entity Listing  │  │ Method Builders │  │  Result Classifier          │  │
//! │  │ pools/inits/vols│  │ 5 SMI-S methods │  │  + Job Poller (JobTimer)    │  │
//! │  └────────┬────────┘  └────────┬────────┘  └─────────────┬───────────────┘  │
//! │           └────────────────────┼─────────────────────────┘                   │
//! │                    ┌───────────┴───────────┐                                │
//! │                    │ Resolver + Decoder    │                                │
//! │                    └───────────┬───────────┘                                │
//! ├────────────────────────────────┴────────────────────────────────────────────┤
//! │                 WbemClient port (CIM-XML transport, external)                │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cim`]: CIM values, object paths, instances, decoding and resolution
//! - [`smis`]: SMI-S operations, job tracking and the session type
//! - [`domain`]: Records and port traits
//! - [`error`]: Error types and handling

pub mod cim;
pub mod domain;
pub mod error;
pub mod smis;

// Re-export commonly used types
pub use cim::{CimInstance, CimValue, InstanceResolver, MemoryWbem, MethodResult, ObjectPath, ParamValue};

pub use domain::{
    Initiator, InitiatorType, StoragePool, Volume, VolumeOpStatus,
    JobTimer, StorageArray, TokioTimer, WbemClient,
};

pub use error::{Error, ErrorKind, Result};

pub use smis::{
    JobPollConfig, JobReport, JobState, Smis, SmisConfig, SmisMetricsSnapshot,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
