//! Domain Ports - Core trait definitions for the SMI-S provider
//!
//! These traits define the boundaries between the adapter logic and
//! external systems: the WBEM transport below, the timer the job poller
//! waits on, and the storage API exposed to the plugin host above.

use crate::cim::{CimInstance, MethodResult, ObjectPath, ParamValue};
use crate::domain::model::{Initiator, StoragePool, Volume};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// WBEM Client Port
// =============================================================================

/// Port for a WBEM (CIM-XML over HTTP) connection
///
/// One call is in flight at a time; implementations are not required to
/// serialise concurrent callers.
#[async_trait]
pub trait WbemClient: Send + Sync {
    /// Open the session
    async fn connect(&self, host: &str, port: u16, username: &str, password: &str) -> Result<()>;

    /// Close the session
    async fn disconnect(&self) -> Result<()>;

    /// Enumerate every instance of a class (deep, with properties)
    async fn enumerate_instances(&self, namespace: &str, class_name: &str)
        -> Result<Vec<CimInstance>>;

    /// Invoke an extrinsic method on an instance or class path
    async fn invoke_method(
        &self,
        namespace: &str,
        path: &ObjectPath,
        method: &str,
        in_params: &[ParamValue],
    ) -> Result<MethodResult>;

    /// Fetch one instance by path
    async fn get_instance(&self, namespace: &str, path: &ObjectPath) -> Result<CimInstance>;

    /// Delete one instance by path
    async fn delete_instance(&self, namespace: &str, path: &ObjectPath) -> Result<()>;

    /// Set the per-request round-trip timeout
    fn set_timeout(&self, timeout: Duration);

    /// Get the per-request round-trip timeout
    fn timeout(&self) -> Duration;
}

// =============================================================================
// Job Timer Port
// =============================================================================

/// Port for the delay between job status polls
#[async_trait]
pub trait JobTimer: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Timer backed by the tokio runtime
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl JobTimer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// =============================================================================
// Storage Array Port
// =============================================================================

/// Port exposed to the plugin host
#[async_trait]
pub trait StorageArray: Send + Sync {
    /// List storage pools
    async fn get_storage_pools(&self) -> Result<Vec<StoragePool>>;

    /// List host initiators
    async fn get_initiators(&self) -> Result<Vec<Initiator>>;

    /// List volumes
    async fn get_volumes(&self) -> Result<Vec<Volume>>;

    /// Grant an initiator read/write access to a volume
    async fn map_lun(&self, initiator_id: &str, volume_name: &str) -> Result<()>;

    /// Create a volume in the named pool
    async fn create_lun(&self, pool_name: &str, name: &str, size_bytes: u64) -> Result<()>;

    /// Resize the named volume
    async fn resize_lun(&self, name: &str, size_bytes: u64) -> Result<()>;

    /// Return the named volume to its pool
    async fn delete_lun(&self, name: &str) -> Result<()>;

    /// Snapshot a volume into the destination pool
    async fn create_snapshot(
        &self,
        source_lun_name: &str,
        dest_pool_name: &str,
        dest_name: &str,
    ) -> Result<()>;

    /// Set the transport timeout in milliseconds
    fn set_timeout(&self, timeout_ms: u32);

    /// Get the transport timeout in milliseconds
    fn timeout(&self) -> u32;
}

// =============================================================================
// Type Aliases for Arc'd Traits
// =============================================================================

pub type WbemClientRef = Arc<dyn WbemClient>;
pub type JobTimerRef = Arc<dyn JobTimer>;
