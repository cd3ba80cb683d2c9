//! Method Call Builders
//!
//! Each storage operation maps onto one extrinsic method of an SMI-S
//! service. The builders resolve the service singleton and the target
//! elements first, so a missing reference fails before anything is sent
//! to the array.

use crate::cim::{decode, CimInstance, CimValue, InstanceResolver, ObjectPath, ParamValue};
use crate::error::Result;
use crate::smis::constants::*;

/// A fully resolved method call, ready to invoke
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    /// Service instance the method is invoked on
    pub target: ObjectPath,
    pub method: &'static str,
    pub params: Vec<ParamValue>,
    /// Output parameter carrying the job reference
    pub job_key: &'static str,
}

impl MethodCall {
    fn new(target: &CimInstance, method: &'static str) -> Self {
        Self {
            target: target.path.clone(),
            method,
            params: Vec::new(),
            job_key: JOB_KEY,
        }
    }

    fn param(mut self, name: &str, value: impl Into<CimValue>) -> Self {
        self.params.push(ParamValue::new(name, value));
        self
    }

    /// Look up an input parameter by name
    pub fn param_value(&self, name: &str) -> Option<&CimValue> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}

/// Builds method calls against one connection
pub struct MethodBuilder<'a> {
    resolver: InstanceResolver<'a>,
}

impl<'a> MethodBuilder<'a> {
    pub fn new(resolver: InstanceResolver<'a>) -> Self {
        Self { resolver }
    }

    async fn volume(&self, name: &str) -> Result<CimInstance> {
        self.resolver
            .resolve_by_property(CLASS_STORAGE_VOLUME, PROP_ELEMENT_NAME, name)
            .await
    }

    async fn pool(&self, name: &str) -> Result<CimInstance> {
        self.resolver
            .resolve_by_property(CLASS_STORAGE_POOL, PROP_ELEMENT_NAME, name)
            .await
    }

    /// `ExposePaths`: grant one initiator read/write access to a volume
    pub async fn map_lun(&self, initiator_id: &str, lun_name: &str) -> Result<MethodCall> {
        let lun = self.volume(lun_name).await?;
        let lun_device_name: String = decode(&lun, PROP_NAME)?;
        let ccs = self
            .resolver
            .resolve_singleton(CLASS_CONTROLLER_CONFIGURATION_SERVICE)
            .await?;

        Ok(MethodCall::new(&ccs, METHOD_EXPOSE_PATHS)
            .param("LUNames", vec![lun_device_name])
            .param("InitiatorPortIDs", vec![initiator_id.to_string()])
            .param("DeviceAccesses", vec![DEVICE_ACCESS_READ_WRITE]))
    }

    /// `CreateOrModifyElementFromStoragePool`: new volume in a pool
    pub async fn create_lun(&self, pool_name: &str, name: &str, size: u64) -> Result<MethodCall> {
        let scs = self
            .resolver
            .resolve_singleton(CLASS_STORAGE_CONFIGURATION_SERVICE)
            .await?;
        let pool = self.pool(pool_name).await?;

        Ok(MethodCall::new(&scs, METHOD_CREATE_OR_MODIFY_ELEMENT)
            .param("ElementName", name)
            .param("ElementType", ELEMENT_TYPE_STORAGE_VOLUME)
            .param("InPool", pool.path)
            .param("Size", size))
    }

    /// `CreateElementReplica`: asynchronous snapshot into a pool
    pub async fn create_snapshot(
        &self,
        source_lun: &str,
        dest_pool: &str,
        dest_name: &str,
    ) -> Result<MethodCall> {
        let rs = self
            .resolver
            .resolve_singleton(CLASS_REPLICATION_SERVICE)
            .await?;
        let pool = self.pool(dest_pool).await?;
        let lun = self.volume(source_lun).await?;

        Ok(MethodCall::new(&rs, METHOD_CREATE_ELEMENT_REPLICA)
            .param("ElementName", dest_name)
            .param("SyncType", SYNC_TYPE_SNAPSHOT)
            .param("Mode", REPLICA_MODE_ASYNC)
            .param("SourceElement", lun.path)
            .param("TargetPool", pool.path))
    }

    /// `CreateOrModifyElementFromStoragePool`: resize an existing volume
    pub async fn resize_lun(&self, name: &str, size: u64) -> Result<MethodCall> {
        let scs = self
            .resolver
            .resolve_singleton(CLASS_STORAGE_CONFIGURATION_SERVICE)
            .await?;
        let lun = self.volume(name).await?;

        Ok(MethodCall::new(&scs, METHOD_CREATE_OR_MODIFY_ELEMENT)
            .param("TheElement", lun.path)
            .param("Size", size))
    }

    /// `ReturnToStoragePool`: delete a volume
    pub async fn delete_lun(&self, name: &str) -> Result<MethodCall> {
        let scs = self
            .resolver
            .resolve_singleton(CLASS_STORAGE_CONFIGURATION_SERVICE)
            .await?;
        let lun = self.volume(name).await?;

        Ok(MethodCall::new(&scs, METHOD_RETURN_TO_STORAGE_POOL).param("TheElement", lun.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cim::MemoryWbem;
    use crate::error::Error;
    use assert_matches::assert_matches;

    const NS: &str = "root/cimv2";

    fn service(class: &str) -> CimInstance {
        CimInstance::new(
            ObjectPath::new(class)
                .with_namespace(NS)
                .with_key("Name", "ARRAY-1"),
        )
    }

    fn pool_path(id: &str) -> ObjectPath {
        ObjectPath::new(CLASS_STORAGE_POOL)
            .with_namespace(NS)
            .with_key("InstanceID", id)
    }

    fn volume_path(id: &str) -> ObjectPath {
        ObjectPath::new(CLASS_STORAGE_VOLUME)
            .with_namespace(NS)
            .with_key("DeviceID", id)
    }

    fn array() -> MemoryWbem {
        let wbem = MemoryWbem::new();
        wbem.add_instance(service(CLASS_STORAGE_CONFIGURATION_SERVICE));
        wbem.add_instance(service(CLASS_CONTROLLER_CONFIGURATION_SERVICE));
        wbem.add_instance(service(CLASS_REPLICATION_SERVICE));
        wbem.add_instance(CimInstance::new(pool_path("P1")).with_property("ElementName", "pool-1"));
        wbem.add_instance(
            CimInstance::new(volume_path("0001"))
                .with_property("ElementName", "vol-A")
                .with_property("Name", "600A0B80005AD1D7"),
        );
        wbem
    }

    #[tokio::test]
    async fn test_map_lun_params() {
        let wbem = array();
        let builder = MethodBuilder::new(InstanceResolver::new(&wbem, NS));

        let call = builder.map_lun("iqn.1994-05.com.redhat:host1", "vol-A").await.unwrap();

        assert_eq!(call.method, "ExposePaths");
        assert_eq!(call.target.class_name, CLASS_CONTROLLER_CONFIGURATION_SERVICE);
        assert_eq!(
            call.param_value("LUNames"),
            Some(&CimValue::string_array(["600A0B80005AD1D7"]))
        );
        assert_eq!(
            call.param_value("InitiatorPortIDs"),
            Some(&CimValue::string_array(["iqn.1994-05.com.redhat:host1"]))
        );
        assert_eq!(
            call.param_value("DeviceAccesses"),
            Some(&CimValue::uint16_array([2]))
        );
    }

    #[tokio::test]
    async fn test_create_lun_params() {
        let wbem = array();
        let builder = MethodBuilder::new(InstanceResolver::new(&wbem, NS));

        let call = builder.create_lun("pool-1", "vol-B", 1 << 30).await.unwrap();

        assert_eq!(call.method, "CreateOrModifyElementFromStoragePool");
        assert_eq!(call.target.class_name, CLASS_STORAGE_CONFIGURATION_SERVICE);
        let names: Vec<_> = call.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["ElementName", "ElementType", "InPool", "Size"]);
        assert_eq!(call.param_value("ElementType"), Some(&CimValue::Uint16(2)));
        assert_eq!(
            call.param_value("InPool"),
            Some(&CimValue::Reference(pool_path("P1")))
        );
        assert_eq!(call.param_value("Size"), Some(&CimValue::Uint64(1 << 30)));
        assert_eq!(call.job_key, "Job");
    }

    #[tokio::test]
    async fn test_create_snapshot_params() {
        let wbem = array();
        let builder = MethodBuilder::new(InstanceResolver::new(&wbem, NS));

        let call = builder
            .create_snapshot("vol-A", "pool-1", "vol-A-snap")
            .await
            .unwrap();

        assert_eq!(call.method, "CreateElementReplica");
        assert_eq!(call.param_value("ElementName"), Some(&CimValue::from("vol-A-snap")));
        assert_eq!(call.param_value("SyncType"), Some(&CimValue::Uint16(7)));
        assert_eq!(call.param_value("Mode"), Some(&CimValue::Uint16(3)));
        assert_eq!(
            call.param_value("SourceElement"),
            Some(&CimValue::Reference(volume_path("0001")))
        );
        assert_eq!(
            call.param_value("TargetPool"),
            Some(&CimValue::Reference(pool_path("P1")))
        );
    }

    #[tokio::test]
    async fn test_resize_and_delete_params() {
        let wbem = array();
        let builder = MethodBuilder::new(InstanceResolver::new(&wbem, NS));

        let resize = builder.resize_lun("vol-A", 2 << 30).await.unwrap();
        assert_eq!(resize.params.len(), 2);
        assert_eq!(
            resize.param_value("TheElement"),
            Some(&CimValue::Reference(volume_path("0001")))
        );
        assert_eq!(resize.param_value("Size"), Some(&CimValue::Uint64(2 << 30)));

        let delete = builder.delete_lun("vol-A").await.unwrap();
        assert_eq!(delete.method, "ReturnToStoragePool");
        assert_eq!(delete.params.len(), 1);
    }

    #[tokio::test]
    async fn test_unresolved_references_fail() {
        let wbem = array();
        let builder = MethodBuilder::new(InstanceResolver::new(&wbem, NS));

        assert_matches!(
            builder.create_lun("pool-9", "vol-B", 1).await,
            Err(Error::InstanceNotFound { .. })
        );
        assert_matches!(
            builder.delete_lun("vol-Z").await,
            Err(Error::InstanceNotFound { .. })
        );

        let bare = MemoryWbem::new();
        let builder = MethodBuilder::new(InstanceResolver::new(&bare, NS));
        assert_matches!(
            builder.resize_lun("vol-A", 1).await,
            Err(Error::AmbiguousOrMissingInstance { .. })
        );
    }
}
