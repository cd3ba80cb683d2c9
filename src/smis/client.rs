//! SMI-S Session
//!
//! [`Smis`] ties a WBEM connection to a namespace and implements the
//! [`StorageArray`] port on top of the resolver, the method builders and
//! the job poller.

use crate::cim::{CimInstance, InstanceResolver};
use crate::domain::model::{Initiator, StoragePool, Volume};
use crate::domain::ports::{JobTimerRef, StorageArray, TokioTimer, WbemClientRef};
use crate::error::Result;
use crate::smis::config::{JobPollConfig, SmisConfig};
use crate::smis::constants::CLASS_STORAGE_POOL;
use crate::smis::invoker::{MethodBuilder, MethodCall};
use crate::smis::job::{evaluate_invocation, JobPoller, JobReport};
use crate::smis::listing::list;
use crate::smis::metrics::{SmisMetrics, SmisMetricsSnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// A session against one SMI-S provider namespace
pub struct Smis {
    client: WbemClientRef,
    namespace: String,
    job: JobPollConfig,
    timer: JobTimerRef,
    metrics: SmisMetrics,
}

impl Smis {
    /// Wrap a client that is already connected
    pub fn new(client: WbemClientRef, namespace: impl Into<String>, job: JobPollConfig) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            job,
            timer: Arc::new(TokioTimer),
            metrics: SmisMetrics::new(),
        }
    }

    /// Validate the configuration, apply the timeout and connect
    pub async fn connect(config: SmisConfig, client: WbemClientRef) -> Result<Self> {
        config.validate()?;
        client.set_timeout(config.timeout());

        let port = config.effective_port();
        info!(
            "Connecting to SMI-S provider {}:{} (namespace {})",
            config.host, port, config.namespace
        );
        client
            .connect(&config.host, port, &config.username, &config.password)
            .await?;

        Ok(Self::new(client, config.namespace, config.job))
    }

    /// Replace the timer the job poller waits on
    pub fn with_timer(mut self, timer: JobTimerRef) -> Self {
        self.timer = timer;
        self
    }

    /// Close the session
    pub async fn disconnect(self) -> Result<()> {
        debug!("Disconnecting from SMI-S provider");
        self.client.disconnect().await
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn metrics(&self) -> SmisMetricsSnapshot {
        self.metrics.snapshot()
    }

    fn resolver(&self) -> InstanceResolver<'_> {
        InstanceResolver::new(self.client.as_ref(), &self.namespace)
    }

    fn builder(&self) -> MethodBuilder<'_> {
        MethodBuilder::new(self.resolver())
    }

    fn poller(&self) -> JobPoller<'_> {
        JobPoller::new(
            self.client.as_ref(),
            &self.namespace,
            self.timer.as_ref(),
            &self.job,
            &self.metrics,
        )
    }

    /// Invoke a resolved call and follow any job it starts
    pub async fn execute(&self, call: MethodCall) -> Result<Option<JobReport>> {
        self.metrics.record_invocation();
        debug!("Invoking {} on {}", call.method, call.target);

        let result = self
            .client
            .invoke_method(&self.namespace, &call.target, call.method, &call.params)
            .await?;

        evaluate_invocation(&self.poller(), call.method, &result, call.job_key).await
    }

    /// String form of one property across every instance of a class
    pub async fn property_values(&self, class_name: &str, property: &str) -> Result<Vec<String>> {
        self.resolver().property_values(class_name, property).await
    }

    /// Raw `CIM_StoragePool` instances
    pub async fn storage_pool_instances(&self) -> Result<Vec<CimInstance>> {
        self.resolver().enumerate(CLASS_STORAGE_POOL).await
    }
}

#[async_trait]
impl StorageArray for Smis {
    async fn get_storage_pools(&self) -> Result<Vec<StoragePool>> {
        list(&self.resolver()).await
    }

    async fn get_initiators(&self) -> Result<Vec<Initiator>> {
        list(&self.resolver()).await
    }

    async fn get_volumes(&self) -> Result<Vec<Volume>> {
        list(&self.resolver()).await
    }

    async fn map_lun(&self, initiator_id: &str, volume_name: &str) -> Result<()> {
        info!("Mapping volume {} to initiator {}", volume_name, initiator_id);
        let call = self.builder().map_lun(initiator_id, volume_name).await?;
        self.execute(call).await.map(|_| ())
    }

    async fn create_lun(&self, pool_name: &str, name: &str, size_bytes: u64) -> Result<()> {
        info!(
            "Creating volume {} ({} bytes) in pool {}",
            name, size_bytes, pool_name
        );
        let call = self.builder().create_lun(pool_name, name, size_bytes).await?;
        self.execute(call).await.map(|_| ())
    }

    async fn resize_lun(&self, name: &str, size_bytes: u64) -> Result<()> {
        info!("Resizing volume {} to {} bytes", name, size_bytes);
        let call = self.builder().resize_lun(name, size_bytes).await?;
        self.execute(call).await.map(|_| ())
    }

    async fn delete_lun(&self, name: &str) -> Result<()> {
        info!("Deleting volume {}", name);
        let call = self.builder().delete_lun(name).await?;
        self.execute(call).await.map(|_| ())
    }

    async fn create_snapshot(
        &self,
        source_lun_name: &str,
        dest_pool_name: &str,
        dest_name: &str,
    ) -> Result<()> {
        info!(
            "Creating snapshot {} of {} in pool {}",
            dest_name, source_lun_name, dest_pool_name
        );
        let call = self
            .builder()
            .create_snapshot(source_lun_name, dest_pool_name, dest_name)
            .await?;
        self.execute(call).await.map(|_| ())
    }

    fn set_timeout(&self, timeout_ms: u32) {
        self.client
            .set_timeout(Duration::from_millis(u64::from(timeout_ms)));
    }

    fn timeout(&self) -> u32 {
        u32::try_from(self.client.timeout().as_millis()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cim::memory::{job_status_instance, MemoryWbem, WbemCall};
    use crate::cim::{CimValue, MethodResult, ObjectPath};
    use crate::domain::ports::WbemClient;
    use crate::error::Error;
    use crate::smis::constants::*;
    use crate::smis::job::tests::RecordingTimer;
    use assert_matches::assert_matches;

    const NS: &str = "root/cimv2";

    struct Harness {
        wbem: Arc<MemoryWbem>,
        timer: Arc<RecordingTimer>,
        smis: Smis,
    }

    fn service(class: &str) -> CimInstance {
        CimInstance::new(
            ObjectPath::new(class)
                .with_namespace(NS)
                .with_key("Name", "ARRAY-1"),
        )
    }

    fn job_path(id: &str) -> ObjectPath {
        ObjectPath::new("CIM_ConcreteJob")
            .with_namespace(NS)
            .with_key("InstanceID", id)
    }

    fn harness() -> Harness {
        let wbem = Arc::new(MemoryWbem::new());
        wbem.add_instance(service(CLASS_STORAGE_CONFIGURATION_SERVICE));
        wbem.add_instance(service(CLASS_CONTROLLER_CONFIGURATION_SERVICE));
        wbem.add_instance(service(CLASS_REPLICATION_SERVICE));
        wbem.add_instance(
            CimInstance::new(
                ObjectPath::new(CLASS_STORAGE_POOL)
                    .with_namespace(NS)
                    .with_key("InstanceID", "P1"),
            )
            .with_property("PoolID", "P1")
            .with_property("ElementName", "pool-1")
            .with_property("TotalManagedSpace", 10u64 << 40)
            .with_property("RemainingManagedSpace", 8u64 << 40),
        );
        wbem.add_instance(
            CimInstance::new(
                ObjectPath::new(CLASS_STORAGE_VOLUME)
                    .with_namespace(NS)
                    .with_key("DeviceID", "0001"),
            )
            .with_property("DeviceID", "0001")
            .with_property("ElementName", "vol-A")
            .with_property("Name", "600A0B80005AD1D7")
            .with_property("OtherIdentifyingInfo", vec!["600a0b80005ad1d7".to_string()])
            .with_property("BlockSize", 512u64)
            .with_property("NumberOfBlocks", 2_097_152u64)
            .with_property("OperationalStatus", vec![2u16]),
        );

        let timer = Arc::new(RecordingTimer::default());
        let smis = Smis::new(wbem.clone(), NS, JobPollConfig::default()).with_timer(timer.clone());
        Harness { wbem, timer, smis }
    }

    #[tokio::test]
    async fn test_create_lun_async_end_to_end() {
        let h = harness();
        let job = job_path("JOB-1");
        h.wbem.push_method_result(
            METHOD_CREATE_OR_MODIFY_ELEMENT,
            MethodResult::new(4096u32)
                .with_out_param("TheElement", CimValue::Null)
                .with_out_param("Job", job.clone()),
        );
        h.wbem.script_job(
            &job,
            vec![
                job_status_instance(&job, &[2], Some(0), false),
                job_status_instance(&job, &[2], Some(50), false),
                job_status_instance(&job, &[2, 17], Some(100), false),
            ],
        );

        h.smis.create_lun("pool-1", "vol-A", 1_073_741_824).await.unwrap();

        let invoke = h
            .wbem
            .calls()
            .into_iter()
            .find_map(|c| match c {
                WbemCall::InvokeMethod { path, in_params, .. } => Some((path, in_params)),
                _ => None,
            })
            .unwrap();
        assert_eq!(invoke.0.class_name, CLASS_STORAGE_CONFIGURATION_SERVICE);
        let element_type = invoke.1.iter().find(|p| p.name == "ElementType").unwrap();
        assert_eq!(element_type.value, CimValue::Uint16(ELEMENT_TYPE_STORAGE_VOLUME));
        let size = invoke.1.iter().find(|p| p.name == "Size").unwrap();
        assert_eq!(size.value, CimValue::Uint64(1_073_741_824));

        assert_eq!(h.wbem.get_instance_count(&job), 3);
        assert_eq!(h.timer.count(), 2);
        assert_eq!(h.wbem.delete_count(&job), 1);

        let metrics = h.smis.metrics();
        assert_eq!(metrics.invocations, 1);
        assert_eq!(metrics.jobs_started, 1);
        assert_eq!(metrics.jobs_succeeded, 1);
    }

    #[tokio::test]
    async fn test_sync_operations_complete_without_polling() {
        let h = harness();

        h.smis.map_lun("iqn.1994-05.com.redhat:host1", "vol-A").await.unwrap();
        h.smis.resize_lun("vol-A", 2 << 30).await.unwrap();
        h.smis.delete_lun("vol-A").await.unwrap();

        assert_eq!(
            h.wbem.invoked_methods(),
            vec![
                METHOD_EXPOSE_PATHS.to_string(),
                METHOD_CREATE_OR_MODIFY_ELEMENT.to_string(),
                METHOD_RETURN_TO_STORAGE_POOL.to_string(),
            ]
        );
        assert!(!h
            .wbem
            .calls()
            .iter()
            .any(|c| matches!(c, WbemCall::GetInstance { .. })));
        assert_eq!(h.smis.metrics().sync_completions, 3);
    }

    #[tokio::test]
    async fn test_sync_failure_reports_code() {
        let h = harness();
        h.wbem.push_method_result(
            METHOD_RETURN_TO_STORAGE_POOL,
            MethodResult::new(4u32).with_out_param("Job", CimValue::Null),
        );

        let err = h.smis.delete_lun("vol-A").await.unwrap_err();
        assert_matches!(err, Error::Invocation { code: 4, .. });
        assert!(err.to_string().contains("ParamName:value(Job:)"));
    }

    #[tokio::test]
    async fn test_snapshot_job_stopped_is_error() {
        let h = harness();
        let job = job_path("JOB-2");
        h.wbem.push_method_result(
            METHOD_CREATE_ELEMENT_REPLICA,
            MethodResult::new(4096u32).with_out_param("Job", job.clone()),
        );
        h.wbem
            .script_job(&job, vec![job_status_instance(&job, &[2, 10], None, true)]);

        let err = h
            .smis
            .create_snapshot("vol-A", "pool-1", "vol-A-snap")
            .await
            .unwrap_err();

        assert_matches!(err, Error::Job { ref reason, .. } if reason == "stopped (status 2,10)");
        assert_eq!(h.wbem.delete_count(&job), 0);
    }

    #[tokio::test]
    async fn test_resolution_failure_sends_nothing() {
        let h = harness();

        let err = h.smis.create_lun("pool-9", "vol-B", 1).await.unwrap_err();
        assert_matches!(err, Error::InstanceNotFound { .. });
        assert!(h.wbem.invoked_methods().is_empty());
    }

    #[tokio::test]
    async fn test_listings() {
        let h = harness();

        let pools = h.smis.get_storage_pools().await.unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].free_space, 8u64 << 40);

        let volumes = h.smis.get_volumes().await.unwrap();
        assert_eq!(volumes[0].size_bytes(), 1_073_741_824);

        assert!(h.smis.get_initiators().await.unwrap().is_empty());
        assert_eq!(h.smis.storage_pool_instances().await.unwrap().len(), 1);
        assert_eq!(
            h.smis
                .property_values(CLASS_STORAGE_VOLUME, "ElementName")
                .await
                .unwrap(),
            vec!["vol-A".to_string()]
        );
    }

    #[tokio::test]
    async fn test_connect_applies_config() {
        let wbem = Arc::new(MemoryWbem::new());
        let config = SmisConfig {
            host: "array-1".into(),
            namespace: "root/emc".into(),
            username: "admin".into(),
            timeout_ms: 5000,
            ..Default::default()
        };

        let smis = Smis::connect(config, wbem.clone()).await.unwrap();
        assert!(wbem.is_connected());
        assert_eq!(smis.namespace(), "root/emc");
        assert_eq!(smis.timeout(), 5000);
        assert_eq!(
            wbem.calls()[0],
            WbemCall::Connect {
                host: "array-1".into(),
                port: 5988,
                username: "admin".into(),
            }
        );

        smis.set_timeout(750);
        assert_eq!(wbem.timeout(), Duration::from_millis(750));

        smis.disconnect().await.unwrap();
        assert!(!wbem.is_connected());
    }

    #[tokio::test]
    async fn test_connect_failures() {
        let wbem = Arc::new(MemoryWbem::new());
        wbem.refuse_connections("connection refused");
        let err = Smis::connect(SmisConfig::default(), wbem.clone())
            .await
            .err()
            .unwrap();
        assert!(err.is_transient());

        let bad = SmisConfig {
            namespace: String::new(),
            ..Default::default()
        };
        assert_matches!(
            Smis::connect(bad, wbem).await.err(),
            Some(Error::Configuration(_))
        );
    }
}
