//! In-Memory WBEM Repository
//!
//! A [`WbemClient`] that serves instances from process memory. Method
//! results and job status sequences are scripted, and every call is
//! recorded so callers can assert on the exact conversation with the
//! "array". Used by the test suites and by plugin hosts for dry runs.

use crate::cim::{CimInstance, CimValue, MethodResult, ObjectPath, ParamValue};
use crate::domain::ports::WbemClient;
use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Default request timeout (30 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One recorded call against the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WbemCall {
    Connect {
        host: String,
        port: u16,
        username: String,
    },
    Disconnect,
    EnumerateInstances {
        namespace: String,
        class_name: String,
    },
    InvokeMethod {
        namespace: String,
        path: ObjectPath,
        method: String,
        in_params: Vec<ParamValue>,
    },
    GetInstance {
        namespace: String,
        path: ObjectPath,
    },
    DeleteInstance {
        namespace: String,
        path: ObjectPath,
    },
}

#[derive(Default)]
struct Repository {
    /// Instances in enumeration order
    instances: Vec<CimInstance>,
    /// Scripted results per method name, consumed front to back
    method_results: HashMap<String, VecDeque<MethodResult>>,
    /// Scripted job status snapshots; the last one repeats
    job_statuses: HashMap<ObjectPath, VecDeque<CimInstance>>,
    /// Error returned by delete_instance, if set
    delete_failure: Option<String>,
    /// Error returned by connect, if set
    connect_failure: Option<String>,
    connected: bool,
    timeout: Option<Duration>,
    calls: Vec<WbemCall>,
}

/// In-memory WBEM client
#[derive(Default)]
pub struct MemoryWbem {
    repo: Mutex<Repository>,
}

impl MemoryWbem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instance; enumeration returns instances in insertion order
    pub fn add_instance(&self, instance: CimInstance) {
        self.repo.lock().instances.push(instance);
    }

    /// Queue the result of the next call to `method`
    ///
    /// Unscripted methods return `0` (completed) with no output parameters.
    pub fn push_method_result(&self, method: &str, result: MethodResult) {
        self.repo
            .lock()
            .method_results
            .entry(method.to_string())
            .or_default()
            .push_back(result);
    }

    /// Script the successive status snapshots served for a job path
    pub fn script_job(&self, job: &ObjectPath, statuses: Vec<CimInstance>) {
        self.repo
            .lock()
            .job_statuses
            .insert(job.clone(), statuses.into_iter().collect());
    }

    /// Make every delete_instance call fail with `reason`
    pub fn fail_deletes(&self, reason: impl Into<String>) {
        self.repo.lock().delete_failure = Some(reason.into());
    }

    /// Make connect fail with `reason`
    pub fn refuse_connections(&self, reason: impl Into<String>) {
        self.repo.lock().connect_failure = Some(reason.into());
    }

    pub fn is_connected(&self) -> bool {
        self.repo.lock().connected
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<WbemCall> {
        self.repo.lock().calls.clone()
    }

    /// Method names invoked so far, in order
    pub fn invoked_methods(&self) -> Vec<String> {
        self.repo
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                WbemCall::InvokeMethod { method, .. } => Some(method.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of get_instance calls made for `path`
    pub fn get_instance_count(&self, path: &ObjectPath) -> usize {
        self.repo
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, WbemCall::GetInstance { path: p, .. } if p == path))
            .count()
    }

    /// Number of delete_instance calls made for `path`
    pub fn delete_count(&self, path: &ObjectPath) -> usize {
        self.repo
            .lock()
            .calls
            .iter()
            .filter(|c| matches!(c, WbemCall::DeleteInstance { path: p, .. } if p == path))
            .count()
    }
}

/// Build a job status snapshot as an SMI-S provider reports it
pub fn job_status_instance(
    job: &ObjectPath,
    operational_status: &[u16],
    percent_complete: Option<u16>,
    delete_on_completion: bool,
) -> CimInstance {
    let mut instance = CimInstance::new(job.clone())
        .with_property("OperationalStatus", operational_status.to_vec())
        .with_property("DeleteOnCompletion", delete_on_completion);
    instance.set_property(
        "PercentComplete",
        percent_complete.map(CimValue::Uint16).unwrap_or(CimValue::Null),
    );
    instance
}

fn not_found(operation: &str, path: &ObjectPath) -> Error {
    Error::transport(operation, format!("CIM_ERR_NOT_FOUND: {}", path))
}

#[async_trait]
impl WbemClient for MemoryWbem {
    async fn connect(&self, host: &str, port: u16, username: &str, _password: &str) -> Result<()> {
        let mut repo = self.repo.lock();
        repo.calls.push(WbemCall::Connect {
            host: host.to_string(),
            port,
            username: username.to_string(),
        });
        if let Some(reason) = &repo.connect_failure {
            return Err(Error::Connection(format!("{}:{}: {}", host, port, reason)));
        }
        repo.connected = true;
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        let mut repo = self.repo.lock();
        repo.calls.push(WbemCall::Disconnect);
        repo.connected = false;
        Ok(())
    }

    async fn enumerate_instances(
        &self,
        namespace: &str,
        class_name: &str,
    ) -> Result<Vec<CimInstance>> {
        let mut repo = self.repo.lock();
        repo.calls.push(WbemCall::EnumerateInstances {
            namespace: namespace.to_string(),
            class_name: class_name.to_string(),
        });
        Ok(repo
            .instances
            .iter()
            .filter(|i| i.class_name().eq_ignore_ascii_case(class_name))
            .cloned()
            .collect())
    }

    async fn invoke_method(
        &self,
        namespace: &str,
        path: &ObjectPath,
        method: &str,
        in_params: &[ParamValue],
    ) -> Result<MethodResult> {
        let mut repo = self.repo.lock();
        repo.calls.push(WbemCall::InvokeMethod {
            namespace: namespace.to_string(),
            path: path.clone(),
            method: method.to_string(),
            in_params: in_params.to_vec(),
        });
        let scripted = repo
            .method_results
            .get_mut(method)
            .and_then(|queue| queue.pop_front());
        Ok(scripted.unwrap_or_else(|| MethodResult::new(0u32)))
    }

    async fn get_instance(&self, namespace: &str, path: &ObjectPath) -> Result<CimInstance> {
        let mut repo = self.repo.lock();
        repo.calls.push(WbemCall::GetInstance {
            namespace: namespace.to_string(),
            path: path.clone(),
        });

        if let Some(queue) = repo.job_statuses.get_mut(path) {
            let snapshot = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            return snapshot.ok_or_else(|| not_found("get_instance", path));
        }

        repo.instances
            .iter()
            .find(|i| &i.path == path)
            .cloned()
            .ok_or_else(|| not_found("get_instance", path))
    }

    async fn delete_instance(&self, namespace: &str, path: &ObjectPath) -> Result<()> {
        let mut repo = self.repo.lock();
        repo.calls.push(WbemCall::DeleteInstance {
            namespace: namespace.to_string(),
            path: path.clone(),
        });
        if let Some(reason) = &repo.delete_failure {
            return Err(Error::transport("delete_instance", reason));
        }

        let scripted = repo.job_statuses.remove(path).is_some();
        let before = repo.instances.len();
        repo.instances.retain(|i| &i.path != path);
        if scripted || repo.instances.len() != before {
            Ok(())
        } else {
            Err(not_found("delete_instance", path))
        }
    }

    fn set_timeout(&self, timeout: Duration) {
        self.repo.lock().timeout = Some(timeout);
    }

    fn timeout(&self) -> Duration {
        self.repo.lock().timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}
