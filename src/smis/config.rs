//! Session Configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default CIM-XML port over plain HTTP
pub const DEFAULT_HTTP_PORT: u16 = 5988;
/// Default CIM-XML port over HTTPS
pub const DEFAULT_HTTPS_PORT: u16 = 5989;

// =============================================================================
// Job Polling
// =============================================================================

/// How the job poller waits for asynchronous jobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPollConfig {
    /// Delay between status polls in milliseconds
    pub interval_ms: u64,
    /// Give up after this many polls; `None` waits for a terminal state
    /// indefinitely
    pub max_polls: Option<u32>,
}

impl Default for JobPollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_polls: None,
        }
    }
}

impl JobPollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

// =============================================================================
// Session
// =============================================================================

/// Configuration for an SMI-S session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmisConfig {
    /// Provider host name or address
    pub host: String,
    /// Provider port; 0 selects the default for the scheme
    pub port: u16,
    /// CIM namespace holding the array profile
    pub namespace: String,
    /// Username
    pub username: String,
    /// Password (should use secrets in production)
    pub password: String,
    /// Request round-trip timeout in milliseconds
    pub timeout_ms: u32,
    /// Use HTTPS
    pub use_tls: bool,
    /// Job polling
    pub job: JobPollConfig,
}

impl Default for SmisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 0,
            namespace: "root/cimv2".to_string(),
            username: String::new(),
            password: String::new(),
            timeout_ms: 30_000,
            use_tls: false,
            job: JobPollConfig::default(),
        }
    }
}

impl SmisConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SmisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Port to connect to
    pub fn effective_port(&self) -> u16 {
        match (self.port, self.use_tls) {
            (0, true) => DEFAULT_HTTPS_PORT,
            (0, false) => DEFAULT_HTTP_PORT,
            (port, _) => port,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_ms))
    }

    /// Reject settings the session cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Configuration("host must not be empty".into()));
        }
        if self.namespace.trim().is_empty() {
            return Err(Error::Configuration("namespace must not be empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Configuration("timeout_ms must be positive".into()));
        }
        if self.job.interval_ms == 0 {
            return Err(Error::Configuration(
                "job.interval_ms must be positive".into(),
            ));
        }
        if self.job.max_polls == Some(0) {
            return Err(Error::Configuration(
                "job.max_polls must be positive when set".into(),
            ));
        }
        Ok(())
    }
}
