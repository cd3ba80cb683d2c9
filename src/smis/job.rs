//! Invocation Results and Job Tracking
//!
//! SMI-S methods either finish before returning or hand back a reference
//! to a `CIM_ConcreteJob` that keeps running on the array. This module
//! classifies method results and drives the job state machine:
//!
//! ```text
//!              get_instance(job)
//!   Running ───────────────────────┐
//!     ▲  │ [OK]                    │ [OK, COMPLETE]  -> Succeeded
//!     └──┘ sleep(interval)         │ [OK, STOPPED]   -> Stopped
//!                                  │ [OK, ERROR]     -> Failed
//!                                  │ [not OK, ..]    -> JobError
//! ```
//!
//! Terminal jobs are deleted unless the array deletes them itself.

use crate::cim::{decode, decode_optional, decode_value, CimInstance, CimValue, MethodResult, ObjectPath};
use crate::domain::ports::{JobTimer, WbemClient};
use crate::error::{Error, Result};
use crate::smis::config::JobPollConfig;
use crate::smis::constants::{
    OperationalStatus, ReturnCode, PROP_DELETE_ON_COMPLETION, PROP_OPERATIONAL_STATUS,
    PROP_PERCENT_COMPLETE,
};
use crate::smis::metrics::SmisMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

// =============================================================================
// Invocation Classification
// =============================================================================

/// What a method call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// Finished synchronously
    Completed,
    /// Started the referenced job
    JobStarted(ObjectPath),
}

/// Classify a method result by its return code
///
/// `0` completed, `4096` started the job named by the `job_key` output
/// parameter, anything else failed. Failures carry every output parameter
/// rendered for diagnosis.
pub fn classify(method: &str, result: &MethodResult, job_key: &str) -> Result<InvokeOutcome> {
    let code: u32 = decode_value("ReturnValue", &result.return_value)?;
    let failure = || Error::Invocation {
        method: method.to_string(),
        code,
        params: result.render_out_params(),
    };

    if code == ReturnCode::Completed as u32 {
        return Ok(InvokeOutcome::Completed);
    }
    if code != ReturnCode::JobStarted as u32 {
        return Err(failure());
    }

    match result.out_param(job_key) {
        Some(CimValue::Reference(path)) => Ok(InvokeOutcome::JobStarted(path.clone())),
        Some(CimValue::String(path)) => Ok(InvokeOutcome::JobStarted(path.parse()?)),
        _ => Err(failure()),
    }
}

// =============================================================================
// Job State
// =============================================================================

/// Job lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Running,
    Succeeded,
    Stopped,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Running)
    }

    /// Interpret a job's `OperationalStatus` sequence
    ///
    /// One element means running, two mean an outcome is present. The
    /// primary code must be OK; anything else is a hard failure.
    pub fn from_operational_status(job: &ObjectPath, codes: &[u16]) -> Result<JobState> {
        let Some(&primary) = codes.first() else {
            return Err(Error::job(job, "reported no operational status"));
        };
        if primary != OperationalStatus::Ok.code() {
            return Err(Error::job(
                job,
                format!("encountered an error! (status {})", primary),
            ));
        }

        match codes {
            [_] => Ok(JobState::Running),
            [_, secondary] => Ok(match *secondary {
                s if s == OperationalStatus::Completed.code() => JobState::Succeeded,
                s if s == OperationalStatus::Stopped.code() => JobState::Stopped,
                s if s == OperationalStatus::Error.code() => JobState::Failed,
                other => {
                    warn!("Job {} finished with unrecognised status {}", job, other);
                    JobState::Failed
                }
            }),
            _ => Err(Error::job(
                job,
                format!("reported {} operational status codes", codes.len()),
            )),
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Running => write!(f, "running"),
            JobState::Succeeded => write!(f, "succeeded"),
            JobState::Stopped => write!(f, "stopped"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

/// Summary of a tracked job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub job: ObjectPath,
    /// Terminal state reached
    pub state: JobState,
    /// Final `OperationalStatus` codes
    pub status: Vec<u16>,
    /// Status polls issued
    pub polls: u32,
    /// Last reported completion percentage
    pub last_percent: Option<u16>,
    /// Whether the job instance was deleted by us
    pub reaped: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

// =============================================================================
// Job Poller
// =============================================================================

/// Drives a job to a terminal state
pub struct JobPoller<'a> {
    client: &'a dyn WbemClient,
    namespace: &'a str,
    timer: &'a dyn JobTimer,
    config: &'a JobPollConfig,
    metrics: &'a SmisMetrics,
}

impl<'a> JobPoller<'a> {
    pub fn new(
        client: &'a dyn WbemClient,
        namespace: &'a str,
        timer: &'a dyn JobTimer,
        config: &'a JobPollConfig,
        metrics: &'a SmisMetrics,
    ) -> Self {
        Self {
            client,
            namespace,
            timer,
            config,
            metrics,
        }
    }

    /// Fetch the job once and interpret its status
    ///
    /// Returns the state, the raw `OperationalStatus` codes and the job
    /// instance.
    pub async fn poll_once(&self, job: &ObjectPath) -> Result<(JobState, Vec<u16>, CimInstance)> {
        self.metrics.record_job_poll();
        let status = self.client.get_instance(self.namespace, job).await?;
        let codes: Vec<u16> = decode(&status, PROP_OPERATIONAL_STATUS)?;
        let state = JobState::from_operational_status(job, &codes)?;
        Ok((state, codes, status))
    }

    /// Poll until the job is terminal, whatever the outcome
    ///
    /// Without `max_polls` this waits as long as the array keeps reporting
    /// the job as running.
    pub async fn wait(&self, job: &ObjectPath) -> Result<JobReport> {
        info!("job started= {}", job);
        let started_at = Utc::now();
        let mut polls = 0u32;
        let mut last_percent = None;

        loop {
            polls += 1;
            let (state, codes, status) = match self.poll_once(job).await {
                Ok(polled) => polled,
                Err(e) => {
                    if matches!(e, Error::Job { .. }) {
                        self.metrics.record_job_failed();
                    }
                    return Err(e);
                }
            };

            // Progress is informational; a malformed value does not fail the job
            match decode_optional::<u16>(&status, PROP_PERCENT_COMPLETE) {
                Ok(Some(percent)) => last_percent = Some(percent),
                Ok(None) => {}
                Err(e) => warn!("Job {} ignoring progress: {}", job, e),
            }

            if !state.is_terminal() {
                debug!(
                    "Job {} percent complete= {}",
                    job,
                    last_percent.map(|p| p.to_string()).unwrap_or_default()
                );
                if let Some(max) = self.config.max_polls {
                    if polls >= max {
                        self.metrics.record_job_failed();
                        return Err(Error::job(
                            job,
                            format!("still running after {} polls", polls),
                        ));
                    }
                }
                self.timer.sleep(self.config.interval()).await;
                continue;
            }

            let reaped = match self.reap(job, &status).await {
                Ok(reaped) => reaped,
                Err(e) => {
                    self.metrics.record_job_failed();
                    return Err(e);
                }
            };
            match state {
                JobState::Succeeded => {
                    self.metrics.record_job_succeeded();
                    info!("Job complete! {} after {} poll(s)", job, polls);
                }
                JobState::Stopped => {
                    self.metrics.record_job_stopped();
                    warn!("Job stopped! {}", job);
                }
                _ => {
                    self.metrics.record_job_failed();
                    error!("Job errored! {}", job);
                }
            }

            return Ok(JobReport {
                job: job.clone(),
                state,
                status: codes,
                polls,
                last_percent,
                reaped,
                started_at,
                finished_at: Utc::now(),
            });
        }
    }

    /// Poll until terminal; anything but success is an error
    pub async fn complete(&self, job: &ObjectPath) -> Result<JobReport> {
        let report = self.wait(job).await?;
        match report.state {
            JobState::Succeeded => Ok(report),
            state => Err(Error::job(
                job,
                format!("{} (status {})", state, render_codes(&report.status)),
            )),
        }
    }

    /// Delete a terminal job unless the array deletes it itself
    ///
    /// Delete failures are logged and swallowed.
    async fn reap(&self, job: &ObjectPath, status: &CimInstance) -> Result<bool> {
        let auto_delete: bool = decode(status, PROP_DELETE_ON_COMPLETION)?;
        if auto_delete {
            return Ok(false);
        }

        match self.client.delete_instance(self.namespace, job).await {
            Ok(()) => Ok(true),
            Err(e) => {
                self.metrics.record_reap_failure();
                warn!("Warning: error when deleting job! {}", e);
                Ok(false)
            }
        }
    }
}

fn render_codes(codes: &[u16]) -> String {
    codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Classify a method result and, if a job was started, see it through
///
/// Returns the job report for asynchronous calls, `None` for synchronous
/// completion.
pub async fn evaluate_invocation(
    poller: &JobPoller<'_>,
    method: &str,
    result: &MethodResult,
    job_key: &str,
) -> Result<Option<JobReport>> {
    let outcome = match classify(method, result, job_key) {
        Ok(outcome) => outcome,
        Err(e) => {
            poller.metrics.record_sync_failure();
            return Err(e);
        }
    };

    match outcome {
        InvokeOutcome::Completed => {
            poller.metrics.record_sync_completion();
            debug!("{} completed synchronously", method);
            Ok(None)
        }
        InvokeOutcome::JobStarted(job) => {
            poller.metrics.record_job_started();
            poller.complete(&job).await.map(Some)
        }
    }
}
