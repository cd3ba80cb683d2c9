//! Session Metrics
//!
//! Lock-free counters for method invocations and job outcomes.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one SMI-S session
#[derive(Debug, Default)]
pub struct SmisMetrics {
    /// Extrinsic methods invoked
    pub invocations: AtomicU64,
    /// Invocations that completed synchronously
    pub sync_completions: AtomicU64,
    /// Invocations that failed synchronously
    pub sync_failures: AtomicU64,
    /// Invocations that started a job
    pub jobs_started: AtomicU64,
    /// Job status polls issued
    pub job_polls: AtomicU64,
    pub jobs_succeeded: AtomicU64,
    pub jobs_stopped: AtomicU64,
    pub jobs_failed: AtomicU64,
    /// Completed jobs that could not be deleted
    pub reap_failures: AtomicU64,
    /// Last update timestamp (Unix millis)
    pub last_update_ms: AtomicU64,
}

impl SmisMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    #[inline]
    pub fn record_sync_completion(&self) {
        self.sync_completions.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    #[inline]
    pub fn record_sync_failure(&self) {
        self.sync_failures.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    #[inline]
    pub fn record_job_started(&self) {
        self.jobs_started.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    #[inline]
    pub fn record_job_poll(&self) {
        self.job_polls.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    #[inline]
    pub fn record_job_succeeded(&self) {
        self.jobs_succeeded.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    #[inline]
    pub fn record_job_stopped(&self) {
        self.jobs_stopped.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    #[inline]
    pub fn record_job_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    #[inline]
    pub fn record_reap_failure(&self) {
        self.reap_failures.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    #[inline]
    fn touch(&self) {
        self.last_update_ms
            .store(Utc::now().timestamp_millis() as u64, Ordering::Release);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> SmisMetricsSnapshot {
        SmisMetricsSnapshot {
            invocations: self.invocations.load(Ordering::Relaxed),
            sync_completions: self.sync_completions.load(Ordering::Relaxed),
            sync_failures: self.sync_failures.load(Ordering::Relaxed),
            jobs_started: self.jobs_started.load(Ordering::Relaxed),
            job_polls: self.job_polls.load(Ordering::Relaxed),
            jobs_succeeded: self.jobs_succeeded.load(Ordering::Relaxed),
            jobs_stopped: self.jobs_stopped.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            reap_failures: self.reap_failures.load(Ordering::Relaxed),
            last_update_ms: self.last_update_ms.load(Ordering::Acquire),
        }
    }
}

/// Serialisable metrics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmisMetricsSnapshot {
    pub invocations: u64,
    pub sync_completions: u64,
    pub sync_failures: u64,
    pub jobs_started: u64,
    pub job_polls: u64,
    pub jobs_succeeded: u64,
    pub jobs_stopped: u64,
    pub jobs_failed: u64,
    pub reap_failures: u64,
    pub last_update_ms: u64,
}

impl SmisMetricsSnapshot {
    /// Jobs that have not reached a terminal state (or were abandoned)
    pub fn jobs_outstanding(&self) -> u64 {
        self.jobs_started
            .saturating_sub(self.jobs_succeeded + self.jobs_stopped + self.jobs_failed)
    }
}
