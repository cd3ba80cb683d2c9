//! SMI-S Adapter
//!
//! Maps the storage API onto SMI-S services:
//! - [`listing`]: pools, initiators and volumes
//! - [`invoker`]: per-operation method calls
//! - [`job`]: return-code classification and job tracking
//! - [`client`]: the [`Smis`] session tying it together

pub mod client;
pub mod config;
pub mod constants;
pub mod invoker;
pub mod job;
pub mod listing;
pub mod metrics;

pub use client::Smis;
pub use config::{JobPollConfig, SmisConfig};
pub use invoker::{MethodBuilder, MethodCall};
pub use job::{classify, evaluate_invocation, InvokeOutcome, JobPoller, JobReport, JobState};
pub use listing::FromCimInstance;
pub use metrics::{SmisMetrics, SmisMetricsSnapshot};
