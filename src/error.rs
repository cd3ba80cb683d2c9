//! Error types for the SMI-S provider
//!
//! Provides structured error types for every layer of the adapter:
//! transport, instance resolution, property decoding, method invocation
//! and asynchronous job tracking.

use thiserror::Error;

/// Unified error type for the provider
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Transport error during {operation}: {reason}")]
    Transport { operation: String, reason: String },

    // =========================================================================
    // Resolution Errors
    // =========================================================================
    #[error("Expecting one object instance of {class_name} got {}", render_found(.found))]
    AmbiguousOrMissingInstance {
        class_name: String,
        found: Vec<String>,
    },

    #[error("Instance of class name: {class_name} property={property} value= {value} not found.")]
    InstanceNotFound {
        class_name: String,
        property: String,
        value: String,
    },

    // =========================================================================
    // Decode Errors
    // =========================================================================
    #[error("Property {property} not found on {path}")]
    PropertyNotFound { property: String, path: String },

    #[error("Cannot decode property {property}: expected {expected}, found {found}")]
    Decode {
        property: String,
        expected: String,
        found: String,
    },

    #[error("Invalid object path '{path}': {reason}")]
    ObjectPathParse { path: String, reason: String },

    // =========================================================================
    // Invocation Errors
    // =========================================================================
    #[error("{method} returned {code}{params}")]
    Invocation {
        method: String,
        code: u32,
        params: String,
    },

    #[error("Job {job} {reason}")]
    Job { job: String, reason: String },

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

fn render_found(found: &[String]) -> String {
    if found.is_empty() {
        return "none!".to_string();
    }
    let mut out = String::from("\n");
    for path in found {
        out.push_str(path);
        out.push('\n');
    }
    out
}

/// Failure buckets a caller is expected to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Connect/auth/timeout failures of the transport
    Connection,
    /// Singleton lookup found zero or several instances
    AmbiguousOrMissingInstance,
    /// Property-filtered lookup found no match
    InstanceNotFound,
    /// Instance does not carry the requested property
    PropertyNotFound,
    /// Property present but of an unexpected shape
    Decode,
    /// Method returned a synchronous failure code
    Invocation,
    /// Asynchronous job failed, stopped or could not be tracked
    Job,
    /// Invalid local configuration
    Configuration,
}

impl Error {
    /// Classify this error into its handling bucket
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection(_) | Error::Transport { .. } => ErrorKind::Connection,
            Error::AmbiguousOrMissingInstance { .. } => ErrorKind::AmbiguousOrMissingInstance,
            Error::InstanceNotFound { .. } => ErrorKind::InstanceNotFound,
            Error::PropertyNotFound { .. } => ErrorKind::PropertyNotFound,
            Error::Decode { .. } | Error::ObjectPathParse { .. } | Error::Json(_) => {
                ErrorKind::Decode
            }
            Error::Invocation { .. } => ErrorKind::Invocation,
            Error::Job { .. } => ErrorKind::Job,
            Error::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Check if this error is transient
    ///
    /// Only transport failures qualify; everything else reflects array
    /// state or schema shape and will fail the same way again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Connection(_) | Error::Transport { .. })
    }

    pub(crate) fn transport(operation: impl Into<String>, reason: impl ToString) -> Self {
        Error::Transport {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn job(job: impl ToString, reason: impl Into<String>) -> Self {
        Error::Job {
            job: job.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for the provider
pub type Result<T> = std::result::Result<T, Error>;
