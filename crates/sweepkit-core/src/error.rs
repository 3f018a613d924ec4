//! Sweep error taxonomy

use std::time::Duration;
use thiserror::Error;

/// Errors produced while sweeping a scope.
///
/// Only `ClientAcquisition` and `Configuration` abort a run. Every other
/// variant is recorded in a [`SweepReport`](crate::SweepReport) and never stops
/// sibling units or sibling resource types from being swept.
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("client acquisition failed for {scope}: {source:#}")]
    ClientAcquisition {
        scope: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("error reading {resource_type} in {scope}: {source:#}")]
    Discovery {
        resource_type: String,
        scope: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("error reading {resource_type} in {scope}: gave up after {max_pages} pages")]
    PageLimitExceeded {
        resource_type: String,
        scope: String,
        max_pages: usize,
    },

    #[error("error deleting {resource_type} ({identifier}): {source:#}")]
    Delete {
        resource_type: String,
        identifier: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{phase} {target} for {resource_type} timed out after {after:?}")]
    Timeout {
        phase: Phase,
        target: String,
        resource_type: String,
        after: Duration,
    },

    #[error("{resource_type} ({identifier}) was not deleted: sweep cancelled")]
    Cancelled {
        resource_type: String,
        identifier: String,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl SweepError {
    /// Resource type this failure belongs to, if any.
    pub fn resource_type(&self) -> Option<&str> {
        match self {
            SweepError::Discovery { resource_type, .. }
            | SweepError::PageLimitExceeded { resource_type, .. }
            | SweepError::Delete { resource_type, .. }
            | SweepError::Timeout { resource_type, .. }
            | SweepError::Cancelled { resource_type, .. } => Some(resource_type),
            SweepError::ClientAcquisition { .. } | SweepError::Configuration(_) => None,
        }
    }

    /// Whether this failure happened while listing rather than deleting.
    pub fn is_discovery(&self) -> bool {
        match self {
            SweepError::Discovery { .. } | SweepError::PageLimitExceeded { .. } => true,
            SweepError::Timeout { phase, .. } => *phase == Phase::List,
            _ => false,
        }
    }
}

/// Remote call a timeout interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    List,
    Delete,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::List => write!(f, "list"),
            Phase::Delete => write!(f, "delete"),
        }
    }
}

/// Registry misconfiguration, detected before any remote call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("sweeper '{0}' is already registered")]
    DuplicateSweeper(String),

    #[error("sweeper '{sweeper}' depends on unregistered sweeper '{dependency}'")]
    UnknownDependency { sweeper: String, dependency: String },

    #[error("no sweeper named '{0}' is registered")]
    UnknownSweeper(String),

    #[error("dependency cycle between sweepers: {}", .0.join(" -> "))]
    Cycle(Vec<String>),
}

/// Error reported by a remote API, carrying the service's error code.
///
/// Adapters convert their SDK errors into this shape so classifiers can match
/// on the code without knowing the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: Option<String>,
    pub message: String,
}

impl ApiError {
    pub fn new(code: Option<impl Into<String>>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
        }
    }

    /// Shorthand for an error with a known code.
    pub fn coded(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Every non-skip failure of one invocation, surfaced as a single error.
#[derive(Debug)]
pub struct AggregateError {
    pub failures: Vec<SweepError>,
}

impl std::fmt::Display for AggregateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.failures.len() {
            1 => writeln!(f, "1 error occurred:")?,
            n => writeln!(f, "{n} errors occurred:")?,
        }
        for failure in &self.failures {
            writeln!(f, "\t* {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

pub type Result<T> = std::result::Result<T, SweepError>;
