// src/error.rs

//! Failures of one event-details run. Every variant names the event it belongs to.

use thiserror::Error;

use crate::classify::EventId;
use crate::convert::ConvertError;
use crate::ingest::source::FetchError;
use crate::report::DecodeError;
use crate::validate::Finding;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Report document could not be retrieved
    #[error("fetching report {event_id}: {source}")]
    Fetch {
        event_id: EventId,
        #[source]
        source: FetchError,
    },

    /// Report document is not a JMA report
    #[error("decoding report {event_id}: {source}")]
    Decode {
        event_id: EventId,
        #[source]
        source: DecodeError,
    },

    /// Required field absent or malformed for the classified report kind
    #[error(transparent)]
    Conversion(#[from] ConvertError),

    /// Error findings present and not forced through
    #[error("report {event_id} failed validation with {} finding(s)", findings.len())]
    Validation {
        event_id: EventId,
        findings: Vec<Finding>,
    },

    /// Warning findings present and not ignored
    #[error("report {event_id} has {} validation warning(s)", findings.len())]
    ValidationWarning {
        event_id: EventId,
        findings: Vec<Finding>,
    },

    /// A converted record did not serialize; indicates a bug, not bad input
    #[error("serializing record {event_id}: {source}")]
    Serialization {
        event_id: EventId,
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub fn event_id(&self) -> &EventId {
        match self {
            PipelineError::Fetch { event_id, .. }
            | PipelineError::Decode { event_id, .. }
            | PipelineError::Validation { event_id, .. }
            | PipelineError::ValidationWarning { event_id, .. }
            | PipelineError::Serialization { event_id, .. } => event_id,
            PipelineError::Conversion(e) => &e.event_id,
        }
    }

    /// Stage label used in logs and the failure counter.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch { .. } => "fetch",
            PipelineError::Decode { .. } => "decode",
            PipelineError::Conversion(_) => "conversion",
            PipelineError::Validation { .. } => "validation",
            PipelineError::ValidationWarning { .. } => "validation_warning",
            PipelineError::Serialization { .. } => "serialization",
        }
    }

    /// Findings computed before the run stopped; empty for earlier stages.
    pub fn findings(&self) -> &[Finding] {
        match self {
            PipelineError::Validation { findings, .. }
            | PipelineError::ValidationWarning { findings, .. } => findings,
            _ => &[],
        }
    }
}
