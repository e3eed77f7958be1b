//! Report error types

use crate::store::{EntityKind, StoreError};
use thiserror::Error;

/// Errors that can occur while generating a statistics report
#[derive(Error, Debug)]
pub enum ReportError {
    /// A request parameter is missing or out of range for the chosen period
    #[error("{message}")]
    InvalidParameter {
        /// Name of the offending request field
        field: &'static str,
        message: String,
    },

    /// The record store could not answer a grouped-count query
    #[error("Aggregation failed for {kind}: {source}")]
    AggregationFailure {
        kind: EntityKind,
        #[source]
        source: StoreError,
    },

    /// The document could not be produced
    #[error("Rendering failed: {0}")]
    RenderingFailure(String),
}

impl ReportError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ReportError::InvalidParameter {
            field,
            message: message.into(),
        }
    }

    /// Field name for `InvalidParameter`, `None` otherwise
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ReportError::InvalidParameter { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Whether the caller, not the service, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, ReportError::InvalidParameter { .. })
    }
}

/// Result type alias for report operations
pub type ReportResult<T> = Result<T, ReportError>;
