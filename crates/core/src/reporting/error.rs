//! Report error types.

use costree_shared::AppError;
use thiserror::Error;

use super::record::CodeDimension;
use super::tree::NodeId;

/// Errors that can occur while building a report tree.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The node has not been selected yet, so it has no records to work on.
    #[error("Report '{objective_id}' has no selection; call select or assign first")]
    NotSelected {
        /// Id of the objective behind the node.
        objective_id: String,
    },

    /// Node handle is not part of the tree or was retired by a reselection.
    #[error("Unknown report node: {0}")]
    UnknownNode(NodeId),

    /// A record has no resolvable classification code.
    #[error("Record {record} has no resolvable {dimension}")]
    UnresolvedCode {
        /// Dimension whose code is missing.
        dimension: CodeDimension,
        /// Identity of the offending record.
        record: String,
    },

    /// Invalid reporting period.
    #[error("Invalid reporting period: {0}")]
    InvalidPeriod(String),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::NotSelected { .. } => Self::Internal(err.to_string()),
            ReportError::UnknownNode(_) => Self::NotFound(err.to_string()),
            ReportError::UnresolvedCode { .. } => Self::DataQuality(err.to_string()),
            ReportError::InvalidPeriod(_) => Self::Validation(err.to_string()),
        }
    }
}
