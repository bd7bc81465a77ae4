//! Error taxonomy for presubmit dispatch.
//!
//! Only [`DispatchError`] ever leaves [`crate::Dispatcher::run`]. The other
//! errors are logged and absorbed at the batch that produced them.

use crate::change::ChangeNumber;

/// A change reference string that does not name a change revision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("unexpected number of parts in {reference:?}: expected 5, got {got}")]
    PartCount { reference: String, got: usize },

    #[error("{reference:?} is not a change ref (expected refs/changes/...)")]
    NotAChangeRef { reference: String },

    #[error("invalid {field} number {value:?} in {reference:?}")]
    InvalidNumber {
        reference: String,
        field: &'static str,
        value: String,
    },
}

/// Errors produced while combining a batch into a [`crate::ChangeGroup`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupingError {
    #[error("malformed reference for member {index} of the group: {source}")]
    MalformedReference {
        index: usize,
        #[source]
        source: ReferenceError,
    },
}

/// Failures reported by a [`crate::Workflow`] backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("failed to cancel outdated build for change {change}: {reason}")]
    CancelBuild { change: ChangeNumber, reason: String },

    #[error("failed to start presubmit build: {0}")]
    StartBuild(String),

    #[error("failed to post results: {0}")]
    PostResults(String),

    #[error("workflow backend error: {0}")]
    Backend(String),
}

/// Errors that abort a whole dispatch run.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("reporting results for {group} failed after {dispatched} change(s) were sent: {source}")]
    ReportFailed {
        group: String,
        dispatched: usize,
        #[source]
        source: WorkflowError,
    },
}

/// Result type for dispatch runs.
pub type Result<T> = std::result::Result<T, DispatchError>;
