//! Presubmit Core
//!
//! Decides, for batches of related code-review changes, whether and how to
//! send them to a CI system for presubmit testing:
//! - groups the CLs of one multi-part change ([`combine`])
//! - applies the skip/trust policy ([`decide`])
//! - drives a [`Workflow`] backend in a fixed order ([`Dispatcher`])

pub mod change;
pub mod decision;
pub mod dispatcher;
pub mod error;
pub mod fakes;
pub mod group;
pub mod obs;
pub mod policy;
pub mod telemetry;
pub mod trust;
pub mod workflow;

pub use change::{
    parse_reference, ChangeIdentity, ChangeNumber, ChangeRecord, PatchsetNumber,
    PresubmitDirective,
};
pub use decision::{decide, decide_before_tests, Decision, Outcome};
pub use dispatcher::{BatchOutcome, BatchStatus, DispatchReport, Dispatcher};
pub use error::{DispatchError, GroupingError, ReferenceError, Result, WorkflowError};
pub use group::{combine, ChangeGroup};
pub use policy::PresubmitPolicy;
pub use trust::{is_trusted_contributor, TrustPolicy};
pub use workflow::Workflow;
