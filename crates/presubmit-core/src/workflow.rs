//! Boundary to the continuous-integration system.
//!
//! The dispatcher only ever talks to CI through [`Workflow`], so a new CI
//! backend (or the in-memory fake in [`crate::fakes`]) can be swapped in
//! without touching the decision logic.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::change::{ChangeNumber, ChangeRecord, PatchsetNumber};
use crate::error::WorkflowError;

/// Operations the dispatcher drives on the CI system.
///
/// Calls are awaited one at a time; timeouts and retries belong to the
/// implementation.
#[async_trait]
pub trait Workflow: Send + Sync {
    /// Names of the tests to run. May be empty.
    async fn list_tests_to_run(&self) -> Vec<String>;

    /// Halt and remove ongoing builds older than the given valid patchsets.
    ///
    /// Best effort: every failure is returned, none stops the caller.
    async fn remove_outdated_builds(
        &self,
        valid: &BTreeMap<ChangeNumber, PatchsetNumber>,
    ) -> Vec<WorkflowError>;

    /// Start `tests` for all `records` together.
    async fn add_presubmit_test_build(
        &self,
        records: &[ChangeRecord],
        tests: &[String],
    ) -> Result<(), WorkflowError>;

    /// Publish `message` for the given refs. `verified` tells the review tool
    /// whether the change is believed OK to submit.
    async fn post_results(
        &self,
        message: &str,
        refs: &[String],
        verified: bool,
    ) -> Result<(), WorkflowError>;
}
