//! In-memory fake for the [`Workflow`] trait (testing only)
//!
//! `RecordingWorkflow` records every call in order and can be scripted to
//! fail specific calls, without any CI backend.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::change::{ChangeNumber, ChangeRecord, PatchsetNumber};
use crate::error::WorkflowError;
use crate::workflow::Workflow;

/// One recorded call on the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowCall {
    ListTests,
    RemoveOutdatedBuilds {
        valid: BTreeMap<ChangeNumber, PatchsetNumber>,
    },
    AddPresubmitTestBuild {
        records: Vec<ChangeRecord>,
        tests: Vec<String>,
    },
    PostResults {
        message: String,
        refs: Vec<String>,
        verified: bool,
    },
}

#[derive(Debug, Default)]
struct Counters {
    builds: usize,
    posts: usize,
}

/// Scriptable, call-recording workflow.
///
/// Build and post failures are addressed by 1-based call number, counted
/// per operation.
#[derive(Debug, Default)]
pub struct RecordingWorkflow {
    tests: Vec<String>,
    stale_failures: Vec<WorkflowError>,
    failing_builds: HashSet<usize>,
    failing_posts: HashSet<usize>,
    calls: Mutex<Vec<WorkflowCall>>,
    counters: Mutex<Counters>,
}

impl RecordingWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tests returned by every `list_tests_to_run` call.
    pub fn with_tests<I, S>(mut self, tests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tests = tests.into_iter().map(Into::into).collect();
        self
    }

    /// Failures returned by every `remove_outdated_builds` call.
    pub fn with_stale_failures(mut self, failures: Vec<WorkflowError>) -> Self {
        self.stale_failures = failures;
        self
    }

    /// Make the `n`th `add_presubmit_test_build` call fail.
    pub fn failing_build_on(mut self, n: usize) -> Self {
        self.failing_builds.insert(n);
        self
    }

    /// Make the `n`th `post_results` call fail.
    pub fn failing_post_on(mut self, n: usize) -> Self {
        self.failing_posts.insert(n);
        self
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<WorkflowCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the `post_results` calls.
    pub fn posts(&self) -> Vec<WorkflowCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, WorkflowCall::PostResults { .. }))
            .collect()
    }

    /// Only the `add_presubmit_test_build` calls.
    pub fn builds(&self) -> Vec<WorkflowCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, WorkflowCall::AddPresubmitTestBuild { .. }))
            .collect()
    }

    fn record(&self, call: WorkflowCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Workflow for RecordingWorkflow {
    async fn list_tests_to_run(&self) -> Vec<String> {
        self.record(WorkflowCall::ListTests);
        self.tests.clone()
    }

    async fn remove_outdated_builds(
        &self,
        valid: &BTreeMap<ChangeNumber, PatchsetNumber>,
    ) -> Vec<WorkflowError> {
        self.record(WorkflowCall::RemoveOutdatedBuilds {
            valid: valid.clone(),
        });
        self.stale_failures.clone()
    }

    async fn add_presubmit_test_build(
        &self,
        records: &[ChangeRecord],
        tests: &[String],
    ) -> Result<(), WorkflowError> {
        self.record(WorkflowCall::AddPresubmitTestBuild {
            records: records.to_vec(),
            tests: tests.to_vec(),
        });
        let n = {
            let mut counters = self.counters.lock().unwrap();
            counters.builds += 1;
            counters.builds
        };
        if self.failing_builds.contains(&n) {
            return Err(WorkflowError::StartBuild(format!("scripted failure on build {n}")));
        }
        Ok(())
    }

    async fn post_results(
        &self,
        message: &str,
        refs: &[String],
        verified: bool,
    ) -> Result<(), WorkflowError> {
        self.record(WorkflowCall::PostResults {
            message: message.to_string(),
            refs: refs.to_vec(),
            verified,
        });
        let n = {
            let mut counters = self.counters.lock().unwrap();
            counters.posts += 1;
            counters.posts
        };
        if self.failing_posts.contains(&n) {
            return Err(WorkflowError::PostResults(format!("scripted failure on post {n}")));
        }
        Ok(())
    }
}
