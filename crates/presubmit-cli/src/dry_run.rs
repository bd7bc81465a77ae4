//! Workflow backend that only logs what it would do.

use std::collections::BTreeMap;

use async_trait::async_trait;
use presubmit_core::{
    ChangeNumber, ChangeRecord, PatchsetNumber, Workflow, WorkflowError,
};
use tracing::info;

/// Logs every CI operation instead of performing it. Always succeeds.
#[derive(Debug, Clone, Default)]
pub struct DryRunWorkflow {
    tests: Vec<String>,
}

impl DryRunWorkflow {
    pub fn new(tests: Vec<String>) -> Self {
        Self { tests }
    }
}

#[async_trait]
impl Workflow for DryRunWorkflow {
    async fn list_tests_to_run(&self) -> Vec<String> {
        self.tests.clone()
    }

    async fn remove_outdated_builds(
        &self,
        valid: &BTreeMap<ChangeNumber, PatchsetNumber>,
    ) -> Vec<WorkflowError> {
        for (change, patchset) in valid {
            info!(
                event = "dry_run.remove_outdated",
                change = %change,
                keep_patchset = %patchset,
            );
        }
        Vec::new()
    }

    async fn add_presubmit_test_build(
        &self,
        records: &[ChangeRecord],
        tests: &[String],
    ) -> Result<(), WorkflowError> {
        let refs: Vec<&str> = records.iter().map(|r| r.reference.as_str()).collect();
        info!(
            event = "dry_run.add_build",
            refs = ?refs,
            tests = ?tests,
        );
        Ok(())
    }

    async fn post_results(
        &self,
        message: &str,
        refs: &[String],
        verified: bool,
    ) -> Result<(), WorkflowError> {
        info!(
            event = "dry_run.post_results",
            message = %message.trim_end(),
            refs = ?refs,
            verified = verified,
        );
        Ok(())
    }
}
