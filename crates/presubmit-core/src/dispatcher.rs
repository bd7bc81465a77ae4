//! Sends batches of related CLs to presubmit testing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::change::ChangeRecord;
use crate::decision::{decide, decide_before_tests, Decision, Outcome};
use crate::error::{DispatchError, Result, WorkflowError};
use crate::group::{combine, ChangeGroup};
use crate::obs;
use crate::policy::PresubmitPolicy;
use crate::workflow::Workflow;

/// What happened to one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchStatus {
    /// A member reference could not be parsed; nothing was sent.
    Malformed { reason: String },
    /// A skip rule matched.
    Skipped { outcome: Outcome, reported: bool },
    /// Starting the build failed; the batch was abandoned.
    BuildFailed { reason: String },
    /// The group was sent to CI.
    Dispatched { tests: usize },
}

/// Per-batch entry of a [`DispatchReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Position of the batch in the run input.
    pub index: usize,

    /// Combined `change/patchset` label (empty when malformed or empty).
    pub label: String,

    /// Number of member records in the batch.
    pub members: usize,

    #[serde(flatten)]
    pub status: BatchStatus,
}

/// Result of a complete dispatch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Number of individual CLs handed to CI.
    pub dispatched: usize,

    pub batches: Vec<BatchOutcome>,
}

impl DispatchReport {
    /// Number of batches that ended in a skip.
    pub fn skipped_count(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| matches!(b.status, BatchStatus::Skipped { .. }))
            .count()
    }

    /// Number of batches whose build could not be started.
    pub fn failed_count(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| matches!(b.status, BatchStatus::BuildFailed { .. }))
            .count()
    }
}

/// A `post_results` failure, before the run adds its dispatched count.
struct ReportFailure {
    group: String,
    source: WorkflowError,
}

/// Drives a [`Workflow`] over a sequence of batches.
///
/// Batches are handled strictly one after another. Stale-build and build
/// failures are logged and absorbed; a failure to post results ends the run.
pub struct Dispatcher {
    workflow: Arc<dyn Workflow>,
    policy: PresubmitPolicy,
}

impl Dispatcher {
    pub fn new(workflow: Arc<dyn Workflow>) -> Self {
        Self {
            workflow,
            policy: PresubmitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PresubmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &PresubmitPolicy {
        &self.policy
    }

    /// Send every batch to presubmit testing, in order.
    pub async fn run(&self, batches: &[Vec<ChangeRecord>]) -> Result<DispatchReport> {
        let run_id = Uuid::new_v4();
        self.run_batches(run_id, batches)
            .instrument(obs::run_span(&run_id))
            .await
    }

    async fn run_batches(
        &self,
        run_id: Uuid,
        batches: &[Vec<ChangeRecord>],
    ) -> Result<DispatchReport> {
        let started_at = Utc::now();
        obs::emit_run_started(batches.len());

        let mut dispatched = 0usize;
        let mut outcomes = Vec::with_capacity(batches.len());

        for (index, batch) in batches.iter().enumerate() {
            let outcome = match self.process_batch(index, batch).await {
                Ok(outcome) => outcome,
                Err(ReportFailure { group, source }) => {
                    obs::emit_run_finished(dispatched, index + 1, false);
                    return Err(DispatchError::ReportFailed {
                        group,
                        dispatched,
                        source,
                    });
                }
            };
            if matches!(outcome.status, BatchStatus::Dispatched { .. }) {
                dispatched += outcome.members;
            }
            outcomes.push(outcome);
        }

        obs::emit_run_finished(dispatched, batches.len(), true);
        Ok(DispatchReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            dispatched,
            batches: outcomes,
        })
    }

    async fn process_batch(
        &self,
        index: usize,
        batch: &[ChangeRecord],
    ) -> std::result::Result<BatchOutcome, ReportFailure> {
        let group = match combine(batch, &self.policy.trust) {
            Ok(group) => group,
            Err(err) => {
                obs::emit_group_malformed(index, &err);
                return Ok(BatchOutcome {
                    index,
                    label: String::new(),
                    members: batch.len(),
                    status: BatchStatus::Malformed {
                        reason: err.to_string(),
                    },
                });
            }
        };

        let outcome = |status| BatchOutcome {
            index,
            label: group.label.clone(),
            members: group.len(),
            status,
        };

        if let Some(decision) = decide_before_tests(&self.policy, &group) {
            let status = self.skip(&group, &decision).await?;
            return Ok(outcome(status));
        }

        // Queried per group; the answer may change between batches.
        let tests = self.workflow.list_tests_to_run().await;

        let decision = decide(&self.policy, &group, &tests);
        if decision.outcome.is_skip() {
            let status = self.skip(&group, &decision).await?;
            return Ok(outcome(status));
        }

        for err in self.workflow.remove_outdated_builds(&group.changes).await {
            obs::emit_stale_build_error(&group.label, &err);
        }

        let status = match self
            .workflow
            .add_presubmit_test_build(&group.members, &tests)
            .await
        {
            Ok(()) => {
                obs::emit_build_sent(&group.label, group.len(), tests.len());
                BatchStatus::Dispatched { tests: tests.len() }
            }
            Err(err) => {
                obs::emit_build_failed(&group.label, &err);
                BatchStatus::BuildFailed {
                    reason: err.to_string(),
                }
            }
        };
        Ok(outcome(status))
    }

    /// Log a skip and post its report, if it has one.
    async fn skip(
        &self,
        group: &ChangeGroup,
        decision: &Decision,
    ) -> std::result::Result<BatchStatus, ReportFailure> {
        obs::emit_batch_skipped(&group.label, decision.outcome);

        let Some(message) = decision.message.as_deref() else {
            return Ok(BatchStatus::Skipped {
                outcome: decision.outcome,
                reported: false,
            });
        };

        if let Err(source) = self
            .workflow
            .post_results(message, &group.refs, decision.verified)
            .await
        {
            obs::emit_report_failed(&group.label, &source);
            return Err(ReportFailure {
                group: group.label.clone(),
                source,
            });
        }

        Ok(BatchStatus::Skipped {
            outcome: decision.outcome,
            reported: true,
        })
    }
}
