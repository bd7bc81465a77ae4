//! Structured log events for a dispatch run.
//!
//! This module provides:
//! - A run-scoped span (`run_span`) that tags every line with the run id
//! - Emission functions for batch decisions and workflow failures
//!
//! Skips are logged at `info!`, best-effort workflow failures at `warn!`,
//! malformed groups and report failures at `error!`.

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::decision::Outcome;

/// Span covering one dispatch run.
///
/// Attach it to the run future with `tracing::Instrument`; an entered guard
/// must not be held across `.await`.
pub fn run_span(run_id: &Uuid) -> tracing::Span {
    tracing::info_span!("presubmit.run", run_id = %run_id)
}

/// Emit event: run started.
pub fn emit_run_started(batches: usize) {
    info!(event = "run.started", batches = batches);
}

/// Emit event: run finished.
pub fn emit_run_finished(dispatched: usize, batches: usize, success: bool) {
    info!(
        event = "run.finished",
        dispatched = dispatched,
        batches = batches,
        success = success,
    );
}

/// Emit event: a batch could not be grouped and was dropped.
pub fn emit_group_malformed(batch: usize, error: &dyn std::fmt::Display) {
    error!(event = "batch.malformed", batch = batch, error = %error);
}

/// Emit event: a batch was skipped.
///
/// ```ignore
/// emit_batch_skipped("1/5, 2/7", Outcome::SkipNoTests);
/// // logs: event=batch.skipped group="1/5, 2/7" outcome=skip-no-tests
/// ```
pub fn emit_batch_skipped(group: &str, outcome: Outcome) {
    info!(event = "batch.skipped", group = %group, outcome = %outcome);
}

/// Emit event: cancelling a stale build failed (not fatal).
pub fn emit_stale_build_error(group: &str, error: &dyn std::fmt::Display) {
    warn!(event = "build.cancel_failed", group = %group, error = %error);
}

/// Emit event: the group was sent to presubmit testing.
pub fn emit_build_sent(group: &str, members: usize, tests: usize) {
    info!(event = "build.sent", group = %group, members = members, tests = tests);
}

/// Emit event: starting the build failed; the batch is abandoned.
pub fn emit_build_failed(group: &str, error: &dyn std::fmt::Display) {
    warn!(event = "build.failed", group = %group, error = %error);
}

/// Emit event: posting results failed; the run stops.
pub fn emit_report_failed(group: &str, error: &dyn std::fmt::Display) {
    error!(event = "report.failed", group = %group, error = %error);
}
