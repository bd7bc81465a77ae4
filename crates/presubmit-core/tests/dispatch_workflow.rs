//! End-to-end dispatch runs against the recording workflow.

use std::collections::BTreeMap;
use std::sync::Arc;

use presubmit_core::fakes::{RecordingWorkflow, WorkflowCall};
use presubmit_core::policy::{NO_TESTS_MESSAGE, SKIPPED_MESSAGE, UNTRUSTED_MESSAGE};
use presubmit_core::{
    BatchStatus, ChangeNumber, ChangeRecord, DispatchError, Dispatcher, Outcome, PatchsetNumber,
    PresubmitDirective, PresubmitPolicy, TrustPolicy, WorkflowError,
};

fn cl(reference: &str, owner: &str) -> ChangeRecord {
    ChangeRecord::new(reference, owner)
}

fn trusted(reference: &str) -> ChangeRecord {
    cl(reference, "dev@google.com")
}

fn dispatcher(workflow: &Arc<RecordingWorkflow>) -> Dispatcher {
    Dispatcher::new(workflow.clone())
}

/// Test: trusted, non-skipped group with tests is sent with exactly its members
#[tokio::test]
async fn test_proceeding_group_sends_its_members() {
    let workflow = Arc::new(RecordingWorkflow::new().with_tests(["unit", "integration"]));
    let members = vec![
        trusted("refs/changes/01/1/5"),
        trusted("refs/changes/02/2/7"),
    ];

    let report = dispatcher(&workflow)
        .run(&[members.clone()])
        .await
        .expect("run failed");

    assert_eq!(report.dispatched, 2);
    assert_eq!(
        workflow.builds(),
        vec![WorkflowCall::AddPresubmitTestBuild {
            records: members,
            tests: vec!["unit".to_string(), "integration".to_string()],
        }]
    );

    let mut valid = BTreeMap::new();
    valid.insert(ChangeNumber(1), PatchsetNumber(5));
    valid.insert(ChangeNumber(2), PatchsetNumber(7));
    assert!(workflow
        .calls()
        .contains(&WorkflowCall::RemoveOutdatedBuilds { valid }));
    assert!(workflow.posts().is_empty(), "proceeding groups are not reported");
}

/// Test: any skip directive wins over trust and test availability
#[tokio::test]
async fn test_author_skip_wins() {
    let workflow = Arc::new(RecordingWorkflow::new());
    let batch = vec![
        cl("refs/changes/01/1/1", "outsider@evil.com"),
        trusted("refs/changes/02/2/1").with_directive(PresubmitDirective::Skip),
    ];

    let report = dispatcher(&workflow).run(&[batch]).await.expect("run failed");

    assert_eq!(
        report.batches[0].status,
        BatchStatus::Skipped {
            outcome: Outcome::SkipByAuthorRequest,
            reported: true,
        }
    );
    assert_eq!(
        workflow.calls(),
        vec![WorkflowCall::PostResults {
            message: SKIPPED_MESSAGE.to_string(),
            refs: vec![
                "refs/changes/01/1/1".to_string(),
                "refs/changes/02/2/1".to_string(),
            ],
            verified: true,
        }],
        "the test list is not queried for an opted-out group"
    );
    assert_eq!(report.dispatched, 0);
}

/// Test: no tests means a verified "no tests" report
#[tokio::test]
async fn test_no_tests_reported_verified() {
    let workflow = Arc::new(RecordingWorkflow::new());

    dispatcher(&workflow)
        .run(&[vec![cl("refs/changes/01/1/1", "outsider@evil.com")]])
        .await
        .expect("run failed");

    assert_eq!(
        workflow.calls(),
        vec![
            WorkflowCall::ListTests,
            WorkflowCall::PostResults {
                message: NO_TESTS_MESSAGE.to_string(),
                refs: vec!["refs/changes/01/1/1".to_string()],
                verified: true,
            },
        ]
    );
}

/// Test: one untrusted owner blocks the group and is not verified
#[tokio::test]
async fn test_untrusted_owner_not_verified() {
    let workflow = Arc::new(RecordingWorkflow::new().with_tests(["unit"]));
    let batch = vec![
        trusted("refs/changes/01/1/1"),
        cl("refs/changes/02/2/1", "a@GOOGLE.COM"),
    ];

    let report = dispatcher(&workflow).run(&[batch]).await.expect("run failed");

    assert_eq!(
        workflow.posts(),
        vec![WorkflowCall::PostResults {
            message: UNTRUSTED_MESSAGE.to_string(),
            refs: vec![
                "refs/changes/01/1/1".to_string(),
                "refs/changes/02/2/1".to_string(),
            ],
            verified: false,
        }]
    );
    assert!(workflow.builds().is_empty());
    assert_eq!(report.dispatched, 0);
}

/// Test: an empty batch makes no workflow calls at all
#[tokio::test]
async fn test_empty_batch_makes_no_calls() {
    let workflow = Arc::new(RecordingWorkflow::new().with_tests(["unit"]));

    let report = dispatcher(&workflow).run(&[vec![]]).await.expect("run failed");

    assert!(workflow.calls().is_empty());
    assert_eq!(
        report.batches[0].status,
        BatchStatus::Skipped {
            outcome: Outcome::SkipEmpty,
            reported: false,
        }
    );
}

/// Test: stale-build failures are logged and the build still goes out
#[tokio::test]
async fn test_stale_build_failures_do_not_block_build() {
    let workflow = Arc::new(
        RecordingWorkflow::new()
            .with_tests(["unit"])
            .with_stale_failures(vec![
                WorkflowError::CancelBuild {
                    change: ChangeNumber(1),
                    reason: "build 17 not found".to_string(),
                },
                WorkflowError::Backend("timeout".to_string()),
            ]),
    );

    let report = dispatcher(&workflow)
        .run(&[vec![trusted("refs/changes/01/1/2")]])
        .await
        .expect("run failed");

    assert_eq!(workflow.builds().len(), 1);
    assert_eq!(report.dispatched, 1);
}

/// Test: a failed build abandons only its own batch
#[tokio::test]
async fn test_build_failure_continues_with_next_batch() {
    let workflow = Arc::new(
        RecordingWorkflow::new()
            .with_tests(["unit"])
            .failing_build_on(1),
    );
    let batches = vec![
        vec![trusted("refs/changes/01/1/1"), trusted("refs/changes/02/2/1")],
        vec![trusted("refs/changes/03/3/1")],
    ];

    let report = dispatcher(&workflow).run(&batches).await.expect("run failed");

    assert_eq!(workflow.builds().len(), 2);
    assert!(workflow.posts().is_empty(), "build failures are not reported");
    assert!(matches!(
        report.batches[0].status,
        BatchStatus::BuildFailed { .. }
    ));
    assert_eq!(report.batches[1].status, BatchStatus::Dispatched { tests: 1 });
    assert_eq!(report.dispatched, 1);
    assert_eq!(report.failed_count(), 1);
}

/// Test: a failed report on batch 2 of 3 stops the run
#[tokio::test]
async fn test_report_failure_aborts_run() {
    let workflow = Arc::new(
        RecordingWorkflow::new()
            .with_tests(["unit"])
            .failing_post_on(1),
    );
    let batches = vec![
        vec![trusted("refs/changes/01/1/1")],
        vec![cl("refs/changes/02/2/1", "outsider@evil.com")],
        vec![trusted("refs/changes/03/3/1")],
    ];

    let err = dispatcher(&workflow)
        .run(&batches)
        .await
        .expect_err("run should fail");

    let DispatchError::ReportFailed {
        group,
        dispatched,
        source,
    } = err;
    assert_eq!(group, "2/1");
    assert_eq!(dispatched, 1);
    assert!(matches!(source, WorkflowError::PostResults(_)));

    // Batch 3 never reached the workflow.
    assert_eq!(workflow.builds().len(), 1);
    assert!(!workflow.calls().iter().any(|c| matches!(
        c,
        WorkflowCall::AddPresubmitTestBuild { records, .. }
            if records[0].reference == "refs/changes/03/3/1"
    )));
}

/// Test: a malformed reference drops its batch and the run continues
#[tokio::test]
async fn test_malformed_batch_skipped() {
    let workflow = Arc::new(RecordingWorkflow::new().with_tests(["unit"]));
    let batches = vec![
        vec![trusted("refs/changes/01/1/1"), trusted("refs/changes/oops")],
        vec![trusted("refs/changes/02/2/1")],
    ];

    let report = dispatcher(&workflow).run(&batches).await.expect("run failed");

    assert!(matches!(
        report.batches[0].status,
        BatchStatus::Malformed { .. }
    ));
    assert_eq!(report.batches[0].members, 2);
    assert_eq!(report.dispatched, 1);
    assert_eq!(workflow.builds().len(), 1);
}

/// Test: tests are queried fresh for every group
#[tokio::test]
async fn test_tests_listed_per_group() {
    let workflow = Arc::new(RecordingWorkflow::new().with_tests(["unit"]));
    let batches = vec![
        vec![trusted("refs/changes/01/1/1")],
        vec![trusted("refs/changes/02/2/1")],
        vec![trusted("refs/changes/03/3/1")],
    ];

    let report = dispatcher(&workflow).run(&batches).await.expect("run failed");

    let listed = workflow
        .calls()
        .iter()
        .filter(|c| **c == WorkflowCall::ListTests)
        .count();
    assert_eq!(listed, 3);
    assert_eq!(report.dispatched, 3);
}

/// Test: a custom policy changes trust and report text
#[tokio::test]
async fn test_custom_policy() {
    let workflow = Arc::new(RecordingWorkflow::new().with_tests(["unit"]));
    let policy = PresubmitPolicy {
        untrusted_message: "Ask a maintainer to run presubmit.\n".to_string(),
        ..PresubmitPolicy::default()
    }
    .with_trust(TrustPolicy::new("@example.org"));

    let batches = vec![
        vec![cl("refs/changes/01/1/1", "dev@example.org")],
        vec![cl("refs/changes/02/2/1", "dev@google.com")],
    ];
    let report = dispatcher(&workflow)
        .with_policy(policy)
        .run(&batches)
        .await
        .expect("run failed");

    assert_eq!(report.dispatched, 1);
    assert_eq!(
        workflow.posts(),
        vec![WorkflowCall::PostResults {
            message: "Ask a maintainer to run presubmit.\n".to_string(),
            refs: vec!["refs/changes/02/2/1".to_string()],
            verified: false,
        }]
    );
}
