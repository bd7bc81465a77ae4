//! Presubmit decision engine.
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. empty group: skip silently
//! 2. author opted out: skip, report, verified
//! 3. no tests to run: skip, report, verified
//! 4. untrusted owner: skip, report asking for a human, not verified
//! 5. otherwise proceed

use serde::{Deserialize, Serialize};

use crate::group::ChangeGroup;
use crate::policy::PresubmitPolicy;

/// Which rule decided a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    SkipEmpty,
    SkipByAuthorRequest,
    SkipNoTests,
    SkipUntrusted,
    Proceed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::SkipEmpty => "skip-empty",
            Outcome::SkipByAuthorRequest => "skip-by-author-request",
            Outcome::SkipNoTests => "skip-no-tests",
            Outcome::SkipUntrusted => "skip-untrusted",
            Outcome::Proceed => "proceed",
        }
    }

    pub fn is_skip(&self) -> bool {
        !matches!(self, Outcome::Proceed)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The verdict for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub outcome: Outcome,

    /// Report to post for the group; `None` means nothing is posted.
    pub message: Option<String>,

    /// Whether the review tool should consider the group submittable.
    pub verified: bool,
}

impl Decision {
    fn silent(outcome: Outcome) -> Self {
        Self {
            outcome,
            message: None,
            verified: false,
        }
    }

    fn report(outcome: Outcome, message: &str, verified: bool) -> Self {
        Self {
            outcome,
            message: Some(message.to_string()),
            verified,
        }
    }
}

/// Rules that do not need the test list (1 and 2).
///
/// Returns `None` when the test list has to be consulted.
pub fn decide_before_tests(policy: &PresubmitPolicy, group: &ChangeGroup) -> Option<Decision> {
    if group.is_empty() {
        return Some(Decision::silent(Outcome::SkipEmpty));
    }
    if group.skip_requested {
        return Some(Decision::report(
            Outcome::SkipByAuthorRequest,
            &policy.skipped_message,
            true,
        ));
    }
    None
}

/// Decide a group given the tests the CI system would run for it.
pub fn decide(policy: &PresubmitPolicy, group: &ChangeGroup, tests: &[String]) -> Decision {
    if let Some(decision) = decide_before_tests(policy, group) {
        return decision;
    }
    if tests.is_empty() {
        return Decision::report(Outcome::SkipNoTests, &policy.no_tests_message, true);
    }
    if !group.all_trusted {
        return Decision::report(Outcome::SkipUntrusted, &policy.untrusted_message, false);
    }
    Decision::silent(Outcome::Proceed)
}
