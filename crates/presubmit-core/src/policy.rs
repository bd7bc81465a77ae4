//! Presubmit policy: trust rule plus the fixed report messages.
//!
//! `PresubmitPolicy::default()` is the legacy policy. Every field can be
//! overridden from a policy file; missing keys keep their defaults.

use serde::{Deserialize, Serialize};

use crate::trust::TrustPolicy;

/// Report posted when an author opted out of presubmit testing.
pub const SKIPPED_MESSAGE: &str = "Presubmit tests skipped.\n";

/// Report posted when the CI system has no tests to run.
pub const NO_TESTS_MESSAGE: &str = "No tests found.\n";

/// Report posted when a change needs a human to start the tests.
pub const UNTRUSTED_MESSAGE: &str = "Tell Freenode#fuchsia to kick the presubmit tests.\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresubmitPolicy {
    #[serde(flatten)]
    pub trust: TrustPolicy,
    pub skipped_message: String,
    pub no_tests_message: String,
    pub untrusted_message: String,
}

impl Default for PresubmitPolicy {
    fn default() -> Self {
        Self {
            trust: TrustPolicy::default(),
            skipped_message: SKIPPED_MESSAGE.to_string(),
            no_tests_message: NO_TESTS_MESSAGE.to_string(),
            untrusted_message: UNTRUSTED_MESSAGE.to_string(),
        }
    }
}

impl PresubmitPolicy {
    /// Replace the trust rule.
    pub fn with_trust(mut self, trust: TrustPolicy) -> Self {
        self.trust = trust;
        self
    }
}
