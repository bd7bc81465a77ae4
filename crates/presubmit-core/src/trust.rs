//! Contributor trust policy.
//!
//! Being trusted controls whether a contributor's changes are sent to
//! presubmit testing automatically. The current rule is a plain,
//! case-sensitive suffix match on the owner's email address; an ACL lookup
//! could replace it later.

use serde::{Deserialize, Serialize};

/// Domain suffix trusted by default.
pub const DEFAULT_TRUSTED_DOMAIN: &str = "@google.com";

/// Suffix-based trust policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustPolicy {
    /// Literal suffix an owner email must end with, e.g. `@google.com`.
    pub trusted_domain: String,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            trusted_domain: DEFAULT_TRUSTED_DOMAIN.to_string(),
        }
    }
}

impl TrustPolicy {
    pub fn new(trusted_domain: impl Into<String>) -> Self {
        Self {
            trusted_domain: trusted_domain.into(),
        }
    }

    /// Whether `owner_email` belongs to a trusted contributor.
    ///
    /// No case folding or trimming is applied.
    pub fn is_trusted(&self, owner_email: &str) -> bool {
        owner_email.ends_with(self.trusted_domain.as_str())
    }
}

/// Trust check under the default policy.
pub fn is_trusted_contributor(owner_email: &str) -> bool {
    owner_email.ends_with(DEFAULT_TRUSTED_DOMAIN)
}
