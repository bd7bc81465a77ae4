//! Change records as supplied by the review system, and the revision
//! identity parsed out of their references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReferenceError;

/// Number of a change (CL) on the review server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeNumber(pub u64);

impl fmt::Display for ChangeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Revision number within a single change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchsetNumber(pub u64);

impl fmt::Display for PatchsetNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Presubmit directive declared by the change author.
///
/// The review server spells these `all` and `none`; both spellings are
/// accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresubmitDirective {
    #[default]
    #[serde(alias = "all")]
    Default,
    #[serde(alias = "none")]
    Skip,
}

/// One change-list entry from the review system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Opaque revision reference, e.g. `refs/changes/34/1234/5`.
    pub reference: String,

    /// Email address of the change owner.
    pub owner_email: String,

    /// Author-declared presubmit directive.
    #[serde(default)]
    pub presubmit: PresubmitDirective,
}

impl ChangeRecord {
    pub fn new(reference: impl Into<String>, owner_email: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            owner_email: owner_email.into(),
            presubmit: PresubmitDirective::Default,
        }
    }

    /// Set the presubmit directive.
    pub fn with_directive(mut self, presubmit: PresubmitDirective) -> Self {
        self.presubmit = presubmit;
        self
    }

    /// Whether the author asked for presubmit tests to be skipped.
    pub fn skips_presubmit(&self) -> bool {
        self.presubmit == PresubmitDirective::Skip
    }

    /// Parse the revision identity out of the reference.
    pub fn identity(&self) -> Result<ChangeIdentity, ReferenceError> {
        parse_reference(&self.reference)
    }
}

/// A specific revision of a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeIdentity {
    pub change: ChangeNumber,
    pub patchset: PatchsetNumber,
}

impl ChangeIdentity {
    pub fn new(change: u64, patchset: u64) -> Self {
        Self {
            change: ChangeNumber(change),
            patchset: PatchsetNumber(patchset),
        }
    }

    /// Canonical ref for this revision: `refs/changes/<shard>/<change>/<patchset>`,
    /// where the shard is the last two digits of the change number.
    pub fn to_reference(&self) -> String {
        format!(
            "refs/changes/{:02}/{}/{}",
            self.change.0 % 100,
            self.change,
            self.patchset
        )
    }
}

/// Formats as `change/patchset`, the form used in group labels.
impl fmt::Display for ChangeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.change, self.patchset)
    }
}

impl FromStr for ChangeIdentity {
    type Err = ReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_reference(s)
    }
}

/// Parse a change ref of the form `refs/changes/<shard>/<change>/<patchset>`.
///
/// The shard segment is owned by the review server and is not checked.
pub fn parse_reference(reference: &str) -> Result<ChangeIdentity, ReferenceError> {
    let parts: Vec<&str> = reference.split('/').collect();
    if parts.len() != 5 {
        return Err(ReferenceError::PartCount {
            reference: reference.to_string(),
            got: parts.len(),
        });
    }
    if parts[0] != "refs" || parts[1] != "changes" {
        return Err(ReferenceError::NotAChangeRef {
            reference: reference.to_string(),
        });
    }

    let change = parse_positive(reference, "change", parts[3])?;
    let patchset = parse_positive(reference, "patchset", parts[4])?;
    Ok(ChangeIdentity::new(change, patchset))
}

fn parse_positive(reference: &str, field: &'static str, value: &str) -> Result<u64, ReferenceError> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ReferenceError::InvalidNumber {
            reference: reference.to_string(),
            field,
            value: value.to_string(),
        }),
    }
}
