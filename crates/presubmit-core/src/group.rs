//! Multi-part change grouping.
//!
//! A single logical change may be split across several individually
//! reviewed CLs, which must be tested together. [`combine`] folds such a
//! batch into one [`ChangeGroup`].

use std::collections::BTreeMap;

use crate::change::{ChangeNumber, ChangeRecord, PatchsetNumber};
use crate::error::GroupingError;
use crate::trust::TrustPolicy;

/// Everything the dispatcher needs to know about one multi-part change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeGroup {
    /// Latest patchset seen for each distinct change number.
    pub changes: BTreeMap<ChangeNumber, PatchsetNumber>,

    /// `change/patchset` per member in input order, joined with `", "`.
    pub label: String,

    /// Set when any member asked to skip presubmit testing.
    pub skip_requested: bool,

    /// Cleared when any member is owned by an untrusted contributor.
    pub all_trusted: bool,

    /// Raw member references, in input order.
    pub refs: Vec<String>,

    /// The member records, in input order.
    pub members: Vec<ChangeRecord>,
}

impl Default for ChangeGroup {
    fn default() -> Self {
        Self {
            changes: BTreeMap::new(),
            label: String::new(),
            skip_requested: false,
            all_trusted: true,
            refs: Vec::new(),
            members: Vec::new(),
        }
    }
}

impl ChangeGroup {
    /// True when the batch had no members.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of member records (not distinct changes).
    pub fn len(&self) -> usize {
        self.members.len()
    }
}

/// Combine a batch of related CLs into a single [`ChangeGroup`].
///
/// A malformed reference anywhere in the batch fails the whole group.
pub fn combine(
    records: &[ChangeRecord],
    trust: &TrustPolicy,
) -> Result<ChangeGroup, GroupingError> {
    let mut group = ChangeGroup::default();
    let mut labels = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let identity = record
            .identity()
            .map_err(|source| GroupingError::MalformedReference { index, source })?;

        if record.skips_presubmit() {
            group.skip_requested = true;
        }
        if !trust.is_trusted(&record.owner_email) {
            group.all_trusted = false;
        }

        labels.push(identity.to_string());
        group.changes.insert(identity.change, identity.patchset);
        group.refs.push(record.reference.clone());
        group.members.push(record.clone());
    }

    group.label = labels.join(", ");
    Ok(group)
}
