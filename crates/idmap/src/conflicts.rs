//! Numeric ID collision detection.

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

use crate::extract::{self, DirectoryObject, GroupAttributes, UserAttributes};
use crate::identity::NormalizedIdentity;

/// Identities sharing one numeric ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    /// The shared UID or GID
    pub numeric_id: String,
    /// Every identity using it, in first-seen order
    pub members: Vec<NormalizedIdentity>,
}

/// Conflicting identities keyed by numeric ID, in first-seen order.
///
/// Every key has at least two members and no member appears twice under the
/// same key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictSet {
    conflicts: Vec<Conflict>,
}

impl ConflictSet {
    /// Members sharing `numeric_id`, if it is in conflict.
    pub fn get(&self, numeric_id: &str) -> Option<&[NormalizedIdentity]> {
        self.conflicts
            .iter()
            .find(|c| c.numeric_id == numeric_id)
            .map(|c| c.members.as_slice())
    }

    /// Number of conflicting IDs.
    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    /// True when no IDs collide.
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Iterate conflicts in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter()
    }

    /// Record that `a` and `b` share `numeric_id`.
    fn record(&mut self, numeric_id: &str, a: &NormalizedIdentity, b: &NormalizedIdentity) {
        let index = match self
            .conflicts
            .iter()
            .position(|c| c.numeric_id == numeric_id)
        {
            Some(index) => index,
            None => {
                self.conflicts.push(Conflict {
                    numeric_id: numeric_id.to_string(),
                    members: Vec::new(),
                });
                self.conflicts.len() - 1
            }
        };

        let members = &mut self.conflicts[index].members;
        for identity in [a, b] {
            if !members.contains(identity) {
                members.push(identity.clone());
            }
        }
    }
}

impl<'a> IntoIterator for &'a ConflictSet {
    type Item = &'a Conflict;
    type IntoIter = std::slice::Iter<'a, Conflict>;

    fn into_iter(self) -> Self::IntoIter {
        self.conflicts.iter()
    }
}

impl Serialize for ConflictSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.conflicts.len()))?;
        for conflict in &self.conflicts {
            map.serialize_entry(&conflict.numeric_id, &conflict.members)?;
        }
        map.end()
    }
}

/// Find every numeric ID used by more than one identity.
///
/// Compares each unordered pair once. Host account populations are small, so
/// the quadratic scan is fine.
pub fn find_conflicts(identities: &[NormalizedIdentity]) -> ConflictSet {
    let mut set = ConflictSet::default();
    if identities.len() < 2 {
        return set;
    }

    for (i, outer) in identities.iter().enumerate() {
        for inner in &identities[i + 1..] {
            if outer.numeric_id == inner.numeric_id {
                set.record(&outer.numeric_id, outer, inner);
            }
        }
    }
    // identical records collide with each other but only leave one member
    set.conflicts.retain(|c| c.members.len() >= 2);

    log::debug!(
        "scanned {} identities, {} conflicting ids",
        identities.len(),
        set.len()
    );
    set
}

/// UID conflicts among Unix-enabled directory users.
pub fn user_conflicts(objects: &[DirectoryObject], attrs: &UserAttributes) -> ConflictSet {
    let identities: Vec<_> = extract::extract_users(objects, attrs)
        .iter()
        .map(|u| u.identity())
        .collect();
    find_conflicts(&identities)
}

/// GID conflicts among Unix-enabled directory groups.
pub fn group_conflicts(objects: &[DirectoryObject], attrs: &GroupAttributes) -> ConflictSet {
    let identities: Vec<_> = extract::extract_groups(objects, attrs)
        .iter()
        .map(|g| g.identity())
        .collect();
    find_conflicts(&identities)
}
