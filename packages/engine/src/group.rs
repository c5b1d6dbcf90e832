//! Groups of passages without overlapping members
//!
//! Adding a passage merges it with any member in the same branch whose
//! selection overlaps or touches it, repeating until nothing else merges.
//! Members stay sorted: federal before state, then by level of code, then by
//! path, then by where their selections start.

use crate::compare::{combine, overlaps};
use crate::passage::Passage;
use crate::record::PassageRecord;
use serde::{Serialize, Serializer};

/// Ordered collection of passages where no two members could be merged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassageGroup {
    passages: Vec<Passage>,
}

impl PassageGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a group by adding each passage in turn.
    pub fn from_passages(passages: impl IntoIterator<Item = Passage>) -> Self {
        let mut group = Self::new();
        for passage in passages {
            group.insert(passage);
        }
        group
    }

    /// New group with `passage` added
    pub fn with(&self, passage: Passage) -> PassageGroup {
        let mut group = self.clone();
        group.insert(passage);
        group
    }

    /// New group with every member of `other` added
    pub fn union(&self, other: &PassageGroup) -> PassageGroup {
        let mut group = self.clone();
        for passage in &other.passages {
            group.insert(passage.clone());
        }
        group
    }

    fn insert(&mut self, passage: Passage) {
        let mut incoming = passage;
        while let Some((index, combined)) = self.find_merge(&incoming) {
            tracing::debug!(
                member = %self.passages[index].path(),
                incoming = %incoming.path(),
                "Merging overlapping passages"
            );
            self.passages.remove(index);
            incoming = combined;
        }
        self.passages.push(incoming);
        self.sort();
    }

    fn find_merge(&self, incoming: &Passage) -> Option<(usize, Passage)> {
        self.passages
            .iter()
            .enumerate()
            .filter(|(_, member)| overlaps(member, incoming))
            .find_map(|(index, member)| match combine(member, incoming) {
                Ok(combined) => Some((index, combined)),
                Err(err) => {
                    tracing::debug!(
                        member = %member.path(),
                        incoming = %incoming.path(),
                        error = %err,
                        "Overlapping passages kept apart"
                    );
                    None
                }
            })
    }

    fn sort(&mut self) {
        self.passages.sort_by(|a, b| {
            let key = |p: &Passage| (!p.is_federal(), p.level().ok().map_or(u8::MAX, |l| l as u8));
            key(a)
                .cmp(&key(b))
                .then_with(|| a.path().cmp(b.path()))
                .then_with(|| a.selection().positions().cmp(b.selection().positions()))
        });
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Passage> {
        self.passages.iter()
    }

    /// Whether some member implies `passage`
    pub fn implies_passage(&self, passage: &Passage) -> bool {
        self.passages.iter().any(|member| member.implies(passage))
    }

    /// Whether every member of `other` is implied by some member of this group
    pub fn implies(&self, other: &PassageGroup) -> bool {
        other.passages.iter().all(|p| self.implies_passage(p))
    }

    /// Whether the two groups imply each other
    pub fn means(&self, other: &PassageGroup) -> bool {
        self.implies(other) && other.implies(self)
    }

    /// Output records of every member
    pub fn to_records(&self) -> Vec<PassageRecord> {
        self.passages.iter().map(PassageRecord::from_passage).collect()
    }
}

impl FromIterator<Passage> for PassageGroup {
    fn from_iter<I: IntoIterator<Item = Passage>>(iter: I) -> Self {
        Self::from_passages(iter)
    }
}

impl IntoIterator for PassageGroup {
    type Item = Passage;
    type IntoIter = std::vec::IntoIter<Passage>;

    fn into_iter(self) -> Self::IntoIter {
        self.passages.into_iter()
    }
}

impl<'a> IntoIterator for &'a PassageGroup {
    type Item = &'a Passage;
    type IntoIter = std::slice::Iter<'a, Passage>;

    fn into_iter(self) -> Self::IntoIter {
        self.passages.iter()
    }
}

impl std::fmt::Display for PassageGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "the group of provisions:")?;
        for passage in &self.passages {
            write!(f, "\n  {}", passage)?;
        }
        Ok(())
    }
}

impl Serialize for PassageGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_records().serialize(serializer)
    }
}
