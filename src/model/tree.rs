use std::collections::BTreeMap;
use std::fmt;

use super::catalog::HaloKey;
use super::mixins::Identifiable;

/// Merger tree ID type. Trees are numbered sequentially by the builder.
pub type TreeId = i64;

/// A merger tree.
///
/// One connected lineage of halos across snapshots, rooted at the final
/// output snapshot. Halos are indexed by snapshot number; a snapshot can
/// hold several halos when multiple branches coexist before merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergerTree {
    pub id: TreeId,
    /// All halos contained in this merger tree, indexed by snapshot.
    pub halos: BTreeMap<i32, Vec<HaloKey>>,
}

impl MergerTree {
    pub fn new(id: TreeId) -> Self {
        Self {
            id,
            halos: BTreeMap::new(),
        }
    }

    /// Registers a halo under its snapshot. Registering the same halo
    /// twice under one snapshot is a no-op.
    pub fn add_halo(&mut self, snapshot: i32, halo: HaloKey) {
        let at_snapshot = self.halos.entry(snapshot).or_default();
        if !at_snapshot.contains(&halo) {
            at_snapshot.push(halo);
        }
    }

    /// The earliest snapshot with halos in this tree.
    pub fn first_snapshot(&self) -> Option<i32> {
        self.halos.keys().next().copied()
    }

    /// The latest snapshot with halos in this tree (the root snapshot).
    pub fn last_snapshot(&self) -> Option<i32> {
        self.halos.keys().next_back().copied()
    }

    /// Total number of halos across all snapshots.
    pub fn halo_count(&self) -> usize {
        self.halos.values().map(Vec::len).sum()
    }
}

impl Identifiable for MergerTree {
    type Id = TreeId;

    fn id(&self) -> TreeId {
        self.id
    }
}

impl fmt::Display for MergerTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<MergerTree {}>", self.id)
    }
}
