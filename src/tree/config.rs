use std::collections::BTreeSet;

use serde::Deserialize;

use super::error::Error;

/// Execution parameters of one tree-building run.
///
/// The maximum of `output_snapshots` is the "last snapshot to consider":
/// every halo found there becomes the root of a merger tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExecutionParameters {
    /// The ordered set of snapshot indices selected for output.
    pub output_snapshots: BTreeSet<i32>,
}

impl ExecutionParameters {
    pub fn new(output_snapshots: impl IntoIterator<Item = i32>) -> Self {
        Self {
            output_snapshots: output_snapshots.into_iter().collect(),
        }
    }

    /// Parses execution parameters from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        let params: ExecutionParameters = toml::from_str(text)?;
        Ok(params)
    }

    /// The last snapshot to consider during this run, `None` when no
    /// output snapshots are configured.
    pub fn last_snapshot_to_consider(&self) -> Option<i32> {
        self.output_snapshots.iter().next_back().copied()
    }
}
