mod builder;
mod config;
mod error;
mod evolve;

pub use builder::TreeBuilder;
pub use config::ExecutionParameters;
pub use error::Error;
pub use evolve::{
    destroy_galaxies_this_snapshot, evolve_tree, populate_halos,
    transfer_galaxies_to_next_snapshot, Epoch, PhysicalModel,
};

use crate::model::catalog::{HaloCatalog, TreeKey};

/// Builds the merger-tree forest of `catalog`.
///
/// Convenience wrapper around [`TreeBuilder::build_trees`].
pub fn build_trees(
    catalog: &mut HaloCatalog,
    exec_params: &ExecutionParameters,
) -> Result<Vec<TreeKey>, Error> {
    TreeBuilder::new(exec_params.clone()).build_trees(catalog)
}
