use std::fs;
use std::path::Path;

use tracing::debug;

use crate::storage::SubsumptionGraph;

use crate::admin::error::{AdminError, Result};

/// Loads the graph file at `path`, failing early when it does not exist.
pub fn open_graph(path: &Path) -> Result<SubsumptionGraph> {
    if !path.is_file() {
        return Err(AdminError::missing_graph(path));
    }
    let loaded = SubsumptionGraph::load(path)?;
    debug!(path = %path.display(), vertices = loaded.graph.len(), "admin.open_graph");
    Ok(loaded)
}

/// Size of the file at `path` in bytes.
pub(crate) fn file_size(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path)?.len())
}
