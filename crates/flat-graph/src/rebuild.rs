// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Reconstructs a [`Graph`] from its persisted vertex sequence.
//!
//! Two passes: every vertex first, then every edge. Sequence order is not
//! topological order, so a child may be listed after the parent that names it.
use std::collections::BTreeSet;

use thiserror::Error;

use crate::graph::{Graph, GraphError, NodeKey, VertexRecord, ROOT_KEY};
use crate::record::{FlatInfoResponse, FlatRecord};
use crate::scalar::{decode, CodecError};

/// Errors raised by [`rebuild`]. None of them leave a partial graph behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RebuildError {
    /// A vertex payload does not decode to its declared type.
    #[error("error parsing data_info of vertex {key}: {source}")]
    DataDecoding {
        /// Key of the offending vertex.
        key: NodeKey,
        /// Underlying codec failure.
        #[source]
        source: CodecError,
    },
    /// An edge names a key that no record defines.
    #[error(transparent)]
    MissingVertex(#[from] GraphError),
    /// No record defines the root vertex.
    #[error("vertex sequence has no root vertex")]
    MissingRoot,
    /// A vertex is reachable twice from the root (shared child or cycle).
    #[error("vertex {key} is reachable more than once from the root")]
    NotATree {
        /// First key reached a second time.
        key: NodeKey,
    },
}

/// Rebuilds the graph described by `sequence`.
///
/// # Errors
///
/// See [`RebuildError`]; the first failure aborts the rebuild.
pub fn rebuild(sequence: &[VertexRecord]) -> Result<Graph, RebuildError> {
    let mut graph = Graph::new();
    for record in sequence {
        let value = decode(&record.data).map_err(|source| RebuildError::DataDecoding {
            key: record.key,
            source,
        })?;
        graph.add_node(record.key, value);
    }
    for record in sequence {
        for &child in &record.edges {
            graph.add_edge(record.key, child)?;
        }
    }
    check_tree(&graph)?;
    Ok(graph)
}

/// Rebuilds a stored record into its listing entry.
///
/// # Errors
///
/// Same as [`rebuild`].
pub fn rebuild_record(record: &FlatRecord) -> Result<FlatInfoResponse, RebuildError> {
    let graph = rebuild(&record.vertex_sequence)?;
    Ok(FlatInfoResponse {
        id: record.id.clone().unwrap_or_default(),
        processed_at: record.processed_at,
        unflatted: graph.to_nested_array(),
        flatted: graph.to_flat_array(),
    })
}

// Projections recurse from the root; they only terminate on a tree.
fn check_tree(graph: &Graph) -> Result<(), RebuildError> {
    if !graph.contains(ROOT_KEY) {
        return Err(RebuildError::MissingRoot);
    }
    let mut seen = BTreeSet::from([ROOT_KEY]);
    let mut stack = vec![ROOT_KEY];
    while let Some(key) = stack.pop() {
        let Some(vertex) = graph.vertex(key) else {
            continue;
        };
        for &child in vertex.children() {
            if !seen.insert(child) {
                return Err(RebuildError::NotATree { key: child });
            }
            stack.push(child);
        }
    }
    Ok(())
}
