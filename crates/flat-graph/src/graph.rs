// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rooted vertex graph that represents a nested array losslessly.
//!
//! The graph owns every [`Vertex`]; vertices refer to their children by
//! [`NodeKey`] only. Vertex 0 is the synthetic, valueless root. Child lists are
//! kept in insertion order so both projections reproduce the input order.
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::scalar::{DataInfo, Scalar};

/// Integer key identifying a vertex inside one graph.
pub type NodeKey = u64;

/// Key of the synthetic root vertex.
pub const ROOT_KEY: NodeKey = 0;

/// Error returned by [`Graph::add_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// One or both endpoints are not in the graph.
    #[error("not all vertices exist (edge {from} -> {to})")]
    MissingVertex {
        /// Parent key of the rejected edge.
        from: NodeKey,
        /// Child key of the rejected edge.
        to: NodeKey,
    },
}

/// A single vertex: an optional scalar plus ordered child keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    key: NodeKey,
    value: Option<Scalar>,
    children: Vec<NodeKey>,
}

impl Vertex {
    fn new(key: NodeKey, value: Option<Scalar>) -> Self {
        Self {
            key,
            value,
            children: Vec::new(),
        }
    }

    /// Key of this vertex.
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Scalar payload, `None` for the root and containers.
    pub fn value(&self) -> Option<&Scalar> {
        self.value.as_ref()
    }

    /// Child keys in insertion order.
    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }

    /// Returns `true` when the vertex is a scalar leaf.
    ///
    /// A vertex with children always projects as an array, even if a payload
    /// was also assigned to it.
    pub fn is_scalar_leaf(&self) -> bool {
        self.value.is_some() && self.children.is_empty()
    }
}

/// One persisted vertex with its outgoing edges embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexRecord {
    /// Vertex key.
    pub key: NodeKey,
    /// Encoded payload.
    pub data: DataInfo,
    /// Child keys in order.
    #[serde(default)]
    pub edges: Vec<NodeKey>,
}

/// Directed rooted multi-tree keyed by [`NodeKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    vertices: BTreeMap<NodeKey, Vertex>,
    directed: bool,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates an empty directed graph (no root yet).
    pub fn new() -> Self {
        Self {
            vertices: BTreeMap::new(),
            directed: true,
        }
    }

    /// Creates a directed graph holding only the valueless root.
    pub fn with_root() -> Self {
        let mut graph = Self::new();
        graph.add_node(ROOT_KEY, None);
        graph
    }

    /// Edges always point parent → child.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of vertices, root included.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the graph has no vertices at all.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Looks up a vertex.
    pub fn vertex(&self, key: NodeKey) -> Option<&Vertex> {
        self.vertices.get(&key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains(&self, key: NodeKey) -> bool {
        self.vertices.contains_key(&key)
    }

    /// Iterates vertices in key order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Inserts a vertex, or replaces the payload of an existing one.
    ///
    /// Replacing keeps the vertex's child list and any edges pointing at it;
    /// callers must not reuse keys for unrelated vertices.
    pub fn add_node(&mut self, key: NodeKey, value: Option<Scalar>) {
        match self.vertices.entry(key) {
            Entry::Occupied(mut slot) => slot.get_mut().value = value,
            Entry::Vacant(slot) => {
                slot.insert(Vertex::new(key, value));
            }
        }
    }

    /// Adds the edge `from → to`. Adding an existing edge is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingVertex`] if either endpoint is absent; the
    /// graph is left unchanged.
    pub fn add_edge(&mut self, from: NodeKey, to: NodeKey) -> Result<(), GraphError> {
        let missing = GraphError::MissingVertex { from, to };
        if !self.vertices.contains_key(&to) {
            return Err(missing);
        }
        let parent = self.vertices.get_mut(&from).ok_or(missing)?;
        if !parent.children.contains(&to) {
            parent.children.push(to);
        }
        Ok(())
    }

    /// Projects the graph back into the nested array it encodes.
    pub fn to_nested_array(&self) -> Vec<Value> {
        self.root_children()
            .map(|child| self.project_nested(child))
            .collect()
    }

    /// Projects the graph into its leaf scalars, depth-first in input order.
    pub fn to_flat_array(&self) -> Vec<Value> {
        let mut out = Vec::new();
        for child in self.root_children() {
            self.collect_leaves(child, &mut out);
        }
        out
    }

    /// Serializes every vertex (key order) with its payload and child keys.
    pub fn to_vertex_sequence(&self) -> Vec<VertexRecord> {
        self.vertices
            .values()
            .map(|v| VertexRecord {
                key: v.key,
                data: v
                    .value
                    .as_ref()
                    .map_or_else(DataInfo::structural, Scalar::to_data_info),
                edges: v.children.clone(),
            })
            .collect()
    }

    fn root_children(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices
            .get(&ROOT_KEY)
            .into_iter()
            .flat_map(move |root| self.children_of(root))
    }

    fn children_of<'a>(&'a self, vertex: &'a Vertex) -> impl Iterator<Item = &'a Vertex> + 'a {
        vertex
            .children
            .iter()
            .filter_map(move |key| self.vertices.get(key))
    }

    fn project_nested(&self, vertex: &Vertex) -> Value {
        match &vertex.value {
            Some(scalar) if vertex.children.is_empty() => scalar.to_json(),
            _ => Value::Array(
                self.children_of(vertex)
                    .map(|child| self.project_nested(child))
                    .collect(),
            ),
        }
    }

    fn collect_leaves(&self, vertex: &Vertex, out: &mut Vec<Value>) {
        match &vertex.value {
            Some(scalar) if vertex.children.is_empty() => out.push(scalar.to_json()),
            _ => {
                for child in self.children_of(vertex) {
                    self.collect_leaves(child, out);
                }
            }
        }
    }
}
