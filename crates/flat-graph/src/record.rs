// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted record and response shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::graph::VertexRecord;

/// Document stored once per flatten request. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord {
    /// Store-assigned identifier; `None` until the record is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Vertex records with embedded child edges.
    pub vertex_sequence: Vec<VertexRecord>,
    /// Deepest array nesting observed in the input.
    pub max_depth: usize,
    /// UTC creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub processed_at: OffsetDateTime,
}

impl FlatRecord {
    /// Returns a copy carrying the given store id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Reply to a flatten request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatResponse {
    /// Deepest array nesting observed in the input.
    pub max_depth: usize,
    /// Leaf scalars in depth-first input order.
    pub flatted_data: Vec<Value>,
}

/// One entry of the listing: a stored record read back through the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatInfoResponse {
    /// Store-assigned identifier.
    pub id: String,
    /// UTC creation time of the record.
    #[serde(with = "time::serde::rfc3339")]
    pub processed_at: OffsetDateTime,
    /// The nested array as submitted.
    pub unflatted: Vec<Value>,
    /// The flattened leaves.
    pub flatted: Vec<Value>,
}
