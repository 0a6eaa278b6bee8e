// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Single-pass walk that turns a nested array into a [`Graph`].
//!
//! The walk is depth-first pre-order. Every element, container or scalar, gets
//! the next key from a [`KeyCursor`] local to the call, so concurrent flattens
//! never share state.

use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

use crate::graph::{Graph, GraphError, NodeKey, VertexRecord, ROOT_KEY};
use crate::record::{FlatRecord, FlatResponse};
use crate::scalar::Scalar;

/// Message for map-typed elements.
pub const OBJECT_ELEMENT: &str = "object is not a valid value inside an array";
/// Message for `null` elements.
pub const NULL_ELEMENT: &str = "null is not a valid value inside an array";
/// Message for numbers with no `f64` form.
///
/// Only reachable when `serde_json/arbitrary_precision` is enabled somewhere
/// in the build; plain `serde_json` numbers always convert.
pub const NUMBER_ELEMENT: &str = "number is not representable as float64";

/// Errors raised by [`flatten`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    /// The top-level JSON value is not an array.
    #[error("input must be a JSON array")]
    NotAnArray,
    /// An element is neither a scalar nor an array.
    #[error("{0}")]
    InvalidElement(&'static str),
    /// Wiring an edge failed; the walk's own bookkeeping is broken.
    #[error("internal error building graph: {0}")]
    Internal(#[from] GraphError),
}

impl FlattenError {
    /// `true` when the caller must fix the request.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::NotAnArray | Self::InvalidElement(_))
    }
}

/// Result of one flatten: the graph, its storage encoding and the depth.
#[derive(Debug, Clone)]
pub struct FlatInfo {
    graph: Graph,
    vertex_sequence: Vec<VertexRecord>,
    max_depth: usize,
    processed_at: OffsetDateTime,
}

impl FlatInfo {
    /// The graph built by the walk.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Vertex records ready for persistence.
    pub fn vertex_sequence(&self) -> &[VertexRecord] {
        &self.vertex_sequence
    }

    /// Deepest array nesting (0 for a flat array).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// UTC time the flatten ran.
    pub fn processed_at(&self) -> OffsetDateTime {
        self.processed_at
    }

    /// The externally visible `{ max_depth, flatted_data }` reply.
    pub fn response(&self) -> FlatResponse {
        FlatResponse {
            max_depth: self.max_depth,
            flatted_data: self.graph.to_flat_array(),
        }
    }

    /// The persistable document (no id yet).
    pub fn to_record(&self) -> FlatRecord {
        FlatRecord {
            id: None,
            vertex_sequence: self.vertex_sequence.clone(),
            max_depth: self.max_depth,
            processed_at: self.processed_at,
        }
    }
}

/// Monotonic key source threaded through one walk.
#[derive(Debug)]
struct KeyCursor(NodeKey);

impl KeyCursor {
    fn next(&mut self) -> NodeKey {
        let key = self.0;
        self.0 += 1;
        key
    }
}

struct Walk {
    graph: Graph,
    cursor: KeyCursor,
    max_depth: usize,
}

impl Walk {
    fn attach(&mut self, father: NodeKey, value: Option<Scalar>) -> Result<NodeKey, GraphError> {
        let key = self.cursor.next();
        self.graph.add_node(key, value);
        self.graph.add_edge(father, key)?;
        Ok(key)
    }

    fn walk(&mut self, items: &[Value], father: NodeKey, depth: usize) -> Result<(), FlattenError> {
        for item in items {
            match item {
                Value::Array(nested) => {
                    let depth = depth + 1;
                    self.max_depth = self.max_depth.max(depth);
                    let key = self.attach(father, None)?;
                    self.walk(nested, key, depth)?;
                }
                Value::Object(_) => return Err(FlattenError::InvalidElement(OBJECT_ELEMENT)),
                Value::Null => return Err(FlattenError::InvalidElement(NULL_ELEMENT)),
                scalar => {
                    let value = Scalar::from_json(scalar)
                        .ok_or(FlattenError::InvalidElement(NUMBER_ELEMENT))?;
                    self.attach(father, Some(value))?;
                }
            }
        }
        Ok(())
    }
}

/// Flattens `input`, stamping the result with the current UTC time.
///
/// # Errors
///
/// [`FlattenError::InvalidElement`] for object or `null` elements at any
/// depth; [`FlattenError::Internal`] if an edge cannot be wired.
pub fn flatten(input: &[Value]) -> Result<FlatInfo, FlattenError> {
    flatten_at(input, OffsetDateTime::now_utc())
}

/// Flattens `input` with an explicit timestamp.
///
/// # Errors
///
/// Same as [`flatten`].
pub fn flatten_at(input: &[Value], processed_at: OffsetDateTime) -> Result<FlatInfo, FlattenError> {
    let mut walk = Walk {
        graph: Graph::with_root(),
        cursor: KeyCursor(ROOT_KEY + 1),
        max_depth: 0,
    };
    walk.walk(input, ROOT_KEY, 0)?;
    let vertex_sequence = walk.graph.to_vertex_sequence();
    Ok(FlatInfo {
        graph: walk.graph,
        vertex_sequence,
        max_depth: walk.max_depth,
        processed_at,
    })
}

/// Flattens a decoded JSON document, which must be an array.
///
/// # Errors
///
/// [`FlattenError::NotAnArray`] for any other top-level value, otherwise the
/// same as [`flatten`].
pub fn flatten_json(input: &Value) -> Result<FlatInfo, FlattenError> {
    match input {
        Value::Array(items) => flatten(items),
        _ => Err(FlattenError::NotAnArray),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(v: &Value) -> &[Value] {
        v.as_array().unwrap()
    }

    #[test]
    fn keys_follow_pre_order() {
        let input = json!([1, [2, 3], 4]);
        let info = flatten(items(&input)).unwrap();
        let g = info.graph();
        assert_eq!(g.vertex(0).unwrap().children(), &[1, 2, 5]);
        assert_eq!(g.vertex(2).unwrap().children(), &[3, 4]);
        assert_eq!(g.vertex(2).unwrap().value(), None);
        assert_eq!(g.vertex(5).unwrap().value(), Some(&Scalar::Float(4.0)));
    }

    #[test]
    fn empty_input_keeps_only_root() {
        let info = flatten(&[]).unwrap();
        assert_eq!(info.graph().len(), 1);
        assert_eq!(info.max_depth(), 0);
        assert!(info.response().flatted_data.is_empty());
    }

    #[test]
    fn empty_nested_arrays_count_toward_depth_not_leaves() {
        let input = json!([1, [[]]]);
        let info = flatten(items(&input)).unwrap();
        assert_eq!(info.max_depth(), 2);
        assert_eq!(info.response().flatted_data, vec![json!(1)]);
        assert_eq!(info.graph().to_nested_array(), vec![json!(1), json!([[]])]);
    }

    #[test]
    fn objects_are_rejected_at_any_depth() {
        let input = json!([1, [2, { "a": 1 }]]);
        let err = flatten(items(&input)).unwrap_err();
        assert_eq!(err, FlattenError::InvalidElement(OBJECT_ELEMENT));
        assert!(err.is_input_error());
        assert_eq!(err.to_string(), OBJECT_ELEMENT);
    }

    #[test]
    fn nulls_are_rejected() {
        let input = json!([null]);
        assert_eq!(
            flatten(items(&input)).unwrap_err(),
            FlattenError::InvalidElement(NULL_ELEMENT)
        );
    }

    #[test]
    fn element_messages_are_input_errors() {
        for message in [OBJECT_ELEMENT, NULL_ELEMENT, NUMBER_ELEMENT] {
            let err = FlattenError::InvalidElement(message);
            assert!(err.is_input_error());
            assert_eq!(err.to_string(), message);
        }
        assert!(!FlattenError::Internal(GraphError::MissingVertex { from: 0, to: 1 })
            .is_input_error());
    }

    #[test]
    fn top_level_must_be_an_array() {
        assert_eq!(
            flatten_json(&json!({ "a": [1] })).unwrap_err(),
            FlattenError::NotAnArray
        );
        assert_eq!(flatten_json(&json!(3)).unwrap_err(), FlattenError::NotAnArray);
    }

    #[test]
    fn record_carries_depth_and_timestamp() {
        let input = json!([1, [2]]);
        let at = OffsetDateTime::UNIX_EPOCH;
        let info = flatten_at(items(&input), at).unwrap();
        let record = info.to_record();
        assert_eq!(record.id, None);
        assert_eq!(record.max_depth, 1);
        assert_eq!(record.processed_at, at);
        assert_eq!(record.vertex_sequence, info.vertex_sequence());
    }
}
