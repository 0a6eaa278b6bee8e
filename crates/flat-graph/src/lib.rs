// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! flat-graph: nested-array flattening codec.
//!
//! [`flatten`] walks a JSON array once, building a rooted [`Graph`] whose
//! vertices are the array's containers and scalars. The graph projects into
//! the flat leaf list, back into the nested array, or into a [`VertexRecord`]
//! sequence for storage; [`rebuild`] reverses the last projection.
//!
//! Everything here is a pure, synchronous computation over a graph owned by
//! the call.
#![forbid(unsafe_code)]

mod flatten;
mod graph;
mod rebuild;
mod record;
pub mod scalar;

pub use flatten::{
    flatten, flatten_at, flatten_json, FlatInfo, FlattenError, NULL_ELEMENT, NUMBER_ELEMENT,
    OBJECT_ELEMENT,
};
pub use graph::{Graph, GraphError, NodeKey, Vertex, VertexRecord, ROOT_KEY};
pub use rebuild::{rebuild, rebuild_record, RebuildError};
pub use record::{FlatInfoResponse, FlatRecord, FlatResponse};
pub use scalar::{decode, encode, CodecError, DataInfo, Scalar};
