// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! flat-service: request-level orchestration over the flatten codec and the
//! record store.
#![forbid(unsafe_code)]

mod error;
mod gateway;

pub use error::{ApiError, ApiErrorKind};
pub use gateway::FlatGateway;
