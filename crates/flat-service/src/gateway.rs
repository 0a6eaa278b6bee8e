// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Flatten-and-persist gateway.

use flat_graph::{flatten_json, rebuild_record, FlatInfoResponse, FlatResponse};
use flat_store::FlatRepository;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ApiError;

/// Message for unparseable request bodies.
const PARSE_BODY: &str = "error parsing body";
const SAVE_FAILED: &str = "error saving the flat_info";
const LOAD_FAILED: &str = "error getting flat_info from db";
const REBUILD_FAILED: &str = "error rebuilding the flat_info";

/// Flattens requests, persists them through `R`, and lists what was stored.
#[derive(Debug)]
pub struct FlatGateway<R> {
    repository: R,
}

impl<R> FlatGateway<R> {
    /// Wraps `repository`.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Borrow the backing repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Unwraps the backing repository.
    pub fn into_repository(self) -> R {
        self.repository
    }
}

impl<R: FlatRepository> FlatGateway<R> {
    /// Flattens `input`, stores the record, and returns the flat reply.
    ///
    /// Nothing is stored when `input` is rejected.
    pub fn flat_response(&mut self, input: &Value) -> Result<FlatResponse, ApiError> {
        let info = flatten_json(input).map_err(|err| {
            if err.is_input_error() {
                ApiError::bad_request(err.to_string())
            } else {
                warn!(error = %err, "flatten failed");
                ApiError::internal(err.to_string())
            }
        })?;
        let id = self.repository.create(info.to_record()).map_err(|err| {
            warn!(error = %err, "failed to store flat record");
            ApiError::internal(SAVE_FAILED).with_cause(err)
        })?;
        info!(%id, max_depth = info.max_depth(), vertices = info.graph().len(), "flattened");
        Ok(info.response())
    }

    /// Same as [`Self::flat_response`] for a raw JSON body.
    pub fn flat_response_bytes(&mut self, body: &[u8]) -> Result<FlatResponse, ApiError> {
        let input: Value = serde_json::from_slice(body)
            .map_err(|err| ApiError::bad_request(PARSE_BODY).with_cause(err))?;
        self.flat_response(&input)
    }

    /// Lists stored records, newest first, rebuilt into nested and flat form.
    ///
    /// A single undecodable record fails the whole listing.
    pub fn get_flats(&self) -> Result<Vec<FlatInfoResponse>, ApiError> {
        let records = self.repository.get_all().map_err(|err| {
            warn!(error = %err, "failed to load flat records");
            ApiError::internal(LOAD_FAILED).with_cause(err)
        })?;
        debug!(count = records.len(), "loaded flat records");
        records
            .iter()
            .map(|record| {
                rebuild_record(record).map_err(|err| {
                    warn!(id = ?record.id, error = %err, "failed to rebuild flat record");
                    ApiError::internal(REBUILD_FAILED).with_cause(err)
                })
            })
            .collect()
    }
}
