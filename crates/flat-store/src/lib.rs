// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Storage port for flatten records.
//!
//! [`FlatRepository`] is the whole contract the service relies on: `create`
//! stores a record and hands back its id, `get_all` returns the newest records
//! first, capped at the store's page limit. Each call is atomic from the
//! caller's point of view; nothing here retries.
//!
//! # Record ids
//!
//! Ids are the first 24 hex characters of `BLAKE3(canonical CBOR || seq)`,
//! where `seq` is the store's insertion counter. Identical documents stored
//! twice still get distinct ids.
#![forbid(unsafe_code)]

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use flat_graph::FlatRecord;

/// Maximum number of records returned by [`FlatRepository::get_all`] unless
/// a store is configured otherwise.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Length of a record id in hex characters.
pub const ID_LEN: usize = 24;

/// Errors that can occur while storing or loading records.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Canonical CBOR encoding failure while deriving an id.
    #[error("encode error: {0}")]
    Encode(String),
    /// A stored document could not be parsed back.
    #[error("corrupt record at {}: {reason}", path.display())]
    Corrupt {
        /// Offending document.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },
    /// The platform data directory could not be resolved.
    #[error("could not resolve data dir")]
    NoDataDir,
}

/// Storage contract for flatten records.
pub trait FlatRepository {
    /// Stores `record` and returns the id assigned to it.
    ///
    /// Any `id` already set on `record` is replaced.
    fn create(&mut self, record: FlatRecord) -> Result<String, StoreError>;

    /// Returns stored records, newest `processed_at` first, at most the
    /// store's page limit. Ties go to the most recently inserted record.
    fn get_all(&self) -> Result<Vec<FlatRecord>, StoreError>;
}

impl<R: FlatRepository + ?Sized> FlatRepository for Box<R> {
    fn create(&mut self, record: FlatRecord) -> Result<String, StoreError> {
        (**self).create(record)
    }

    fn get_all(&self) -> Result<Vec<FlatRecord>, StoreError> {
        (**self).get_all()
    }
}

/// Derives the id for the `seq`-th record of a store.
pub fn record_id(record: &FlatRecord, seq: u64) -> Result<String, StoreError> {
    let mut bytes = Vec::new();
    ciborium::ser::into_writer(record, &mut bytes)
        .map_err(|err| StoreError::Encode(err.to_string()))?;
    let mut hasher = blake3::Hasher::new();
    hasher.update(&bytes);
    hasher.update(&seq.to_le_bytes());
    let hex = hasher.finalize().to_hex();
    Ok(hex.as_str()[..ID_LEN].to_owned())
}

// Newest first, ties broken by insertion sequence (higher = newer).
fn newest_first(mut entries: Vec<(u64, FlatRecord)>, limit: usize) -> Vec<FlatRecord> {
    entries.sort_by(|(seq_a, a), (seq_b, b)| {
        b.processed_at
            .cmp(&a.processed_at)
            .then_with(|| seq_b.cmp(seq_a))
    });
    entries.truncate(limit);
    entries.into_iter().map(|(_, record)| record).collect()
}
