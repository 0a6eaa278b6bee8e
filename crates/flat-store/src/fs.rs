// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed record store (one JSON document per record).

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use flat_graph::FlatRecord;
use tracing::{debug, warn};

use crate::{newest_first, record_id, FlatRepository, StoreError, DEFAULT_PAGE_LIMIT};

/// Store records as `<seq>-<id>.json` files in a directory.
///
/// The zero-padded sequence prefix preserves insertion order across
/// processes; it is recovered from the file names on [`FsStore::open`].
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
    limit: usize,
    next_seq: u64,
}

impl FsStore {
    /// Opens the store under the platform data directory
    /// (e.g., `~/.local/share/flattener/flats`).
    pub fn new() -> Result<Self, StoreError> {
        let proj =
            ProjectDirs::from("dev", "flyingrobots", "Flattener").ok_or(StoreError::NoDataDir)?;
        Self::open(proj.data_dir().join("flats"))
    }

    /// Opens (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let next_seq = scan(&dir)?
            .iter()
            .map(|(seq, _)| seq + 1)
            .max()
            .unwrap_or(0);
        debug!(dir = %dir.display(), next_seq, "opened flat store");
        Ok(Self {
            dir,
            limit: DEFAULT_PAGE_LIMIT,
            next_seq,
        })
    }

    /// Sets the page limit applied by `get_all`.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Directory holding the documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Page limit applied by `get_all`.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

// `<seq>-<id>.json` entries; other files are ignored.
fn scan(dir: &Path) -> Result<Vec<(u64, PathBuf)>, StoreError> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let seq = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.split_once('-'))
            .and_then(|(seq, _)| seq.parse::<u64>().ok());
        match seq {
            Some(seq) => out.push((seq, path)),
            None => warn!(path = %path.display(), "skipping unrecognised file in flat store"),
        }
    }
    Ok(out)
}

impl FlatRepository for FsStore {
    fn create(&mut self, record: FlatRecord) -> Result<String, StoreError> {
        let seq = self.next_seq;
        let id = record_id(&record, seq)?;
        let path = self.dir.join(format!("{seq:012}-{id}.json"));
        let data = serde_json::to_vec_pretty(&record.with_id(id.clone()))?;
        fs::write(&path, data)?;
        self.next_seq += 1;
        debug!(%id, path = %path.display(), "stored flat record");
        Ok(id)
    }

    fn get_all(&self) -> Result<Vec<FlatRecord>, StoreError> {
        let mut entries = Vec::new();
        for (seq, path) in scan(&self.dir)? {
            let bytes = fs::read(&path)?;
            let record: FlatRecord =
                serde_json::from_slice(&bytes).map_err(|err| StoreError::Corrupt {
                    path: path.clone(),
                    reason: err.to_string(),
                })?;
            entries.push((seq, record));
        }
        Ok(newest_first(entries, self.limit))
    }
}
