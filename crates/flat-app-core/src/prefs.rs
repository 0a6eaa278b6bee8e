// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Saved preferences for the flattener tools.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Config key the preferences are stored under.
pub const PREFS_KEY: &str = "flattener";

/// Which record store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Records live for the lifetime of the process.
    Memory,
    /// One JSON document per record on disk.
    #[default]
    Fs,
}

/// Flattener preferences. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenerPrefs {
    /// Maximum records returned by a listing.
    pub page_limit: usize,
    /// Record store backend.
    pub store: StoreKind,
    /// Overrides the platform data directory for the fs store.
    pub data_dir: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for FlattenerPrefs {
    fn default() -> Self {
        Self {
            page_limit: 100,
            store: StoreKind::Fs,
            data_dir: None,
            log_filter: "info".into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_documents_fill_defaults() {
        let prefs: FlattenerPrefs = serde_json::from_str(r#"{ "store": "memory" }"#).unwrap();
        assert_eq!(prefs.store, StoreKind::Memory);
        assert_eq!(prefs.page_limit, 100);
        assert_eq!(prefs.log_filter, "info");
    }
}
