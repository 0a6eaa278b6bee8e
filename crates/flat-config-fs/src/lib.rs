// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `ConfigStore` adapter that keeps one `<key>.json` per key in a directory,
//! by default the platform config dir (`~/.config/flattener` on Linux).

use directories::ProjectDirs;
use flat_app_core::config::{ConfigError, ConfigStore};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Directory of JSON config documents.
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Opens the store in the platform config directory.
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("dev", "flyingrobots", "Flattener")
            .ok_or(ConfigError::NoConfigDir)?;
        Self::at(dirs.config_dir())
    }

    /// Opens the store in `base`, creating the directory when missing.
    pub fn at(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// Directory holding the documents.
    pub fn base(&self) -> &Path {
        &self.base
    }

    // Keys name a file directly inside `base`; anything that could escape it
    // or collide with the extension is refused.
    fn document(&self, key: &str) -> Result<PathBuf, ConfigError> {
        let plain = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !plain {
            return Err(ConfigError::InvalidKey(key.to_owned()));
        }
        Ok(self.base.join(format!("{key}.json")))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        fs::read(self.document(key)?).map_err(|err| match err.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::Io(err),
        })
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let path = self.document(key)?;
        fs::create_dir_all(&self.base)?;
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use flat_app_core::config::ConfigService;
    use flat_app_core::prefs::{FlattenerPrefs, StoreKind, PREFS_KEY};

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(tag: &str) -> Self {
            Self(std::env::temp_dir().join(format!(
                "flat-config-fs-{tag}-{}",
                std::process::id()
            )))
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn prefs_round_trip_through_files() {
        let tmp = TempDir::new("prefs");
        let svc = ConfigService::new(FsConfigStore::at(&tmp.0).unwrap());
        assert!(matches!(
            svc.store().load_raw(PREFS_KEY),
            Err(ConfigError::NotFound)
        ));

        let prefs = FlattenerPrefs {
            page_limit: 5,
            store: StoreKind::Memory,
            ..FlattenerPrefs::default()
        };
        svc.save(PREFS_KEY, &prefs).unwrap();
        assert!(tmp.0.join("flattener.json").exists());
        assert_eq!(svc.load::<FlattenerPrefs>(PREFS_KEY).unwrap(), Some(prefs));
    }

    #[test]
    fn keys_cannot_leave_the_directory() {
        let tmp = TempDir::new("keys");
        let store = FsConfigStore::at(&tmp.0).unwrap();
        for key in ["", "../flattener", "a/b", "prefs.json"] {
            assert!(
                matches!(store.save_raw(key, b"{}"), Err(ConfigError::InvalidKey(_))),
                "{key:?}"
            );
            assert!(
                matches!(store.load_raw(key), Err(ConfigError::InvalidKey(_))),
                "{key:?}"
            );
        }
        store.save_raw("session_host-2", b"{}").unwrap();
        assert_eq!(store.load_raw("session_host-2").unwrap(), b"{}");
    }
}
