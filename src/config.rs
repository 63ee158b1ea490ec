// Global configuration for the data explorer query layer
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::Mutex;

// Global configuration for data store locations
pub static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::new()));

/// Global configuration container for the query layer.
///
/// Holds the roots of the two mirrored file trees (EXFORtables and
/// ENDFtables) and the paths of the two SQLite stores they were generated
/// from. A single global instance is exposed via the `CONFIG` static; most
/// code should obtain a guard with [`Config::global`] rather than accessing
/// the mutex directly. Tests construct local `Config` values instead.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the mirrored EXFORtables tree (per-nuclide experimental data files).
    pub exfortables_path: PathBuf,
    /// Root of the mirrored ENDFtables tree (per-nuclide evaluated data files).
    pub endftables_path: PathBuf,
    /// SQLite file of the experimental-data store.
    pub exfor_db: PathBuf,
    /// SQLite file of the evaluated-library store.
    pub endftables_db: PathBuf,
    /// Common data root stripped when rendering file links.
    pub data_dir: PathBuf,
}

impl Config {
    /// Create a new configuration with default (relative) locations
    pub fn new() -> Self {
        Config {
            exfortables_path: PathBuf::from("exfortables_py"),
            endftables_path: PathBuf::from("endftables"),
            exfor_db: PathBuf::from("exfor.sqlite"),
            endftables_db: PathBuf::from("endftables.sqlite"),
            data_dir: PathBuf::from("."),
        }
    }

    /// Set both mirrored-tree roots at once
    pub fn set_table_paths(
        &mut self,
        exfortables: impl Into<PathBuf>,
        endftables: impl Into<PathBuf>,
    ) {
        self.exfortables_path = exfortables.into();
        self.endftables_path = endftables.into();
    }

    /// Set both store file paths at once
    pub fn set_db_paths(
        &mut self,
        exfor_db: impl Into<PathBuf>,
        endftables_db: impl Into<PathBuf>,
    ) {
        self.exfor_db = exfor_db.into();
        self.endftables_db = endftables_db.into();
    }

    /// Get the global configuration instance
    pub fn global() -> std::sync::MutexGuard<'static, Self> {
        CONFIG
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_table_paths() {
        let mut config = Config::new();
        config.set_table_paths("/data/exfortables_py", "/data/endftables");
        assert_eq!(
            config.exfortables_path,
            PathBuf::from("/data/exfortables_py")
        );
        assert_eq!(config.endftables_path, PathBuf::from("/data/endftables"));
    }

    #[test]
    fn test_set_db_paths() {
        let mut config = Config::new();
        config.set_db_paths("/db/exfor.sqlite", "/db/endftables.sqlite");
        assert_eq!(config.exfor_db, PathBuf::from("/db/exfor.sqlite"));
        assert_eq!(
            config.endftables_db,
            PathBuf::from("/db/endftables.sqlite")
        );
    }
}
