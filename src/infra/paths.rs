// src/infra/paths.rs — Config location
//
// QARELAY_HOME overrides everything. Otherwise config lives in ~/.qarelay/.

use std::path::PathBuf;

/// Returns the QARELAY_HOME override, if set.
fn qarelay_home() -> Option<PathBuf> {
    std::env::var_os("QARELAY_HOME").map(PathBuf::from)
}

/// Configuration directory: $QARELAY_HOME/ or ~/.qarelay/
pub fn config_dir() -> PathBuf {
    if let Some(home) = qarelay_home() {
        return home;
    }
    match directories::BaseDirs::new() {
        Some(base) => base.home_dir().join(".qarelay"),
        // No resolvable home (e.g. stripped container env): use the working directory
        None => PathBuf::from(".qarelay"),
    }
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
