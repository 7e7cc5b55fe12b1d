use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TRANSIT_DIR: &str = ".transit";

pub const CONFIG_FILE: &str = ".transit/config.yaml";
pub const STOPS_FILE: &str = ".transit/stops.json";
pub const ROUTES_FILE: &str = ".transit/routes.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn transit_dir(root: &Path) -> PathBuf {
    root.join(TRANSIT_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn stops_path(root: &Path) -> PathBuf {
    root.join(STOPS_FILE)
}

pub fn routes_path(root: &Path) -> PathBuf {
    root.join(ROUTES_FILE)
}

/// Trim a stop or route name the way uniqueness checks see it.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_string()
}

/// Case-insensitive name equality after trimming.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
