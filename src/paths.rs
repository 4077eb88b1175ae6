//! Path resolution for taskdeck directories.
//!
//! Follows the XDG base directory layout.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "taskdeck";

/// Get the XDG data directory for taskdeck.
///
/// Uses `$XDG_DATA_HOME/taskdeck`, falling back to `~/.local/share/taskdeck`.
/// Without `HOME` either, the directory is relative to the working directory.
pub fn get_data_dir() -> PathBuf {
    let data_home = env::var_os("XDG_DATA_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".local/share"))
                .unwrap_or_default()
        });

    data_home.join(APP_DIR)
}

/// Get database file path (data_dir/taskdeck.db).
pub fn get_db_path() -> PathBuf {
    get_data_dir().join("taskdeck.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_ends_with_app_dir() {
        // Env vars are unreliable in parallel tests, so only check the suffix
        assert!(get_data_dir().ends_with("taskdeck"));
    }

    #[test]
    fn db_path_ends_with_db_file() {
        assert!(get_db_path().ends_with("taskdeck/taskdeck.db"));
    }
}
