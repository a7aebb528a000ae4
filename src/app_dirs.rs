use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Default location for `--log-file` without an explicit path
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("soroban-flash");
            Some(state_dir.join("soroban-flash.log"))
        } else {
            ProjectDirs::from("", "", "soroban-flash")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("soroban-flash.log"))
        }
    }
}
