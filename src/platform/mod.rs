// Platform abstraction: per-OS filesystem locations and the fixed
// virtual-key encoding the embedded engine expects.

use std::path::PathBuf;

pub mod input;

const APP_DIR: &str = "osrbrowser";

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `~/.config/osrbrowser` (or `$XDG_CONFIG_HOME/osrbrowser`)
/// - **macOS**: `~/Library/Application Support/osrbrowser`
/// - **Windows**: `%APPDATA%/osrbrowser`
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(APP_DIR)
}

/// Returns the platform-specific data directory.
///
/// - **Linux**: `~/.local/share/osrbrowser` (or `$XDG_DATA_HOME/osrbrowser`)
/// - **macOS**: `~/Library/Application Support/osrbrowser`
/// - **Windows**: `%APPDATA%/osrbrowser`
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(APP_DIR)
}

/// Returns the platform-specific cache directory.
///
/// - **Linux**: `~/.cache/osrbrowser` (or `$XDG_CACHE_HOME/osrbrowser`)
/// - **macOS**: `~/Library/Caches/osrbrowser`
/// - **Windows**: `%LOCALAPPDATA%/osrbrowser`
pub fn get_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(APP_DIR)
}
