//! Path utilities and file system helpers

use std::path::PathBuf;

/// Gets the application data directory
pub fn get_app_data_dir() -> Result<PathBuf, String> {
    dirs::data_dir()
        .map(|p| p.join("com.promptbattle.desktop"))
        .ok_or_else(|| "Could not find app data directory".to_string())
}

/// Gets the configuration file path (API key and settings)
pub fn get_config_path() -> Result<PathBuf, String> {
    get_app_data_dir().map(|p| p.join(".config.json"))
}

/// Gets the directory automatic downloads are written to
pub fn get_download_dir() -> Result<PathBuf, String> {
    if let Some(dir) = dirs::download_dir() {
        return Ok(dir);
    }
    // Headless systems may not expose a download directory
    get_app_data_dir().map(|p| p.join("downloads"))
}
