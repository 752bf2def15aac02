// src/utils/io.rs

/// Per-user configuration directory, created on first use.
pub fn get_app_config_dir() -> Option<std::path::PathBuf> {
    let dir = dirs::config_dir()?.join("familytree");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok()?;
    }
    Some(dir)
}
