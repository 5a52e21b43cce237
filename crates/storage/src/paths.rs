use std::path::PathBuf;

use directories::ProjectDirs;

pub fn project_dirs() -> anyhow::Result<ProjectDirs> {
    ProjectDirs::from("io", "github", "macrolink")
        .ok_or_else(|| anyhow::anyhow!("unable to determine platform data directories"))
}

/// Directory for user-writable application data (selection, offline profiles).
pub fn data_dir() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

/// Directory for settings and the optional macro catalog override.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn settings_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("settings.json"))
}

pub fn catalog_path() -> anyhow::Result<PathBuf> {
    Ok(config_dir()?.join("catalog.json"))
}

pub fn selection_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join("selection.json"))
}

pub fn profile_book_path() -> anyhow::Result<PathBuf> {
    Ok(data_dir()?.join("profiles.json"))
}
