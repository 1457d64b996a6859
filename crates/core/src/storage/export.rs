use crate::domain::product::Product;
use anyhow::Context;
use std::path::{Path, PathBuf};

pub const EXPORT_FILE_NAME: &str = "smart-shopping-list.json";

/// Pretty-printed JSON array of the saved list, in list order.
pub fn saved_list_json(saved: &[Product]) -> anyhow::Result<String> {
    serde_json::to_string_pretty(saved).context("failed to serialize saved list")
}

/// Writes the saved list to `<dir>/smart-shopping-list.json`, replacing any
/// previous export.
pub fn write_saved_list(dir: &Path, saved: &[Product]) -> anyhow::Result<PathBuf> {
    let json = saved_list_json(saved)?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export dir {}", dir.display()))?;

    let path = dir.join(EXPORT_FILE_NAME);
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), items = saved.len(), "saved list exported");
    Ok(path)
}
