pub mod init;
pub mod render;
pub mod validate;

pub use init::{init, InitArgs};
pub use render::{render, RenderArgs};
pub use validate::{validate, ValidateArgs};

use crate::config::DEFAULT_CONFIG_NAME;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Content files under `dir`, in a stable order
pub(crate) fn find_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
        let is_config = path.file_name().and_then(|s| s.to_str()) == Some(DEFAULT_CONFIG_NAME);
        if path.is_file() && is_json && !is_config {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}
