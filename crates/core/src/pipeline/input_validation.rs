use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{OUTPUT_EXTENSION, SOURCE_EXTENSIONS};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("source {} is not a supported video (expected .mov or .mp4)", .0.display())]
    UnsupportedSource(PathBuf),
    #[error("output {} must be an .mp4 file", .0.display())]
    UnsupportedOutput(PathBuf),
}

/// Checks the source and destination container extensions.
///
/// Runs before anything is opened or created.
pub fn validate_paths(src: &Path, dst: &Path) -> Result<(), ValidationError> {
    let src_ok = extension(src)
        .map(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    if !src_ok {
        return Err(ValidationError::UnsupportedSource(src.to_path_buf()));
    }
    if extension(dst).as_deref() != Some(OUTPUT_EXTENSION) {
        return Err(ValidationError::UnsupportedOutput(dst.to_path_buf()));
    }
    Ok(())
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}
