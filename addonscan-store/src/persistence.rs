//! Result file persistence.
//!
//! Addons are written to the output path as a JSON array. Invalid addons go
//! to a sibling file named `<stem>.invalid.json`.

use std::path::{Path, PathBuf};

use addonscan_core::{Addon, InvalidAddon};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::StoreError;

// ============================================================================
// Path Checks
// ============================================================================

/// Fails unless `path` has a `.json` extension.
pub fn ensure_json_extension(path: &Path) -> Result<(), StoreError> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(())
    } else {
        Err(StoreError::NotJson {
            path: path.to_path_buf(),
        })
    }
}

/// Checks that `path` can take a new result file: it must end in `.json`
/// and must not exist yet.
pub fn validate_output_path(path: &Path) -> Result<(), StoreError> {
    ensure_json_extension(path)?;
    if path.exists() {
        return Err(StoreError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

/// `addons.json` -> `addons.invalid.json`, in the same directory.
pub fn invalid_output_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}.invalid.json"))
}

// ============================================================================
// File Operations
// ============================================================================

async fn create_parent_dirs(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            debug!(path = %parent.display(), "Creating directory");
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    Ok(())
}

/// Serializes `data` next to `path` and returns the temp file written.
async fn stage_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<PathBuf, StoreError> {
    create_parent_dirs(path).await?;

    let json = serde_json::to_string(data)?;
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, &json).await?;

    debug!(path = %temp_path.display(), bytes = json.len(), "Staged JSON file");
    Ok(temp_path)
}

/// Saves data to a JSON file.
///
/// Creates parent directories if they don't exist and writes atomically
/// (via temp file + rename).
pub async fn save_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<(), StoreError> {
    debug!(path = %path.display(), "Saving JSON file");

    let temp_path = stage_json(path, data).await?;
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Writes the run's results.
///
/// The output path is checked again right before writing, since a run takes
/// long enough for something else to create it. Both files are staged before
/// either is renamed into place, so a failed write leaves neither behind.
/// Returns the path the invalid addons went to.
pub async fn write_results(
    output: &Path,
    addons: &[Addon],
    invalid: &[InvalidAddon],
) -> Result<PathBuf, StoreError> {
    validate_output_path(output)?;
    let invalid_path = invalid_output_path(output);

    let staged_addons = stage_json(output, addons).await?;
    let staged_invalid = match stage_json(&invalid_path, invalid).await {
        Ok(path) => path,
        Err(e) => {
            discard(&staged_addons).await;
            return Err(e);
        }
    };

    if let Err(e) = tokio::fs::rename(&staged_invalid, &invalid_path).await {
        discard(&staged_addons).await;
        discard(&staged_invalid).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&staged_addons, output).await {
        discard(&staged_addons).await;
        discard(&invalid_path).await;
        return Err(e.into());
    }

    info!(
        output = %output.display(),
        invalid_output = %invalid_path.display(),
        addons = addons.len(),
        invalid = invalid.len(),
        "Wrote results"
    );
    Ok(invalid_path)
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "Failed to remove partial result file");
    }
}
