//! `.luna` file read/write.
//!
//! # Side effects
//! - Emits `workspace_save` / `workspace_load` events with duration and size.
//!   Paths and document content are never logged.

use super::codec::{deserialize, serialize};
use super::PersistError;
use crate::model::workspace::Workspace;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File extension of workspace files, without the dot.
pub const WORKSPACE_EXTENSION: &str = "luna";

/// Appends `.luna` when `path` has no extension.
///
/// # Errors
/// - `InvalidExtension` when `path` already has a different extension.
pub fn ensure_workspace_extension(path: impl AsRef<Path>) -> Result<PathBuf, PersistError> {
    let path = path.as_ref();
    match path.extension().and_then(|value| value.to_str()) {
        None => Ok(path.with_extension(WORKSPACE_EXTENSION)),
        Some(ext) if ext.eq_ignore_ascii_case(WORKSPACE_EXTENSION) => Ok(path.to_path_buf()),
        Some(_) => Err(PersistError::InvalidExtension(path.to_path_buf())),
    }
}

/// Serializes `workspace` and writes it to `path`.
///
/// The payload is written to a sibling temp file first and renamed into
/// place, so an interrupted save leaves the previous file intact.
pub fn save_workspace_file(path: impl AsRef<Path>, workspace: &Workspace) -> Result<(), PersistError> {
    let started_at = Instant::now();
    let path = ensure_workspace_extension(path)?;
    info!("event=workspace_save module=persistence status=start");

    let result = serialize(workspace)
        .map_err(PersistError::from)
        .and_then(|payload| write_replacing(&path, payload.as_bytes()).map(|()| payload.len()));

    match result {
        Ok(bytes) => {
            info!(
                "event=workspace_save module=persistence status=ok duration_ms={} bytes={} notebooks={} cells={}",
                started_at.elapsed().as_millis(),
                bytes,
                workspace.notebooks.len(),
                workspace.cells.len()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=workspace_save module=persistence status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Reads and decodes the workspace stored at `path`.
pub fn load_workspace_file(path: impl AsRef<Path>) -> Result<Workspace, PersistError> {
    let started_at = Instant::now();
    let path = path.as_ref();
    info!("event=workspace_load module=persistence status=start");

    let result = std::fs::read_to_string(path)
        .map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|payload| deserialize(&payload).map_err(PersistError::from));

    match result {
        Ok(workspace) => {
            info!(
                "event=workspace_load module=persistence status=ok duration_ms={} notebooks={} cells={} binned_cells={}",
                started_at.elapsed().as_millis(),
                workspace.notebooks.len(),
                workspace.cells.len(),
                workspace.recycle_bin.cells.len()
            );
            Ok(workspace)
        }
        Err(err) => {
            error!(
                "event=workspace_load module=persistence status=error duration_ms={} error_code=workspace_load_failed",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn write_replacing(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let io_error = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    std::fs::write(&temp_path, bytes).map_err(io_error)?;
    if let Err(source) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(io_error(source));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_workspace_extension;
    use crate::persistence::PersistError;
    use std::path::PathBuf;

    #[test]
    fn extension_is_appended_or_validated() {
        assert_eq!(
            ensure_workspace_extension("/tmp/notes").unwrap(),
            PathBuf::from("/tmp/notes.luna")
        );
        assert_eq!(
            ensure_workspace_extension("/tmp/notes.LUNA").unwrap(),
            PathBuf::from("/tmp/notes.LUNA")
        );
        assert!(matches!(
            ensure_workspace_extension("/tmp/notes.zip"),
            Err(PersistError::InvalidExtension(_))
        ));
    }
}
