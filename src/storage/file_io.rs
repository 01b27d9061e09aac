//! File I/O utilities with atomic creation
//!
//! New files are written to a temp file and renamed into place, so a reader
//! never sees a half-written header. Appends are flushed and synced before
//! returning.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::TrackerError;

/// Temp path next to the target (same directory keeps the rename atomic)
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn ensure_parent(path: &Path) -> Result<(), TrackerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            TrackerError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }
    Ok(())
}

/// Write a new file atomically (write to temp, then rename)
///
/// `write` receives a buffered writer over the temp file.
pub fn write_atomic<P, F>(path: P, write: F) -> Result<(), TrackerError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> Result<(), TrackerError>,
{
    let path = path.as_ref();
    ensure_parent(path)?;

    let temp_path = temp_path(path);

    let file = File::create(&temp_path)
        .map_err(|e| TrackerError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    if let Err(e) = write(&mut writer) {
        drop(writer);
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    writer
        .flush()
        .map_err(|e| TrackerError::Storage(format!("Failed to flush data: {}", e)))?;

    // Sync to disk before rename
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| TrackerError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        TrackerError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Append to an existing file and sync before returning
pub fn append_synced<P, F>(path: P, write: F) -> Result<(), TrackerError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> Result<(), TrackerError>,
{
    let path = path.as_ref();

    let file = OpenOptions::new().append(true).open(path).map_err(|e| {
        TrackerError::Storage(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let mut writer = BufWriter::new(file);
    write(&mut writer)?;

    writer
        .flush()
        .map_err(|e| TrackerError::Storage(format!("Failed to flush data: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| TrackerError::Storage(format!("Failed to sync data: {}", e)))?;

    Ok(())
}
