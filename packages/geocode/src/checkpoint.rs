//! JSON persistence for record sets: input, checkpoint, and output files.
//!
//! Snapshots are written to a sibling `.tmp` file and renamed over the
//! target, so a reader never sees a half-written checkpoint even if the
//! process dies mid-write.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};

use school_map_school_models::SchoolRecord;

use crate::GeocodeRunError;

/// Reads a JSON array of records.
///
/// # Errors
///
/// Returns [`GeocodeRunError`] if the file cannot be opened or does not
/// contain a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<SchoolRecord>, GeocodeRunError> {
    let file = File::open(path).map_err(|e| GeocodeRunError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| GeocodeRunError::json(path, e))
}

/// Loads the checkpoint at `checkpoint` if it exists, else `input`.
///
/// Returns the records and whether they came from the checkpoint.
///
/// # Errors
///
/// Returns [`GeocodeRunError`] if the chosen file cannot be read or parsed.
pub fn load_or_resume(
    input: &Path,
    checkpoint: &Path,
) -> Result<(Vec<SchoolRecord>, bool), GeocodeRunError> {
    if checkpoint.exists() {
        log::info!("Resuming from checkpoint: {}", checkpoint.display());
        Ok((load_records(checkpoint)?, true))
    } else {
        Ok((load_records(input)?, false))
    }
}

/// Atomically replaces `path` with the pretty-printed JSON of `records`,
/// creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`GeocodeRunError`] if the directory, temporary file, or rename
/// fails.
pub fn save(path: &Path, records: &[SchoolRecord]) -> Result<(), GeocodeRunError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| GeocodeRunError::io(parent, e))?;
    }

    let tmp_path = tmp_path(path);
    if let Err(e) = write_snapshot(&tmp_path, records) {
        if let Err(rm) = std::fs::remove_file(&tmp_path)
            && rm.kind() != std::io::ErrorKind::NotFound
        {
            log::warn!("Failed to remove {}: {rm}", tmp_path.display());
        }
        return Err(e);
    }

    std::fs::rename(&tmp_path, path).map_err(|e| GeocodeRunError::io(path, e))?;
    Ok(())
}

fn write_snapshot(tmp_path: &Path, records: &[SchoolRecord]) -> Result<(), GeocodeRunError> {
    let file = File::create(tmp_path).map_err(|e| GeocodeRunError::io(tmp_path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|e| GeocodeRunError::json(tmp_path, e))?;
    writer
        .flush()
        .map_err(|e| GeocodeRunError::io(tmp_path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| GeocodeRunError::io(tmp_path, e))
}

/// Removes the checkpoint at `path`. A missing file is fine; any other
/// failure is logged and otherwise ignored.
pub fn discard(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("Removed checkpoint {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove checkpoint {}: {e}", path.display()),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
