//! Writing the finished CSV.
//!
//! Output files are staged in a temp file next to the target and renamed
//! into place, so a failed run never leaves a half-written file behind.

use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use planefence_core::emit::write_csv;
use planefence_core::{FenceError, TrackRecord};

/// Write `records` to `path`, or stdout for `None`/`-`.
///
/// Nothing is created, truncated, or printed when `records` is empty.
pub fn write_output(records: &[TrackRecord], path: Option<&Path>) -> Result<usize, FenceError> {
    if records.is_empty() {
        info!("no aircraft inside the fence, nothing to write");
        return Ok(0);
    }

    let path = match path {
        Some(p) if p.to_str() != Some("-") => p,
        _ => return write_csv(records, io::stdout().lock()),
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    let written = write_csv(records, &mut tmp)?;
    tmp.persist(path).map_err(|e| FenceError::Io(e.error))?;

    info!(rows = written, path = %path.display(), "wrote output");
    Ok(written)
}
