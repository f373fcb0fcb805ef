//! Atomic file persistence for the CLI.
//!
//! The engine never touches the filesystem; the CLI uses this to write
//! results back so a crash mid-write can never leave a half-patched file.

use std::io::Write;
use std::path::Path;

/// Atomic file write: tempfile in the same directory + fsync + rename.
pub fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
