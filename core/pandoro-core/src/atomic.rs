//! Atomic file replacement.
//!
//! Contents are written to a sibling temporary file (`state.json~`,
//! `state.json~~`, ... whichever is free), synced, then renamed over the
//! target. Readers see either the old file or the new one, never a partial
//! write. The temporary file is removed when the write finishes, whether it
//! succeeded or not.

use fs_err as fs;
use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{PandoroError, Result};

const TEMP_SUFFIX: char = '~';
const MAX_TEMP_ATTEMPTS: usize = 64;

/// Removes the temporary file when the save operation ends.
struct TempFileGuard {
    path: PathBuf,
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed leftover temp file"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "Failed to remove temp file")
            }
        }
    }
}

fn with_suffix(path: &Path, count: usize) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    for _ in 0..count {
        name.push(TEMP_SUFFIX.to_string());
    }
    PathBuf::from(name)
}

fn io_error(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> PandoroError {
    let context = context.into();
    move |source| PandoroError::Io { context, source }
}

/// Creates the first free `<path>~…` sibling, claiming it with `create_new`
/// so two writers never share a temp file.
fn create_temp_sibling(path: &Path) -> Result<(fs::File, TempFileGuard)> {
    for count in 1..=MAX_TEMP_ATTEMPTS {
        let candidate = with_suffix(path, count);
        if candidate.exists() {
            continue;
        }
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((file, TempFileGuard { path: candidate })),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(io_error("Failed to create temp file")(err)),
        }
    }

    Err(PandoroError::Io {
        context: format!("No free temp file name next to {}", path.display()),
        source: std::io::Error::from(ErrorKind::AlreadyExists),
    })
}

/// Atomically replaces `path` with `contents`, creating the parent directory
/// if needed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error("Failed to create parent directory"))?;
    }

    let (mut file, guard) = create_temp_sibling(path)?;
    file.write_all(contents)
        .map_err(io_error("Failed to write temp file"))?;
    file.sync_all()
        .map_err(io_error("Failed to sync temp file"))?;
    drop(file);

    fs::rename(&guard.path, path).map_err(io_error("Failed to replace file"))?;
    Ok(())
}
