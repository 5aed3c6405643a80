//! Scoped ownership of the temporary files a resize creates.
//!
//! A [`ScratchFile`] names the downloaded original. When it is dropped,
//! every file in the same directory whose name *starts with* that name is
//! removed, which also catches sidecars tools write next to it
//! (`<uuid>.svg.scour`, …). Dropping happens on every exit path, including
//! early returns and propagated errors.

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ScratchFile {
    dir: PathBuf,
    name: String,
}

impl ScratchFile {
    /// Claim `name` inside `dir`. Nothing is created yet.
    pub fn new(dir: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            name: name.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remove the file and all its prefix-named siblings now.
    ///
    /// Returns how many files were removed.
    pub fn cleanup(&self) -> usize {
        remove_with_prefix(&self.dir, &self.name)
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        let removed = self.cleanup();
        log::debug!("Removed {removed} temporary file(s) for {}", self.name);
    }
}

/// Delete every regular file in `dir` whose name starts with `prefix`.
fn remove_with_prefix(dir: &Path, prefix: &str) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        let matches = entry.file_name().to_string_lossy().starts_with(prefix);
        if matches && entry.file_type().is_ok_and(|t| t.is_file()) {
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Could not remove {}: {e}", entry.path().display()),
            }
        }
    }
    removed
}
