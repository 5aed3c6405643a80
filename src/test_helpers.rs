//! Shared test utilities for the resizer test suite.
//!
//! Provides an in-memory [`ImageSource`] and helpers to inspect what a run
//! left behind in its work directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = MockSource::new(b"<svg .../>");
//! let resizer = Resizer::new(&source, &backend, &optimizer, tmp.path());
//! resizer.resize("Logo.svg", "logo").unwrap();
//!
//! assert_eq!(source.requests(), vec!["Logo.svg"]);
//! assert!(scratch_leftovers(tmp.path()).is_empty());
//! ```

use crate::source::{ImageSource, SourceError};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

// =========================================================================
// Sources
// =========================================================================

/// Serves the same bytes for every name and records what was asked for.
pub struct MockSource {
    bytes: Option<Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: Some(bytes.to_vec()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A source whose every download fails as if the file were missing.
    pub fn failing() -> Self {
        Self {
            bytes: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl ImageSource for MockSource {
    fn download(&self, name: &str, dest: &mut dyn Write) -> Result<u64, SourceError> {
        self.requests.lock().unwrap().push(name.to_string());
        let bytes = self
            .bytes
            .as_ref()
            .ok_or_else(|| SourceError::NotFound(name.to_string()))?;
        dest.write_all(bytes)?;
        Ok(bytes.len() as u64)
    }
}

// =========================================================================
// Work directory inspection
// =========================================================================

/// Names of files in `dir` that look like temp downloads (hyphenated
/// `<uuid>.<ext>` and anything derived from them).
pub fn scratch_leftovers(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| {
            let stem = name.split('.').next().unwrap_or_default();
            stem.len() == 36 && Uuid::try_parse(stem).is_ok()
        })
        .collect();
    names.sort();
    names
}

#[test]
fn scratch_leftovers_ignores_outputs() {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::write(tmp.path().join("out.png"), b"").unwrap();
    std::fs::write(tmp.path().join(crate::naming::temp_file_name(".png")), b"").unwrap();
    assert_eq!(scratch_leftovers(tmp.path()).len(), 1);
}
