//! Input validation: make sure the user-supplied path is a readable PDF.
//!
//! pdfium reports a missing file and a garbage file with the same opaque
//! error, so we check existence, permissions, and the `%PDF` magic bytes up
//! front and return a specific [`Pdf2TxtError`] instead.

use crate::error::Pdf2TxtError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local file path and return it as an owned `PathBuf`.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<PathBuf, Pdf2TxtError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(Pdf2TxtError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2TxtError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2TxtError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2TxtError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}
