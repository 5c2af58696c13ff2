//! Transcript output: write UTF-8 text to a file, replacing it atomically.
//!
//! Bytes go to a uniquely named temporary file next to the destination,
//! which is then renamed over it. A failed write leaves any previous file
//! untouched and never a half-written one, and no existing file other than
//! the destination is ever replaced.

use crate::chunk::TextChunk;
use crate::error::Pdf2TxtError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Write `text` to `path`, creating parent directories and overwriting any
/// existing file.
pub fn write_transcript(path: &Path, text: &str) -> Result<(), Pdf2TxtError> {
    write_atomic(path, text.as_bytes())
}

/// Write `chunks` to `path` as JSON Lines, one chunk object per line.
pub fn write_chunks(path: &Path, chunks: &[TextChunk]) -> Result<(), Pdf2TxtError> {
    let mut jsonl = String::new();
    for chunk in chunks {
        jsonl.push_str(&serde_json::to_string(chunk)?);
        jsonl.push('\n');
    }
    write_atomic(path, jsonl.as_bytes())
}

/// Replace `path` with `bytes` in a single rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), Pdf2TxtError> {
    let write_err = |source: std::io::Error| Pdf2TxtError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(write_err)?;
            parent
        }
        None => Path::new("."),
    };

    // Dropping the handle on any error path removes the staging file.
    let mut staged = tempfile::Builder::new()
        .prefix(".pdf2txt-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    staged.write_all(bytes).map_err(write_err)?;
    staged.as_file().sync_all().map_err(write_err)?;
    persist(staged, path).map_err(write_err)?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn persist(staged: NamedTempFile, path: &Path) -> std::io::Result<()> {
    staged.persist(path).map(drop).map_err(|e| e.error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn overwrites_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "a much longer previous transcript").unwrap();

        write_transcript(&path, "new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(entries(dir.path()), vec!["out.txt"]);
    }

    #[test]
    fn neighbouring_tmp_file_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let neighbour = dir.path().join("out.txt.tmp");
        std::fs::write(&neighbour, "user data").unwrap();

        write_transcript(&path, "transcript").unwrap();

        assert_eq!(std::fs::read_to_string(&neighbour).unwrap(), "user data");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "transcript");
        assert_eq!(entries(dir.path()), vec!["out.txt", "out.txt.tmp"]);
    }

    #[test]
    fn chunks_are_written_one_json_object_per_line() {
        use crate::chunk::SectionKind;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.jsonl");
        let chunks: Vec<TextChunk> = ["first", "second \"quoted\"\nline"]
            .iter()
            .enumerate()
            .map(|(index, text)| TextChunk {
                index,
                total_chunks: 2,
                page_num: 1,
                section: SectionKind::General,
                text: text.to_string(),
            })
            .collect();

        write_chunks(&path, &chunks).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        let back: TextChunk = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(back, chunks[1]);
        assert!(lines[0].contains("\"section\":\"general\""));
    }

    #[test]
    fn creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.txt");
        write_transcript(&path, "héllo wörld ✓").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "héllo wörld ✓");
    }

    #[test]
    fn directory_destination_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("taken");
        std::fs::create_dir(&target).unwrap();

        let err = write_transcript(&target, "text").unwrap_err();

        assert!(matches!(err, Pdf2TxtError::OutputWriteFailed { .. }));
        assert_eq!(entries(dir.path()), vec!["taken"]);
    }
}
