//! Result types returned by the transcription entry points.

use crate::chunk::TextChunk;
use serde::{Deserialize, Serialize};

/// A full transcription: joined text, per-page outcomes, and counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptOutput {
    /// Cleaned pages joined by the configured separator.
    pub text: String,
    /// One entry per selected page, in document order.
    pub pages: Vec<PageResult>,
    /// Indexing chunks; empty unless chunking was configured.
    #[serde(default)]
    pub chunks: Vec<TextChunk>,
    pub stats: TranscriptStats,
}

/// Outcome for a single selected page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Cleaned text, or `None` when the page had no extractable text.
    pub text: Option<String>,
    /// Character count of the raw extracted text (0 when absent).
    pub raw_chars: usize,
}

impl PageResult {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptStats {
    /// Pages in the source document. The completion diagnostic reports this.
    pub total_pages: usize,
    /// Pages the selection asked for.
    pub selected_pages: usize,
    /// Pages that contributed text to the transcript.
    pub written_pages: usize,
    /// Selected pages left out for having no text.
    pub empty_pages: usize,
    pub raw_chars: usize,
    pub cleaned_chars: usize,
    #[serde(default)]
    pub chunk_count: usize,
    pub duration_ms: u64,
}

/// Document-level information reported by `--inspect-only`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
