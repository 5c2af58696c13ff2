//! Progress-callback trait for per-page transcription events.
//!
//! Inject an [`Arc<dyn TranscriptProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! the run's diagnostics: one event per page with no extractable text, and a
//! completion event carrying the document's total page count.
//!
//! The library also logs the same events through `tracing`, so callers that
//! only want log lines need no callback at all.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2txt::{ExtractionConfig, TranscriptProgressCallback};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct EmptyPages(Mutex<Vec<usize>>);
//!
//! impl TranscriptProgressCallback for EmptyPages {
//!     fn on_page_empty(&self, page_num: usize, _total_pages: usize) {
//!         self.0.lock().unwrap().push(page_num);
//!     }
//! }
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(Arc::new(EmptyPages::default()))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the pipeline as it walks the document.
///
/// All methods default to no-ops. The pipeline is single-threaded, but the
/// trait is `Send + Sync` so one callback can be shared across runs.
pub trait TranscriptProgressCallback: Send + Sync {
    /// Called once after the document is opened.
    ///
    /// * `total_pages`   : pages in the document
    /// * `selected_pages`: pages that will be extracted
    fn on_transcript_start(&self, total_pages: usize, selected_pages: usize) {
        let _ = (total_pages, selected_pages);
    }

    /// A page produced text and was normalised.
    ///
    /// * `page_num`   : 1-indexed page number
    /// * `total_pages`: pages in the document
    /// * `cleaned_len`: byte length of the cleaned page text
    fn on_page_extracted(&self, page_num: usize, total_pages: usize, cleaned_len: usize) {
        let _ = (page_num, total_pages, cleaned_len);
    }

    /// A page had no extractable text and was left out of the transcript.
    fn on_page_empty(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called once after the transcript has been assembled (and written, when
    /// `output_path` is `Some`).
    ///
    /// * `total_pages`  : pages in the source document, not pages written
    /// * `written_pages`: pages that contributed text
    fn on_transcript_complete(
        &self,
        total_pages: usize,
        written_pages: usize,
        output_path: Option<&Path>,
    ) {
        let _ = (total_pages, written_pages, output_path);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl TranscriptProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn TranscriptProgressCallback>;
