//! # edgequake-pdf2txt
//!
//! Extract the text of a PDF into a clean, paginated plain-text transcript.
//!
//! Text pulled out of a PDF page by page carries a hard line break wherever
//! the renderer wrapped a line, and the only thing separating those from real
//! paragraph breaks is that paragraphs are followed by a blank line. This
//! crate joins wrapped lines back into prose, keeps paragraphs apart, and
//! writes every page into one UTF-8 file separated by `--- PAGE BREAK ---`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate path and %PDF magic bytes
//!  ├─ 2. Extract   per-page text via pdfium (pages without text are skipped)
//!  ├─ 3. Normalize join wrapped lines, keep paragraphs, collapse spaces
//!  ├─ 4. Assemble  join kept pages with the page separator
//!  ├─ 5. Chunk     optional size-bounded chunks for indexing
//!  └─ 6. Output    atomic write + completion report
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2txt::{run, ExtractionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stats = run("document.pdf", "document.txt", &ExtractionConfig::default())?;
//!     eprintln!("{} of {} pages had text", stats.written_pages, stats.total_pages);
//!     Ok(())
//! }
//! ```
//!
//! Any [`PageSource`] can stand in for a PDF, which is how the pipeline is
//! tested without pdfium:
//!
//! ```rust
//! use edgequake_pdf2txt::{transcribe, ExtractionConfig, InMemoryDocument};
//!
//! let doc = InMemoryDocument::new(vec![Some("Hello\nworld.".into()), None]);
//! let out = transcribe(&doc, &ExtractionConfig::default()).unwrap();
//! assert_eq!(out.text, "Hello world.");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2txt` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chunk;
pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chunk::{chunk_pages, ChunkConfig, SectionKind, TextChunk};
pub use config::{
    ExtractionConfig, ExtractionConfigBuilder, PageSelection, PageSeparator, WhitespacePolicy,
    PAGE_BREAK,
};
pub use convert::{
    convert, inspect, run, run_with_chunks, transcribe, transcribe_to_file,
    transcribe_with_chunks,
};
pub use document::{InMemoryDocument, PageSource, PdfiumDocument};
pub use error::Pdf2TxtError;
pub use output::{DocumentMetadata, PageResult, TranscriptOutput, TranscriptStats};
pub use pipeline::normalize::{normalize_page_text, normalize_with_policy};
pub use progress::{NoopProgressCallback, ProgressCallback, TranscriptProgressCallback};
