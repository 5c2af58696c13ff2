//! Transcription entry points.
//!
//! [`run`] is the whole program: validate the input, bind pdfium, open the
//! document, extract and clean every selected page, join the pages, and write
//! the transcript. The other functions expose the same pipeline in pieces:
//! [`transcribe`] and [`transcribe_to_file`] work on any [`PageSource`], and
//! [`convert`] returns the transcript without writing it. The `*_with_chunks`
//! variants also write the transcript's indexing chunks as JSON Lines.

use crate::chunk::{self, TextChunk};
use crate::config::{ExtractionConfig, PageSelection};
use crate::document::{PageSource, PdfiumDocument};
use crate::error::Pdf2TxtError;
use crate::output::{DocumentMetadata, TranscriptOutput, TranscriptStats};
use crate::pipeline::{assemble, extract, input, write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Transcribe the PDF at `input_path` into a text file at `output_path`.
///
/// # Errors
/// Returns `Err(Pdf2TxtError)` only for fatal errors:
/// - input missing, unreadable, not a PDF, corrupt, or password-protected
/// - pdfium could not be bound
/// - the output could not be written
///
/// Pages with no text are not errors; see [`crate::progress`].
pub fn run(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<TranscriptStats, Pdf2TxtError> {
    let output_path = output_path.as_ref();
    if output_path.as_os_str().is_empty() {
        return Err(Pdf2TxtError::InvalidConfig(
            "Output path must not be empty".into(),
        ));
    }

    let input_path = input::resolve_input(input_path)?;
    info!("Starting transcription: {}", input_path.display());

    let pdfium = pdfium_provision::bind_pdfium(None)?;
    let document = PdfiumDocument::open(&pdfium, &input_path, config.password.as_deref())?;
    transcribe_to_file(&document, output_path, config)
}

/// [`run`], and also write indexing chunks to `chunks_path` as JSON Lines.
///
/// Chunk sizes come from `config.chunking`, or the defaults when unset.
pub fn run_with_chunks(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    chunks_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<TranscriptStats, Pdf2TxtError> {
    let (output_path, chunks_path) = (output_path.as_ref(), chunks_path.as_ref());
    if output_path.as_os_str().is_empty() || chunks_path.as_os_str().is_empty() {
        return Err(Pdf2TxtError::InvalidConfig(
            "Output paths must not be empty".into(),
        ));
    }

    let input_path = input::resolve_input(input_path)?;
    info!("Starting transcription: {}", input_path.display());

    let pdfium = pdfium_provision::bind_pdfium(None)?;
    let document = PdfiumDocument::open(&pdfium, &input_path, config.password.as_deref())?;
    transcribe_with_chunks(&document, output_path, chunks_path, config)
}

/// Transcribe the PDF at `input_path` and return the result without writing it.
pub fn convert(
    input_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<TranscriptOutput, Pdf2TxtError> {
    let input_path = input::resolve_input(input_path)?;
    let pdfium = pdfium_provision::bind_pdfium(None)?;
    let document = PdfiumDocument::open(&pdfium, &input_path, config.password.as_deref())?;
    transcribe(&document, config)
}

/// Extract PDF metadata without touching page text.
pub fn inspect(
    input_path: impl AsRef<Path>,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2TxtError> {
    let input_path = input::resolve_input(input_path)?;
    let pdfium = pdfium_provision::bind_pdfium(None)?;
    let document = PdfiumDocument::open(&pdfium, &input_path, password)?;
    Ok(document.metadata())
}

/// Extract, clean, and join the selected pages of `source`.
pub fn transcribe(
    source: &dyn PageSource,
    config: &ExtractionConfig,
) -> Result<TranscriptOutput, Pdf2TxtError> {
    let output = assemble_output(source, config)?;

    info!(
        "Transcribed {}/{} pages",
        output.stats.written_pages, output.stats.total_pages
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_transcript_complete(output.stats.total_pages, output.stats.written_pages, None);
    }

    Ok(output)
}

/// [`transcribe`] and write the transcript to `output_path`, overwriting it.
pub fn transcribe_to_file(
    source: &dyn PageSource,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<TranscriptStats, Pdf2TxtError> {
    write_outputs(source, output_path.as_ref(), None, config)
}

/// [`transcribe_to_file`], and also write indexing chunks to `chunks_path`.
pub fn transcribe_with_chunks(
    source: &dyn PageSource,
    output_path: impl AsRef<Path>,
    chunks_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<TranscriptStats, Pdf2TxtError> {
    write_outputs(
        source,
        output_path.as_ref(),
        Some(chunks_path.as_ref()),
        config,
    )
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn write_outputs(
    source: &dyn PageSource,
    output_path: &Path,
    chunks_path: Option<&Path>,
    config: &ExtractionConfig,
) -> Result<TranscriptStats, Pdf2TxtError> {
    let start = Instant::now();

    let mut output = assemble_output(source, config)?;
    let chunks: Option<Vec<TextChunk>> = match chunks_path {
        Some(_) if config.chunking.is_some() => Some(std::mem::take(&mut output.chunks)),
        Some(_) => Some(chunk::chunk_pages(&output.pages, &Default::default())),
        None => None,
    };

    // Both files are complete in memory before either is replaced.
    write::write_transcript(output_path, &output.text)?;
    if let (Some(path), Some(chunks)) = (chunks_path, &chunks) {
        write::write_chunks(path, chunks)?;
        info!("Wrote {} chunks to '{}'", chunks.len(), path.display());
    }

    let stats = TranscriptStats {
        chunk_count: chunks.as_ref().map_or(output.stats.chunk_count, Vec::len),
        duration_ms: start.elapsed().as_millis() as u64,
        ..output.stats
    };

    // Reports the document's page count, not the number of pages written.
    info!(
        "Cleaned text from {} pages saved to '{}'",
        stats.total_pages,
        output_path.display()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_transcript_complete(stats.total_pages, stats.written_pages, Some(output_path));
    }

    Ok(stats)
}

fn assemble_output(
    source: &dyn PageSource,
    config: &ExtractionConfig,
) -> Result<TranscriptOutput, Pdf2TxtError> {
    let start = Instant::now();
    let total_pages = source.page_count();

    let indices = config.pages.to_indices(total_pages);
    if indices.is_empty() && config.pages != PageSelection::All {
        return Err(Pdf2TxtError::PageOutOfRange {
            page: config.pages.first_requested(),
            total: total_pages,
        });
    }
    debug!("Selected {} of {} pages", indices.len(), total_pages);

    if let Some(ref cb) = config.progress_callback {
        cb.on_transcript_start(total_pages, indices.len());
    }

    let pages = extract::extract_pages(source, &indices, config)?;
    let text = assemble::assemble_transcript(&pages, &config.page_separator);

    let chunks = config
        .chunking
        .as_ref()
        .map(|c| chunk::chunk_pages(&pages, c))
        .unwrap_or_default();

    let written_pages = pages.iter().filter(|p| !p.is_empty()).count();
    let stats = TranscriptStats {
        total_pages,
        selected_pages: indices.len(),
        written_pages,
        empty_pages: pages.len() - written_pages,
        raw_chars: pages.iter().map(|p| p.raw_chars).sum(),
        cleaned_chars: text.chars().count(),
        chunk_count: chunks.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    Ok(TranscriptOutput {
        text,
        pages,
        chunks,
        stats,
    })
}
