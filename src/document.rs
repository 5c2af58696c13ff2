//! The PDF text capability the pipeline depends on.
//!
//! The pipeline only needs two things from a document: how many pages it has,
//! and the raw text of each page (or a signal that there is none). That seam
//! is [`PageSource`]. [`PdfiumDocument`] implements it on top of
//! `pdfium-render`; [`InMemoryDocument`] implements it over plain strings for
//! tests and for callers that already have page text.

use crate::error::Pdf2TxtError;
use crate::output::DocumentMetadata;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An ordered, indexable collection of pages with extractable text.
pub trait PageSource {
    /// Number of pages; stable for the lifetime of the source.
    fn page_count(&self) -> usize;

    /// Raw text of the page at 0-based `index`.
    ///
    /// `Ok(None)` means the page has no text. `Err` is reserved for a page
    /// that could not be read at all.
    fn extract_text(&self, index: usize) -> Result<Option<String>, Pdf2TxtError>;
}

// ── pdfium ───────────────────────────────────────────────────────────────────

/// A PDF opened through pdfium.
pub struct PdfiumDocument<'a> {
    path: PathBuf,
    document: PdfDocument<'a>,
}

impl<'a> PdfiumDocument<'a> {
    /// Open `path`, mapping pdfium load failures onto [`Pdf2TxtError`].
    pub fn open(
        pdfium: &'a Pdfium,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Self, Pdf2TxtError> {
        let document = pdfium.load_pdf_from_file(path, password).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    Pdf2TxtError::WrongPassword {
                        path: path.to_path_buf(),
                    }
                } else {
                    Pdf2TxtError::PasswordRequired {
                        path: path.to_path_buf(),
                    }
                }
            } else {
                Pdf2TxtError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        info!(
            "PDF loaded: {} ({} pages)",
            path.display(),
            document.pages().len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Information-dictionary fields, page count, and PDF version.
    pub fn metadata(&self) -> DocumentMetadata {
        let metadata = self.document.metadata();
        let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
            metadata
                .get(tag)
                .map(|t| t.value().to_string())
                .filter(|v| !v.is_empty())
        };

        DocumentMetadata {
            title: get_meta(PdfDocumentMetadataTagType::Title),
            author: get_meta(PdfDocumentMetadataTagType::Author),
            subject: get_meta(PdfDocumentMetadataTagType::Subject),
            creator: get_meta(PdfDocumentMetadataTagType::Creator),
            producer: get_meta(PdfDocumentMetadataTagType::Producer),
            creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
            modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
            page_count: self.page_count(),
            pdf_version: format!("{:?}", self.document.version()),
        }
    }
}

impl PageSource for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn extract_text(&self, index: usize) -> Result<Option<String>, Pdf2TxtError> {
        let page_err = |detail: String| Pdf2TxtError::ExtractionFailed {
            page: index + 1,
            detail,
        };

        let page_index =
            PdfPageIndex::try_from(index).map_err(|e| page_err(format!("index: {e}")))?;
        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| page_err(format!("{:?}", e)))?;
        let text = page
            .text()
            .map_err(|e| page_err(format!("{:?}", e)))?
            .all();

        debug!("Page {}: {} raw chars", index + 1, text.chars().count());

        if text.is_empty() {
            return Ok(None);
        }
        // pdfium separates lines with CRLF; the normaliser works on LF.
        Ok(Some(text.replace("\r\n", "\n").replace('\r', "\n")))
    }
}

// ── In-memory ────────────────────────────────────────────────────────────────

/// Page text held in memory; `None` entries are pages with no text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryDocument {
    pages: Vec<Option<String>>,
}

impl InMemoryDocument {
    pub fn new(pages: Vec<Option<String>>) -> Self {
        Self { pages }
    }

    /// Every page has text; an empty string still counts as "no text".
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages.into_iter().map(|p| Some(p.into())).collect(),
        }
    }
}

impl PageSource for InMemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn extract_text(&self, index: usize) -> Result<Option<String>, Pdf2TxtError> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(Pdf2TxtError::PageOutOfRange {
                page: index + 1,
                total: self.pages.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The loaded document borrows the password for as long as it borrows
    // pdfium, so a password owned by the caller's config must be accepted.
    #[allow(dead_code)]
    fn open_with_config_password<'a>(
        pdfium: &'a Pdfium,
        path: &Path,
        password: &'a Option<String>,
    ) -> Result<usize, Pdf2TxtError> {
        let doc = PdfiumDocument::open(pdfium, path, password.as_deref())?;
        Ok(doc.page_count())
    }

    #[test]
    fn in_memory_reports_pages_in_order() {
        let doc = InMemoryDocument::new(vec![Some("one".into()), None, Some("three".into())]);
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.extract_text(0).unwrap().as_deref(), Some("one"));
        assert_eq!(doc.extract_text(1).unwrap(), None);
        assert_eq!(doc.extract_text(2).unwrap().as_deref(), Some("three"));
    }

    #[test]
    fn in_memory_out_of_range_is_an_error() {
        let doc = InMemoryDocument::from_pages(["only"]);
        let err = doc.extract_text(1).unwrap_err();
        assert!(matches!(err, Pdf2TxtError::PageOutOfRange { page: 2, total: 1 }));
    }

    #[test]
    fn page_source_is_object_safe() {
        let doc = InMemoryDocument::from_pages(["a", "b"]);
        let source: &dyn PageSource = &doc;
        assert_eq!(source.page_count(), 2);
    }
}
