//! Per-page extraction: pull raw text from a [`PageSource`] and normalise it.
//!
//! A page with no text (absent or empty) is not an error. It is logged,
//! reported to the progress callback, and recorded as a [`PageResult`] with
//! `text: None` so the assembler leaves it out. Any other page is normalised
//! and kept, even when its cleaned text comes out empty.

use crate::config::ExtractionConfig;
use crate::document::PageSource;
use crate::error::Pdf2TxtError;
use crate::output::PageResult;
use crate::pipeline::normalize::normalize_with_policy;
use tracing::{debug, warn};

/// Extract and normalise the pages at the given 0-based `indices`, in order.
///
/// Fails only when the source cannot read a page at all.
pub fn extract_pages(
    source: &dyn PageSource,
    indices: &[usize],
    config: &ExtractionConfig,
) -> Result<Vec<PageResult>, Pdf2TxtError> {
    let total_pages = source.page_count();
    let mut results = Vec::with_capacity(indices.len());

    for &idx in indices {
        let page_num = idx + 1;
        let raw = source.extract_text(idx)?;
        let raw_chars = raw.as_deref().map_or(0, |t| t.chars().count());

        let text = match raw {
            Some(raw) if !raw.is_empty() => {
                let cleaned = normalize_with_policy(&raw, config.whitespace);
                debug!(
                    "Page {}: {} raw chars → {} cleaned bytes",
                    page_num,
                    raw_chars,
                    cleaned.len()
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_extracted(page_num, total_pages, cleaned.len());
                }
                Some(cleaned)
            }
            _ => {
                warn!("Page {} contains no extractable text", page_num);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_empty(page_num, total_pages);
                }
                None
            }
        };

        results.push(PageResult {
            page_num,
            text,
            raw_chars,
        });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WhitespacePolicy;
    use crate::document::InMemoryDocument;

    #[test]
    fn absent_and_empty_pages_have_no_text() {
        let doc = InMemoryDocument::new(vec![Some("first\npage".into()), None, Some(String::new())]);
        let pages = extract_pages(&doc, &[0, 1, 2], &ExtractionConfig::default()).unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].text.as_deref(), Some("first page"));
        assert!(pages[1..].iter().all(PageResult::is_empty));
    }

    #[test]
    fn whitespace_only_page_is_kept_with_empty_text() {
        let doc = InMemoryDocument::from_pages(["a", " \n\n \n", "b"]);
        let pages = extract_pages(&doc, &[0, 1, 2], &ExtractionConfig::default()).unwrap();

        assert_eq!(pages[1].text.as_deref(), Some(""));
        assert_eq!(pages[1].raw_chars, 5);
        assert!(pages.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn only_requested_indices_are_read() {
        let doc = InMemoryDocument::from_pages(["a", "b", "c"]);
        let pages = extract_pages(&doc, &[2], &ExtractionConfig::default()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_num, 3);
        assert_eq!(pages[0].text.as_deref(), Some("c"));
    }

    #[test]
    fn whitespace_policy_is_applied() {
        let doc = InMemoryDocument::from_pages(["a\r\n\r\nb"]);
        let config = ExtractionConfig::builder()
            .whitespace(WhitespacePolicy::Extended)
            .build()
            .unwrap();
        let pages = extract_pages(&doc, &[0], &config).unwrap();
        assert_eq!(pages[0].text.as_deref(), Some("a\n\nb"));
    }

    #[test]
    fn unreadable_page_propagates() {
        let doc = InMemoryDocument::from_pages(["a"]);
        assert!(extract_pages(&doc, &[0, 5], &ExtractionConfig::default()).is_err());
    }
}
