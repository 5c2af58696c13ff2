//! Configuration types for PDF-to-text transcription.
//!
//! Every knob lives in [`ExtractionConfig`], built through
//! [`ExtractionConfigBuilder`]. The defaults reproduce the plain behaviour:
//! all pages, the `--- PAGE BREAK ---` separator, and strict whitespace
//! handling.

use crate::chunk::ChunkConfig;
use crate::error::Pdf2TxtError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The literal separator placed between consecutive kept pages by default.
pub const PAGE_BREAK: &str = "\n\n--- PAGE BREAK ---\n\n";

/// Configuration for a transcription run.
///
/// # Example
/// ```rust
/// use edgequake_pdf2txt::{ExtractionConfig, PageSelection, WhitespacePolicy};
///
/// let config = ExtractionConfig::builder()
///     .pages(PageSelection::Range(1, 10))
///     .whitespace(WhitespacePolicy::Extended)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Default)]
pub struct ExtractionConfig {
    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Page selection. Default: all pages.
    ///
    /// Unselected pages are skipped without a warning; they still count
    /// towards the document's total page count.
    pub pages: PageSelection,

    /// Separator between consecutive kept pages. Default: [`PageSeparator::PageBreak`].
    pub page_separator: PageSeparator,

    /// Which whitespace the normaliser touches. Default: [`WhitespacePolicy::Strict`].
    pub whitespace: WhitespacePolicy,

    /// Split the transcript into indexing chunks as well. Default: off.
    pub chunking: Option<ChunkConfig>,

    /// Receives per-page and completion events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pages", &self.pages)
            .field("page_separator", &self.page_separator)
            .field("whitespace", &self.whitespace)
            .field("chunking", &self.chunking)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn TranscriptProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn whitespace(mut self, policy: WhitespacePolicy) -> Self {
        self.config.whitespace = policy;
        self
    }

    pub fn chunking(mut self, chunks: ChunkConfig) -> Self {
        self.config.chunking = Some(chunks);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Pdf2TxtError> {
        self.config.pages.validate()?;
        if let Some(ref chunks) = self.config.chunking {
            chunks.validate()?;
        }
        if let PageSeparator::Custom(ref s) = self.config.page_separator {
            if s.trim().is_empty() {
                return Err(Pdf2TxtError::InvalidConfig(
                    "Custom page separator must contain visible text".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Which whitespace the normaliser is allowed to rewrite.
///
/// `Strict` only ever touches `\n` and U+0020. `Extended` first folds CR and
/// CRLF line endings into `\n` and turns tabs, NBSP, and the other Unicode
/// space separators into plain spaces, then runs the same rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WhitespacePolicy {
    #[default]
    Strict,
    Extended,
}

/// Specifies which pages of the PDF to transcribe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Every page (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// The first 1-indexed page this selection asks for (`0` for `All`).
    pub fn first_requested(&self) -> usize {
        match self {
            PageSelection::All => 0,
            PageSelection::Single(p) => *p,
            PageSelection::Range(start, _) => *start,
            PageSelection::Set(pages) => pages.iter().copied().min().unwrap_or(0),
        }
    }

    fn validate(&self) -> Result<(), Pdf2TxtError> {
        let invalid = |msg: String| Err(Pdf2TxtError::InvalidConfig(msg));
        match self {
            PageSelection::All => Ok(()),
            PageSelection::Single(0) => invalid("Pages are 1-indexed, minimum is 1".into()),
            PageSelection::Single(_) => Ok(()),
            PageSelection::Range(start, _) if *start == 0 => {
                invalid("Pages are 1-indexed, minimum is 1".into())
            }
            PageSelection::Range(start, end) if start > end => invalid(format!(
                "Invalid page range '{start}-{end}': start must be <= end"
            )),
            PageSelection::Range(..) => Ok(()),
            PageSelection::Set(pages) if pages.is_empty() => {
                invalid("Page set must name at least one page".into())
            }
            PageSelection::Set(pages) if pages.contains(&0) => {
                invalid("Pages are 1-indexed, minimum is 1".into())
            }
            PageSelection::Set(_) => Ok(()),
        }
    }
}

/// How to separate pages in the assembled transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// `"\n\n--- PAGE BREAK ---\n\n"` (default).
    #[default]
    PageBreak,
    /// A blank line only: `"\n\n"`.
    Blank,
    /// The 1-indexed number of the page that follows: `"\n\n--- PAGE N ---\n\n"`.
    Numbered,
    /// Custom line surrounded by blank lines.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator placed before page `page_num` (1-indexed).
    pub fn render(&self, page_num: usize) -> String {
        match self {
            PageSeparator::PageBreak => PAGE_BREAK.to_string(),
            PageSeparator::Blank => "\n\n".to_string(),
            PageSeparator::Numbered => format!("\n\n--- PAGE {} ---\n\n", page_num),
            PageSeparator::Custom(s) => format!("\n\n{}\n\n", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plain_behaviour() {
        let config = ExtractionConfig::default();
        assert_eq!(config.pages, PageSelection::All);
        assert_eq!(config.page_separator, PageSeparator::PageBreak);
        assert_eq!(config.whitespace, WhitespacePolicy::Strict);
        assert!(config.password.is_none());
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(3), vec![0, 1, 2]);
        assert_eq!(PageSelection::Single(2).to_indices(3), vec![1]);
        assert_eq!(PageSelection::Single(4).to_indices(3), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 9).to_indices(4), vec![1, 2, 3]);
        assert_eq!(
            PageSelection::Set(vec![3, 1, 3]).to_indices(5),
            vec![0, 2] // deduplicated and sorted
        );
    }

    #[test]
    fn separator_render() {
        assert_eq!(PageSeparator::PageBreak.render(2), "\n\n--- PAGE BREAK ---\n\n");
        assert_eq!(PageSeparator::Blank.render(2), "\n\n");
        assert_eq!(PageSeparator::Numbered.render(7), "\n\n--- PAGE 7 ---\n\n");
        assert_eq!(PageSeparator::Custom("***".into()).render(1), "\n\n***\n\n");
    }

    #[test]
    fn builder_rejects_bad_selections() {
        for bad in [
            PageSelection::Single(0),
            PageSelection::Range(0, 3),
            PageSelection::Range(5, 2),
            PageSelection::Set(vec![]),
            PageSelection::Set(vec![1, 0]),
        ] {
            let result = ExtractionConfig::builder().pages(bad.clone()).build();
            assert!(
                matches!(result, Err(Pdf2TxtError::InvalidConfig(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn builder_rejects_blank_custom_separator() {
        let result = ExtractionConfig::builder()
            .page_separator(PageSeparator::Custom("   ".into()))
            .build();
        assert!(matches!(result, Err(Pdf2TxtError::InvalidConfig(_))));
    }

    #[test]
    fn builder_validates_chunking() {
        let bad = ChunkConfig {
            max_chars: 100,
            overlap_chars: 100,
        };
        let result = ExtractionConfig::builder().chunking(bad).build();
        assert!(matches!(result, Err(Pdf2TxtError::InvalidConfig(_))));

        let config = ExtractionConfig::builder()
            .chunking(ChunkConfig::default())
            .build()
            .unwrap();
        assert_eq!(config.chunking, Some(ChunkConfig::default()));
    }

    #[test]
    fn debug_redacts_password() {
        let config = ExtractionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn first_requested_page() {
        assert_eq!(PageSelection::All.first_requested(), 0);
        assert_eq!(PageSelection::Range(4, 8).first_requested(), 4);
        assert_eq!(PageSelection::Set(vec![9, 2, 5]).first_requested(), 2);
    }
}
