//! Split cleaned pages into size-bounded, section-tagged chunks for indexing.
//!
//! Chunks are built from the normaliser's paragraphs, never span a page, and
//! never exceed [`ChunkConfig::max_chars`] characters. Small paragraphs on
//! the same page and in the same section are packed together. A paragraph
//! that is too long on its own is cut at sentence ends (then at words, then
//! mid-word as a last resort), and each cut piece repeats the last words of
//! the piece before it.
//!
//! Section tags come from résumé-style headings (`EDUCATION`, `EXPERIENCE`,
//! `PROJECTS`, ...) at the start of a paragraph. A tag applies to every
//! following chunk until the next heading, across page boundaries.

use crate::error::Pdf2TxtError;
use crate::output::PageResult;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_CHARS: usize = 800;
pub const DEFAULT_OVERLAP_CHARS: usize = 50;

/// Lowercase headings are only trusted on paragraphs this short.
const SHORT_HEADING_CHARS: usize = 40;

const HEADING: &str = r"^(?:(?:PROFESSIONAL|RESEARCH|PROJECT|WORK)\s+)?(EDUCATION|EXPERIENCE|SKILLS|PROJECTS?|CERTIFICATIONS|AWARDS)\b";

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(HEADING).unwrap());

static RE_HEADING_ANY_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("(?i){HEADING}")).unwrap());

/// Sentence end: terminal punctuation followed by whitespace.
static RE_SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());

/// Chunk size limits, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Hard upper bound on a chunk's length. Default: 800.
    pub max_chars: usize,
    /// Words carried over from the previous piece of a split paragraph,
    /// up to this many characters. Default: 50.
    pub overlap_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            overlap_chars: DEFAULT_OVERLAP_CHARS,
        }
    }
}

impl ChunkConfig {
    pub fn validate(&self) -> Result<(), Pdf2TxtError> {
        if self.max_chars == 0 {
            return Err(Pdf2TxtError::InvalidConfig(
                "Chunk size must be at least 1 character".into(),
            ));
        }
        if self.overlap_chars >= self.max_chars {
            return Err(Pdf2TxtError::InvalidConfig(format!(
                "Chunk overlap ({}) must be smaller than the chunk size ({})",
                self.overlap_chars, self.max_chars
            )));
        }
        Ok(())
    }
}

/// The résumé section a chunk belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    #[default]
    General,
    Education,
    Experience,
    Project,
    Skills,
    Certifications,
    Awards,
}

/// One chunk of transcript text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// 0-based position among all chunks of the document.
    pub index: usize,
    pub total_chunks: usize,
    /// 1-indexed page the text came from.
    pub page_num: usize,
    pub section: SectionKind,
    pub text: String,
}

/// Chunk every page that has text, in order.
pub fn chunk_pages(pages: &[PageResult], config: &ChunkConfig) -> Vec<TextChunk> {
    let mut packer = Packer::new(config.max_chars);
    let mut section = SectionKind::General;

    for page in pages {
        let Some(text) = page.text.as_deref() else {
            continue;
        };

        for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            if let Some(kind) = section_heading(para) {
                if kind != section {
                    packer.flush();
                    section = kind;
                }
            }

            if char_len(para) <= config.max_chars {
                packer.push(page.page_num, section, para);
            } else {
                packer.flush();
                for piece in split_paragraph(para, config) {
                    packer.emit(page.page_num, section, piece);
                }
            }
        }
        packer.flush();
    }

    let mut chunks = packer.chunks;
    let total = chunks.len();
    for chunk in &mut chunks {
        chunk.total_chunks = total;
    }
    chunks
}

/// Section tag for a paragraph that opens with a known heading.
pub fn section_heading(para: &str) -> Option<SectionKind> {
    let caps = RE_HEADING.captures(para).or_else(|| {
        if char_len(para) <= SHORT_HEADING_CHARS {
            RE_HEADING_ANY_CASE.captures(para)
        } else {
            None
        }
    })?;

    let kind = match caps[1].to_ascii_uppercase().as_str() {
        "EDUCATION" => SectionKind::Education,
        "EXPERIENCE" => SectionKind::Experience,
        "SKILLS" => SectionKind::Skills,
        "PROJECT" | "PROJECTS" => SectionKind::Project,
        "CERTIFICATIONS" => SectionKind::Certifications,
        "AWARDS" => SectionKind::Awards,
        _ => return None,
    };
    Some(kind)
}

// ── Packing ──────────────────────────────────────────────────────────────────

struct Packer {
    max_chars: usize,
    chunks: Vec<TextChunk>,
    buf: String,
    buf_len: usize,
    page_num: usize,
    section: SectionKind,
}

impl Packer {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            chunks: Vec::new(),
            buf: String::new(),
            buf_len: 0,
            page_num: 0,
            section: SectionKind::General,
        }
    }

    /// Append a paragraph that fits on its own, starting a new chunk when
    /// the current one would overflow.
    fn push(&mut self, page_num: usize, section: SectionKind, para: &str) {
        let len = char_len(para);
        if !self.buf.is_empty() && self.buf_len + 2 + len > self.max_chars {
            self.flush();
        }

        if self.buf.is_empty() {
            self.page_num = page_num;
            self.section = section;
            self.buf_len = len;
        } else {
            self.buf.push_str("\n\n");
            self.buf_len += 2 + len;
        }
        self.buf.push_str(para);
    }

    fn flush(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buf);
        let (page_num, section) = (self.page_num, self.section);
        self.buf_len = 0;
        self.emit(page_num, section, text);
    }

    fn emit(&mut self, page_num: usize, section: SectionKind, text: String) {
        self.chunks.push(TextChunk {
            index: self.chunks.len(),
            total_chunks: 0,
            page_num,
            section,
            text,
        });
    }
}

// ── Splitting oversized paragraphs ───────────────────────────────────────────

fn split_paragraph(para: &str, config: &ChunkConfig) -> Vec<String> {
    let max = config.max_chars;
    let mut pieces = Vec::new();
    let mut buf = String::new();

    for sentence in split_sentences(para) {
        for unit in fit_words(sentence, max) {
            if buf.is_empty() {
                buf = unit;
                continue;
            }
            if char_len(&buf) + 1 + char_len(&unit) <= max {
                buf.push(' ');
                buf.push_str(&unit);
                continue;
            }

            let tail = overlap_tail(&buf, config.overlap_chars);
            pieces.push(std::mem::take(&mut buf));
            buf = if !tail.is_empty() && char_len(&tail) + 1 + char_len(&unit) <= max {
                format!("{tail} {unit}")
            } else {
                unit
            };
        }
    }

    if !buf.is_empty() {
        pieces.push(buf);
    }
    pieces
}

/// Split after `.`, `!` or `?` followed by whitespace, keeping the punctuation.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in RE_SENTENCE_END.find_iter(text) {
        sentences.push(text[start..m.start() + 1].trim());
        start = m.end();
    }
    sentences.push(text[start..].trim());
    sentences.retain(|s| !s.is_empty());
    sentences
}

/// A sentence as one unit if it fits, otherwise word-packed units of at
/// most `max` characters.
fn fit_words(sentence: &str, max: usize) -> Vec<String> {
    if char_len(sentence) <= max {
        return vec![sentence.to_string()];
    }

    let mut units = Vec::new();
    let mut buf = String::new();
    let mut buf_len = 0;
    for word in sentence.split_whitespace() {
        for part in hard_split(word, max) {
            let part_len = char_len(&part);
            if buf.is_empty() {
                buf = part;
                buf_len = part_len;
            } else if buf_len + 1 + part_len <= max {
                buf.push(' ');
                buf.push_str(&part);
                buf_len += 1 + part_len;
            } else {
                units.push(std::mem::replace(&mut buf, part));
                buf_len = part_len;
            }
        }
    }
    if !buf.is_empty() {
        units.push(buf);
    }
    units
}

fn hard_split(word: &str, max: usize) -> Vec<String> {
    if char_len(word) <= max {
        return vec![word.to_string()];
    }
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(max).map(|c| c.iter().collect()).collect()
}

/// The trailing words of `text` that fit in `budget` characters.
fn overlap_tail(text: &str, budget: usize) -> String {
    let mut words: Vec<&str> = Vec::new();
    let mut used = 0;
    for word in text.split_whitespace().rev() {
        let cost = char_len(word) + usize::from(!words.is_empty());
        if used + cost > budget {
            break;
        }
        used += cost;
        words.push(word);
    }
    words.reverse();
    words.join(" ")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page_num: usize, text: &str) -> PageResult {
        PageResult {
            page_num,
            text: Some(text.to_string()),
            raw_chars: text.len(),
        }
    }

    fn config(max_chars: usize, overlap_chars: usize) -> ChunkConfig {
        ChunkConfig {
            max_chars,
            overlap_chars,
        }
    }

    #[test]
    fn small_paragraphs_pack_into_one_chunk() {
        let pages = [page(1, "First para.\n\nSecond para.")];
        let chunks = chunk_pages(&pages, &ChunkConfig::default());

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "First para.\n\nSecond para.");
        assert_eq!(chunks[0].page_num, 1);
        assert_eq!(chunks[0].total_chunks, 1);
    }

    #[test]
    fn chunks_never_span_pages() {
        let pages = [
            page(1, "one"),
            PageResult {
                page_num: 2,
                text: None,
                raw_chars: 0,
            },
            page(3, "three"),
        ];
        let chunks = chunk_pages(&pages, &ChunkConfig::default());

        let located: Vec<(usize, &str)> =
            chunks.iter().map(|c| (c.page_num, c.text.as_str())).collect();
        assert_eq!(located, vec![(1, "one"), (3, "three")]);
        assert!(chunks.iter().enumerate().all(|(i, c)| c.index == i));
    }

    #[test]
    fn paragraphs_split_when_pack_overflows() {
        let pages = [page(1, "aaaa aaaa\n\nbbbb bbbb\n\ncccc")];
        let chunks = chunk_pages(&pages, &config(20, 0));

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["aaaa aaaa\n\nbbbb bbbb", "cccc"]);
    }

    #[test]
    fn long_paragraph_is_cut_at_sentences_with_overlap() {
        let para = "Alpha beta gamma. Delta epsilon zeta. Eta theta iota.";
        let chunks = chunk_pages(&[page(1, para)], &config(40, 12));

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Alpha beta gamma. Delta epsilon zeta.",
                "zeta. Eta theta iota."
            ]
        );
    }

    #[test]
    fn no_chunk_exceeds_the_limit() {
        let word = "x".repeat(25);
        let para = format!("{word} short words here. {} end.", "ab ".repeat(30));
        let chunks = chunk_pages(&[page(1, &para)], &config(10, 4));

        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 10, "too long: {:?}", chunk.text);
        }
        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert!(joined.contains("end."));
    }

    #[test]
    fn limit_counts_characters_not_bytes() {
        let chunks = chunk_pages(&[page(1, "ééééé ééééé")], &config(11, 0));
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn headings_tag_following_chunks() {
        let pages = [
            page(1, "Jane Doe\n\nEDUCATION B.Sc. Physics, 2019"),
            page(2, "More study.\n\nWORK EXPERIENCE Acme Corp 2020-2024\n\nSkills\n\nRust, Go"),
        ];
        let chunks = chunk_pages(&pages, &ChunkConfig::default());

        let tagged: Vec<(SectionKind, &str)> =
            chunks.iter().map(|c| (c.section, c.text.as_str())).collect();
        assert_eq!(
            tagged,
            vec![
                (SectionKind::General, "Jane Doe"),
                (SectionKind::Education, "EDUCATION B.Sc. Physics, 2019"),
                (SectionKind::Education, "More study."),
                (SectionKind::Experience, "WORK EXPERIENCE Acme Corp 2020-2024"),
                (SectionKind::Skills, "Skills\n\nRust, Go"),
            ]
        );
    }

    #[test]
    fn lowercase_heading_only_on_short_paragraphs() {
        assert_eq!(section_heading("Projects"), Some(SectionKind::Project));
        assert_eq!(
            section_heading("Experience shows that long prose paragraphs are not headings."),
            None
        );
        assert_eq!(section_heading("EXPERIENCEMENT"), None);
        assert_eq!(section_heading("AWARDS and honours"), Some(SectionKind::Awards));
    }

    #[test]
    fn validate_rejects_bad_limits() {
        assert!(config(0, 0).validate().is_err());
        assert!(config(50, 50).validate().is_err());
        assert!(ChunkConfig::default().validate().is_ok());
    }

    #[test]
    fn sentence_split_keeps_punctuation() {
        assert_eq!(
            split_sentences("One. Two!  Three? Four"),
            vec!["One.", "Two!", "Three?", "Four"]
        );
    }

    #[test]
    fn overlap_tail_respects_budget() {
        assert_eq!(overlap_tail("one two three", 9), "two three");
        assert_eq!(overlap_tail("one two three", 4), "");
        assert_eq!(overlap_tail("one two three", 0), "");
    }
}
