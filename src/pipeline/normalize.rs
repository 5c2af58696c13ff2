//! Text normalisation: repair line-wrapped prose extracted from a PDF page.
//!
//! A PDF renderer inserts hard line breaks both at real paragraph boundaries
//! and wherever a line happened to wrap. The only signal separating the two
//! is run length: a paragraph boundary is two or more consecutive `\n`, a
//! wrap point is a single `\n`.
//!
//! ## Rule Order
//!
//! 1. Split the text at every run of 2+ newlines (paragraph breaks)
//! 2. Inside each paragraph, turn each remaining `\n` (wrap break) into a space
//! 3. Rejoin paragraphs with exactly `\n\n`
//! 4. Collapse runs of 2+ spaces to one
//! 5. Trim the whole result
//!
//! Paragraph breaks must be identified before wrap breaks are removed,
//! otherwise the two kinds of newline are conflated. Steps 1–3 split and
//! rejoin instead of substituting a sentinel token, so no input text can be
//! mistaken for a paragraph marker.

use crate::config::WhitespacePolicy;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

static RE_SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

// Tab plus every Unicode space separator (Zs) except U+0020 itself.
static RE_EXOTIC_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t\p{Zs}&&[^ ]]").unwrap());

/// Clean one page of raw extracted text using [`WhitespacePolicy::Strict`].
///
/// Pure and infallible: any string is valid input.
///
/// ```rust
/// use edgequake_pdf2txt::normalize_page_text;
///
/// assert_eq!(
///     normalize_page_text("Hello\nworld.\n\nNext para."),
///     "Hello world.\n\nNext para."
/// );
/// ```
pub fn normalize_page_text(raw: &str) -> String {
    let s = join_wrapped_lines(raw);
    let s = collapse_spaces(&s);
    s.trim().to_string()
}

/// Clean one page of raw text under the given whitespace policy.
pub fn normalize_with_policy(raw: &str, policy: WhitespacePolicy) -> String {
    match policy {
        WhitespacePolicy::Strict => normalize_page_text(raw),
        WhitespacePolicy::Extended => normalize_page_text(&fold_exotic_whitespace(raw)),
    }
}

// ── Rules 1–3: paragraph vs. wrap breaks ─────────────────────────────────────

fn join_wrapped_lines(input: &str) -> String {
    RE_PARAGRAPH_BREAK
        .split(input)
        .map(|paragraph| paragraph.replace('\n', " "))
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ── Rule 4: collapse space runs ──────────────────────────────────────────────

fn collapse_spaces(input: &str) -> String {
    RE_SPACE_RUN.replace_all(input, " ").into_owned()
}

// ── Extended policy pre-pass ─────────────────────────────────────────────────

fn fold_exotic_whitespace(input: &str) -> String {
    let s = input.replace("\r\n", "\n").replace('\r', "\n");
    RE_EXOTIC_SPACE.replace_all(&s, " ").into_owned()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_and_paragraph_breaks() {
        assert_eq!(
            normalize_page_text("Hello\nworld.\n\nNext para."),
            "Hello world.\n\nNext para."
        );
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_page_text(""), "");
    }

    #[test]
    fn blank_lines_only_collapse_to_empty() {
        assert_eq!(normalize_page_text("\n"), "");
        assert_eq!(normalize_page_text("\n\n\n\n"), "");
        assert_eq!(normalize_page_text("  \n \n\n  "), "");
    }

    #[test]
    fn no_newlines_only_collapses_and_trims() {
        assert_eq!(normalize_page_text("  a   b  c "), "a b c");
        assert_eq!(normalize_page_text("plain"), "plain");
    }

    #[test]
    fn long_newline_runs_become_one_blank_line() {
        assert_eq!(normalize_page_text("one\n\n\n\n\ntwo"), "one\n\ntwo");
    }

    #[test]
    fn wrap_break_next_to_spaces_leaves_single_space() {
        assert_eq!(normalize_page_text("end of  \n  line"), "end of line");
    }

    #[test]
    fn spaces_around_paragraph_break_survive_inside() {
        // Only the outer edges are trimmed; the break itself is kept verbatim.
        assert_eq!(normalize_page_text("a \n\n b"), "a \n\n b");
    }

    #[test]
    fn strict_leaves_tabs_and_nbsp() {
        let raw = "col1\tcol2\u{00A0}\u{00A0}x";
        assert_eq!(normalize_page_text(raw), raw);
    }

    #[test]
    fn strict_does_not_treat_crlf_as_paragraph_break() {
        assert_eq!(normalize_page_text("a\r\n\r\nb"), "a\r \r b");
    }

    #[test]
    fn extended_folds_crlf_tabs_and_nbsp() {
        let raw = "Heading\r\n\r\nfirst\tline\r\nsecond\u{00A0}\u{00A0}line";
        assert_eq!(
            normalize_with_policy(raw, WhitespacePolicy::Extended),
            "Heading\n\nfirst line second line"
        );
    }

    #[test]
    fn normalisation_is_idempotent() {
        let samples = [
            "Hello\nworld.\n\nNext para.",
            "  lead\n\n\n\nmid \n wrap  \n\n tail  ",
            "a \n\n b",
            "\n\nx\ny\nz\n\n",
            "",
        ];
        for raw in samples {
            let once = normalize_page_text(raw);
            let twice = normalize_page_text(&once);
            assert_eq!(once, twice, "not idempotent for {raw:?}");
            assert_eq!(
                once.matches("\n\n").count(),
                twice.matches("\n\n").count(),
                "paragraph count changed for {raw:?}"
            );
        }
    }

    #[test]
    fn output_never_has_single_newlines_or_double_spaces() {
        let out = normalize_page_text("a\nb\n\nc  d\ne\n\n\nf");
        assert_eq!(out, "a b\n\nc d e\n\nf");
        assert!(!out.contains("  "));
        for chunk in out.split("\n\n") {
            assert!(!chunk.contains('\n'));
        }
    }
}
