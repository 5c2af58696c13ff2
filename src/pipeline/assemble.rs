//! Transcript assembly: join kept pages with the configured separator.

use crate::config::PageSeparator;
use crate::output::PageResult;

/// Join every page that has text, in the order given.
///
/// Pages without text contribute nothing, not even an empty slot, so two
/// kept pages are always separated by exactly one separator. There is no
/// leading or trailing separator.
pub fn assemble_transcript(pages: &[PageResult], separator: &PageSeparator) -> String {
    let mut out = String::new();
    let kept = pages.iter().filter_map(|p| p.text.as_deref().map(|t| (p.page_num, t)));

    for (i, (page_num, text)) in kept.enumerate() {
        if i > 0 {
            out.push_str(&separator.render(page_num));
        }
        out.push_str(text);
    }

    out
}
