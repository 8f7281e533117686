//! Inline markdown tokenizer

use std::sync::OnceLock;

use regex::{Captures, Regex};
use stagecraft_core::RichTextSpan;

static INLINE_PATTERN: OnceLock<Regex> = OnceLock::new();

// Alternation order breaks ties at the same offset: `**` is tried before `*`.
fn inline_pattern() -> &'static Regex {
    INLINE_PATTERN.get_or_init(|| {
        Regex::new(r"\*\*(.+?)\*\*|\*(.+?)\*|`([^`]+)`|\[([^\]]+)\]\(([^)\s]+)\)")
            .expect("Invalid inline markdown regex pattern")
    })
}

/// Parse a single line or paragraph into annotated spans.
///
/// Matches are taken left to right, earliest first; nested or overlapping
/// markup is not interpreted (the inner text is kept verbatim). Text between
/// matches becomes plain spans.
pub fn parse_rich_text(text: &str) -> Vec<RichTextSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for caps in inline_pattern().captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };

        if whole.start() > cursor {
            spans.push(RichTextSpan::plain(&text[cursor..whole.start()]));
        }
        spans.push(span_from_captures(&caps));
        cursor = whole.end();
    }

    if cursor < text.len() {
        spans.push(RichTextSpan::plain(&text[cursor..]));
    }

    spans
}

fn span_from_captures(caps: &Captures<'_>) -> RichTextSpan {
    if let Some(m) = caps.get(1) {
        RichTextSpan::bold(m.as_str())
    } else if let Some(m) = caps.get(2) {
        RichTextSpan::italic(m.as_str())
    } else if let Some(m) = caps.get(3) {
        RichTextSpan::code(m.as_str())
    } else {
        let label = caps.get(4).map_or("", |m| m.as_str());
        let url = caps.get(5).map_or("", |m| m.as_str());
        RichTextSpan::link(label, url)
    }
}
