//! Line-oriented markdown to block conversion

use stagecraft_core::{Block, HeadingLevel};
use tracing::debug;

use crate::chunker::ChunkSplitter;
use crate::rich_text::parse_rich_text;

/// Maximum characters of text in a single exported paragraph block.
pub const EXPORT_TEXT_LIMIT: usize = 1800;

/// Converts a markdown document into an ordered sequence of blocks.
///
/// Recognised line forms:
/// - `# `, `## `, `### ` headings
/// - `- ` / `* ` bullet items
/// - `1. ` numbered items
/// - blank lines, which end the current paragraph
///
/// Any other line is appended to the pending paragraph. Paragraph lines are
/// joined with a single space, and a paragraph longer than the export limit
/// is chunked into consecutive paragraph blocks before inline parsing.
#[derive(Debug, Clone, Copy)]
pub struct BlockConverter {
    splitter: ChunkSplitter,
}

impl BlockConverter {
    pub fn new(export_limit: usize) -> Self {
        Self {
            splitter: ChunkSplitter::new(export_limit),
        }
    }

    pub fn convert(&self, markdown: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();

        for raw_line in markdown.lines() {
            let line = raw_line.trim();

            if line.is_empty() {
                self.flush_paragraph(&mut paragraph, &mut blocks);
                continue;
            }

            if let Some((level, text)) = heading(line) {
                self.flush_paragraph(&mut paragraph, &mut blocks);
                blocks.push(Block::Heading {
                    level,
                    spans: parse_rich_text(text),
                });
            } else if let Some(text) = bullet_item(line) {
                self.flush_paragraph(&mut paragraph, &mut blocks);
                blocks.push(Block::BulletItem {
                    spans: parse_rich_text(text),
                });
            } else if let Some(text) = numbered_item(line) {
                self.flush_paragraph(&mut paragraph, &mut blocks);
                blocks.push(Block::NumberedItem {
                    spans: parse_rich_text(text),
                });
            } else {
                paragraph.push(line);
            }
        }

        self.flush_paragraph(&mut paragraph, &mut blocks);

        debug!("Converted markdown into {} blocks", blocks.len());
        blocks
    }

    fn flush_paragraph(&self, pending: &mut Vec<&str>, blocks: &mut Vec<Block>) {
        if pending.is_empty() {
            return;
        }

        let text = pending.join(" ");
        pending.clear();

        if text.chars().count() > self.splitter.max_length() {
            for chunk in self.splitter.split(&text) {
                blocks.push(Block::Paragraph {
                    spans: parse_rich_text(&chunk),
                });
            }
        } else {
            blocks.push(Block::Paragraph {
                spans: parse_rich_text(&text),
            });
        }
    }
}

impl Default for BlockConverter {
    fn default() -> Self {
        Self::new(EXPORT_TEXT_LIMIT)
    }
}

fn heading(line: &str) -> Option<(HeadingLevel, &str)> {
    if let Some(text) = line.strip_prefix("### ") {
        Some((HeadingLevel::H3, text.trim()))
    } else if let Some(text) = line.strip_prefix("## ") {
        Some((HeadingLevel::H2, text.trim()))
    } else {
        line.strip_prefix("# ")
            .map(|text| (HeadingLevel::H1, text.trim()))
    }
}

fn bullet_item(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('-').or_else(|| line.strip_prefix('*'))?;
    rest.starts_with(char::is_whitespace)
        .then(|| rest.trim_start())
}

fn numbered_item(line: &str) -> Option<&str> {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    rest.starts_with(char::is_whitespace)
        .then(|| rest.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagecraft_core::RichTextSpan;

    fn convert(markdown: &str) -> Vec<Block> {
        BlockConverter::default().convert(markdown)
    }

    #[test]
    fn test_heading_then_paragraph() {
        let blocks = convert("# Title\n\nSome *text* here.");
        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: HeadingLevel::H1,
                    spans: vec![RichTextSpan::plain("Title")],
                },
                Block::Paragraph {
                    spans: vec![
                        RichTextSpan::plain("Some "),
                        RichTextSpan::italic("text"),
                        RichTextSpan::plain(" here."),
                    ],
                },
            ]
        );
    }

    #[test]
    fn test_heading_levels() {
        let blocks = convert("# One\n## Two\n### Three\n#### Four");
        let levels: Vec<Option<HeadingLevel>> = blocks
            .iter()
            .map(|b| match b {
                Block::Heading { level, .. } => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(
            levels,
            vec![
                Some(HeadingLevel::H1),
                Some(HeadingLevel::H2),
                Some(HeadingLevel::H3),
                None
            ]
        );
        assert_eq!(blocks[3].plain_text(), "#### Four");
    }

    #[test]
    fn test_list_items_flush_paragraph() {
        let blocks = convert("Intro line\n- first\n* second\n1. one\n12. twelve\nafter");
        assert!(matches!(blocks[0], Block::Paragraph { .. }));
        assert!(matches!(blocks[1], Block::BulletItem { .. }));
        assert!(matches!(blocks[2], Block::BulletItem { .. }));
        assert!(matches!(blocks[3], Block::NumberedItem { .. }));
        assert!(matches!(blocks[4], Block::NumberedItem { .. }));
        assert!(matches!(blocks[5], Block::Paragraph { .. }));
        assert_eq!(blocks[4].plain_text(), "twelve");
    }

    #[test]
    fn test_bold_line_is_not_a_bullet() {
        let blocks = convert("**Owner:** Morgan");
        assert_eq!(
            blocks,
            vec![Block::Paragraph {
                spans: vec![RichTextSpan::bold("Owner:"), RichTextSpan::plain(" Morgan")],
            }]
        );
    }

    #[test]
    fn test_version_number_is_not_numbered_item() {
        let blocks = convert("2.0 release notes");
        assert!(matches!(blocks[0], Block::Paragraph { .. }));
    }

    #[test]
    fn test_paragraph_lines_joined_with_space() {
        let blocks = convert("first line\nsecond line\n\n\nthird");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].plain_text(), "first line second line");
        assert_eq!(blocks[1].plain_text(), "third");
    }

    #[test]
    fn test_empty_document() {
        assert!(convert("").is_empty());
        assert!(convert("\n\n   \n").is_empty());
    }

    #[test]
    fn test_long_paragraph_is_chunked_in_order() {
        let sentence = "The pipeline streams tokens and publishes blocks. ";
        let long = sentence.repeat(100);
        let blocks = convert(&format!("# Report\n\n{}\n\n- tail", long));

        let paragraphs: Vec<&Block> = blocks
            .iter()
            .filter(|b| matches!(b, Block::Paragraph { .. }))
            .collect();
        assert!(paragraphs.len() >= 3);
        assert!(paragraphs
            .iter()
            .all(|b| b.plain_text().chars().count() <= EXPORT_TEXT_LIMIT));

        assert!(matches!(blocks.first(), Some(Block::Heading { .. })));
        assert!(matches!(blocks.last(), Some(Block::BulletItem { .. })));

        let rejoined = paragraphs
            .iter()
            .map(|b| b.plain_text())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(rejoined, long.trim());
    }

    #[test]
    fn test_plain_text_round_trip() {
        let markdown = "# Plan\n\nWe ship **fast** and *safely*.\nUse `cargo` daily.\n\n\
                        ## Steps\n- Read the [guide](https://example.com)\n1. Build\n2. Test";
        let blocks = convert(markdown);

        let rendered: Vec<String> = blocks.iter().map(Block::plain_text).collect();
        assert_eq!(
            rendered,
            vec![
                "Plan",
                "We ship fast and safely. Use cargo daily.",
                "Steps",
                "Read the guide",
                "Build",
                "Test",
            ]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let blocks = convert("- item");
        let json = serde_json::to_value(&blocks).unwrap();
        assert_eq!(json[0]["type"], "bullet_item");
        assert_eq!(json[0]["spans"][0]["text"], "item");
    }
}
