//! Document conversion for stage deliverables
//!
//! Turns generated markdown into the block model published to the document
//! workspace.
//!
//! - **Rich text**: inline `**bold**`, `*italic*`, `` `code` `` and `[text](url)` spans
//! - **Blocks**: line-oriented headings, paragraphs, bullet and numbered items
//! - **Chunker**: whitespace-aware splitting of text that exceeds a size limit

pub mod blocks;
pub mod chunker;
pub mod rich_text;

pub use blocks::{BlockConverter, EXPORT_TEXT_LIMIT};
pub use chunker::ChunkSplitter;
pub use rich_text::parse_rich_text;

use stagecraft_core::Block;

/// Convert a markdown document with the default export limit.
pub fn markdown_to_blocks(markdown: &str) -> Vec<Block> {
    BlockConverter::default().convert(markdown)
}
