//! Length-bounded text chunking

use tracing::debug;

/// Splits text into chunks no longer than a maximum number of characters.
///
/// Each cut happens at the last whitespace within the limit, unless that
/// whitespace falls in the first half of the window (or there is none), in
/// which case the text is hard-cut at the limit. Whitespace around every cut
/// is trimmed; no other character is ever dropped.
#[derive(Debug, Clone, Copy)]
pub struct ChunkSplitter {
    /// Maximum characters per chunk
    max_length: usize,
}

impl ChunkSplitter {
    /// Create a new ChunkSplitter. A zero limit is treated as one.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let max = self.max_length;
        let mut chunks = Vec::new();
        let mut remaining = text.trim();

        while !remaining.is_empty() {
            // Byte offset of the first character past the limit.
            let Some(limit) = remaining.char_indices().nth(max).map(|(i, _)| i) else {
                chunks.push(remaining.to_string());
                break;
            };

            let cut = Self::break_point(remaining, limit, max).unwrap_or(limit);
            let (head, tail) = remaining.split_at(cut);
            chunks.push(head.trim_end().to_string());
            remaining = tail.trim_start();
        }

        if chunks.len() > 1 {
            debug!(
                "Split {} chars into {} chunks (max {})",
                text.chars().count(),
                chunks.len(),
                max
            );
        }

        chunks
    }

    /// Byte offset of the last whitespace among the first `max + 1`
    /// characters, if it is not before `max / 2`.
    fn break_point(text: &str, limit: usize, max: usize) -> Option<usize> {
        let window_end = limit + text[limit..].chars().next().map_or(0, char::len_utf8);

        let (char_index, byte_index) = text[..window_end]
            .char_indices()
            .enumerate()
            .filter(|(_, (_, c))| c.is_whitespace())
            .map(|(ci, (bi, _))| (ci, bi))
            .last()?;

        if char_index < max / 2 {
            None
        } else {
            Some(byte_index)
        }
    }
}

/// Split `text` into chunks of at most `max_length` characters.
pub fn split(text: &str, max_length: usize) -> Vec<String> {
    ChunkSplitter::new(max_length).split(text)
}
