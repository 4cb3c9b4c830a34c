//! Recursive character text splitter.
//!
//! Splits on the coarsest separator present (`"\n\n"`, then `"\n"`, `" "`,
//! and finally individual characters), keeps each separator attached to
//! the piece that follows it, and merges pieces into windows of at most
//! `chunk_size` characters that overlap by up to `chunk_overlap`.
//! Lengths are counted in characters, not bytes.

use std::collections::VecDeque;
use tracing::warn;

use crate::constants::indexing::{CHUNK_OVERLAP, CHUNK_SIZE, SEPARATORS};

/// A window of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Path of the originating file, relative to the indexed root
    pub source: String,
    /// Position of this chunk within its file
    pub ordinal: usize,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(CHUNK_SIZE, CHUNK_OVERLAP)
    }
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
            separators: SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Split one file's text into chunks tagged with `source`
    pub fn split_document(&self, source: &str, text: &str) -> Vec<Chunk> {
        self.split_text(text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, content)| Chunk {
                source: source.to_string(),
                ordinal,
                content,
            })
            .collect()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // First separator present in the text; "" always matches
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep.as_str()))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).map(String::as_str).unwrap_or("");
        let finer = separators.get(position + 1..).unwrap_or(&[]);

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }

            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }
        chunks
    }

    /// Greedily pack pieces into windows, carrying a tail of up to
    /// `chunk_overlap` characters into the next window.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, self.chunk_size
                    );
                }
                if let Some(chunk) = join(&window) {
                    out.push(chunk);
                }

                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }

            window.push_back(piece);
            total += len;
        }

        if let Some(chunk) = join(&window) {
            out.push(chunk);
        }
        out
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Concatenate and trim; whitespace-only windows produce nothing
fn join(window: &VecDeque<&str>) -> Option<String> {
    let text: String = window.iter().copied().collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Split so that every piece after the first starts with `separator`.
/// An empty separator splits into characters.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        assert_eq!(splitter.split_text("fn main() {}\n"), vec!["fn main() {}"]);
    }

    #[test]
    fn test_empty_and_whitespace_text() {
        let splitter = TextSplitter::default();
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text("  \n\n  ").is_empty());
    }

    #[test]
    fn test_separator_kept_with_following_piece() {
        assert_eq!(
            split_keeping_separator("a\n\nb\n\nc", "\n\n"),
            vec!["a", "\n\nb", "\n\nc"]
        );
        assert_eq!(split_keeping_separator("\n\n\n", "\n\n"), vec!["\n\n\n"]);
        assert_eq!(split_keeping_separator("héllo", ""), vec!["h", "é", "l", "l", "o"]);
    }

    #[test]
    fn test_paragraphs_packed_with_overlap() {
        let splitter = TextSplitter::new(10, 4);
        let chunks = splitter.split_text("aaa bbb ccc ddd eee");
        assert_eq!(chunks, vec!["aaa bbb", "bbb ccc", "ccc ddd", "ddd eee"]);
    }

    #[test]
    fn test_long_word_split_by_characters() {
        let splitter = TextSplitter::new(4, 1);
        let chunks = splitter.split_text("abcdefghij");
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
        assert_eq!(chunks.first().map(String::as_str), Some("abcd"));
        assert_eq!(chunks.get(1).map(String::as_str), Some("defg"));
    }

    #[test]
    fn test_document_ordinals() {
        let splitter = TextSplitter::new(12, 0);
        let chunks = splitter.split_document("src/lib.rs", "first para\n\nsecond para");
        let contents: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, vec!["first para", "second para"]);
        assert_eq!(chunks[0].ordinal, 0);
        assert_eq!(chunks[1].ordinal, 1);
        assert!(chunks.iter().all(|c| c.source == "src/lib.rs"));
    }

    #[test]
    fn test_piece_at_chunk_size_is_split_further() {
        // Only pieces strictly shorter than chunk_size are kept whole; the
        // separator it carries pushes "\n\nsecond para" past the limit
        let chunks = TextSplitter::new(10, 0).split_text("first para\n\nsecond para");
        assert_eq!(chunks, vec!["first para", "second", "para"]);
    }

    proptest! {
        #[test]
        fn prop_chunks_bounded_and_nonempty(
            text in "[a-z \\n]{0,400}",
            size in 5usize..60,
            overlap in 0usize..5,
        ) {
            let splitter = TextSplitter::new(size, overlap);
            for chunk in splitter.split_text(&text) {
                prop_assert!(!chunk.trim().is_empty());
                prop_assert!(chunk.chars().count() <= size);
                prop_assert_eq!(chunk.trim(), chunk.as_str());
            }
        }

        #[test]
        fn prop_every_word_survives(words in proptest::collection::vec("[a-z]{1,6}", 0..40)) {
            let text = words.join(" ");
            let chunks = TextSplitter::new(20, 5).split_text(&text);
            for word in &words {
                prop_assert!(chunks.iter().any(|c| c.contains(word.as_str())));
            }
        }
    }
}
