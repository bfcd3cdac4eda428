
use std::collections::VecDeque;
use tracing::warn;

use crate::config::SplitterConfig;

/// Separator priority for recursive splitting: paragraph break, line break,
/// heading marker, space, and a character-level fallback.
pub const SEPARATORS: [&str; 5] = ["\n\n", "\n", "# ", " ", ""];

/// Splits text into chunks of at most `chunk_size` characters, carrying
/// `chunk_overlap` characters between consecutive chunks.
///
/// The splitter walks the separator list top-down: text is split on the
/// first separator it contains, pieces that still exceed the chunk size are
/// re-split with the remaining separators, and sibling pieces are greedily
/// merged back together up to the size limit. Lengths are counted in
/// characters, not bytes.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    #[inline]
    pub fn new(config: &SplitterConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }

    #[inline]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let Some(pos) = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
        else {
            // No separator applies; the text is a single unsplittable piece.
            return if text.is_empty() {
                Vec::new()
            } else {
                vec![text.to_string()]
            };
        };
        let separator = separators[pos];
        let remaining = &separators[pos + 1..];

        let splits: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator).map(str::to_string).collect()
        };

        let mut chunks = Vec::new();
        let mut good: Vec<String> = Vec::new();
        for piece in splits {
            if char_len(&piece) < self.chunk_size {
                good.push(piece);
            } else {
                if !good.is_empty() {
                    chunks.extend(self.merge_splits(std::mem::take(&mut good), separator));
                }
                if remaining.is_empty() {
                    chunks.push(piece);
                } else {
                    chunks.extend(self.split_with(&piece, remaining));
                }
            }
        }
        if !good.is_empty() {
            chunks.extend(self.merge_splits(good, separator));
        }
        chunks
    }

    /// Greedily merge sibling pieces into chunks, keeping a window of
    /// trailing pieces within the overlap budget for the next chunk.
    fn merge_splits(&self, splits: Vec<String>, separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut docs = Vec::new();
        let mut current: VecDeque<String> = VecDeque::new();
        let mut total = 0usize;

        for piece in splits {
            let len = char_len(&piece);
            let sep_cost = if current.is_empty() { 0 } else { sep_len };
            if total + len + sep_cost > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Produced a chunk of {} characters, above the requested size of {}",
                        total, self.chunk_size
                    );
                }
                if !current.is_empty() {
                    if let Some(doc) = join_pieces(&current, separator) {
                        docs.push(doc);
                    }
                    while total > self.chunk_overlap
                        || (total + len + if current.is_empty() { 0 } else { sep_len }
                            > self.chunk_size
                            && total > 0)
                    {
                        let Some(front) = current.pop_front() else {
                            break;
                        };
                        total -= char_len(&front) + if current.is_empty() { 0 } else { sep_len };
                    }
                }
            }
            total += len + if current.is_empty() { 0 } else { sep_len };
            current.push_back(piece);
        }
        if let Some(doc) = join_pieces(&current, separator) {
            docs.push(doc);
        }
        docs
    }
}

fn join_pieces(pieces: &VecDeque<String>, separator: &str) -> Option<String> {
    let joined = pieces
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
