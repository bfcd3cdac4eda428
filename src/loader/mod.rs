#[cfg(test)]
mod tests;

pub mod splitter;

use std::fs;
use tracing::{debug, warn};

use crate::config::SplitterConfig;
use splitter::TextSplitter;

/// Heading delimiter used to break a markdown file into sections before
/// size-based splitting.
const SECTION_DELIMITER: &str = "# ";

/// A unit of text produced by the loader, immutable once created. Only its
/// text and metadata survive past indexing; the chunk itself is discarded
/// after it has been embedded and stored.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    pub content: String,
    /// Path of the originating file.
    pub source: String,
    /// 0-based index of the heading section this chunk came from.
    pub section_index: usize,
}

/// Loads markdown files by glob pattern and splits them into overlapping
/// chunks with source metadata attached.
#[derive(Debug, Clone)]
pub struct MarkdownLoader {
    splitter: TextSplitter,
}

impl MarkdownLoader {
    #[inline]
    pub fn new(config: &SplitterConfig) -> Self {
        Self {
            splitter: TextSplitter::new(config),
        }
    }

    /// Load every file matching the given glob patterns and split it into
    /// chunks. A file that fails to read is logged and skipped; it never
    /// aborts the batch. Patterns matching zero files are silently skipped,
    /// so an empty match list yields an empty chunk list rather than an
    /// error.
    #[inline]
    pub fn load_documents(&self, patterns: &[String]) -> Vec<DocumentChunk> {
        let mut chunks = Vec::new();

        for pattern in patterns {
            let paths = match glob::glob(pattern) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!("Skipping invalid glob pattern {:?}: {}", pattern, e);
                    continue;
                }
            };

            for entry in paths {
                let path = match entry {
                    Ok(path) => path,
                    Err(e) => {
                        warn!("Skipping unreadable glob entry: {}", e);
                        continue;
                    }
                };

                let content = match fs::read_to_string(&path) {
                    Ok(content) => content,
                    Err(e) => {
                        warn!("Failed to load file {}: {}", path.display(), e);
                        continue;
                    }
                };

                let source = path.display().to_string();
                let file_chunks = self.split_file(&content, &source);
                debug!("Loaded {} chunks from {}", file_chunks.len(), source);
                chunks.extend(file_chunks);
            }
        }

        chunks
    }

    /// Split one file's content on the heading delimiter, then size-split
    /// each non-empty section.
    fn split_file(&self, content: &str, source: &str) -> Vec<DocumentChunk> {
        let mut chunks = Vec::new();

        for (section_index, section) in content.split(SECTION_DELIMITER).enumerate() {
            if section.trim().is_empty() {
                continue;
            }

            for piece in self.splitter.split_text(section) {
                chunks.push(DocumentChunk {
                    content: piece,
                    source: source.to_string(),
                    section_index,
                });
            }
        }

        chunks
    }
}
