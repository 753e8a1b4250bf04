//! Character-window splitting
//!
//! Text is cut on a separator, then pieces are greedily merged back
//! (joined by the separator) into chunks no longer than `chunk_size`.
//! When a chunk is emitted, leading pieces are dropped until what remains
//! fits within `chunk_overlap`; that remainder opens the next chunk.
//! All lengths are counted in chars.

use crate::rag::document::{Document, Page};
use tracing::{debug, warn};

/// Where a chunk came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkPosition {
    /// Ordinal across the whole document
    pub ordinal: usize,
    pub page: usize,
    /// Char offset of the chunk within its page
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentChunk {
    pub text: String,
    pub position: ChunkPosition,
}

#[derive(Clone, Debug)]
pub struct CharacterSplitter {
    separator: String,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for CharacterSplitter {
    fn default() -> Self {
        Self {
            separator: "\n\n".to_string(),
            chunk_size: 500,
            chunk_overlap: 100,
        }
    }
}

impl CharacterSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            ..Default::default()
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Split raw text into chunk strings
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = if self.separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(self.separator.as_str())
                .filter(|p| !p.is_empty())
                .collect()
        };
        self.merge(&pieces)
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let sep_len = self.separator.chars().count();
        let mut chunks = Vec::new();
        let mut current: Vec<(&str, usize)> = Vec::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = piece.chars().count();
            let joiner = if current.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total, self.chunk_size
                    );
                }
                if !current.is_empty() {
                    if let Some(chunk) = self.join(&current) {
                        chunks.push(chunk);
                    }
                    loop {
                        let joiner = if current.is_empty() { 0 } else { sep_len };
                        let too_long = total > 0 && total + len + joiner > self.chunk_size;
                        if total <= self.chunk_overlap && !too_long {
                            break;
                        }
                        if current.is_empty() {
                            break;
                        }
                        let (_, first_len) = current.remove(0);
                        let dropped_joiner = if current.is_empty() { 0 } else { sep_len };
                        total = total.saturating_sub(first_len + dropped_joiner);
                    }
                }
            }

            if !current.is_empty() {
                total += sep_len;
            }
            current.push((piece, len));
            total += len;
        }

        if let Some(chunk) = self.join(&current) {
            chunks.push(chunk);
        }
        chunks
    }

    fn join(&self, pieces: &[(&str, usize)]) -> Option<String> {
        let joined = pieces
            .iter()
            .map(|(p, _)| *p)
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Split every page of a document, recording where each chunk starts
    pub fn split_document(&self, document: &Document) -> Vec<DocumentChunk> {
        let mut chunks = Vec::new();
        for page in &document.pages {
            self.split_page(page, &mut chunks);
        }
        debug!(
            "Split {} pages into {} chunks",
            document.pages.len(),
            chunks.len()
        );
        chunks
    }

    fn split_page(&self, page: &Page, out: &mut Vec<DocumentChunk>) {
        let mut search_from = 0usize;
        for text in self.split_text(&page.text) {
            let byte_offset = match page.text[search_from..].find(&text) {
                Some(found) => search_from + found,
                None => page.text.find(&text).unwrap_or(0),
            };
            // next chunk starts strictly after this one
            search_from = page.text[byte_offset..]
                .chars()
                .next()
                .map(|c| byte_offset + c.len_utf8())
                .unwrap_or(byte_offset);

            out.push(DocumentChunk {
                position: ChunkPosition {
                    ordinal: out.len(),
                    page: page.number,
                    offset: page.text[..byte_offset].chars().count(),
                },
                text,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn small_pieces_merge_until_the_limit() {
        let splitter = CharacterSplitter::new(7, 3).with_separator(" ");
        let chunks = splitter.split_text("foo bar baz 123");
        assert_eq!(chunks, vec!["foo bar", "bar baz", "baz 123"]);
    }

    #[test]
    fn oversized_piece_becomes_its_own_chunk() {
        let splitter = CharacterSplitter::new(10, 0);
        let long = "ا".repeat(25);
        let text = format!("short\n\n{}\n\ntail", long);
        let chunks = splitter.split_text(&text);
        assert_eq!(chunks, vec!["short".to_string(), long, "tail".to_string()]);
    }

    #[test]
    fn lengths_are_counted_in_chars_not_bytes() {
        // 8 chars, 15 bytes
        let splitter = CharacterSplitter::new(9, 0).with_separator(" ");
        let chunks = splitter.split_text("کتاب قلم");
        assert_eq!(chunks, vec!["کتاب قلم"]);
    }

    #[test]
    fn empty_pieces_are_dropped() {
        let splitter = CharacterSplitter::default();
        let chunks = splitter.split_text("\n\n\n\nایک\n\n\n\nدو\n\n");
        assert_eq!(chunks, vec!["ایک\n\nدو"]);
    }

    #[test]
    fn default_window_respects_size_and_carries_overlap() {
        let paragraph = "ب".repeat(80);
        let text = vec![paragraph.as_str(); 10].join("\n\n");
        let chunks = CharacterSplitter::default().split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 500);
        }
        // the last paragraph of one chunk opens the next
        let first_tail = chunks[0].rsplit("\n\n").next().unwrap();
        assert!(chunks[1].starts_with(first_tail));
    }

    #[test]
    fn document_chunks_record_page_and_offset() {
        let document = Document {
            path: PathBuf::from("doc.txt"),
            pages: vec![
                Page {
                    number: 1,
                    text: "الف\n\nب".to_string(),
                },
                Page {
                    number: 2,
                    text: "ج".to_string(),
                },
            ],
        };
        let chunks = CharacterSplitter::new(3, 0).split_document(&document);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].text, "ب");
        assert_eq!(
            chunks[1].position,
            ChunkPosition {
                ordinal: 1,
                page: 1,
                offset: 5
            }
        );
        assert_eq!(chunks[2].position.page, 2);
        assert_eq!(chunks[2].position.ordinal, 2);
    }
}
