//! Loading the reference document

use crate::{AwaazError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One page of extracted text, numbered from 1
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub text: String,
}

/// Text of a loaded document, split into pages
#[derive(Clone, Debug)]
pub struct Document {
    pub path: PathBuf,
    pub pages: Vec<Page>,
}

impl Document {
    /// Load a PDF, or a plain `.txt`/`.md` file as a single page
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AwaazError::DocumentError(format!(
                "Document not found: {}",
                path.display()
            )));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let pages = match extension.as_str() {
            "pdf" => {
                let text = pdf_extract::extract_text(path).map_err(|e| {
                    AwaazError::DocumentError(format!("Failed to read PDF {}: {}", path.display(), e))
                })?;
                split_pages(&text)
            }
            "txt" | "md" => {
                let text = std::fs::read_to_string(path)?;
                split_pages(&text)
            }
            other => {
                return Err(AwaazError::DocumentError(format!(
                    "Unsupported document type '{}': {}",
                    other,
                    path.display()
                )))
            }
        };

        let doc = Self {
            path: path.to_path_buf(),
            pages,
        };

        if doc.is_empty() {
            return Err(AwaazError::DocumentError(format!(
                "Document contains no text: {}",
                path.display()
            )));
        }

        info!(
            "Loaded {} ({} pages, {} chars)",
            path.display(),
            doc.pages.len(),
            doc.char_count()
        );
        Ok(doc)
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|p| p.text.trim().is_empty())
    }

    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }
}

/// Extracted PDF text marks page breaks with a form feed
fn split_pages(text: &str) -> Vec<Page> {
    let pages: Vec<Page> = text
        .split('\u{c}')
        .enumerate()
        .filter(|(_, t)| !t.trim().is_empty())
        .map(|(i, t)| Page {
            number: i + 1,
            text: t.to_string(),
        })
        .collect();
    debug!("Split document into {} non-empty pages", pages.len());
    pages
}
