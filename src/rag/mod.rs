pub mod chain;
pub mod document;
pub mod index;
pub mod splitter;

pub use chain::{RetrievalResponder, RetrievalSettings};
pub use document::{Document, Page};
pub use index::{ScoredChunk, VectorIndex};
pub use splitter::{CharacterSplitter, ChunkPosition, DocumentChunk};
