//! In-memory similarity index over embedded chunks

use crate::rag::splitter::DocumentChunk;

struct Entry {
    chunk: DocumentChunk,
    vector: Vec<f32>,
    norm: f32,
}

/// A chunk returned by [`VectorIndex::search`]
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a DocumentChunk,
    pub score: f32,
}

/// Flat index, exhaustive cosine search
#[derive(Default)]
pub struct VectorIndex {
    entries: Vec<Entry>,
    dimension: Option<usize>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk with its embedding.
    ///
    /// Vectors whose dimension differs from the first one added are rejected.
    pub fn insert(&mut self, chunk: DocumentChunk, vector: Vec<f32>) -> bool {
        match self.dimension {
            Some(dim) if dim != vector.len() => return false,
            None => self.dimension = Some(vector.len()),
            _ => {}
        }

        let norm = l2_norm(&vector);
        self.entries.push(Entry {
            chunk,
            vector,
            norm,
        });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// The `k` most similar chunks, best first
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk<'_>> {
        if k == 0 || self.dimension != Some(query.len()) {
            return Vec::new();
        }

        let query_norm = l2_norm(query);
        let mut scored: Vec<ScoredChunk<'_>> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: &entry.chunk,
                score: cosine(query, query_norm, &entry.vector, entry.norm),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.chunk.position.ordinal.cmp(&b.chunk.position.ordinal))
        });
        scored.truncate(k);
        scored
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    dot / (a_norm * b_norm)
}
