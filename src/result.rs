use crate::slice::ChunkId;

/// Outcome of chunk exclusion for one query.
///
/// The chunk list is sound, not minimal: every chunk that can hold a
/// matching row is present, and the executor still filters rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExclusionResult {
    chunks: Vec<ChunkId>,
    restriction_count: usize,
    clause_count: usize,
}

impl ExclusionResult {
    pub(crate) fn new(chunks: Vec<ChunkId>, restriction_count: usize, clause_count: usize) -> Self {
        Self {
            chunks,
            restriction_count,
            clause_count,
        }
    }

    /// Candidate chunks, sorted by id.
    pub fn chunks(&self) -> &[ChunkId] {
        &self.chunks
    }

    pub fn into_chunks(self) -> Vec<ChunkId> {
        self.chunks
    }

    /// Number of clauses that restricted a dimension
    pub fn restriction_count(&self) -> usize {
        self.restriction_count
    }

    /// Number of clauses considered
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// True if no clause restricted any dimension, i.e. the result is a full scan.
    pub fn is_full_scan(&self) -> bool {
        self.restriction_count == 0
    }
}
