//! Catalog seams used during chunk exclusion, plus an in-memory catalog.
//!
//! The pruning core never owns slice or chunk metadata. It asks a
//! [`SliceScanner`] for the slices a restriction could overlap and hands the
//! per-dimension candidates to a [`ChunkLookup`].

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::{
    dimension::{DimensionId, HyperSpace},
    error::{PruneError, Result},
    slice::{CandidateSliceSet, ChunkId, ScanBound, Slice, SliceId},
};

pub trait SliceScanner {
    /// Slices of `dimension` whose range overlaps the given bounds.
    ///
    /// `upper` restricts the slice start, `lower` the slice end. `None` for a
    /// bound means unbounded on that side.
    fn scan_slices(
        &self,
        dimension: DimensionId,
        upper: Option<ScanBound>,
        lower: Option<ScanBound>,
    ) -> Result<Vec<Slice>>;

    /// Every slice of `dimension`.
    fn all_slices(&self, dimension: DimensionId) -> Result<Vec<Slice>> {
        self.scan_slices(dimension, None, None)
    }
}

pub trait ChunkLookup {
    /// Chunks whose slice in every dimension is a member of that
    /// dimension's candidate set. `candidates` is in dimension order.
    fn find_chunks(&self, space: &HyperSpace, candidates: &[CandidateSliceSet])
    -> Result<Vec<ChunkId>>;
}

/// Everything chunk exclusion needs from the catalog.
pub trait Catalog: SliceScanner + ChunkLookup {}

impl<T: SliceScanner + ChunkLookup> Catalog for T {}

#[derive(Clone, Debug)]
struct ChunkEntry {
    id: ChunkId,
    slices: Vec<SliceId>,
}

#[derive(Debug, Default)]
struct CatalogState {
    slices: BTreeMap<DimensionId, Vec<Slice>>,
    chunks: Vec<ChunkEntry>,
}

/// Catalog held in memory.
///
/// Readers take a shared lock for the duration of one scan, so slices and
/// chunks can be added while other threads plan queries; a scan sees either
/// all or none of a concurrent insertion.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    state: RwLock<CatalogState>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dimension with no slices yet.
    pub fn add_dimension(&self, dimension: DimensionId) {
        self.state.write().slices.entry(dimension).or_default();
    }

    pub fn add_slice(&self, slice: Slice) {
        let mut state = self.state.write();
        let slices = state.slices.entry(slice.dimension).or_default();
        let pos = slices.partition_point(|s| s.range_start <= slice.range_start);
        slices.insert(pos, slice);
    }

    /// Register a chunk built from one slice per dimension, in dimension order.
    pub fn add_chunk(&self, id: ChunkId, slices: Vec<SliceId>) {
        self.state.write().chunks.push(ChunkEntry { id, slices });
    }

    pub fn num_chunks(&self) -> usize {
        self.state.read().chunks.len()
    }

    /// Every chunk id, sorted.
    pub fn all_chunks(&self) -> Vec<ChunkId> {
        let mut ids: Vec<_> = self.state.read().chunks.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids
    }
}

impl SliceScanner for MemoryCatalog {
    fn scan_slices(
        &self,
        dimension: DimensionId,
        upper: Option<ScanBound>,
        lower: Option<ScanBound>,
    ) -> Result<Vec<Slice>> {
        let state = self.state.read();
        let slices = state
            .slices
            .get(&dimension)
            .ok_or(PruneError::DimensionNotFound(dimension))?;

        Ok(slices
            .iter()
            .filter(|s| s.overlaps(upper, lower))
            .copied()
            .collect())
    }
}

impl ChunkLookup for MemoryCatalog {
    fn find_chunks(
        &self,
        space: &HyperSpace,
        candidates: &[CandidateSliceSet],
    ) -> Result<Vec<ChunkId>> {
        if candidates.len() != space.num_dimensions() {
            return Err(PruneError::ChunkLookup(format!(
                "expected {} candidate slice sets, got {}",
                space.num_dimensions(),
                candidates.len()
            )));
        }

        let state = self.state.read();
        let mut ids: Vec<ChunkId> = state
            .chunks
            .iter()
            .filter(|chunk| {
                chunk.slices.len() == candidates.len()
                    && chunk
                        .slices
                        .iter()
                        .zip(candidates)
                        .all(|(slice, set)| set.contains(*slice))
            })
            .map(|chunk| chunk.id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use arrow_schema::DataType;

    use super::*;
    use crate::{dimension::Dimension, expr::Strategy};

    fn time_catalog() -> MemoryCatalog {
        let catalog = MemoryCatalog::new();
        for (i, start) in [0i64, 100, 200, 300].into_iter().enumerate() {
            let id = i as i32 + 1;
            catalog.add_slice(Slice::new(SliceId(id), DimensionId(1), start, start + 100));
            catalog.add_chunk(ChunkId(id), vec![SliceId(id)]);
        }
        catalog
    }

    #[test]
    fn scan_filters_by_both_bounds() {
        let catalog = time_catalog();
        let slices = catalog
            .scan_slices(
                DimensionId(1),
                Some(ScanBound::new(Strategy::Lt, 200)),
                Some(ScanBound::new(Strategy::GtEq, 100)),
            )
            .unwrap();
        let ids: Vec<_> = slices.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SliceId(2)]);
    }

    #[test]
    fn unknown_dimension_is_an_error() {
        let catalog = time_catalog();
        assert!(matches!(
            catalog.all_slices(DimensionId(9)),
            Err(PruneError::DimensionNotFound(DimensionId(9)))
        ));
    }

    #[test]
    fn chunk_lookup_is_membership_join() {
        let catalog = time_catalog();
        let space = HyperSpace::new(
            1,
            vec![Dimension::open(DimensionId(1), "time", DataType::Int64)],
        );
        let set: CandidateSliceSet = catalog
            .all_slices(DimensionId(1))
            .unwrap()
            .into_iter()
            .filter(|s| s.range_start >= 200)
            .collect();
        assert_eq!(
            catalog.find_chunks(&space, &[set]).unwrap(),
            vec![ChunkId(3), ChunkId(4)]
        );
    }

    #[test]
    fn chunk_lookup_checks_dimension_count() {
        let catalog = time_catalog();
        let space = HyperSpace::new(1, vec![]);
        assert!(matches!(
            catalog.find_chunks(&space, &[CandidateSliceSet::new()]),
            Err(PruneError::ChunkLookup(_))
        ));
    }
}
