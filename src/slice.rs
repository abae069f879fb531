use std::{collections::HashSet, fmt};

use crate::{dimension::DimensionId, expr::Strategy};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SliceId(pub i32);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub i32);

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stored boundary of one dimension's contribution to a chunk: `[range_start, range_end)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Slice {
    pub id: SliceId,
    pub dimension: DimensionId,
    pub range_start: i64,
    pub range_end: i64,
}

impl Slice {
    pub fn new(id: SliceId, dimension: DimensionId, range_start: i64, range_end: i64) -> Self {
        Self {
            id,
            dimension,
            range_start,
            range_end,
        }
    }

    /// True if some value in the slice satisfies both bounds.
    ///
    /// The upper bound constrains the slice start and the lower bound its
    /// last contained value (`range_end - 1`). Absent bounds are unbounded.
    pub fn overlaps(&self, upper: Option<ScanBound>, lower: Option<ScanBound>) -> bool {
        if self.range_end <= self.range_start {
            return false;
        }
        let last = self.range_end - 1;
        let below_upper = upper.is_none_or(|b| b.strategy.holds(self.range_start, b.value));
        let above_lower = lower.is_none_or(|b| b.strategy.holds(last, b.value));
        below_upper && above_lower
    }

    pub fn contains(&self, value: i64) -> bool {
        self.range_start <= value && value < self.range_end
    }
}

/// One side of a slice scan: `value` and the comparison it was derived from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScanBound {
    pub strategy: Strategy,
    pub value: i64,
}

impl ScanBound {
    pub fn new(strategy: Strategy, value: i64) -> Self {
        Self { strategy, value }
    }
}

/// Slices of one dimension that may hold matching rows.
///
/// An empty set is absorbing: no chunk can match.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CandidateSliceSet {
    slices: Vec<Slice>,
    seen: HashSet<SliceId>,
}

impl CandidateSliceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slice unless one with the same id is already present.
    pub fn add_unique(&mut self, slice: Slice) -> bool {
        if self.seen.insert(slice.id) {
            self.slices.push(slice);
            true
        } else {
            false
        }
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn contains(&self, id: SliceId) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl FromIterator<Slice> for CandidateSliceSet {
    fn from_iter<T: IntoIterator<Item = Slice>>(iter: T) -> Self {
        let mut set = Self::new();
        for slice in iter {
            set.add_unique(slice);
        }
        set
    }
}
