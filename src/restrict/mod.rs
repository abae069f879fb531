//! Per-dimension restrictions and their combination across a hypertable.

mod closed;
mod hypertable;
mod open;

pub use self::{
    closed::{ClosedRestriction, PartitionSet},
    hypertable::HypertableRestrictInfo,
    open::OpenRestriction,
};
use crate::{
    catalog::SliceScanner,
    classify::DimensionValues,
    dimension::{Dimension, DimensionId, DimensionKind},
    error::Result,
    expr::Strategy,
    options::RestrictOptions,
    slice::CandidateSliceSet,
};

/// Accumulated restriction of one dimension, by dimension kind.
#[derive(Clone, Debug)]
pub enum DimensionRestriction {
    Open(OpenRestriction),
    Closed(ClosedRestriction),
}

impl DimensionRestriction {
    /// Empty restriction matching the kind of `dimension`.
    pub fn for_dimension(dimension: &Dimension) -> Self {
        match dimension.kind() {
            DimensionKind::Open => DimensionRestriction::Open(OpenRestriction::new()),
            DimensionKind::Closed {
                num_slices,
                partitioning,
            } => DimensionRestriction::Closed(ClosedRestriction::new(
                partitioning.clone(),
                dimension.column_type().clone(),
                *num_slices,
            )),
        }
    }

    pub fn add(
        &mut self,
        strategy: Strategy,
        values: &DimensionValues,
        options: &RestrictOptions,
    ) -> Result<bool> {
        match self {
            DimensionRestriction::Open(open) => open.add(strategy, values, options),
            DimensionRestriction::Closed(closed) => closed.add(strategy, values, options),
        }
    }

    pub fn slices<S: SliceScanner + ?Sized>(
        &self,
        dimension: DimensionId,
        scanner: &S,
    ) -> Result<CandidateSliceSet> {
        match self {
            DimensionRestriction::Open(open) => open.slices(dimension, scanner),
            DimensionRestriction::Closed(closed) => closed.slices(dimension, scanner),
        }
    }

    pub fn as_open(&self) -> Option<&OpenRestriction> {
        match self {
            DimensionRestriction::Open(open) => Some(open),
            DimensionRestriction::Closed(_) => None,
        }
    }

    pub fn as_closed(&self) -> Option<&ClosedRestriction> {
        match self {
            DimensionRestriction::Closed(closed) => Some(closed),
            DimensionRestriction::Open(_) => None,
        }
    }
}
