//! Chunk exclusion for tables partitioned across range ("open") and hash
//! ("closed") dimensions.
//!
//! Given the top-level clauses of a query filter, [`HypertableRestrictInfo`]
//! works out which chunks could contain matching rows. The result is sound
//! (no chunk with a matching row is ever excluded) but not necessarily
//! minimal.

pub mod catalog;
pub mod classify;
mod compile;
pub mod dimension;
mod error;
mod expr;
mod options;
pub mod partitioning;
mod request;
pub mod restrict;
mod result;
pub mod slice;
pub mod time;

pub use catalog::{Catalog, ChunkLookup, MemoryCatalog, SliceScanner};
pub use classify::{
    BtreeOperatorFamily, ClassifiedClause, ClassifyContext, ConstantFolder, DimensionValues,
    LiteralFolder, OpFamilyMember, OperatorFamily, classify,
};
pub use compile::clauses_from_df_expr;
pub use dimension::{Dimension, DimensionId, DimensionKind, DimensionType, HyperSpace};
pub use error::{PruneError, Result};
pub use expr::{Clause, ClauseExpr, Strategy};
pub use options::{RestrictOptions, RestrictOptionsBuilder};
pub use partitioning::{HashPartitioning, PartitioningFunction};
pub use request::ExclusionRequest;
pub use restrict::{
    ClosedRestriction, DimensionRestriction, HypertableRestrictInfo, OpenRestriction, PartitionSet,
};
pub use result::ExclusionResult;
pub use slice::{CandidateSliceSet, ChunkId, ScanBound, Slice, SliceId};
