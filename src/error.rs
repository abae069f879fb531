use arrow_schema::DataType;
use datafusion_common::DataFusionError;
use thiserror::Error;

use crate::dimension::DimensionId;

/// Errors that abort a pruning attempt.
///
/// Unsupported clauses are never reported here: they are skipped by the
/// classifier, which only ever widens the candidate chunk set. Everything in
/// this enum means the caller must fall back to scanning all chunks (or fail
/// the query), never to a narrower result.
#[derive(Debug, Error)]
pub enum PruneError {
    /// The catalog carries a dimension kind this crate does not know
    #[error("unknown dimension kind: {code}")]
    UnknownDimensionKind {
        /// Raw kind code read from the catalog
        code: u8,
    },

    /// A closed dimension was declared without a partitioning function
    #[error("closed dimension '{column}' has no partitioning function")]
    MissingPartitioning {
        /// Partitioning column of the dimension
        column: String,
    },

    /// A literal on an open dimension has no internal time representation
    #[error("unsupported time type {data_type:?} for open dimension")]
    UnsupportedTimeType {
        /// Type of the offending value
        data_type: DataType,
    },

    /// The partitioning function cannot hash a value of this type
    #[error("cannot compute partition for value of type {data_type:?}")]
    UnsupportedPartitionValue {
        /// Type of the offending value
        data_type: DataType,
    },

    /// The right-hand side of an ANY/ALL comparison folded to a non-array
    #[error("expected array literal in ANY/ALL comparison, found {data_type:?}")]
    NotAnArray {
        /// Type the operand folded to
        data_type: DataType,
    },

    /// A catalog scan referenced a dimension it does not store
    #[error("dimension {0} not found in catalog")]
    DimensionNotFound(DimensionId),

    /// Failure reported by a partitioning function
    #[error("partitioning error: {0}")]
    Partitioning(String),

    /// Failure reported by a slice scan
    #[error("slice lookup error: {0}")]
    SliceLookup(String),

    /// Failure reported by the chunk lookup
    #[error("chunk lookup error: {0}")]
    ChunkLookup(String),

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] DataFusionError),
}

pub type Result<T, E = PruneError> = std::result::Result<T, E>;
