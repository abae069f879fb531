use std::{fmt, sync::Arc};

use arrow_schema::DataType;

use crate::{
    error::{PruneError, Result},
    partitioning::PartitioningFunction,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct DimensionId(pub i32);

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog tag of a dimension.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DimensionType {
    /// Range partitioned, usually on time.
    Open,
    /// Hash partitioned into a fixed number of partitions.
    Closed,
}

impl TryFrom<u8> for DimensionType {
    type Error = PruneError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(DimensionType::Open),
            1 => Ok(DimensionType::Closed),
            code => Err(PruneError::UnknownDimensionKind { code }),
        }
    }
}

#[derive(Clone, Debug)]
pub enum DimensionKind {
    Open,
    /// `num_slices` bounds the partition numbers `partitioning` may return.
    Closed {
        num_slices: u16,
        partitioning: Arc<dyn PartitioningFunction>,
    },
}

/// One partitioning axis of a hypertable.
#[derive(Clone, Debug)]
pub struct Dimension {
    id: DimensionId,
    column: String,
    column_type: DataType,
    kind: DimensionKind,
}

impl Dimension {
    pub fn open(id: DimensionId, column: impl Into<String>, column_type: DataType) -> Self {
        Self {
            id,
            column: column.into(),
            column_type,
            kind: DimensionKind::Open,
        }
    }

    pub fn closed(
        id: DimensionId,
        column: impl Into<String>,
        column_type: DataType,
        num_slices: u16,
        partitioning: Arc<dyn PartitioningFunction>,
    ) -> Self {
        Self {
            id,
            column: column.into(),
            column_type,
            kind: DimensionKind::Closed {
                num_slices,
                partitioning,
            },
        }
    }

    /// Build a dimension from its raw catalog row.
    ///
    /// `kind_code` is the stored dimension tag; anything other than open (0)
    /// or closed (1) is rejected. Closed dimensions require a partitioning
    /// function.
    pub fn from_catalog(
        id: DimensionId,
        column: impl Into<String>,
        column_type: DataType,
        kind_code: u8,
        num_slices: u16,
        partitioning: Option<Arc<dyn PartitioningFunction>>,
    ) -> Result<Self> {
        let column = column.into();
        match DimensionType::try_from(kind_code)? {
            DimensionType::Open => Ok(Self::open(id, column, column_type)),
            DimensionType::Closed => {
                let partitioning =
                    partitioning.ok_or_else(|| PruneError::MissingPartitioning {
                        column: column.clone(),
                    })?;
                Ok(Self::closed(id, column, column_type, num_slices, partitioning))
            }
        }
    }

    pub fn id(&self) -> DimensionId {
        self.id
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn column_type(&self) -> &DataType {
        &self.column_type
    }

    pub fn kind(&self) -> &DimensionKind {
        &self.kind
    }

    pub fn dimension_type(&self) -> DimensionType {
        match self.kind {
            DimensionKind::Open => DimensionType::Open,
            DimensionKind::Closed { .. } => DimensionType::Closed,
        }
    }
}

/// Partitioning space of one hypertable: its dimensions in canonical order.
#[derive(Clone, Debug)]
pub struct HyperSpace {
    hypertable: i32,
    dimensions: Vec<Dimension>,
}

impl HyperSpace {
    pub fn new(hypertable: i32, dimensions: Vec<Dimension>) -> Self {
        Self {
            hypertable,
            dimensions,
        }
    }

    pub fn hypertable(&self) -> i32 {
        self.hypertable
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn num_dimensions(&self) -> usize {
        self.dimensions.len()
    }

    /// Position of the dimension partitioning on `column`, if any.
    pub fn position_of(&self, column: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.column == column)
    }
}
