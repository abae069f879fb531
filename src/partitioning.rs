use std::fmt::Debug;

use datafusion_common::ScalarValue;
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{PruneError, Result};

/// Maps a value of a closed dimension's column to its partition number.
///
/// Implementations must be pure: the same value always lands in the same
/// partition, otherwise pruning can exclude chunks that hold matching rows.
pub trait PartitioningFunction: Debug + Send + Sync {
    fn partition(&self, value: &ScalarValue) -> Result<i32>;
}

/// Hash partitioning with a fixed number of partitions.
///
/// Partition numbers are in `[0, num_partitions)`; the closed dimension's
/// slices are intervals over that space.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HashPartitioning {
    num_partitions: u32,
}

impl HashPartitioning {
    pub fn new(num_partitions: u32) -> Self {
        Self {
            num_partitions: num_partitions.max(1),
        }
    }

    pub fn num_partitions(&self) -> u32 {
        self.num_partitions
    }
}

impl PartitioningFunction for HashPartitioning {
    fn partition(&self, value: &ScalarValue) -> Result<i32> {
        let bytes = canonical_bytes(value)?;
        let bucket = xxh3_64(&bytes) % u64::from(self.num_partitions);
        // bucket < u32::MAX by construction
        i32::try_from(bucket).map_err(|_| {
            PruneError::Partitioning(format!(
                "partition {bucket} out of range for {} partitions",
                self.num_partitions
            ))
        })
    }
}

/// Encoding that is stable across integer widths, so that `device = 3::int2`
/// and `device = 3::int8` hash to the same partition.
fn canonical_bytes(value: &ScalarValue) -> Result<Vec<u8>> {
    let widened: Option<i64> = match value {
        ScalarValue::Int8(v) => v.map(i64::from),
        ScalarValue::Int16(v) => v.map(i64::from),
        ScalarValue::Int32(v) => v.map(i64::from),
        ScalarValue::Int64(v) => *v,
        ScalarValue::UInt8(v) => v.map(i64::from),
        ScalarValue::UInt16(v) => v.map(i64::from),
        ScalarValue::UInt32(v) => v.map(i64::from),
        ScalarValue::UInt64(v) => v.map(|v| v as i64),
        ScalarValue::Date32(v) => v.map(i64::from),
        ScalarValue::Date64(v)
        | ScalarValue::TimestampSecond(v, _)
        | ScalarValue::TimestampMillisecond(v, _)
        | ScalarValue::TimestampMicrosecond(v, _)
        | ScalarValue::TimestampNanosecond(v, _) => *v,
        ScalarValue::Boolean(v) => v.map(i64::from),
        ScalarValue::Utf8(Some(s))
        | ScalarValue::LargeUtf8(Some(s))
        | ScalarValue::Utf8View(Some(s)) => return Ok(s.as_bytes().to_vec()),
        ScalarValue::Binary(Some(b))
        | ScalarValue::LargeBinary(Some(b))
        | ScalarValue::BinaryView(Some(b)) => return Ok(b.clone()),
        other => {
            return Err(PruneError::UnsupportedPartitionValue {
                data_type: other.data_type(),
            });
        }
    };

    widened
        .map(|v| v.to_le_bytes().to_vec())
        .ok_or_else(|| PruneError::UnsupportedPartitionValue {
            data_type: value.data_type(),
        })
}
