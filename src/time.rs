//! Conversion of open-dimension literals to the internal ordered integer.
//!
//! Time values are kept as microseconds since the Unix epoch; plain integer
//! columns are used as-is. Conversions saturate instead of failing on
//! overflow: a saturated bound is only ever looser than the exact one.

use arrow_schema::{DataType, TimeUnit};
use datafusion_common::ScalarValue;

use crate::error::{PruneError, Result};

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_MILLI: i64 = 1_000;
const NANOS_PER_MICRO: i64 = 1_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// Convert `value`, interpreted as `data_type`, to its internal representation.
///
/// Returns `Ok(None)` for NULL. `data_type` is the declared type of the
/// value (the array element type for ANY/ALL operands) and drives the unit
/// conversion; a value whose runtime type differs from it is cast first.
pub fn time_value_to_internal(value: &ScalarValue, data_type: &DataType) -> Result<Option<i64>> {
    let value = if &value.data_type() == data_type {
        value.clone()
    } else {
        value.cast_to(data_type)?
    };

    let internal = match value {
        ScalarValue::Int8(v) => v.map(i64::from),
        ScalarValue::Int16(v) => v.map(i64::from),
        ScalarValue::Int32(v) => v.map(i64::from),
        ScalarValue::Int64(v) => v,
        ScalarValue::UInt8(v) => v.map(i64::from),
        ScalarValue::UInt16(v) => v.map(i64::from),
        ScalarValue::UInt32(v) => v.map(i64::from),
        ScalarValue::UInt64(v) => v.map(|v| i64::try_from(v).unwrap_or(i64::MAX)),
        ScalarValue::Date32(v) => v.map(|days| i64::from(days).saturating_mul(MICROS_PER_DAY)),
        ScalarValue::Date64(v) => v.map(|ms| ms.saturating_mul(MICROS_PER_MILLI)),
        ScalarValue::TimestampSecond(v, _) => v.map(|s| s.saturating_mul(MICROS_PER_SECOND)),
        ScalarValue::TimestampMillisecond(v, _) => v.map(|ms| ms.saturating_mul(MICROS_PER_MILLI)),
        ScalarValue::TimestampMicrosecond(v, _) => v,
        ScalarValue::TimestampNanosecond(v, _) => v.map(|ns| ns.div_euclid(NANOS_PER_MICRO)),
        other => {
            return Err(PruneError::UnsupportedTimeType {
                data_type: other.data_type(),
            });
        }
    };
    Ok(internal)
}

/// True if converting `data_type` rounds values down to whole microseconds.
///
/// Strict bounds built from such values must be relaxed to their inclusive
/// form, since two distinct source values can share one internal value.
pub fn truncates(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Timestamp(TimeUnit::Nanosecond, _))
}
