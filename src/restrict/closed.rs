use std::{collections::BTreeSet, sync::Arc};

use arrow_schema::DataType;
use datafusion_common::ScalarValue;
use tracing::{debug, trace};

use crate::{
    catalog::SliceScanner,
    classify::{DimensionValues, TypeFamily},
    dimension::DimensionId,
    error::{PruneError, Result},
    expr::Strategy,
    options::RestrictOptions,
    partitioning::PartitioningFunction,
    slice::{CandidateSliceSet, ScanBound},
};

/// Candidate partitions of a hash-partitioned dimension.
///
/// `Empty` is an explicit contradiction, distinct from `Unrestricted`: it
/// resolves to no slices at all, while `Unrestricted` resolves to every
/// slice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum PartitionSet {
    #[default]
    Unrestricted,
    Partitions(BTreeSet<i32>),
    Empty,
}

/// Tightening set of candidate partitions for a hash-partitioned dimension.
#[derive(Clone, Debug)]
pub struct ClosedRestriction {
    partitioning: Arc<dyn PartitioningFunction>,
    /// Type the partitioning function sees for stored rows.
    value_type: DataType,
    num_slices: u16,
    state: PartitionSet,
}

impl ClosedRestriction {
    /// `column_type` is the dimension column's type; dictionary columns
    /// partition on their value type.
    pub fn new(
        partitioning: Arc<dyn PartitioningFunction>,
        column_type: DataType,
        num_slices: u16,
    ) -> Self {
        let value_type = match column_type {
            DataType::Dictionary(_, value) => *value,
            other => other,
        };
        Self {
            partitioning,
            value_type,
            num_slices,
            state: PartitionSet::Unrestricted,
        }
    }

    pub fn state(&self) -> &PartitionSet {
        &self.state
    }

    /// Fold one classified clause into the partition set.
    ///
    /// Only equality carries information about hash membership. Values are
    /// hashed as the column's type; a clause with any value that does not
    /// convert exactly is skipped. Returns whether the clause counts as a
    /// restriction.
    pub fn add(
        &mut self,
        strategy: Strategy,
        values: &DimensionValues,
        options: &RestrictOptions,
    ) -> Result<bool> {
        if strategy != Strategy::Eq {
            return Ok(false);
        }

        let mut partitions = BTreeSet::new();
        for value in &values.values {
            let Some(value) = convert_exact(value, &self.value_type) else {
                trace!(
                    ?value,
                    column_type = ?self.value_type,
                    "skipping value that does not convert to the column type"
                );
                return Ok(false);
            };
            partitions.insert(self.partition(&value)?);
        }

        // A row lands in exactly one partition, so ANDed values spanning
        // several partitions cannot all hold.
        if partitions.len() > 1 && !values.use_or {
            self.state = PartitionSet::Empty;
            return Ok(true);
        }

        if options
            .max_in_list_partitions()
            .is_some_and(|max| partitions.len() > max)
        {
            return Ok(false);
        }

        self.state = match std::mem::take(&mut self.state) {
            PartitionSet::Unrestricted => non_empty(partitions),
            PartitionSet::Empty => PartitionSet::Empty,
            PartitionSet::Partitions(current) => {
                non_empty(current.intersection(&partitions).copied().collect())
            }
        };
        Ok(true)
    }

    fn partition(&self, value: &ScalarValue) -> Result<i32> {
        let partition = self.partitioning.partition(value)?;
        if !(0..i32::from(self.num_slices)).contains(&partition) {
            return Err(PruneError::Partitioning(format!(
                "partition {partition} of {value} is outside the dimension's {} slices",
                self.num_slices
            )));
        }
        Ok(partition)
    }

    /// Slices holding any candidate partition, or every slice when unrestricted.
    pub fn slices<S: SliceScanner + ?Sized>(
        &self,
        dimension: DimensionId,
        scanner: &S,
    ) -> Result<CandidateSliceSet> {
        let set = match &self.state {
            PartitionSet::Unrestricted => scanner.all_slices(dimension)?.into_iter().collect(),
            PartitionSet::Empty => CandidateSliceSet::new(),
            PartitionSet::Partitions(partitions) => {
                let mut set = CandidateSliceSet::new();
                for &partition in partitions {
                    let value = i64::from(partition);
                    let slices = scanner.scan_slices(
                        dimension,
                        Some(ScanBound::new(Strategy::LtEq, value)),
                        Some(ScanBound::new(Strategy::GtEq, value)),
                    )?;
                    for slice in slices {
                        set.add_unique(slice);
                    }
                }
                set
            }
        };
        debug!(
            %dimension,
            state = ?self.state,
            candidates = set.len(),
            "resolved closed dimension"
        );
        Ok(set)
    }
}

/// `value` as `target`, if the conversion keeps the value intact.
fn convert_exact(value: &ScalarValue, target: &DataType) -> Option<ScalarValue> {
    let source = value.data_type();
    if &source == target {
        return Some(value.clone());
    }
    if TypeFamily::of(&source)? != TypeFamily::of(target)? {
        return None;
    }
    let converted = value.cast_to(target).ok()?;
    if converted.is_null() {
        return None;
    }
    let back = converted.cast_to(&source).ok()?;
    (back == *value).then_some(converted)
}

fn non_empty(partitions: BTreeSet<i32>) -> PartitionSet {
    if partitions.is_empty() {
        PartitionSet::Empty
    } else {
        PartitionSet::Partitions(partitions)
    }
}

#[cfg(test)]
mod tests {
    use arrow_schema::DataType;
    use datafusion_common::ScalarValue;

    use super::*;
    use crate::{
        catalog::MemoryCatalog,
        partitioning::HashPartitioning,
        slice::{Slice, SliceId},
    };

    /// Partitions strings by their first byte, so tests can pick partitions.
    #[derive(Debug)]
    struct FirstByte;

    impl PartitioningFunction for FirstByte {
        fn partition(&self, value: &ScalarValue) -> Result<i32> {
            match value {
                ScalarValue::Utf8(Some(s)) => match s.as_bytes().first() {
                    Some(first) => Ok(i32::from(first.wrapping_sub(b'a') % 4)),
                    None => Err(PruneError::Partitioning("empty device name".into())),
                },
                other => Err(PruneError::UnsupportedPartitionValue {
                    data_type: other.data_type(),
                }),
            }
        }
    }

    fn restriction() -> ClosedRestriction {
        ClosedRestriction::new(Arc::new(FirstByte), DataType::Utf8, 4)
    }

    fn eq(v: &str) -> DimensionValues {
        DimensionValues::single(ScalarValue::from(v))
    }

    fn strs(vs: &[&str]) -> Vec<ScalarValue> {
        vs.iter().map(|v| ScalarValue::from(*v)).collect()
    }

    fn set(ps: &[i32]) -> PartitionSet {
        PartitionSet::Partitions(ps.iter().copied().collect())
    }

    #[test]
    fn ordering_strategies_are_ignored() {
        let mut r = restriction();
        let options = RestrictOptions::default();
        assert!(!r.add(Strategy::Lt, &eq("a"), &options).unwrap());
        assert_eq!(r.state(), &PartitionSet::Unrestricted);
    }

    #[test]
    fn same_partition_is_not_a_contradiction() {
        let mut r = restriction();
        let options = RestrictOptions::default();
        // "c" and "g" both land in partition 2
        assert!(r.add(Strategy::Eq, &eq("c"), &options).unwrap());
        assert!(r.add(Strategy::Eq, &eq("g"), &options).unwrap());
        assert_eq!(r.state(), &set(&[2]));
    }

    #[test]
    fn disjoint_equalities_intersect_to_empty() {
        let mut r = restriction();
        let options = RestrictOptions::default();
        r.add(Strategy::Eq, &eq("c"), &options).unwrap();
        assert!(r.add(Strategy::Eq, &eq("d"), &options).unwrap());
        assert_eq!(r.state(), &PartitionSet::Empty);
    }

    #[test]
    fn conjunctive_array_over_partitions_is_contradiction() {
        let mut r = restriction();
        let options = RestrictOptions::default();
        let values = DimensionValues::all(strs(&["c", "d"]), DataType::Utf8);
        assert!(r.add(Strategy::Eq, &values, &options).unwrap());
        assert_eq!(r.state(), &PartitionSet::Empty);

        // Absorbing
        assert!(r.add(Strategy::Eq, &eq("c"), &options).unwrap());
        assert_eq!(r.state(), &PartitionSet::Empty);
    }

    #[test]
    fn in_list_is_a_union() {
        let mut r = restriction();
        let options = RestrictOptions::default();
        let values = DimensionValues::any(strs(&["c", "d"]), DataType::Utf8);
        assert!(r.add(Strategy::Eq, &values, &options).unwrap());
        assert_eq!(r.state(), &set(&[2, 3]));

        r.add(Strategy::Eq, &eq("d"), &options).unwrap();
        assert_eq!(r.state(), &set(&[3]));
    }

    #[test]
    fn in_list_over_limit_is_dropped() {
        let mut r = restriction();
        let options = RestrictOptions::builder().max_in_list_partitions(1).build();
        let values = DimensionValues::any(strs(&["a", "b"]), DataType::Utf8);
        assert!(!r.add(Strategy::Eq, &values, &options).unwrap());
        assert_eq!(r.state(), &PartitionSet::Unrestricted);
    }

    #[test]
    fn partitioning_errors_propagate() {
        let mut r = restriction();
        let err = r
            .add(Strategy::Eq, &eq(""), &RestrictOptions::default())
            .unwrap_err();
        assert!(matches!(err, PruneError::Partitioning(_)));
    }

    #[test]
    fn partitions_beyond_num_slices_are_errors() {
        let mut r = ClosedRestriction::new(Arc::new(FirstByte), DataType::Utf8, 2);
        let options = RestrictOptions::default();
        assert!(r.add(Strategy::Eq, &eq("b"), &options).unwrap());
        let err = r.add(Strategy::Eq, &eq("d"), &options).unwrap_err();
        assert!(matches!(err, PruneError::Partitioning(_)));
    }

    #[test]
    fn values_of_another_type_are_skipped() {
        let mut r = restriction();
        let options = RestrictOptions::default();
        let int = DimensionValues::single(ScalarValue::Int64(Some(1)));
        assert!(!r.add(Strategy::Eq, &int, &options).unwrap());

        // One unconvertible element voids the whole list.
        let mixed = DimensionValues::any(
            vec![ScalarValue::from("c"), ScalarValue::Int64(Some(1))],
            DataType::Utf8,
        );
        assert!(!r.add(Strategy::Eq, &mixed, &options).unwrap());
        assert_eq!(r.state(), &PartitionSet::Unrestricted);
    }

    #[test]
    fn values_are_converted_to_the_column_type() {
        let mut r = ClosedRestriction::new(
            Arc::new(HashPartitioning::new(4)),
            DataType::Int16,
            4,
        );
        let options = RestrictOptions::default();
        let expected = HashPartitioning::new(4)
            .partition(&ScalarValue::Int16(Some(5)))
            .unwrap();
        let wide = DimensionValues::single(ScalarValue::Int64(Some(5)));
        assert!(r.add(Strategy::Eq, &wide, &options).unwrap());
        assert_eq!(r.state(), &set(&[expected]));

        // 70000 has no Int16 representation
        let lossy = DimensionValues::single(ScalarValue::Int64(Some(70_000)));
        assert!(!r.add(Strategy::Eq, &lossy, &options).unwrap());
        assert_eq!(r.state(), &set(&[expected]));
    }

    #[test]
    fn dictionary_columns_partition_on_their_values() {
        let column_type = DataType::Dictionary(Box::new(DataType::Int32), Box::new(DataType::Utf8));
        let mut r = ClosedRestriction::new(Arc::new(FirstByte), column_type, 4);
        let large = DimensionValues::single(ScalarValue::LargeUtf8(Some("d".into())));
        assert!(r.add(Strategy::Eq, &large, &RestrictOptions::default()).unwrap());
        assert_eq!(r.state(), &set(&[3]));
    }

    #[test]
    fn slices_follow_state() {
        let catalog = MemoryCatalog::new();
        let dim = DimensionId(2);
        for p in 0..4 {
            catalog.add_slice(Slice::new(SliceId(10 + p), dim, i64::from(p), i64::from(p) + 1));
        }
        let options = RestrictOptions::default();

        let r = restriction();
        assert_eq!(r.slices(dim, &catalog).unwrap().len(), 4);

        let mut r = restriction();
        let values = DimensionValues::any(strs(&["b", "d", "h"]), DataType::Utf8);
        r.add(Strategy::Eq, &values, &options).unwrap();
        let ids: Vec<_> = r
            .slices(dim, &catalog)
            .unwrap()
            .slices()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![SliceId(11), SliceId(13)]);

        let mut r = restriction();
        r.add(Strategy::Eq, &DimensionValues::all(strs(&["a", "b"]), DataType::Utf8), &options)
            .unwrap();
        assert!(r.slices(dim, &catalog).unwrap().is_empty());
    }
}
