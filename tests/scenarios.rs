/// End-to-end exclusion scenarios over a time x device hypertable.
///
/// The device dimension uses a fixed lookup table as partitioning function
/// so each test can choose which values share a partition.
use std::sync::Arc;

use arrow_schema::DataType;
use datafusion_common::ScalarValue;
use datafusion_expr::{Operator, Volatility};
use hyperprune::{
    ChunkId, ClassifyContext, Clause, ClauseExpr, Dimension, DimensionId, HashPartitioning,
    HyperSpace, HypertableRestrictInfo, MemoryCatalog, PartitionSet, PartitioningFunction, PruneError,
    ScanBound, Slice, SliceId, Strategy,
};

const TIME: DimensionId = DimensionId(1);
const DEVICE: DimensionId = DimensionId(2);

/// a -> 2, b -> 2, c -> 3, anything else -> 0 (modulus 4)
#[derive(Debug)]
struct DeviceTable;

impl PartitioningFunction for DeviceTable {
    fn partition(&self, value: &ScalarValue) -> hyperprune::Result<i32> {
        match value {
            ScalarValue::Utf8(Some(s)) => Ok(match s.as_str() {
                "a" | "b" => 2,
                "c" => 3,
                _ => 0,
            }),
            other => Err(PruneError::UnsupportedPartitionValue {
                data_type: other.data_type(),
            }),
        }
    }
}

fn time_space() -> HyperSpace {
    HyperSpace::new(1, vec![Dimension::open(TIME, "time", DataType::Int64)])
}

fn device_space() -> HyperSpace {
    HyperSpace::new(
        2,
        vec![
            Dimension::open(TIME, "time", DataType::Int64),
            Dimension::closed(DEVICE, "device_id", DataType::Utf8, 4, Arc::new(DeviceTable)),
        ],
    )
}

/// Integer device ids hashed into 4 partitions.
fn hashed_device_space() -> HyperSpace {
    HyperSpace::new(
        3,
        vec![
            Dimension::open(TIME, "time", DataType::Int64),
            Dimension::closed(
                DEVICE,
                "device",
                DataType::Int64,
                4,
                Arc::new(HashPartitioning::new(4)),
            ),
        ],
    )
}

/// Time slices [0,100) .. [400,500), ids 0..5.
fn time_catalog() -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    for t in 0..5 {
        let start = i64::from(t) * 100;
        catalog.add_slice(Slice::new(SliceId(t), TIME, start, start + 100));
        catalog.add_chunk(ChunkId(t), vec![SliceId(t)]);
    }
    catalog
}

/// Time slices as above times device partitions 0..4 (slice ids 10..14).
/// Chunk id is `time * 10 + partition`.
fn device_catalog() -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    for t in 0..5 {
        let start = i64::from(t) * 100;
        catalog.add_slice(Slice::new(SliceId(t), TIME, start, start + 100));
    }
    for p in 0..4 {
        catalog.add_slice(Slice::new(SliceId(10 + p), DEVICE, i64::from(p), i64::from(p) + 1));
    }
    for t in 0..5 {
        for p in 0..4 {
            catalog.add_chunk(ChunkId(t * 10 + p), vec![SliceId(t), SliceId(10 + p)]);
        }
    }
    catalog
}

fn chunks_for(space: &HyperSpace, catalog: &MemoryCatalog, clauses: &[Clause]) -> Vec<ChunkId> {
    let mut info = HypertableRestrictInfo::new(space);
    info.ingest(clauses, &ClassifyContext::default()).unwrap();
    info.resolve_candidate_chunks(catalog).unwrap()
}

#[test]
fn time_window_selects_overlapping_slices() {
    let space = time_space();
    let catalog = time_catalog();
    let clauses = [Clause::gt_eq("time", 100i64), Clause::lt("time", 200i64)];

    let mut info = HypertableRestrictInfo::new(&space);
    info.ingest(&clauses, &ClassifyContext::default()).unwrap();
    let open = info.restriction(0).unwrap().as_open().unwrap();
    assert_eq!(open.lower(), Some(ScanBound::new(Strategy::GtEq, 100)));
    assert_eq!(open.upper(), Some(ScanBound::new(Strategy::Lt, 200)));

    let sets = info.candidate_slices(&catalog).unwrap().unwrap();
    let ids: Vec<_> = sets[0].slices().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![SliceId(1)]);

    assert_eq!(info.resolve_candidate_chunks(&catalog).unwrap(), vec![ChunkId(1)]);
}

#[test]
fn window_straddling_slices_keeps_both() {
    let space = time_space();
    let catalog = time_catalog();
    let chunks = chunks_for(
        &space,
        &catalog,
        &[Clause::gt("time", 150i64), Clause::lt_eq("time", 300i64)],
    );
    assert_eq!(chunks, vec![ChunkId(1), ChunkId(2), ChunkId(3)]);
}

#[test]
fn equal_devices_in_same_partition_are_not_a_contradiction() {
    let space = device_space();
    let catalog = device_catalog();
    let clauses = [Clause::eq("device_id", "a"), Clause::eq("device_id", "b")];

    let mut info = HypertableRestrictInfo::new(&space);
    info.ingest(&clauses, &ClassifyContext::default()).unwrap();
    let closed = info.restriction_for("device_id").unwrap().as_closed().unwrap();
    assert_eq!(closed.state(), &PartitionSet::Partitions([2].into()));

    let chunks = info.resolve_candidate_chunks(&catalog).unwrap();
    assert_eq!(
        chunks,
        vec![ChunkId(2), ChunkId(12), ChunkId(22), ChunkId(32), ChunkId(42)]
    );
}

#[test]
fn equal_devices_in_different_partitions_exclude_everything() {
    let space = device_space();
    let catalog = device_catalog();
    let clauses = [
        Clause::gt_eq("time", 0i64),
        Clause::eq("device_id", "a"),
        Clause::eq("device_id", "c"),
    ];

    let mut info = HypertableRestrictInfo::new(&space);
    info.ingest(&clauses, &ClassifyContext::default()).unwrap();
    let closed = info.restriction_for("device_id").unwrap().as_closed().unwrap();
    assert_eq!(closed.state(), &PartitionSet::Empty);
    assert!(info.resolve_candidate_chunks(&catalog).unwrap().is_empty());
}

#[test]
fn device_all_across_partitions_is_a_contradiction() {
    let space = device_space();
    let catalog = device_catalog();
    let chunks = chunks_for(
        &space,
        &catalog,
        &[Clause::all("device_id", Operator::Eq, ["a", "c"])],
    );
    assert!(chunks.is_empty());
}

#[test]
fn device_in_list_is_a_union() {
    let space = device_space();
    let catalog = device_catalog();
    let clauses = [
        Clause::in_list("device_id", ["a", "c"]),
        Clause::lt("time", 100i64),
    ];

    let mut info = HypertableRestrictInfo::new(&space);
    info.ingest(&clauses, &ClassifyContext::default()).unwrap();
    let closed = info.restriction_for("device_id").unwrap().as_closed().unwrap();
    assert_eq!(closed.state(), &PartitionSet::Partitions([2, 3].into()));
    assert_eq!(
        info.resolve_candidate_chunks(&catalog).unwrap(),
        vec![ChunkId(2), ChunkId(3)]
    );
}

#[test]
fn volatile_comparison_is_ignored() {
    let space = time_space();
    let catalog = time_catalog();
    let now = Clause::op(
        ClauseExpr::column("time"),
        Operator::Gt,
        ClauseExpr::function("now", Volatility::Volatile, vec![]),
    );

    let mut info = HypertableRestrictInfo::new(&space);
    info.ingest(&[now], &ClassifyContext::default()).unwrap();
    assert!(!info.has_restrictions());
    assert_eq!(info.restriction(0).unwrap().as_open().unwrap().lower(), None);
    assert_eq!(info.resolve_candidate_chunks(&catalog).unwrap(), catalog.all_chunks());
}

#[test]
fn time_in_list_is_dropped_by_default() {
    let space = time_space();
    let catalog = time_catalog();
    let chunks = chunks_for(&space, &catalog, &[Clause::in_list("time", [50i64, 450])]);
    assert_eq!(chunks, catalog.all_chunks());
}

#[test]
fn new_chunks_are_visible_to_later_queries() {
    let space = time_space();
    let catalog = time_catalog();
    let clauses = [Clause::gt_eq("time", 500i64)];
    assert!(chunks_for(&space, &catalog, &clauses).is_empty());

    catalog.add_slice(Slice::new(SliceId(5), TIME, 500, 600));
    catalog.add_chunk(ChunkId(5), vec![SliceId(5)]);
    assert_eq!(chunks_for(&space, &catalog, &clauses), vec![ChunkId(5)]);
}

#[test]
fn string_literal_on_integer_hash_dimension_keeps_every_chunk() {
    let space = hashed_device_space();
    let catalog = device_catalog();
    let partition = HashPartitioning::new(4)
        .partition(&ScalarValue::Int64(Some(5)))
        .unwrap();

    // Hashing the text "5" would pick an unrelated partition.
    let mut info = HypertableRestrictInfo::new(&space);
    info.ingest(&[Clause::eq("device", "5")], &ClassifyContext::default())
        .unwrap();
    assert!(!info.has_restrictions());
    let chunks = info.resolve_candidate_chunks(&catalog).unwrap();
    assert_eq!(chunks, catalog.all_chunks());
    assert!(chunks.contains(&ChunkId(partition)));
}

#[test]
fn narrower_integer_literal_hashes_as_the_column_type() {
    let space = hashed_device_space();
    let catalog = device_catalog();
    let partition = HashPartitioning::new(4)
        .partition(&ScalarValue::Int64(Some(5)))
        .unwrap();

    let chunks = chunks_for(
        &space,
        &catalog,
        &[Clause::eq("device", 5i32), Clause::lt("time", 100i64)],
    );
    assert_eq!(chunks, vec![ChunkId(partition)]);
}

#[test]
fn fractional_bound_on_integer_time_is_skipped() {
    let space = time_space();
    let catalog = time_catalog();

    let mut info = HypertableRestrictInfo::new(&space);
    info.ingest(&[Clause::lt("time", 2.5f64)], &ClassifyContext::default())
        .unwrap();
    assert!(!info.has_restrictions());
    assert_eq!(info.resolve_candidate_chunks(&catalog).unwrap(), catalog.all_chunks());
}
