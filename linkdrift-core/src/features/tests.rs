//! Unit tests for pair-table construction.

use super::*;
use linkdrift_test_support::fixtures;
use rstest::rstest;

fn node(id: u64) -> NodeId {
    NodeId::new(id)
}

fn edges(pairs: &[(u64, u64)]) -> BTreeSet<Edge> {
    pairs
        .iter()
        .map(|&(a, b)| Edge::from_raw(a, b).expect("fixture pairs are valid"))
        .collect()
}

#[test]
fn complete_graph_labels_every_pair() {
    let positives = edges(&fixtures::complete(4));
    let table = FeatureBuilder::new().build(&positives).expect("table");
    assert_eq!(table.len(), 6);
    assert!(table.rows().iter().all(PairRow::link));
    assert_eq!(table.positive_rate(), 1.0);
}

#[rstest]
#[case(3)]
#[case(5)]
#[case(8)]
fn row_count_is_pair_count_of_universe(#[case] nodes: u64) {
    let positives = edges(&[(0, 1)]);
    let universe: BTreeSet<NodeId> = (0..nodes).map(node).collect();
    let table = FeatureBuilder::new()
        .build_with(FeatureInputs::new(&positives).with_universe(&universe))
        .expect("table");
    assert_eq!(table.len(), pair_count(universe.len()));
    assert_eq!(table.positives(), 1);
}

#[test]
fn rows_are_ordered_and_normalised() {
    let positives = edges(&[(2, 0), (1, 2)]);
    let table = FeatureBuilder::new().build(&positives).expect("table");
    let pairs: Vec<(u64, u64)> = table
        .rows()
        .iter()
        .map(|row| (row.source().get(), row.target().get()))
        .collect();
    assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    assert_eq!(table.labels(), vec![false, true, true]);
}

#[test]
fn features_come_from_reference_graph() {
    let reference = Graph::try_from_pairs(&[(0, 1), (0, 2), (1, 2), (2, 3)]).expect("graph");
    let partition = Partition::from_labels(reference.nodes().iter().map(|n| (*n, 0)));
    let table = FeatureBuilder::new()
        .build_with(
            FeatureInputs::new(reference.edges())
                .with_reference(&reference)
                .with_partition(&partition),
        )
        .expect("table");
    let row = table
        .row(&Edge::from_raw(0, 3).expect("edge"))
        .expect("pair 0-3 is enumerated");
    let features = row.features();
    assert!(!row.link());
    assert_eq!(features.source_degree, 2);
    assert_eq!(features.target_degree, 1);
    assert_eq!(features.common_neighbors, 1);
    assert!(features.source_pagerank > features.target_pagerank);
}

#[test]
fn isolated_universe_nodes_get_zero_structure() {
    let positives = edges(&[(0, 1)]);
    let universe: BTreeSet<NodeId> = [node(0), node(1), node(7)].into_iter().collect();
    let table = FeatureBuilder::new()
        .build_with(FeatureInputs::new(&positives).with_universe(&universe))
        .expect("table");
    let row = table
        .row(&Edge::from_raw(0, 7).expect("edge"))
        .expect("pair 0-7 is enumerated");
    assert_eq!(row.features().target_degree, 0);
    assert_eq!(row.features().common_neighbors, 0);
}

#[test]
fn community_indicator_is_one_hot() {
    let positives = edges(&[(0, 1), (2, 3)]);
    let partition = Partition::from_labels([
        (node(0), 'a'),
        (node(1), 'a'),
        (node(2), 'b'),
        (node(3), 'b'),
    ]);
    let table = FeatureBuilder::new()
        .build_with(FeatureInputs::new(&positives).with_partition(&partition))
        .expect("table");
    let schema = *table.schema();
    assert_eq!(schema.width(), 9);
    let row = table
        .row(&Edge::from_raw(1, 2).expect("edge"))
        .expect("pair 1-2 is enumerated");
    let encoded = row.features().encode(&schema);
    assert_eq!(encoded.len(), schema.width());
    let hot: Vec<usize> = encoded
        .iter()
        .enumerate()
        .skip(NUMERIC_COLUMNS.len())
        .filter(|(_, value)| **value == 1.0)
        .map(|(column, _)| column)
        .collect();
    assert_eq!(
        hot,
        vec![schema.indicator_column(CommunityId::new(0), CommunityId::new(1))]
    );
}

#[test]
fn column_names_follow_schema() {
    let names = FeatureSchema::new(2).column_names();
    assert_eq!(names.len(), 9);
    assert_eq!(names[0], "source_degree");
    assert_eq!(names[4], "common_neighbors");
    assert_eq!(names[5], "community_0_0");
    assert_eq!(names[8], "community_1_1");
}

#[test]
fn detected_partition_is_seeded() {
    let positives = edges(&fixtures::two_cliques(4));
    let builder = FeatureBuilder::new().with_seed(11);
    assert_eq!(
        builder.build(&positives).expect("first"),
        builder.build(&positives).expect("second")
    );
}

#[test]
fn positive_outside_universe_is_rejected() {
    let positives = edges(&[(0, 1), (1, 9)]);
    let universe: BTreeSet<NodeId> = [node(0), node(1)].into_iter().collect();
    let err = FeatureBuilder::new()
        .build_with(FeatureInputs::new(&positives).with_universe(&universe))
        .expect_err("node 9 is outside the universe");
    assert_eq!(err, LinkDriftError::UnknownNode { node: node(9) });
}

#[test]
fn partition_must_cover_universe() {
    let positives = edges(&[(0, 1), (1, 2)]);
    let partition = Partition::from_labels([(node(0), 0), (node(1), 0)]);
    let err = FeatureBuilder::new()
        .build_with(FeatureInputs::new(&positives).with_partition(&partition))
        .expect_err("node 2 is unlabelled");
    assert_eq!(err, LinkDriftError::UnpartitionedNode { node: node(2) });
}

#[test]
fn empty_input_yields_empty_table() {
    let table = FeatureBuilder::new()
        .build(&BTreeSet::new())
        .expect("empty table");
    assert!(table.is_empty());
    assert_eq!(table.positive_rate(), 0.0);
}

#[rstest]
#[case::in_range(CommunityId::new(1), Some(8))]
#[case::out_of_range(CommunityId::new(4), None)]
fn encode_lays_out_numeric_prefix(#[case] target_community: CommunityId, #[case] hot: Option<usize>) {
    let features = PairFeatures {
        source_degree: 3,
        target_degree: 1,
        source_pagerank: 0.25,
        target_pagerank: 0.125,
        source_community: CommunityId::new(1),
        target_community,
        common_neighbors: 2,
    };
    let encoded = features.encode(&FeatureSchema::new(2));
    assert_eq!(encoded.len(), 9);
    assert_eq!(encoded[..5], [3.0, 1.0, 0.25, 0.125, 2.0]);
    let ones: Vec<usize> = encoded
        .iter()
        .enumerate()
        .skip(NUMERIC_COLUMNS.len())
        .filter(|(_, value)| **value == 1.0)
        .map(|(column, _)| column)
        .collect();
    assert_eq!(ones, hot.into_iter().collect::<Vec<_>>());
}
