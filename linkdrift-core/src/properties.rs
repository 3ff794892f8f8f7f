//! Property-based checks for pair tables, rewiring and metrics.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rand::{SeedableRng, rngs::SmallRng};

use crate::{
    Edge, FeatureBuilder, FeatureInputs, Graph, LouvainConfig, NodeId, Partition, Rewirer,
    Scorer, degree_inequality, modularity, pair_count, roc_auc,
    test_utils::suite_proptest_config,
};

/// Node count plus a random edge subset over `0..n`, with at least one edge.
fn snapshot_strategy() -> impl Strategy<Value = (u64, Vec<(u64, u64)>)> {
    (3_u64..12).prop_flat_map(|nodes| {
        let pair = (0..nodes, 0..nodes)
            .prop_filter("endpoints must differ", |(a, b)| a != b);
        (Just(nodes), prop::collection::vec(pair, 1..24))
    })
}

fn snapshot(nodes: u64, pairs: &[(u64, u64)]) -> Graph {
    let edges = pairs
        .iter()
        .filter_map(|&(a, b)| Edge::from_raw(a, b).ok());
    Graph::with_nodes((0..nodes).map(NodeId::new), edges)
}

/// Scores pairs by their common-neighbour count.
struct CommonNeighbours;

impl Scorer for CommonNeighbours {
    fn fit(&mut self, _table: &crate::PairTable) -> crate::Result<()> {
        Ok(())
    }

    fn score(&self, features: &[f64]) -> crate::Result<f64> {
        Ok(features.get(4).copied().unwrap_or(0.0) / 100.0)
    }
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn table_enumerates_every_pair_once((nodes, pairs) in snapshot_strategy()) {
        let graph = snapshot(nodes, &pairs);
        let table = FeatureBuilder::new()
            .build_with(
                FeatureInputs::new(graph.edges())
                    .with_universe(graph.nodes())
                    .with_reference(&graph),
            )
            .expect("table builds");
        prop_assert_eq!(table.len(), pair_count(graph.node_count()));
        prop_assert!(table.rows().windows(2).all(|w| w[0].pair() < w[1].pair()));
        for row in table.rows() {
            prop_assert!(row.source() < row.target());
            prop_assert_eq!(row.link(), graph.contains_edge(&row.pair()));
        }
        prop_assert_eq!(table.positives(), graph.edge_count());
    }

    #[test]
    fn rewiring_preserves_edges_and_nodes(
        (nodes, pairs) in snapshot_strategy(),
        seed in any::<u64>(),
        removals in 1_usize..4,
    ) {
        let graph = snapshot(nodes, &pairs);
        prop_assume!(removals <= graph.edge_count());
        let partition = Partition::detect(&graph, &LouvainConfig::default());
        let mut rng = SmallRng::seed_from_u64(seed);
        let outcome = Rewirer::new(removals)
            .expect("non-zero removals")
            .apply(&graph, &FeatureBuilder::new(), &partition, &CommonNeighbours, &mut rng)
            .expect("rewire succeeds");
        prop_assert_eq!(outcome.graph.edge_count(), graph.edge_count());
        prop_assert_eq!(outcome.graph.nodes(), graph.nodes());
        let added: BTreeSet<Edge> = outcome.added.iter().copied().collect();
        prop_assert_eq!(added.len(), removals);
    }

    #[test]
    fn metrics_stay_in_range((nodes, pairs) in snapshot_strategy(), seed in any::<u64>()) {
        let graph = snapshot(nodes, &pairs);
        let partition = Partition::detect(&graph, &LouvainConfig::default().with_seed(seed));
        let q = modularity(&graph, &partition).expect("graph has edges");
        prop_assert!((-0.5..1.0).contains(&q), "modularity {q}");
        prop_assert_eq!(q, modularity(&graph, &partition).expect("graph has edges"));
        let gini = degree_inequality(&graph).expect("graph has edges");
        prop_assert!((0.0..1.0).contains(&gini), "degree inequality {gini}");
    }

    #[test]
    fn roc_auc_is_a_probability(
        scored in prop::collection::vec((0.0_f64..1.0, any::<bool>()), 2..40),
    ) {
        let (scores, labels): (Vec<f64>, Vec<bool>) = scored.into_iter().unzip();
        prop_assume!(labels.iter().any(|l| *l) && labels.iter().any(|l| !*l));
        let auc = roc_auc(&scores, &labels).expect("both classes present");
        prop_assert!((0.0..=1.0).contains(&auc), "auc {auc}");
    }
}
