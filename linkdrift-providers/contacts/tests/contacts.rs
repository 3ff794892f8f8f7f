#![expect(clippy::expect_used, reason = "tests require contextual panics")]
//! Integration tests covering the contact-log [`EdgeSource`] implementation.
use std::io::Cursor;

use linkdrift_core::{Edge, EdgeSource, EdgeSourceError, NodeId, load_graph};
use linkdrift_providers_contacts::{ContactLog, ContactLogError};
use rstest::{fixture, rstest};

const LOG: &str = "\
20\t1\t2\t1A\t1A
40\t2\t3\t1A\t1B
60\t3\t2\t1B\t1A
80\t1\t2\t1A\t1A
100\t4\t5\t1B\t1B
120\t5\t5\t1B\t1B
";

#[fixture]
fn log() -> ContactLog {
    ContactLog::try_from_reader("school", Cursor::new(LOG)).expect("log must parse")
}

#[rstest]
fn reader_keeps_ordered_events_in_file_order(log: ContactLog) {
    let times: Vec<u64> = log.events().iter().map(|event| event.time).collect();
    assert_eq!(times, vec![20, 40, 80, 100]);
    assert_eq!(log.discarded(), 2);
    assert_eq!(log.name(), "school");
}

#[rstest]
fn repeated_contacts_collapse_into_one_edge(log: ContactLog) -> anyhow::Result<()> {
    let graph = load_graph(&log)?;
    assert_eq!(log.len(), 4);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.node_count(), 5);
    assert!(graph.contains_edge(&Edge::from_raw(1, 2)?));
    Ok(())
}

#[rstest]
#[case(0, 0, 4)]
#[case(2, 2, 2)]
#[case(4, 4, 0)]
#[case(99, 4, 0)]
fn split_clamps_offset(
    log: ContactLog,
    #[case] offset: usize,
    #[case] training: usize,
    #[case] test: usize,
) {
    let (prefix, suffix) = log.split_at(offset);
    assert_eq!(prefix.len(), training);
    assert_eq!(suffix.len(), test);
}

#[rstest]
fn split_windows_yield_their_own_edges(log: ContactLog) -> anyhow::Result<()> {
    let (training, test) = log.split_at(2);
    let expected_training: Vec<Edge> = vec![Edge::from_raw(1, 2)?, Edge::from_raw(2, 3)?];
    assert_eq!(
        training.edges()?.into_iter().collect::<Vec<_>>(),
        expected_training
    );
    let expected_test: Vec<Edge> = vec![Edge::from_raw(1, 2)?, Edge::from_raw(4, 5)?];
    assert_eq!(test.edges()?.into_iter().collect::<Vec<_>>(), expected_test);
    Ok(())
}

#[rstest]
fn empty_window_is_an_empty_source(log: ContactLog) {
    let (_, test) = log.split_at(usize::MAX);
    assert_eq!(test.edges(), Err(EdgeSourceError::EmptySource));
    assert_eq!(
        test.observation(0),
        Err(EdgeSourceError::OutOfBounds { index: 0 })
    );
}

#[rstest]
fn class_partition_uses_first_observed_class(log: ContactLog) {
    let partition = log.class_partition();
    assert_eq!(partition.len(), 5);
    assert_eq!(partition.community_count(), 2);
    let class_of = |node| partition.community_of(NodeId::new(node));
    assert_eq!(class_of(1), class_of(2));
    assert_eq!(class_of(3), class_of(4));
    assert_ne!(class_of(1), class_of(3));
}

#[rstest]
#[case("")]
#[case("\n\n")]
#[case("10\t3\t3\tA\tA\n20\t4\t1\tA\tA\n")]
fn try_from_reader_empty_input(#[case] raw: &str) {
    let err = ContactLog::try_from_reader("demo", Cursor::new(raw))
        .expect_err("no usable events must fail");
    assert!(matches!(err, ContactLogError::EmptyInput));
}

#[rstest]
fn malformed_line_reports_its_position() {
    let raw = "20\t1\t2\t1A\t1A\n\n40\t2\tthree\t1A\t1B\n";
    let err = ContactLog::try_from_reader("demo", Cursor::new(raw))
        .expect_err("malformed record must fail");
    assert!(matches!(
        err,
        ContactLogError::InvalidField { line: 3, field: "target", ref value } if value == "three"
    ));
}

#[rstest]
fn try_from_reader_propagates_io_error() {
    struct FailingReader;

    impl std::io::Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("boom"))
        }
    }

    impl std::io::BufRead for FailingReader {
        fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
            Err(std::io::Error::other("boom"))
        }

        fn consume(&mut self, _amt: usize) {}
    }

    let err = ContactLog::try_from_reader("demo", FailingReader)
        .expect_err("I/O failure must propagate");
    assert!(matches!(err, ContactLogError::Io(_)));
}
