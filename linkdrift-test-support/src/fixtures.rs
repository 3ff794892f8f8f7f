//! Canonical edge lists for graph tests.
//!
//! Every list names each undirected edge once with the smaller endpoint
//! first, in ascending order.

/// Complete graph on nodes `0..n`.
///
/// # Examples
/// ```
/// use linkdrift_test_support::fixtures;
///
/// assert_eq!(fixtures::complete(4).len(), 6);
/// ```
#[must_use]
pub fn complete(n: u64) -> Vec<(u64, u64)> {
    clique(0, n)
}

/// Two cliques of `n` nodes, `0..n` and `n..2n`, joined by the bridge
/// `(n - 1, n)`.
///
/// # Examples
/// ```
/// use linkdrift_test_support::fixtures;
///
/// let edges = fixtures::two_cliques(5);
/// assert_eq!(edges.len(), 21);
/// assert!(edges.contains(&(4, 5)));
/// ```
#[must_use]
pub fn two_cliques(n: u64) -> Vec<(u64, u64)> {
    let mut edges = clique(0, n);
    if n > 0 {
        edges.push((n - 1, n));
    }
    edges.extend(clique(n, n));
    edges.sort_unstable();
    edges
}

/// Triangles `{0, 1, 2}` and `{3, 4, 5}` joined by the bridge `(2, 3)`.
#[must_use]
pub fn two_triangles() -> Vec<(u64, u64)> {
    two_cliques(3)
}

/// Cycle through nodes `0..n`. Needs `n >= 3` to be a simple cycle.
///
/// # Examples
/// ```
/// use linkdrift_test_support::fixtures;
///
/// assert_eq!(fixtures::ring(4), vec![(0, 1), (0, 3), (1, 2), (2, 3)]);
/// ```
#[must_use]
pub fn ring(n: u64) -> Vec<(u64, u64)> {
    let mut edges: Vec<(u64, u64)> = (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            (i.min(j), i.max(j))
        })
        .filter(|(a, b)| a != b)
        .collect();
    edges.sort_unstable();
    edges.dedup();
    edges
}

fn clique(offset: u64, n: u64) -> Vec<(u64, u64)> {
    (offset..offset + n)
        .flat_map(|a| (a + 1..offset + n).map(move |b| (a, b)))
        .collect()
}
