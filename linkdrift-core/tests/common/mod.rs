use linkdrift_core::{EdgeSource, EdgeSourceError, Graph, NodeId, load_graph};

/// Edge source over a fixed list of raw pairs.
#[derive(Clone)]
pub struct Pairs {
    pairs: Vec<(u64, u64)>,
}

impl Pairs {
    #[must_use]
    pub fn new(pairs: Vec<(u64, u64)>) -> Self {
        Self { pairs }
    }

    /// Loads the pairs as a graph, panicking on malformed input.
    #[must_use]
    pub fn graph(&self) -> Graph {
        load_graph(self).expect("fixture pairs must load")
    }
}

impl EdgeSource for Pairs {
    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn name(&self) -> &str {
        "pairs"
    }

    fn observation(&self, index: usize) -> Result<(NodeId, NodeId), EdgeSourceError> {
        let &(left, right) = self
            .pairs
            .get(index)
            .ok_or(EdgeSourceError::OutOfBounds { index })?;
        Ok((NodeId::new(left), NodeId::new(right)))
    }
}
