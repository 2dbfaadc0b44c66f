/// Fixed, undirected tile adjacency in compressed sparse row format.
#[derive(Debug, Clone)]
pub(crate) struct Adjacency {
    offsets: Vec<u32>,
    edges: Vec<u32>,
}

impl Adjacency {
    /// Construct from per-node neighbor lists.
    pub(crate) fn new(edges: &[Vec<u32>]) -> Self {
        Self {
            offsets: std::iter::once(0u32).chain(
                edges.iter()
                    .map(|v| v.len() as u32)
                    .scan(0u32, |acc, len| {*acc += len; Some(*acc)})
            ).collect::<Vec<u32>>(),
            edges: edges.iter().flatten().copied().collect(),
        }
    }

    /// Get the number of nodes.
    #[inline] pub(crate) fn node_count(&self) -> usize { self.offsets.len() - 1 }

    /// Get the number of directed edge entries (twice the undirected count).
    #[inline] pub(crate) fn edge_count(&self) -> usize { self.edges.len() }

    #[inline]
    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize .. self.offsets[node + 1] as usize
    }

    /// Get the degree (number of present neighbors) of a node.
    #[inline] pub(crate) fn degree(&self, node: usize) -> usize { self.range(node).len() }

    /// Get an iterator over the neighbors of a node.
    #[inline]
    pub(crate) fn edges(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.range(node).map(move |v| self.edges[v] as usize)
    }
}
