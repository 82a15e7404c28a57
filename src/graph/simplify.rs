use crate::core::graph::FlowGraph;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Maps a reduced-graph vertex index back to its index in the input graph.
///
/// Monotonic: surviving vertices keep their relative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexMap(Vec<usize>);

impl IndexMap {
    /// The map of a graph that lost no vertices.
    pub fn identity(n: usize) -> Self {
        Self((0..n).collect())
    }

    pub fn new(original: Vec<usize>) -> Self {
        Self(original)
    }

    /// Original index of reduced vertex `i`.
    pub fn original(&self, i: usize) -> usize {
        self.0[i]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

/// Output of [`simplify`]: the reduced graph and where its vertices came from.
#[derive(Debug, Clone)]
pub struct Simplified {
    pub graph: FlowGraph,
    pub index_map: IndexMap,
}

/// Tighten arc capacities to the through-flow each vertex can structurally
/// support and drop vertices that cannot carry any circulation.
///
/// # Algorithm
///
/// 1. Each vertex bound starts at min(out-capacity, in-capacity).
/// 2. Every arc is clamped to the bounds of both of its endpoints.
/// 3. Bounds are recomputed from the clamped matrix; if any shrank, go to 2.
/// 4. Vertices whose bound reached 0 are removed.
///
/// Bounds are non-negative integers that only decrease, so the loop
/// terminates. The clamped capacities are kept even when no vertex is
/// removed; in that case the index map is the identity.
pub fn simplify(graph: FlowGraph) -> Simplified {
    let (mut capacity, weight) = graph.into_parts();
    let n = capacity.size();

    let mut bounds: Vec<u64> = (0..n)
        .map(|i| capacity.row_sum(i).min(capacity.column_sum(i)))
        .collect();

    let mut round = 0usize;
    loop {
        round += 1;
        for (i, &bound) in bounds.iter().enumerate() {
            for j in 0..n {
                if capacity[(i, j)] > bound {
                    capacity[(i, j)] = bound;
                }
                if capacity[(j, i)] > bound {
                    capacity[(j, i)] = bound;
                }
            }
        }

        let mut changed = false;
        for (i, bound) in bounds.iter_mut().enumerate() {
            let tightened = capacity.row_sum(i).min(capacity.column_sum(i));
            if tightened < *bound {
                *bound = tightened;
                changed = true;
            }
        }
        debug!("Simplifier round {}: changed = {}", round, changed);
        if !changed {
            break;
        }
    }

    let survivors: Vec<usize> = (0..n).filter(|&i| bounds[i] > 0).collect();
    info!(
        "Simplifier converged after {} rounds: {} of {} vertices remain",
        round,
        survivors.len(),
        n
    );

    if survivors.len() == n {
        return Simplified {
            graph: FlowGraph::from_parts(capacity, weight),
            index_map: IndexMap::identity(n),
        };
    }

    let reduced = FlowGraph::from_parts(capacity.select(&survivors), weight.select(&survivors));
    Simplified {
        graph: reduced,
        index_map: IndexMap::new(survivors),
    }
}
