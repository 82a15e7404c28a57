use crate::core::error::QuboError;
use crate::core::matrix::Matrix;
use log::warn;
use serde::{Deserialize, Serialize};

/// A capacitated, weighted directed graph over vertices `0..n`.
///
/// `capacity[(i, j)]` bounds the flow on arc `i → j` (0 means no arc) and
/// `weight[(i, j)]` is the reward per unit of flow on that arc. Both
/// matrices always have the same dimension and the capacity diagonal is
/// always zero.
///
/// # Examples
///
/// ```
/// use cycle_qubo::core::graph::FlowGraph;
///
/// let graph = FlowGraph::from_rows(
///     vec![vec![0, 2, 0], vec![0, 0, 2], vec![2, 0, 0]],
///     vec![vec![0, 3, 0], vec![0, 0, 5], vec![4, 0, 0]],
/// ).unwrap();
///
/// assert_eq!(graph.vertex_count(), 3);
/// assert_eq!(graph.arc_count(), 3);
/// assert_eq!(graph.vertex_cap(1), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFlowGraph")]
pub struct FlowGraph {
    capacity: Matrix<u64>,
    weight: Matrix<u64>,
}

#[derive(Deserialize)]
struct RawFlowGraph {
    capacity: Matrix<u64>,
    weight: Matrix<u64>,
}

impl TryFrom<RawFlowGraph> for FlowGraph {
    type Error = QuboError;

    fn try_from(raw: RawFlowGraph) -> Result<Self, Self::Error> {
        Self::new(raw.capacity, raw.weight)
    }
}

impl FlowGraph {
    /// Pair a capacity and a weight matrix.
    ///
    /// Self-loop capacities are cleared here so that no later stage has to
    /// consider them.
    pub fn new(mut capacity: Matrix<u64>, weight: Matrix<u64>) -> Result<Self, QuboError> {
        if capacity.size() != weight.size() {
            return Err(QuboError::DimensionMismatch {
                capacity: capacity.size(),
                weight: weight.size(),
            });
        }
        for i in 0..capacity.size() {
            if capacity[(i, i)] != 0 {
                warn!("Clearing self-loop capacity {} at vertex {}", capacity[(i, i)], i);
                capacity[(i, i)] = 0;
            }
        }
        Ok(Self { capacity, weight })
    }

    /// Build a graph from nested capacity and weight rows.
    pub fn from_rows(capacity: Vec<Vec<u64>>, weight: Vec<Vec<u64>>) -> Result<Self, QuboError> {
        Self::new(Matrix::from_rows(capacity)?, Matrix::from_rows(weight)?)
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.capacity.size()
    }

    /// Number of arcs with positive capacity.
    pub fn arc_count(&self) -> usize {
        self.capacity.positive_entries().count()
    }

    pub fn capacity(&self) -> &Matrix<u64> {
        &self.capacity
    }

    pub fn weight(&self) -> &Matrix<u64> {
        &self.weight
    }

    /// Total capacity leaving vertex `i`.
    pub fn out_capacity(&self, i: usize) -> u64 {
        self.capacity.row_sum(i)
    }

    /// Total capacity entering vertex `i`.
    pub fn in_capacity(&self, i: usize) -> u64 {
        self.capacity.column_sum(i)
    }

    /// Maximum through-flow of vertex `i`: min(out-capacity, in-capacity).
    pub fn vertex_cap(&self, i: usize) -> u64 {
        self.out_capacity(i).min(self.in_capacity(i))
    }

    /// The same graph with every positive capacity lowered to 1.
    pub fn with_unit_capacities(mut self) -> Self {
        for i in 0..self.vertex_count() {
            for c in self.capacity.row_mut(i) {
                *c = (*c).min(1);
            }
        }
        self
    }

    /// Weights of all arcs whose weight is strictly positive, row-major.
    pub fn positive_weights(&self) -> Vec<u64> {
        self.weight.positive_entries().map(|(_, _, w)| w).collect()
    }

    /// Reassemble matrices taken apart by [`into_parts`](Self::into_parts).
    /// Both must come from a valid graph, so neither check is repeated.
    pub(crate) fn from_parts(capacity: Matrix<u64>, weight: Matrix<u64>) -> Self {
        debug_assert_eq!(capacity.size(), weight.size());
        Self { capacity, weight }
    }

    pub(crate) fn into_parts(self) -> (Matrix<u64>, Matrix<u64>) {
        (self.capacity, self.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> FlowGraph {
        FlowGraph::from_rows(
            vec![vec![0, 2, 0], vec![0, 0, 2], vec![2, 0, 0]],
            vec![vec![0, 3, 0], vec![0, 0, 5], vec![4, 0, 0]],
        )
        .unwrap()
    }

    #[test]
    fn test_graph_basic() {
        let graph = triangle();
        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.arc_count(), 3);
        assert_eq!(graph.out_capacity(0), 2);
        assert_eq!(graph.in_capacity(0), 2);
        assert_eq!(graph.positive_weights(), vec![3, 5, 4]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = FlowGraph::from_rows(vec![vec![0, 1], vec![1, 0]], vec![vec![0]]).unwrap_err();
        assert!(matches!(
            err,
            QuboError::DimensionMismatch {
                capacity: 2,
                weight: 1
            }
        ));
    }

    #[test]
    fn test_self_loops_cleared() {
        let graph =
            FlowGraph::from_rows(vec![vec![5, 1], vec![1, 0]], vec![vec![9, 1], vec![1, 0]])
                .unwrap();
        assert_eq!(graph.capacity()[(0, 0)], 0);
        assert_eq!(graph.vertex_cap(0), 1);
    }

    #[test]
    fn test_deserialize_validates_graph() {
        let json = r#"{
            "capacity": {"size": 2, "data": [4, 1, 1, 0]},
            "weight": {"size": 2, "data": [0, 2, 3, 0]}
        }"#;
        let graph: FlowGraph = serde_json::from_str(json).unwrap();
        assert_eq!(graph.capacity()[(0, 0)], 0);
        assert_eq!(graph.vertex_cap(0), 1);

        let mismatched = r#"{
            "capacity": {"size": 2, "data": [0, 1, 1, 0]},
            "weight": {"size": 1, "data": [0]}
        }"#;
        let err = serde_json::from_str::<FlowGraph>(mismatched).unwrap_err();
        assert!(err.to_string().contains("weight matrix is 1x1"));
    }

    #[test]
    fn test_serialized_graph_reloads() {
        let graph = triangle();
        let json = serde_json::to_string(&graph).unwrap();
        let back: FlowGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, graph);
    }

    #[test]
    fn test_unit_capacities() {
        let graph = FlowGraph::from_rows(vec![vec![0, 5], vec![3, 0]], vec![vec![0, 2], vec![7, 0]])
            .unwrap()
            .with_unit_capacities();
        assert_eq!(graph.capacity().as_slice(), &[0, 1, 1, 0]);
        assert_eq!(graph.weight()[(1, 0)], 7);
    }

    #[test]
    fn test_vertex_cap_is_min_of_sums() {
        let graph = FlowGraph::from_rows(
            vec![vec![0, 5, 1], vec![1, 0, 0], vec![3, 0, 0]],
            vec![vec![0; 3]; 3],
        )
        .unwrap();
        // out 6, in 4
        assert_eq!(graph.vertex_cap(0), 4);
        assert_eq!(graph.vertex_cap(1), 1);
    }
}
