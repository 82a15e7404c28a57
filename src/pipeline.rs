//! End-to-end construction of a QUBO instance and interpretation of
//! solver output against it.

use crate::core::config::QuboConfig;
use crate::core::error::QuboError;
use crate::core::graph::FlowGraph;
use crate::graph::rings::{label_rings, RingLabels};
use crate::graph::simplify::{simplify, IndexMap, Simplified};
use crate::qubo::assembler::{assemble, QuboMatrix};
use crate::qubo::encoding::TranslationTable;
use crate::qubo::scaling::{penalty_parameters, PenaltyParameters};
use crate::solution::interpret::{interpret, Interpretation};
use log::info;

/// Everything produced while building an instance.
#[derive(Debug, Clone)]
pub struct BuiltInstance {
    /// The simplified graph the QUBO is defined over.
    pub reduced: FlowGraph,
    pub index_map: IndexMap,
    pub rings: RingLabels,
    pub parameters: PenaltyParameters,
    pub qubo: QuboMatrix,
    pub table: TranslationTable,
}

impl BuiltInstance {
    /// Number of QUBO variables.
    pub fn variable_count(&self) -> usize {
        self.table.len()
    }

    /// Check solver candidates against this instance.
    pub fn interpret(&self, candidates: &[Vec<bool>]) -> Result<Interpretation, QuboError> {
        interpret(candidates, &self.table, &self.reduced, &self.index_map)
    }
}

/// Runs simplification, ring labelling, penalty scaling and assembly.
pub struct Pipeline;

impl Pipeline {
    /// Build the QUBO instance for `graph`.
    ///
    /// Every stage is deterministic, so building twice from the same graph
    /// and configuration yields the same translation table. Solver output
    /// can therefore be interpreted in a later run.
    pub fn build(graph: FlowGraph, config: &QuboConfig) -> Result<BuiltInstance, QuboError> {
        let Simplified { graph: reduced, index_map } = simplify(graph);
        info!(
            "After pre-processing, the number of vertices is {}",
            reduced.vertex_count()
        );

        let rings = label_rings(reduced.capacity());
        let parameters = penalty_parameters(config, &reduced, rings.max())?;
        info!(
            "Penalty multiplier {:.4}, ring factor {:.4} over {} rings",
            parameters.multiplier,
            parameters.ring_factor,
            rings.max()
        );

        let (qubo, table) = assemble(&reduced, config.encoding, &rings, &parameters)?;

        Ok(BuiltInstance {
            reduced,
            index_map,
            rings,
            parameters,
            qubo,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Encoding;

    fn triangle_with_tail() -> FlowGraph {
        // 0 -> 1 -> 2 -> 0 plus a dead end 1 -> 3
        FlowGraph::from_rows(
            vec![
                vec![0, 2, 0, 0],
                vec![0, 0, 2, 1],
                vec![2, 0, 0, 0],
                vec![0, 0, 0, 0],
            ],
            vec![
                vec![0, 3, 0, 0],
                vec![0, 0, 5, 9],
                vec![4, 0, 0, 0],
                vec![0, 0, 0, 0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_build_drops_dead_end() {
        let built = Pipeline::build(triangle_with_tail(), &QuboConfig::default()).unwrap();
        assert_eq!(built.reduced.vertex_count(), 3);
        assert_eq!(built.index_map.as_slice(), &[0, 1, 2]);
        assert_eq!(built.variable_count(), 12);
        assert_eq!(built.qubo.size(), 12);
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = QuboConfig {
            encoding: Encoding::ArcDisaggregated,
            ring_ratio: 0.5,
            ..Default::default()
        };
        let a = Pipeline::build(triangle_with_tail(), &config).unwrap();
        let b = Pipeline::build(triangle_with_tail(), &config).unwrap();
        assert_eq!(a.table, b.table);
        assert_eq!(a.qubo, b.qubo);
    }

    #[test]
    fn test_interpret_full_flow() {
        let built = Pipeline::build(triangle_with_tail(), &QuboConfig::default()).unwrap();
        let full = vec![true; built.variable_count()];
        let result = built.interpret(&[full]).unwrap();
        match result {
            Interpretation::Feasible { value, cycles, .. } => {
                assert_eq!(value, 24);
                assert_eq!(cycles.len(), 1);
            }
            other => panic!("expected a feasible result, got {:?}", other),
        }
    }

    #[test]
    fn test_large_capacities_build() {
        let big = 1u64 << 33;
        let graph =
            FlowGraph::from_rows(vec![vec![0, big], vec![big, 0]], vec![vec![0, 1], vec![1, 0]])
                .unwrap();
        let built = Pipeline::build(graph, &QuboConfig::default()).unwrap();
        // 34 digits for each of two vertices and two arcs
        assert_eq!(built.variable_count(), 4 * 34);
        assert_eq!(built.qubo.energy(&vec![false; built.variable_count()]), 0.0);

        let full = vec![true; built.variable_count()];
        match built.interpret(&[full]).unwrap() {
            Interpretation::Feasible { value, .. } => assert_eq!(value, 2 * big),
            other => panic!("expected a feasible result, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_invalid_ring_ratio() {
        let config = QuboConfig {
            ring_ratio: 0.0,
            ..Default::default()
        };
        let err = Pipeline::build(triangle_with_tail(), &config).unwrap_err();
        assert!(matches!(err, QuboError::InvalidRingRatio(r) if r == 0.0));
    }

    #[test]
    fn test_empty_graph_builds_empty_instance() {
        let graph = FlowGraph::from_rows(vec![vec![0, 1], vec![0, 0]], vec![vec![0; 2]; 2]).unwrap();
        let built = Pipeline::build(graph, &QuboConfig::default()).unwrap();
        assert_eq!(built.variable_count(), 0);
        assert!(built.index_map.is_empty());
    }
}
