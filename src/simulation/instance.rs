//! Random circulation instances for experiments and benchmarks.
//!
//! Vertices 0, 1 and 2 form a hub: arcs 1 → 0 and 2 → 0 always exist, each
//! hub vertex gets ⌊√n⌋ random outgoing arcs, and every other vertex gets a
//! few random outgoing arcs plus one arc back into the hub. This makes most
//! vertices lie on some cycle through the hub, so the simplifier keeps a
//! useful share of the graph.

use crate::core::error::QuboError;
use crate::core::graph::FlowGraph;
use crate::core::matrix::Matrix;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Capacities are drawn uniformly from this list.
pub const CAPACITY_CHOICES: [u64; 6] = [1, 1, 2, 3, 4, 6];
/// Weights of arcs with positive capacity are drawn uniformly from this list.
pub const WEIGHT_CHOICES: [u64; 6] = [2, 2, 3, 4, 6, 11];

const HUB_SIZE: usize = 3;

/// Configuration for generating a random instance.
#[derive(Debug, Clone)]
pub struct InstanceConfig {
    /// Number of vertices, at least 4.
    pub size: usize,
    /// Random outgoing arcs drawn for each non-hub vertex.
    pub arcs_per_vertex: usize,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            size: 30,
            arcs_per_vertex: 3,
        }
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, choices: &[u64]) -> u64 {
    choices[rng.gen_range(0..choices.len())]
}

/// Generate a random capacitated, weighted graph.
///
/// Random arcs that would be self-loops are skipped, and a later draw of
/// the same arc overwrites the earlier capacity.
pub fn generate_instance<R: Rng + ?Sized>(
    config: &InstanceConfig,
    rng: &mut R,
) -> Result<FlowGraph, QuboError> {
    let n = config.size;
    if n < HUB_SIZE + 1 {
        return Err(QuboError::InvalidInstanceSize(n));
    }

    let mut capacity = Matrix::<u64>::zeros(n);
    capacity[(1, 0)] = pick(rng, &CAPACITY_CHOICES);
    capacity[(2, 0)] = pick(rng, &CAPACITY_CHOICES);

    let hub_arcs = (n as f64).sqrt() as usize;
    for i in 0..HUB_SIZE {
        for _ in 0..hub_arcs {
            let j = rng.gen_range(0..n);
            if i != j {
                capacity[(i, j)] = pick(rng, &CAPACITY_CHOICES);
            }
        }
    }

    for i in HUB_SIZE..n {
        for _ in 0..config.arcs_per_vertex {
            let j = rng.gen_range(0..n);
            if i != j {
                capacity[(i, j)] = pick(rng, &CAPACITY_CHOICES);
            }
        }
        let hub = rng.gen_range(0..HUB_SIZE);
        capacity[(i, hub)] = pick(rng, &CAPACITY_CHOICES);
    }

    let mut weight = Matrix::<u64>::zeros(n);
    for (i, j, _) in capacity.positive_entries() {
        weight[(i, j)] = pick(rng, &WEIGHT_CHOICES);
    }

    let graph = FlowGraph::new(capacity, weight)?;
    info!(
        "Generated instance with {} vertices and {} arcs",
        graph.vertex_count(),
        graph.arc_count()
    );
    Ok(graph)
}

/// [`generate_instance`] with a reproducible seed.
pub fn generate_seeded(config: &InstanceConfig, seed: u64) -> Result<FlowGraph, QuboError> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_instance(config, &mut rng)
}
