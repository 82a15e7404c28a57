use crate::core::config::Encoding;
use crate::core::error::QuboError;
use crate::core::graph::FlowGraph;
use crate::core::matrix::Matrix;
use log::info;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Number of binary digits needed to represent `0..=bound`.
pub fn bit_count(bound: u64) -> usize {
    (u64::BITS - bound.leading_zeros()) as usize
}

/// Digit weights of the bounded binary encoding of `0..=bound`.
///
/// For `k = bit_count(bound)` the digits are `1, 2, …, 2^(k-2)` followed by
/// a closing digit `bound - 2^(k-1) + 1`, so every value in `0..=bound` is a
/// subset sum and nothing above `bound` is.
///
/// # Examples
///
/// ```
/// use cycle_qubo::qubo::encoding::binary_weights;
///
/// assert_eq!(binary_weights(0), Vec::<u64>::new());
/// assert_eq!(binary_weights(1), vec![1]);
/// assert_eq!(binary_weights(5), vec![1, 2, 2]);
/// assert_eq!(binary_weights(7), vec![1, 2, 4]);
/// ```
pub fn binary_weights(bound: u64) -> Vec<u64> {
    let k = bit_count(bound);
    if k == 0 {
        return Vec::new();
    }
    let mut weights: Vec<u64> = (0..k - 1).map(|p| 1u64 << p).collect();
    weights.push(bound - (1u64 << (k - 1)) + 1);
    weights
}

/// Digits of `value` in the encoding of [`binary_weights`]`(bound)`, or
/// `None` if `value > bound`.
pub fn encode_value(value: u64, bound: u64) -> Option<Vec<bool>> {
    if value > bound {
        return None;
    }
    let weights = binary_weights(bound);
    let mut digits = vec![false; weights.len()];
    let Some((&closing, powers)) = weights.split_last() else {
        return Some(digits);
    };
    let mut rest = value;
    let power_sum: u64 = powers.iter().sum();
    if rest > power_sum {
        digits[powers.len()] = true;
        rest -= closing;
    }
    for (p, digit) in digits.iter_mut().take(powers.len()).enumerate() {
        *digit = rest & (1 << p) != 0;
    }
    Some(digits)
}

/// One binary decision variable of the QUBO.
///
/// `origin == destination` marks a vertex variable, contributing `weight`
/// to that vertex's through-flow; otherwise it contributes `weight` to the
/// flow on arc `origin → destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub origin: usize,
    pub destination: usize,
    pub weight: u64,
}

impl VariableSpec {
    pub fn is_vertex(&self) -> bool {
        self.origin == self.destination
    }
}

/// The contiguous run of variables encoding one arc's flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcRun {
    pub origin: usize,
    pub destination: usize,
    pub bound: u64,
    pub range: Range<usize>,
}

/// Ordered list of QUBO variables; a variable's position is its QUBO index.
///
/// Vertex variables come first, grouped by vertex in vertex order, then arc
/// variables grouped by arc in row-major order. Built once per reduced
/// graph and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationTable {
    variables: Vec<VariableSpec>,
    vertex_bounds: Vec<u64>,
    vertex_runs: Vec<Range<usize>>,
    arc_runs: Vec<ArcRun>,
}

impl TranslationTable {
    /// Lay out the variables for `graph` under the given encoding.
    ///
    /// Vertex bounds are min(out-capacity, in-capacity), or 1 when vertices
    /// are disaggregated. Arc bounds are the arc capacity, or 1 when arcs
    /// are disaggregated.
    pub fn build(graph: &FlowGraph, encoding: Encoding) -> Result<Self, QuboError> {
        let n = graph.vertex_count();
        let vertex_bounds: Vec<u64> = (0..n)
            .map(|i| {
                if encoding.vertices_disaggregated() {
                    1
                } else {
                    graph.vertex_cap(i)
                }
            })
            .collect();
        let arc_bounds: Vec<(usize, usize, u64)> = graph
            .capacity()
            .positive_entries()
            .map(|(i, j, c)| (i, j, if encoding.arcs_disaggregated() { 1 } else { c }))
            .collect();

        let expected: usize = vertex_bounds.iter().map(|&b| bit_count(b)).sum::<usize>()
            + arc_bounds.iter().map(|&(_, _, b)| bit_count(b)).sum::<usize>();

        let mut variables = Vec::with_capacity(expected);
        let mut vertex_runs = Vec::with_capacity(n);
        for (v, &bound) in vertex_bounds.iter().enumerate() {
            let start = variables.len();
            variables.extend(binary_weights(bound).into_iter().map(|weight| VariableSpec {
                origin: v,
                destination: v,
                weight,
            }));
            vertex_runs.push(start..variables.len());
        }
        let vertex_variables = variables.len();

        let mut arc_runs = Vec::with_capacity(arc_bounds.len());
        for (origin, destination, bound) in arc_bounds {
            let start = variables.len();
            variables.extend(binary_weights(bound).into_iter().map(|weight| VariableSpec {
                origin,
                destination,
                weight,
            }));
            arc_runs.push(ArcRun {
                origin,
                destination,
                bound,
                range: start..variables.len(),
            });
        }

        if variables.len() < expected {
            return Err(QuboError::TranslationUnderflow {
                expected,
                actual: variables.len(),
            });
        }

        info!(
            "Translation table: {} vertex variables, {} arc variables over {} arcs",
            vertex_variables,
            variables.len() - vertex_variables,
            arc_runs.len()
        );

        Ok(Self {
            variables,
            vertex_bounds,
            vertex_runs,
            arc_runs,
        })
    }

    /// Total number of QUBO variables.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Number of vertices of the graph the table was built for.
    pub fn vertex_count(&self) -> usize {
        self.vertex_runs.len()
    }

    pub fn variables(&self) -> &[VariableSpec] {
        &self.variables
    }

    pub fn get(&self, index: usize) -> Option<&VariableSpec> {
        self.variables.get(index)
    }

    /// Indices of the variables encoding vertex `v`'s through-flow.
    pub fn vertex_run(&self, v: usize) -> Range<usize> {
        self.vertex_runs[v].clone()
    }

    /// Upper bound on vertex `v`'s through-flow.
    pub fn vertex_bound(&self, v: usize) -> u64 {
        self.vertex_bounds[v]
    }

    /// Arc runs in row-major arc order.
    pub fn arc_runs(&self) -> &[ArcRun] {
        &self.arc_runs
    }

    /// Encode integer through-flows and arc flows as a 0/1 assignment.
    ///
    /// Returns `None` when a value exceeds its variable bound or flow sits on
    /// an arc that has no variables.
    pub fn encode(&self, through: &[u64], flow: &Matrix<u64>) -> Option<Vec<bool>> {
        if through.len() != self.vertex_count() || flow.size() != self.vertex_count() {
            return None;
        }
        let mut assignment = vec![false; self.len()];
        for (v, &value) in through.iter().enumerate() {
            let digits = encode_value(value, self.vertex_bounds[v])?;
            assignment[self.vertex_run(v)].copy_from_slice(&digits);
        }
        let mut covered = 0u64;
        for run in &self.arc_runs {
            let value = flow[(run.origin, run.destination)];
            let digits = encode_value(value, run.bound)?;
            assignment[run.range.clone()].copy_from_slice(&digits);
            covered += value;
        }
        if covered != flow.total() {
            return None;
        }
        Some(assignment)
    }
}
