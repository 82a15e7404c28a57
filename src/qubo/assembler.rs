use crate::core::config::Encoding;
use crate::core::error::QuboError;
use crate::core::graph::FlowGraph;
use crate::core::matrix::Matrix;
use crate::graph::rings::RingLabels;
use crate::qubo::encoding::TranslationTable;
use crate::qubo::scaling::PenaltyParameters;
use log::info;

/// Coefficients of a QUBO to be minimised: `E(x) = Σ_p Σ_q Q[p][q]·x_p·x_q`.
///
/// Linear terms live on the diagonal (`x² = x` for binary `x`). Off-diagonal
/// products are accumulated on both `[p][q]` and `[q][p]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuboMatrix {
    coefficients: Matrix<f64>,
}

impl QuboMatrix {
    pub fn zeros(size: usize) -> Self {
        Self {
            coefficients: Matrix::zeros(size),
        }
    }

    /// Number of variables.
    pub fn size(&self) -> usize {
        self.coefficients.size()
    }

    pub fn get(&self, p: usize, q: usize) -> f64 {
        self.coefficients[(p, q)]
    }

    pub fn coefficients(&self) -> &Matrix<f64> {
        &self.coefficients
    }

    /// Energy of a 0/1 assignment.
    pub fn energy(&self, assignment: &[bool]) -> f64 {
        let set: Vec<usize> = assignment
            .iter()
            .enumerate()
            .filter(|&(_, &x)| x)
            .map(|(p, _)| p)
            .collect();
        let mut energy = 0.0;
        for &p in &set {
            let row = self.coefficients.row(p);
            for &q in &set {
                energy += row[q];
            }
        }
        energy
    }

    /// Add `multiplier · (Σ c_p x_p)²` for the given `(index, c_p)` terms.
    pub fn add_squared_penalty(&mut self, terms: &[(usize, f64)], multiplier: f64) {
        for &(p, cp) in terms {
            let row = self.coefficients.row_mut(p);
            for &(q, cq) in terms {
                row[q] += multiplier * cp * cq;
            }
        }
    }

    fn add_linear(&mut self, p: usize, coefficient: f64) {
        self.coefficients[(p, p)] += coefficient;
    }
}

/// Build the QUBO for a reduced graph together with its translation table.
///
/// # Algorithm
///
/// 1. Lay out the variables ([`TranslationTable::build`]).
/// 2. Objective: every arc variable of weight `b` on arc `(i, j)` adds
///    `-weight[i][j] · b` to its diagonal entry, so higher flow on
///    higher-reward arcs lowers the energy.
/// 3. Conservation, outflow side: for each vertex `v`, the through-flow
///    digits minus the digits of `v`'s outgoing arcs are squared and added
///    with the vertex's local multiplier.
/// 4. Conservation, inflow side: the same with `v`'s incoming arcs.
///
/// A circulation whose through-flows match makes both penalty sums zero;
/// any violated vertex with a positive local multiplier adds positive energy.
pub fn assemble(
    graph: &FlowGraph,
    encoding: Encoding,
    rings: &RingLabels,
    parameters: &PenaltyParameters,
) -> Result<(QuboMatrix, TranslationTable), QuboError> {
    let table = TranslationTable::build(graph, encoding)?;
    let mut qubo = QuboMatrix::zeros(table.len());
    let weight = graph.weight();

    for run in table.arc_runs() {
        let reward = weight[(run.origin, run.destination)];
        for p in run.range.clone() {
            let bit = table.variables()[p].weight;
            qubo.add_linear(p, -(reward as f64 * bit as f64));
        }
    }

    let n = table.vertex_count();
    for v in 0..n {
        let multiplier = parameters.local_multiplier(rings.label(v));
        let terms = conservation_terms(&table, v, |origin, _| origin == v);
        qubo.add_squared_penalty(&terms, multiplier);
    }
    for v in 0..n {
        let multiplier = parameters.local_multiplier(rings.label(v));
        let terms = conservation_terms(&table, v, |_, destination| destination == v);
        qubo.add_squared_penalty(&terms, multiplier);
    }

    info!("Assembled QUBO over {} variables", qubo.size());
    Ok((qubo, table))
}

/// `(index, signed digit weight)` pairs of `through(v) - Σ flow(selected arcs)`.
///
/// Digit weights go straight to `f64`; their pairwise products can exceed
/// every integer type for large capacities.
fn conservation_terms(
    table: &TranslationTable,
    v: usize,
    selects: impl Fn(usize, usize) -> bool,
) -> Vec<(usize, f64)> {
    let variables = table.variables();
    let mut terms: Vec<(usize, f64)> = table
        .vertex_run(v)
        .map(|p| (p, variables[p].weight as f64))
        .collect();
    for run in table.arc_runs() {
        if selects(run.origin, run.destination) {
            terms.extend(run.range.clone().map(|p| (p, -(variables[p].weight as f64))));
        }
    }
    terms
}
