use crate::core::error::QuboError;
use crate::core::matrix::Matrix;
use crate::graph::simplify::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An elementary cycle carrying a uniform amount of flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowCycle {
    /// Flow sent around the cycle (the minimum over its arcs).
    pub amount: u64,
    /// Vertices in walk order, as indices of the input graph.
    /// The last vertex has an arc back to the first.
    pub vertices: Vec<usize>,
}

impl FlowCycle {
    /// Number of vertices (and arcs) in this cycle.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Arcs of the cycle as `(from, to)` pairs, closing arc included.
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let k = self.vertices.len();
        (0..k).map(move |p| (self.vertices[p], self.vertices[(p + 1) % k]))
    }
}

impl fmt::Display for FlowCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flow of {} along ", self.amount)?;
        for v in &self.vertices {
            write!(f, "{} -> ", v)?;
        }
        match self.vertices.first() {
            Some(first) => write!(f, "{}", first),
            None => Ok(()),
        }
    }
}

/// First vertex whose inflow and outflow differ, or that carries flow on a
/// self-loop. `None` means `flow` is a circulation.
pub fn conservation_violation(flow: &Matrix<u64>) -> Option<(usize, u64, u64)> {
    (0..flow.size()).find_map(|v| {
        let inflow = flow.column_sum(v);
        let outflow = flow.row_sum(v);
        if inflow != outflow || flow[(v, v)] > 0 {
            Some((v, inflow, outflow))
        } else {
            None
        }
    })
}

/// True iff every vertex has equal inflow and outflow and no self-loop
/// carries flow.
pub fn is_circulation(flow: &Matrix<u64>) -> bool {
    conservation_violation(flow).is_none()
}

/// Peel a circulation into elementary flow-carrying cycles.
///
/// # Algorithm
///
/// 1. Start at the first vertex (row-major) with a positive outgoing arc.
/// 2. Walk along the first positive outgoing arc of each vertex until a
///    vertex already on the walk is reached again.
/// 3. The suffix of the walk from that vertex is a cycle; its amount is the
///    minimum flow on its arcs, which is subtracted from each of them.
/// 4. Repeat until no positive arc remains.
///
/// Conservation guarantees that every vertex entered on a positive arc also
/// has a positive outgoing arc, and each round removes at least one unit of
/// flow, so the loop terminates. `flow` is left untouched; vertices in the
/// result are mapped back through `index_map`.
pub fn decompose(flow: &Matrix<u64>, index_map: &IndexMap) -> Result<Vec<FlowCycle>, QuboError> {
    if let Some((vertex, inflow, outflow)) = conservation_violation(flow) {
        return Err(QuboError::NotCirculation {
            vertex: index_map.original(vertex),
            inflow,
            outflow,
        });
    }

    let n = flow.size();
    let mut residual = flow.clone();
    let mut on_walk = vec![false; n];
    let mut walk: Vec<usize> = Vec::new();
    let mut cycles = Vec::new();

    loop {
        let Some((start, _, _)) = residual.positive_entries().next() else {
            break;
        };
        let mut u = start;
        while !on_walk[u] {
            on_walk[u] = true;
            walk.push(u);
            if let Some(next) = residual.row(u).iter().position(|&f| f > 0) {
                u = next;
            }
        }

        let from = walk.iter().position(|&v| v == u).unwrap_or(0);
        let cycle = &walk[from..];
        let amount = (0..cycle.len())
            .map(|p| residual[(cycle[p], cycle[(p + 1) % cycle.len()])])
            .min()
            .unwrap_or(0);
        for p in 0..cycle.len() {
            residual[(cycle[p], cycle[(p + 1) % cycle.len()])] -= amount;
        }

        let report = FlowCycle {
            amount,
            vertices: cycle.iter().map(|&v| index_map.original(v)).collect(),
        };
        debug!("{}", report);
        cycles.push(report);

        for &v in &walk {
            on_walk[v] = false;
        }
        walk.clear();
    }

    Ok(cycles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_triangle() {
        let flow = Matrix::from_rows(vec![vec![0, 2, 0], vec![0, 0, 2], vec![2, 0, 0]]).unwrap();
        let cycles = decompose(&flow, &IndexMap::identity(3)).unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].amount, 2);
        assert_eq!(cycles[0].vertices, vec![0, 1, 2]);
        assert_eq!(cycles[0].to_string(), "Flow of 2 along 0 -> 1 -> 2 -> 0");
    }

    #[test]
    fn test_two_cycles_sharing_a_vertex() {
        // 0 <-> 1 carrying 1, 0 -> 2 -> 0 carrying 3
        let flow = Matrix::from_rows(vec![vec![0, 1, 3], vec![1, 0, 0], vec![3, 0, 0]]).unwrap();
        let cycles = decompose(&flow, &IndexMap::identity(3)).unwrap();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].amount, 1);
        assert_eq!(cycles[0].vertices, vec![0, 1]);
        assert_eq!(cycles[1].amount, 3);
        assert_eq!(cycles[1].vertices, vec![0, 2]);
    }

    #[test]
    fn test_walk_prefix_is_dropped() {
        // the walk 0 -> 1 -> 2 closes on 1, so 0 is not part of the first cycle
        let flow = Matrix::from_rows(vec![
            vec![0, 1, 0, 0],
            vec![0, 0, 2, 0],
            vec![0, 1, 0, 1],
            vec![1, 0, 0, 0],
        ])
        .unwrap();
        let cycles = decompose(&flow, &IndexMap::identity(4)).unwrap();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].vertices, vec![1, 2]);
        assert_eq!(cycles[0].amount, 1);
        assert_eq!(cycles[1].vertices, vec![0, 1, 2, 3]);
        let total: u64 = cycles.iter().map(|c| c.amount * c.len() as u64).sum();
        assert_eq!(total, flow.total());
    }

    #[test]
    fn test_indices_mapped_back() {
        let flow = Matrix::from_rows(vec![vec![0, 4], vec![4, 0]]).unwrap();
        let cycles = decompose(&flow, &IndexMap::new(vec![3, 7])).unwrap();
        assert_eq!(cycles[0].vertices, vec![3, 7]);
        assert_eq!(cycles[0].arcs().collect::<Vec<_>>(), vec![(3, 7), (7, 3)]);
    }

    #[test]
    fn test_zero_flow_reports_nothing() {
        let flow = Matrix::<u64>::zeros(3);
        assert!(decompose(&flow, &IndexMap::identity(3)).unwrap().is_empty());
    }

    #[test]
    fn test_non_circulation_rejected() {
        let flow = Matrix::from_rows(vec![vec![0, 1], vec![0, 0]]).unwrap();
        let err = decompose(&flow, &IndexMap::identity(2)).unwrap_err();
        assert!(matches!(
            err,
            QuboError::NotCirculation {
                vertex: 0,
                inflow: 0,
                outflow: 1
            }
        ));
        assert!(!is_circulation(&flow));
    }
}
