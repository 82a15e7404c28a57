use crate::core::matrix::Matrix;
use log::debug;

/// Per-vertex depth labels used to decay penalty strength.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingLabels {
    labels: Vec<u32>,
    max: u32,
}

impl RingLabels {
    /// Label of vertex `i` (always ≥ 1).
    pub fn label(&self, i: usize) -> u32 {
        self.labels[i]
    }

    /// Largest label; 0 only for a graph without vertices.
    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.labels
    }
}

/// Assign each vertex a ring label by layered expansion from a root.
///
/// Vertex 0 gets label 1. Every unlabelled neighbour (in either arc
/// direction) of a vertex labelled `r` gets `r + 1`. When a round labels
/// nothing while vertices remain, the lowest unlabelled vertex becomes the
/// root of a new cluster with label 1 and expansion restarts from label 1.
///
/// # Examples
///
/// ```
/// use cycle_qubo::core::matrix::Matrix;
/// use cycle_qubo::graph::rings::label_rings;
///
/// let caps = Matrix::from_rows(vec![vec![0, 1, 0], vec![0, 0, 1], vec![1, 0, 0]]).unwrap();
/// let rings = label_rings(&caps);
/// assert_eq!(rings.as_slice(), &[1, 2, 2]);
/// assert_eq!(rings.max(), 2);
/// ```
pub fn label_rings(capacity: &Matrix<u64>) -> RingLabels {
    let n = capacity.size();
    if n == 0 {
        return RingLabels {
            labels: Vec::new(),
            max: 0,
        };
    }

    let mut labels = vec![0u32; n];
    labels[0] = 1;
    let mut unlabelled = n - 1;
    let mut ring = 1u32;

    while unlabelled > 0 {
        let mut grew = false;
        for i in 0..n {
            if labels[i] != ring {
                continue;
            }
            for j in 0..n {
                if labels[j] == 0 && (capacity[(i, j)] > 0 || capacity[(j, i)] > 0) {
                    labels[j] = ring + 1;
                    unlabelled -= 1;
                    grew = true;
                }
            }
        }

        if grew {
            ring += 1;
        } else {
            if let Some(root) = labels.iter().position(|&l| l == 0) {
                debug!("Ring labelling restarts at vertex {}", root);
                labels[root] = 1;
                unlabelled -= 1;
            }
            ring = 1;
        }
    }

    let max = labels.iter().copied().max().unwrap_or(0);
    RingLabels { labels, max }
}
