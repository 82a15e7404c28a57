use crate::core::config::QuboConfig;
use crate::core::error::QuboError;
use crate::core::graph::FlowGraph;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Mean of `values` after repeatedly discarding 3σ outliers.
///
/// Each round computes the mean and population standard deviation of the
/// remaining values, then drops the maximum if it lies above `mean + 3σ`,
/// or else the minimum if it lies below `mean - 3σ`. Stops when neither
/// extreme is an outlier. An empty input yields 0.
///
/// # Examples
///
/// ```
/// use cycle_qubo::qubo::scaling::trimmed_mean;
///
/// let mut weights = vec![2; 10];
/// weights.push(100);
/// assert_eq!(trimmed_mean(&weights), 2.0);
/// ```
pub fn trimmed_mean(values: &[u64]) -> f64 {
    let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mut kept: &[f64] = &sorted;

    loop {
        let Some((&low, &high)) = kept.first().zip(kept.last()) else {
            return 0.0;
        };
        let k = kept.len() as f64;
        let mean = kept.iter().sum::<f64>() / k;
        if kept.len() <= 1 {
            return mean;
        }
        let variance = kept.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / k;
        let stddev = variance.sqrt();

        if high > mean + 3.0 * stddev {
            debug!("Trimming high weight {} (mean {:.3}, stddev {:.3})", high, mean, stddev);
            kept = &kept[..kept.len() - 1];
        } else if low < mean - 3.0 * stddev {
            debug!("Trimming low weight {} (mean {:.3}, stddev {:.3})", low, mean, stddev);
            kept = &kept[1..];
        } else {
            return mean;
        }
    }
}

/// Penalty strength actually used by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenaltyParameters {
    /// Base multiplier, already divided by one `ring_factor`.
    pub multiplier: f64,
    /// Per-ring decay base.
    pub ring_factor: f64,
}

impl PenaltyParameters {
    /// Multiplier applied to the conservation penalties of a vertex at `ring`.
    pub fn local_multiplier(&self, ring: u32) -> f64 {
        self.multiplier * self.ring_factor.powi(ring as i32)
    }
}

/// Derive the penalty parameters for a (reduced) graph.
///
/// Unless the configured multiplier is absolute it is scaled by the trimmed
/// mean of the positive arc weights. The ring factor is
/// `ring_ratio^(1/max_ring)`, and the multiplier is divided by it once so
/// that vertices at ring 1 get exactly the base multiplier. Across
/// `max_ring` levels the local multiplier changes by `ring_ratio` overall.
///
/// The configuration is validated first, so a ring ratio that would turn
/// the multiplier into `inf` or `NaN` is an error.
pub fn penalty_parameters(
    config: &QuboConfig,
    graph: &FlowGraph,
    max_ring: u32,
) -> Result<PenaltyParameters, QuboError> {
    config.validate()?;

    let mut multiplier = config.penalty_multiplier;
    if !config.absolute_multiplier {
        let average = trimmed_mean(&graph.positive_weights());
        info!("Adjusted average of the weights (scale for the penalties): {:.2}", average);
        multiplier *= average;
    }

    let ring_factor = if max_ring == 0 {
        1.0
    } else {
        config.ring_ratio.powf(1.0 / max_ring as f64)
    };

    Ok(PenaltyParameters {
        multiplier: multiplier / ring_factor,
        ring_factor,
    })
}
