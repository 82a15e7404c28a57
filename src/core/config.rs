use crate::core::error::QuboError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How bounded integer variables are spread over binary digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    /// Vertex and arc variables use the minimal multi-bit encoding of their bound.
    #[default]
    Weighted,
    /// Every arc carries at most one unit (one bit per arc); vertices stay weighted.
    ArcDisaggregated,
    /// One bit per vertex and one bit per arc.
    Disaggregated,
}

impl Encoding {
    pub fn vertices_disaggregated(self) -> bool {
        matches!(self, Encoding::Disaggregated)
    }

    pub fn arcs_disaggregated(self) -> bool {
        matches!(self, Encoding::ArcDisaggregated | Encoding::Disaggregated)
    }
}

/// Knobs for building a QUBO instance.
///
/// # Examples
///
/// ```
/// use cycle_qubo::core::config::{Encoding, QuboConfig};
///
/// let config: QuboConfig =
///     serde_json::from_str(r#"{ "ring_ratio": 0.5, "encoding": "disaggregated" }"#).unwrap();
/// assert_eq!(config.penalty_multiplier, 1.0);
/// assert_eq!(config.encoding, Encoding::Disaggregated);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuboConfig {
    /// Penalty multiplier. Relative to the trimmed mean of the arc weights
    /// unless `absolute_multiplier` is set.
    pub penalty_multiplier: f64,
    /// Use `penalty_multiplier` as is.
    pub absolute_multiplier: bool,
    /// Ratio between the penalty strength of the deepest ring and the first.
    pub ring_ratio: f64,
    pub encoding: Encoding,
}

impl Default for QuboConfig {
    fn default() -> Self {
        Self {
            penalty_multiplier: 1.0,
            absolute_multiplier: false,
            ring_ratio: 1.0,
            encoding: Encoding::Weighted,
        }
    }
}

impl QuboConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, QuboError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the penalty coefficients `inf` or `NaN`.
    ///
    /// The ring ratio must be finite and positive; the multiplier must be
    /// finite and non-negative.
    pub fn validate(&self) -> Result<(), QuboError> {
        if !(self.ring_ratio.is_finite() && self.ring_ratio > 0.0) {
            return Err(QuboError::InvalidRingRatio(self.ring_ratio));
        }
        if !(self.penalty_multiplier.is_finite() && self.penalty_multiplier >= 0.0) {
            return Err(QuboError::InvalidMultiplier(self.penalty_multiplier));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QuboConfig::default();
        assert_eq!(config.penalty_multiplier, 1.0);
        assert!(!config.absolute_multiplier);
        assert_eq!(config.ring_ratio, 1.0);
        assert_eq!(config.encoding, Encoding::Weighted);
    }

    #[test]
    fn test_encoding_flags() {
        assert!(!Encoding::Weighted.arcs_disaggregated());
        assert!(Encoding::ArcDisaggregated.arcs_disaggregated());
        assert!(!Encoding::ArcDisaggregated.vertices_disaggregated());
        assert!(Encoding::Disaggregated.vertices_disaggregated());
        assert!(Encoding::Disaggregated.arcs_disaggregated());
    }

    #[test]
    fn test_json_round_trip() {
        let config = QuboConfig {
            penalty_multiplier: 3.5,
            absolute_multiplier: true,
            ring_ratio: 0.25,
            encoding: Encoding::ArcDisaggregated,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"arc-disaggregated\""));
        let back: QuboConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validate() {
        assert!(QuboConfig::default().validate().is_ok());

        let zero_ratio = QuboConfig {
            ring_ratio: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            zero_ratio.validate(),
            Err(QuboError::InvalidRingRatio(r)) if r == 0.0
        ));

        let negative = QuboConfig {
            penalty_multiplier: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(QuboError::InvalidMultiplier(_))
        ));
    }

    #[test]
    fn test_json_file_is_validated() {
        let path = std::env::temp_dir().join(format!("cycle-qubo-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "ring_ratio": -2.0 }"#).unwrap();
        let result = QuboConfig::from_json_file(&path);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(QuboError::InvalidRingRatio(_))));
    }
}
