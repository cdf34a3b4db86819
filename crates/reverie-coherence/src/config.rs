//! Engine configuration.
//!
//! Every tunable lives here so operators can adjust behavior without code
//! changes: detection thresholds, selection weights, convergence constants,
//! and the scoring timeout. Loadable from YAML; every field has a default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use reverie_core::error::CoherenceError;

/// Detection thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Token-overlap below which two statements about the same
    /// subject+attribute are treated as mutually exclusive.
    pub exclusivity_overlap_threshold: f64,
    /// Theme-overlap below which content is flagged as drifting from the
    /// active storylines.
    pub implicit_theme_overlap_threshold: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            exclusivity_overlap_threshold: 0.25,
            implicit_theme_overlap_threshold: 0.2,
        }
    }
}

/// Solution-selection weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Weight on effectiveness (w1).
    pub effectiveness_weight: f64,
    /// Weight on narrative cost (w2).
    pub cost_weight: f64,
    /// Weight on player impact (w3).
    pub impact_weight: f64,
    /// Minimum composite score a candidate must reach; below it the
    /// selector falls back to the universal candidate.
    pub acceptance_threshold: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            effectiveness_weight: 0.6,
            cost_weight: 0.25,
            impact_weight: 0.15,
            acceptance_threshold: 0.0,
        }
    }
}

/// Convergence scoring constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvergenceConfig {
    /// Base score with no shared elements.
    pub base: f64,
    /// Score added per shared participant or theme.
    pub weight_per_point: f64,
    /// Score at or above which threads count as convergent.
    pub threshold: f64,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            base: 0.4,
            weight_per_point: 0.2,
            threshold: 0.7,
        }
    }
}

/// Scoring-strategy call limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// How long one pluggable-scorer call may take before the rule-based
    /// fallback takes over.
    pub timeout_ms: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { timeout_ms: 2_000 }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoherenceConfig {
    /// Detection thresholds.
    pub detection: DetectionConfig,
    /// Selection weights.
    pub selection: SelectionConfig,
    /// Convergence constants.
    pub convergence: ConvergenceConfig,
    /// Scoring limits.
    pub scoring: ScoringConfig,
}

impl CoherenceConfig {
    /// Parses a configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns `CoherenceError::Config` when the YAML does not parse.
    pub fn from_yaml(yaml: &str) -> Result<Self, CoherenceError> {
        serde_yaml::from_str(yaml).map_err(|e| CoherenceError::Config(e.to_string()))
    }

    /// Loads a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `CoherenceError::Config` when the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self, CoherenceError> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| CoherenceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&yaml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let config = CoherenceConfig::default();

        assert!((config.selection.effectiveness_weight - 0.6).abs() < f64::EPSILON);
        assert!((config.selection.cost_weight - 0.25).abs() < f64::EPSILON);
        assert!((config.selection.impact_weight - 0.15).abs() < f64::EPSILON);
        assert!((config.convergence.base - 0.4).abs() < f64::EPSILON);
        assert!((config.convergence.weight_per_point - 0.2).abs() < f64::EPSILON);
        assert!((config.convergence.threshold - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_yaml_overrides_only_named_fields() {
        let yaml = "selection:\n  effectiveness_weight: 0.5\n";

        let config = CoherenceConfig::from_yaml(yaml).unwrap();

        assert!((config.selection.effectiveness_weight - 0.5).abs() < f64::EPSILON);
        assert!((config.selection.cost_weight - 0.25).abs() < f64::EPSILON);
        assert!((config.convergence.threshold - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_yaml_is_a_config_error() {
        let result = CoherenceConfig::from_yaml(": not yaml [");

        match result.unwrap_err() {
            CoherenceError::Config(_) => {}
            other => panic!("expected Config, got {other:?}"),
        }
    }
}
