//! Fusion configuration, loaded from YAML.
//!
//! ```yaml
//! cell_size: 10.0
//! noise_floor: 1.0
//! acceptance_threshold: 20.0
//! storage: sparse
//! layout: half_plane
//! metric: energy
//! max_grid_cells: 25000000
//! rotation:
//!   order: translate_zyx
//!   pitch_offset_deg: -90.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::{GridStorage, Metric};
use crate::transform::RotationConvention;
use crate::types::{
    DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_CELL_SIZE, DEFAULT_MAX_GRID_CELLS, DEFAULT_NOISE_FLOOR,
    FusionError, GridLayout,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FusionConfig {
    /// Cell edge length, same unit as the points (millimetres).
    #[serde(default = "default_cell_size", deserialize_with = "deserialize_positive")]
    pub cell_size: f64,
    /// Heights with magnitude at or below this never enter a cell.
    #[serde(
        default = "default_noise_floor",
        deserialize_with = "deserialize_non_negative"
    )]
    pub noise_floor: f64,
    /// Scans scoring at or above this against the combined grid are rejected.
    #[serde(
        default = "default_acceptance_threshold",
        deserialize_with = "deserialize_positive"
    )]
    pub acceptance_threshold: f64,
    /// Scans that would grow the fused grid past this many cells are
    /// recorded as failed instead of being fused.
    #[serde(default = "default_max_grid_cells")]
    pub max_grid_cells: u64,
    #[serde(default)]
    pub storage: GridStorage,
    #[serde(default)]
    pub layout: GridLayout,
    #[serde(default)]
    pub metric: Metric,
    #[serde(default)]
    pub rotation: RotationConvention,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            noise_floor: DEFAULT_NOISE_FLOOR,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            max_grid_cells: DEFAULT_MAX_GRID_CELLS,
            storage: GridStorage::default(),
            layout: GridLayout::default(),
            metric: Metric::default(),
            rotation: RotationConvention::default(),
        }
    }
}

impl FusionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FusionError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, FusionError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, FusionError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check the numeric invariants, for configs built in code.
    pub fn validate(&self) -> Result<(), FusionError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if !(self.noise_floor.is_finite() && self.noise_floor >= 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "noise_floor must be non-negative, got {}",
                self.noise_floor
            )));
        }
        if !(self.acceptance_threshold.is_finite() && self.acceptance_threshold > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "acceptance_threshold must be positive, got {}",
                self.acceptance_threshold
            )));
        }
        if self.max_grid_cells == 0 {
            return Err(FusionError::InvalidConfig(
                "max_grid_cells must be at least 1".to_string(),
            ));
        }
        if !self.rotation.pitch_offset_deg.is_finite() {
            return Err(FusionError::InvalidConfig(
                "rotation.pitch_offset_deg must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_cell_size() -> f64 {
    DEFAULT_CELL_SIZE
}

fn default_noise_floor() -> f64 {
    DEFAULT_NOISE_FLOOR
}

fn default_acceptance_threshold() -> f64 {
    DEFAULT_ACCEPTANCE_THRESHOLD
}

fn default_max_grid_cells() -> u64 {
    DEFAULT_MAX_GRID_CELLS
}

fn deserialize_positive<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom("value must be finite and > 0"))
    }
}

fn deserialize_non_negative<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom("value must be finite and >= 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::RotationOrder;

    #[test]
    fn empty_document_uses_defaults() {
        let config = FusionConfig::from_yaml("{}").unwrap();
        assert_eq!(config, FusionConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let yaml = r#"
cell_size: 5
noise_floor: 2.5
acceptance_threshold: 35
max_grid_cells: 1000
storage: sparse
layout: centered
metric: rms
rotation:
  order: translate_xyz
  pitch_offset_deg: -90
  negate_translation: true
"#;
        let config = FusionConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.cell_size, 5.0);
        assert_eq!(config.noise_floor, 2.5);
        assert_eq!(config.acceptance_threshold, 35.0);
        assert_eq!(config.max_grid_cells, 1000);
        assert_eq!(config.storage, GridStorage::Sparse);
        assert_eq!(config.layout, GridLayout::Centered);
        assert_eq!(config.metric, Metric::Rms);
        assert_eq!(config.rotation.order, RotationOrder::TranslateXyz);
        assert_eq!(config.rotation.pitch_offset_deg, -90.0);
        assert!(!config.rotation.negate_pitch);
        assert!(config.rotation.negate_translation);
    }

    #[test]
    fn rejects_invalid_numbers() {
        assert!(matches!(
            FusionConfig::from_yaml("cell_size: 0"),
            Err(FusionError::Yaml(_))
        ));
        assert!(FusionConfig::from_yaml("noise_floor: -1").is_err());
        assert!(FusionConfig::from_yaml("acceptance_threshold: -3").is_err());
        assert!(FusionConfig::from_yaml("max_grid_cells: 0").is_err());
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(FusionConfig::from_yaml("cel_size: 10").is_err());
    }

    #[test]
    fn yaml_round_trip() {
        let config = FusionConfig {
            cell_size: 2.0,
            storage: GridStorage::Sparse,
            ..Default::default()
        };
        let parsed = FusionConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn validate_catches_code_built_configs() {
        let config = FusionConfig {
            cell_size: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FusionError::InvalidConfig(_))
        ));
    }
}
