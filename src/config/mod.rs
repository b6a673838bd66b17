//! Configuration types for the GCP filter.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a filter run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Maximum per-axis coordinate difference for a match, in CRS units
    /// (meters for projected survey data)
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Abort on the first malformed row instead of skipping it
    #[serde(default)]
    pub strict: bool,
}

fn default_tolerance() -> f64 {
    0.001
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            strict: false,
        }
    }
}

/// Configuration for match overview plots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Maximum GCP rows to plot (subsamples if exceeded)
    #[serde(default = "default_plot_max_points")]
    pub max_points: usize,

    /// Alpha/transparency for GCP row markers
    #[serde(default = "default_plot_alpha")]
    pub alpha: f32,
}

fn default_plot_max_points() -> usize {
    100_000
}

fn default_plot_alpha() -> f32 {
    0.8
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            max_points: default_plot_max_points(),
            alpha: default_plot_alpha(),
        }
    }
}

/// Main application configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub plot: PlotConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_config() {
        let config = FilterConfig::default();
        assert_eq!(config.tolerance, 0.001);
        assert!(!config.strict);
    }

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();
        assert_eq!(config.filter.tolerance, 0.001);
        assert_eq!(config.plot.max_points, 100_000);
        assert_eq!(config.plot.alpha, 0.8);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: AppConfig = serde_yaml::from_str("filter:\n  tolerance: 0.05\n").unwrap();
        assert_eq!(config.filter.tolerance, 0.05);
        assert!(!config.filter.strict);
        assert_eq!(config.plot.max_points, 100_000);
    }

    #[test]
    fn test_yaml_round_trip() {
        use tempfile::NamedTempFile;

        let mut config = AppConfig::default();
        config.filter.tolerance = 0.01;
        config.filter.strict = true;

        let file = NamedTempFile::new().unwrap();
        config.to_yaml(file.path()).unwrap();

        let loaded = AppConfig::from_yaml(file.path()).unwrap();
        assert_eq!(loaded.filter.tolerance, 0.01);
        assert!(loaded.filter.strict);
    }
}
