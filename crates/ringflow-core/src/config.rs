//! Configuration loading and typed config structures for the ringflow
//! engine.
//!
//! The configuration lives in `ringflow-config.yaml` next to the binary's
//! working directory. Every field has a default, so an empty file (or no
//! file at all) yields a usable configuration.

use std::path::Path;

use ringflow_types::ReportPeriod;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Environment variable overriding `logging.level`.
pub const ENV_LOG_LEVEL: &str = "RINGFLOW_LOG_LEVEL";

/// Environment variable overriding `report.period`.
pub const ENV_REPORT_PERIOD: &str = "RINGFLOW_REPORT_PERIOD";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration, mirroring `ringflow-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Adjacency graph builder settings.
    #[serde(default)]
    pub adjacency: AdjacencyConfig,

    /// Graph walk limits.
    #[serde(default)]
    pub navigation: NavigationConfig,

    /// Standoff distances and fallback policies.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Report layout.
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override values from the environment when set.
    ///
    /// - `RINGFLOW_LOG_LEVEL` overrides `logging.level`
    /// - `RINGFLOW_REPORT_PERIOD` overrides `report.period`
    ///
    /// `lookup` resolves a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the report period is unknown.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(period) = lookup(ENV_REPORT_PERIOD) {
            self.report.period = period
                .parse()
                .map_err(|reason| ConfigError::Invalid { reason })?;
        }
        Ok(())
    }

    /// Check that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let radius = self.adjacency.search_radius;
        if !(radius.is_finite() && radius > 0.0) {
            return Err(invalid(format!("adjacency.search_radius must be positive, got {radius}")));
        }
        if self.navigation.max_walk_steps == 0 {
            return Err(invalid("navigation.max_walk_steps must be at least 1".to_owned()));
        }
        let sim = &self.simulation;
        for (name, value) in [
            ("simulation.min_precharge_distance", sim.min_precharge_distance),
            ("simulation.min_drill_lead_distance", sim.min_drill_lead_distance),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("{name} must be zero or positive, got {value}")));
            }
        }
        if sim.default_block_metres.is_sign_negative() {
            return Err(invalid(format!(
                "simulation.default_block_metres must not be negative, got {}",
                sim.default_block_metres
            )));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// Adjacency graph builder settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdjacencyConfig {
    /// Inclusive planar search radius for neighbour candidates.
    #[serde(default = "default_search_radius")]
    pub search_radius: f64,
}

impl Default for AdjacencyConfig {
    fn default() -> Self {
        Self {
            search_radius: default_search_radius(),
        }
    }
}

/// Graph walk limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavigationConfig {
    /// Maximum steps a single walk may take.
    #[serde(default = "default_max_walk_steps")]
    pub max_walk_steps: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_walk_steps: default_max_walk_steps(),
        }
    }
}

/// Standoff distances and fallback policies for the simulator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Distance the charge front is kept ahead of the bogging front.
    #[serde(default = "default_min_precharge_distance")]
    pub min_precharge_distance: f64,

    /// Distance the drill front is kept ahead of the charge front, and
    /// the minimum gap to a neighbouring drive's charge front.
    #[serde(default = "default_min_drill_lead_distance")]
    pub min_drill_lead_distance: f64,

    /// Metres tallied for a block with no rings.
    #[serde(default = "default_block_metres")]
    pub default_block_metres: Decimal,

    /// Whether drives without a sequencing hint may take a geometric
    /// direction.
    #[serde(default = "default_true")]
    pub allow_geometric_direction: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_precharge_distance: default_min_precharge_distance(),
            min_drill_lead_distance: default_min_drill_lead_distance(),
            default_block_metres: default_block_metres(),
            allow_geometric_direction: true,
        }
    }
}

/// Report layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportConfig {
    /// Period column width.
    #[serde(default)]
    pub period: ReportPeriod,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const fn default_search_radius() -> f64 {
    ringflow_graph::DEFAULT_SEARCH_RADIUS
}

const fn default_max_walk_steps() -> usize {
    ringflow_graph::DEFAULT_MAX_WALK_STEPS
}

const fn default_min_precharge_distance() -> f64 {
    7.5
}

const fn default_min_drill_lead_distance() -> f64 {
    10.0
}

fn default_block_metres() -> Decimal {
    Decimal::from(165)
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.adjacency.search_radius, 20.0);
        assert_eq!(config.navigation.max_walk_steps, 500);
        assert_eq!(config.simulation.min_precharge_distance, 7.5);
        assert_eq!(config.simulation.min_drill_lead_distance, 10.0);
        assert_eq!(config.simulation.default_block_metres, Decimal::from(165));
        assert!(config.simulation.allow_geometric_direction);
        assert_eq!(config.report.period, ReportPeriod::Month);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
adjacency:
  search_radius: 25.0
navigation:
  max_walk_steps: 50
simulation:
  min_precharge_distance: 5
  min_drill_lead_distance: 12.5
  default_block_metres: 150.5
  allow_geometric_direction: false
report:
  period: half_month
logging:
  level: debug
";
        let config: Result<EngineConfig, _> = serde_yml::from_str(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.adjacency.search_radius, 25.0);
        assert_eq!(config.navigation.max_walk_steps, 50);
        assert_eq!(config.simulation.min_precharge_distance, 5.0);
        assert_eq!(config.simulation.min_drill_lead_distance, 12.5);
        assert_eq!(config.simulation.default_block_metres, Decimal::new(1505, 1));
        assert!(!config.simulation.allow_geometric_direction);
        assert_eq!(config.report.period, ReportPeriod::HalfMonth);
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "simulation:\n  min_drill_lead_distance: 15\n";
        let config: Result<EngineConfig, _> = serde_yml::from_str(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        // Overridden
        assert_eq!(config.simulation.min_drill_lead_distance, 15.0);
        // Everything else uses defaults
        assert_eq!(config.simulation.min_precharge_distance, 7.5);
        assert_eq!(config.adjacency.search_radius, 20.0);
    }

    #[test]
    fn parse_empty_yaml() {
        let config: Result<EngineConfig, _> = serde_yml::from_str("");
        assert!(config.is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut config = EngineConfig::default();
        config.adjacency.search_radius = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = EngineConfig::default();
        config.navigation.max_walk_steps = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.simulation.min_precharge_distance = -1.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.simulation.default_block_metres = Decimal::from(-5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn overrides_replace_level_and_period() {
        let mut config = EngineConfig::default();
        let result = config.apply_overrides(|key| match key {
            ENV_LOG_LEVEL => Some("warn".to_owned()),
            ENV_REPORT_PERIOD => Some("half-month".to_owned()),
            _ => None,
        });
        assert!(result.is_ok());
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.report.period, ReportPeriod::HalfMonth);

        let mut untouched = EngineConfig::default();
        assert!(untouched.apply_overrides(no_env).is_ok());
        assert_eq!(untouched, EngineConfig::default());
    }

    #[test]
    fn unknown_period_override_is_invalid() {
        let mut config = EngineConfig::default();
        let result = config.apply_overrides(|key| {
            (key == ENV_REPORT_PERIOD).then(|| "fortnight".to_owned())
        });
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("ringflow-config.yaml");
        if path.exists() {
            let config = EngineConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
