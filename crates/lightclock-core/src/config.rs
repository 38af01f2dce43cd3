//! Configuration loading and typed config structures for a Lightclock run.
//!
//! The canonical configuration lives in `lightclock-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the file.
//! Every field has a default, so an empty file is a valid configuration that
//! reproduces the reference light-between-mirrors run.

use std::path::Path;

use serde::Deserialize;

/// Environment variable overriding `output.path`.
pub const OUTPUT_PATH_ENV: &str = "LIGHTCLOCK_OUTPUT";

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

    /// The values parsed but are inconsistent with each other.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Scheduler and clock settings.
    #[serde(default)]
    pub simulation: SchedulerConfig,

    /// Physical parameters of the reference scenario.
    #[serde(default)]
    pub scenario: ScenarioConfig,

    /// Where the recorded history is written.
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// `LIGHTCLOCK_OUTPUT` overrides `output.path` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Invalid`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document means all defaults.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.output.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulation;
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };

        // History bounds and positions must survive a JSON round trip.
        let floats = [
            ("simulation.epsilon", sim.epsilon),
            ("simulation.start_time", sim.start_time),
            ("simulation.time_step", sim.time_step),
            ("simulation.bootstrap_floor", sim.bootstrap_floor),
            ("scenario.rod_length", self.scenario.rod_length),
            ("scenario.rod_velocity", self.scenario.rod_velocity),
            ("scenario.light_speed", self.scenario.light_speed),
        ];
        if let Some((name, _)) = floats.iter().find(|(_, value)| !value.is_finite()) {
            return invalid(&format!("{name} must be finite"));
        }

        if !(sim.time_step > 0.0) {
            return invalid("simulation.time_step must be positive");
        }
        if !(sim.epsilon > 0.0) {
            return invalid("simulation.epsilon must be positive");
        }
        if sim.epsilon >= sim.time_step {
            return invalid("simulation.epsilon must be smaller than simulation.time_step");
        }
        if !(sim.bootstrap_floor < sim.start_time) {
            return invalid("simulation.bootstrap_floor must be below simulation.start_time");
        }
        if !(self.scenario.rod_length > 0.0) {
            return invalid("scenario.rod_length must be positive");
        }
        if !(self.scenario.light_speed > 0.0) {
            return invalid("scenario.light_speed must be positive");
        }
        Ok(())
    }
}

/// Scheduler and clock settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SchedulerConfig {
    /// Number of rounds to run. No convergence check is made.
    #[serde(default = "default_rounds")]
    pub rounds: u32,

    /// How far before an agent's clock the snapshot is read.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Shared start time `t_0` of every agent.
    #[serde(default)]
    pub start_time: f64,

    /// Step size every agent advances by.
    #[serde(default = "default_time_step")]
    pub time_step: f64,

    /// Lower bound of the bootstrap record `[bootstrap_floor, start_time)`.
    #[serde(default = "default_bootstrap_floor")]
    pub bootstrap_floor: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            epsilon: default_epsilon(),
            start_time: 0.0,
            time_step: default_time_step(),
            bootstrap_floor: default_bootstrap_floor(),
        }
    }
}

/// Physical parameters of the rod and light pulse.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioConfig {
    /// Rest length of the rod between end A and end B.
    #[serde(default = "default_rod_length")]
    pub rod_length: f64,

    /// Velocity of the rod in the stationary frame.
    #[serde(default = "default_rod_velocity")]
    pub rod_velocity: f64,

    /// Speed of the light pulse.
    #[serde(default = "default_light_speed")]
    pub light_speed: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            rod_length: default_rod_length(),
            rod_velocity: default_rod_velocity(),
            light_speed: default_light_speed(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// File the history is written to.
    #[serde(default = "default_output_path")]
    pub path: String,
}

impl OutputConfig {
    /// Override the output path with `LIGHTCLOCK_OUTPUT` when set.
    pub fn apply_env_overrides(&mut self) {
        self.apply_path_override(std::env::var(OUTPUT_PATH_ENV).ok());
    }

    /// Replace the output path when an override is present.
    pub fn apply_path_override(&mut self, path: Option<String>) {
        if let Some(path) = path {
            self.path = path;
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset.
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

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_rounds() -> u32 {
    100
}

const fn default_epsilon() -> f64 {
    0.001
}

const fn default_time_step() -> f64 {
    1.0
}

const fn default_bootstrap_floor() -> f64 {
    -999_999_999.0
}

const fn default_rod_length() -> f64 {
    15.0
}

const fn default_rod_velocity() -> f64 {
    1.0
}

const fn default_light_speed() -> f64 {
    2.0
}

fn default_output_path() -> String {
    String::from("public/data.json")
}

fn default_log_level() -> String {
    String::from("info")
}
