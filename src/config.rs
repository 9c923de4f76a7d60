//! TOML-based batch configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::pipeline::VesselLimits;

/// Top-level batch configuration parsed from TOML.
///
/// All fields have defaults matching the baseline preset. Load from TOML
/// with [`BatchConfig::from_toml_file`] or use [`BatchConfig::baseline`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    /// Vessel budgets and identity.
    #[serde(default)]
    pub vessel: VesselConfig,
    /// Enumeration factors.
    #[serde(default)]
    pub enumeration: EnumerationConfig,
    /// Input file locations.
    #[serde(default)]
    pub inputs: InputsConfig,
    /// Simulation model selection and upload.
    #[serde(default)]
    pub model: ModelConfig,
    /// Simulation service endpoint and retry behaviour.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Vessel budgets and identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VesselConfig {
    /// Vessel name reported to the simulation service.
    pub name: String,
    /// Task (duty profile) name reported to the simulation service.
    pub task: String,
    /// Maximum summed generator mass.
    pub weight_limit: f64,
    /// Maximum summed generator volume.
    pub volume_limit: f64,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            name: "vessel".to_string(),
            task: "task".to_string(),
            weight_limit: 60_000.0,
            volume_limit: 60_000.0,
        }
    }
}

impl VesselConfig {
    pub fn limits(&self) -> VesselLimits {
        VesselLimits {
            weight_limit: self.weight_limit,
            volume_limit: self.volume_limit,
        }
    }
}

/// Enumeration factors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnumerationConfig {
    /// Generator bays in the simulation model (must be > 0).
    pub bay_count: usize,
    /// Candidate battery module counts; 0 means no battery.
    pub battery_counts: Vec<u32>,
    /// Candidate lower controller thresholds (load fraction, 0.0–1.0).
    pub lower_thresholds: Vec<f64>,
    /// Candidate upper controller thresholds (load fraction, 0.0–1.0).
    pub upper_thresholds: Vec<f64>,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            bay_count: 2,
            battery_counts: vec![0, 1, 5, 10],
            lower_thresholds: vec![0.05],
            upper_thresholds: vec![0.001],
        }
    }
}

/// Input file locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputsConfig {
    /// Engine and battery catalog CSV.
    pub catalog: Option<PathBuf>,
    /// Duty-cycle profile.
    pub duty_cycle: Option<PathBuf>,
    /// Factor converting the duty-cycle power column to kW.
    pub power_scale: f64,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            duty_cycle: None,
            power_scale: 1.0,
        }
    }
}

/// Model simulated when neither a name nor a model file is configured.
pub const DEFAULT_MODEL_NAME: &str = "SEACHANGE_TEST_85MCR_batch";

/// Simulation model selection and upload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Model name on the simulation service; defaults to the model file stem.
    pub name: Option<String>,
    /// Model source to upload before dispatch; skipped when unset.
    pub path: Option<PathBuf>,
}

impl ModelConfig {
    /// Explicit name, else the model file stem, else [`DEFAULT_MODEL_NAME`].
    pub fn resolved_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| {
                self.path
                    .as_deref()
                    .and_then(Path::file_stem)
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string())
    }
}

/// Default simulation service root.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Simulation service endpoint and retry behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Service root URL.
    pub base_url: String,
    /// Per-request timeout (seconds, must be > 0).
    pub timeout_secs: u64,
    /// Attempts per request including the first (must be > 0).
    pub max_attempts: u32,
    /// Delay before the first retry (milliseconds).
    pub initial_backoff_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 600,
            max_attempts: 3,
            initial_backoff_ms: 500,
        }
    }
}

impl DispatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[cfg(feature = "dispatch")]
    pub fn retry_policy(&self) -> crate::dispatch::RetryPolicy {
        crate::dispatch::RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"enumeration.bay_count"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl BatchConfig {
    /// Returns the baseline configuration: two bays, four battery counts.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the three-bay preset: a third generator bay, fewer battery counts.
    pub fn three_bay() -> Self {
        Self {
            enumeration: EnumerationConfig {
                bay_count: 3,
                battery_counts: vec![0, 1, 5],
                ..EnumerationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "three_bay"];

    /// Loads a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "three_bay" => Ok(Self::three_bay()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let v = &self.vessel;
        if v.weight_limit.is_nan() || v.weight_limit < 0.0 {
            errors.push(ConfigError::new("vessel.weight_limit", "must be >= 0"));
        }
        if v.volume_limit.is_nan() || v.volume_limit < 0.0 {
            errors.push(ConfigError::new("vessel.volume_limit", "must be >= 0"));
        }

        let e = &self.enumeration;
        if e.bay_count == 0 {
            errors.push(ConfigError::new("enumeration.bay_count", "must be > 0"));
        }
        if e.battery_counts.is_empty() {
            errors.push(ConfigError::new("enumeration.battery_counts", "must not be empty"));
        }
        if has_duplicates(&e.battery_counts) {
            errors.push(ConfigError::new(
                "enumeration.battery_counts",
                "values must be distinct",
            ));
        }
        for (field, values) in [
            ("enumeration.lower_thresholds", &e.lower_thresholds),
            ("enumeration.upper_thresholds", &e.upper_thresholds),
        ] {
            if values.is_empty() {
                errors.push(ConfigError::new(field, "must not be empty"));
            }
            if values.iter().any(|t| !(0.0..=1.0).contains(t)) {
                errors.push(ConfigError::new(field, "values must be in [0.0, 1.0]"));
            }
            if has_duplicates(values) {
                errors.push(ConfigError::new(field, "values must be distinct"));
            }
        }

        if self.inputs.power_scale.is_nan() || self.inputs.power_scale <= 0.0 {
            errors.push(ConfigError::new("inputs.power_scale", "must be > 0"));
        }

        if self.model.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            errors.push(ConfigError::new("model.name", "must not be empty"));
        }

        let d = &self.dispatch;
        if !d.base_url.starts_with("http://") && !d.base_url.starts_with("https://") {
            errors.push(ConfigError::new(
                "dispatch.base_url",
                format!("must be an http(s) URL, got \"{}\"", d.base_url),
            ));
        }
        if d.timeout_secs == 0 {
            errors.push(ConfigError::new("dispatch.timeout_secs", "must be > 0"));
        }
        if d.max_attempts == 0 {
            errors.push(ConfigError::new("dispatch.max_attempts", "must be > 0"));
        }

        errors
    }
}

/// Repeated candidate values would enumerate identical configurations.
fn has_duplicates<T: PartialEq>(values: &[T]) -> bool {
    values
        .iter()
        .enumerate()
        .any(|(i, v)| values[i + 1..].contains(v))
}
