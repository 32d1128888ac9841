//! Solver configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML, or JSON by extension)
//! 2. Environment variables (with HHL_ prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values
//!
//! ```yaml
//! algorithm:
//!   auto_resize: true
//! eigs:
//!   num_ancillae: 3
//!   evo_time: 1.5707963267948966
//! backend:
//!   name: qasm_simulator
//!   shots: 4096
//!   seed: 7
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use hhl_hal::{BackendConfig, DEFAULT_SIMULATOR_QUBITS};

/// Complete solver configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HhlConfig {
    /// Preprocessing switches.
    pub algorithm: AlgorithmConfig,
    /// Eigenvalue estimator selection and parameters.
    pub eigs: EigsConfig,
    /// State preparer selection.
    pub init_state: InitStateConfig,
    /// Reciprocal rotator selection and parameters.
    pub reciprocal: ReciprocalConfig,
    /// Tomography fitter selection.
    pub tomography: TomographyConfig,
    /// Execution backend.
    pub backend: BackendSettings,
}

/// Preprocessing switches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmConfig {
    /// Embed a non-Hermitian matrix into a Hermitian one of twice the size.
    pub auto_hermitian: bool,
    /// Pad a non-power-of-two matrix with the identity.
    pub auto_resize: bool,
}

/// Product formula used for the controlled time evolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpansionMode {
    /// First-order Lie-Trotter.
    Trotter,
    /// Recursive Suzuki expansion.
    #[default]
    Suzuki,
}

/// Eigenvalue estimator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EigsConfig {
    /// Registered estimator name.
    pub name: String,
    /// Size of the eigenvalue register.
    pub num_ancillae: usize,
    /// Product-formula slices per controlled evolution.
    pub num_time_slices: usize,
    /// Product formula.
    pub expansion_mode: ExpansionMode,
    /// Suzuki order.
    pub expansion_order: usize,
    /// Read the eigenvalue register as two's complement.
    pub negative_evals: bool,
    /// Evolution time; derived from the matrix when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evo_time: Option<f64>,
}

impl Default for EigsConfig {
    fn default() -> Self {
        Self {
            name: "qpe".to_string(),
            num_ancillae: 6,
            num_time_slices: 50,
            expansion_mode: ExpansionMode::Suzuki,
            expansion_order: 2,
            negative_evals: false,
            evo_time: None,
        }
    }
}

/// State preparer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitStateConfig {
    /// Registered preparer name.
    pub name: String,
}

impl Default for InitStateConfig {
    fn default() -> Self {
        Self {
            name: "custom".to_string(),
        }
    }
}

/// Reciprocal rotator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReciprocalConfig {
    /// Registered rotator name.
    pub name: String,
    /// Constant `C` of the `C/λ` map; `0` picks the smallest resolvable
    /// eigenvalue.
    pub scale: f64,
}

impl Default for ReciprocalConfig {
    fn default() -> Self {
        Self {
            name: "lookup".to_string(),
            scale: 0.0,
        }
    }
}

/// Tomography fitter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomographyConfig {
    /// Registered fitter name.
    pub fitter: String,
}

impl Default for TomographyConfig {
    fn default() -> Self {
        Self {
            fitter: "linear_inversion".to_string(),
        }
    }
}

/// Backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Registered backend name.
    pub name: String,
    /// Shots for sampling backends.
    pub shots: u32,
    /// Sampling seed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Widest circuit the backend accepts.
    pub max_qubits: u32,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            name: "statevector_simulator".to_string(),
            shots: 1024,
            seed: None,
            max_qubits: DEFAULT_SIMULATOR_QUBITS,
        }
    }
}

impl BackendSettings {
    /// Backend configuration for the registry.
    pub fn to_backend_config(&self) -> BackendConfig {
        let mut config = BackendConfig::new(&self.name)
            .with_extra("shots", serde_json::json!(self.shots))
            .with_extra("max_qubits", serde_json::json!(self.max_qubits));
        if let Some(seed) = self.seed {
            config = config.with_extra("seed", serde_json::json!(seed));
        }
        config
    }
}

impl HhlConfig {
    /// Load configuration from a YAML (or `.json`) file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: HhlConfig = if is_json {
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?
        } else {
            serde_yaml_ng::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let config = if let Some(path) = config_file {
            Self::from_file(path)?
        } else {
            HhlConfig::default()
        };

        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Merge `HHL_*` environment variables into this configuration.
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge overrides from `lookup`; unset or unparsable values leave the
    /// corresponding fields unchanged.
    pub fn merge_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fn parsed<T: std::str::FromStr>(
            lookup: &impl Fn(&str) -> Option<String>,
            key: &str,
        ) -> Option<T> {
            lookup(key).and_then(|v| v.trim().parse().ok())
        }

        if let Some(v) = lookup("HHL_BACKEND") {
            self.backend.name = v;
        }
        if let Some(v) = parsed(&lookup, "HHL_SHOTS") {
            self.backend.shots = v;
        }
        if let Some(v) = parsed(&lookup, "HHL_SEED") {
            self.backend.seed = Some(v);
        }
        if let Some(v) = parsed(&lookup, "HHL_NUM_ANCILLAE") {
            self.eigs.num_ancillae = v;
        }
        if let Some(v) = parsed(&lookup, "HHL_NUM_TIME_SLICES") {
            self.eigs.num_time_slices = v;
        }
        if let Some(v) = parsed(&lookup, "HHL_EVO_TIME") {
            self.eigs.evo_time = Some(v);
        }
        if let Some(v) = parsed(&lookup, "HHL_NEGATIVE_EVALS") {
            self.eigs.negative_evals = v;
        }
        if let Some(v) = parsed(&lookup, "HHL_AUTO_HERMITIAN") {
            self.algorithm.auto_hermitian = v;
        }
        if let Some(v) = parsed(&lookup, "HHL_AUTO_RESIZE") {
            self.algorithm.auto_resize = v;
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.eigs.num_ancillae == 0 || self.eigs.num_ancillae > 16 {
            return Err(ConfigError::ValidationError(format!(
                "num_ancillae must be in 1..=16, got {}",
                self.eigs.num_ancillae
            )));
        }
        if self.eigs.num_time_slices == 0 {
            return Err(ConfigError::ValidationError(
                "num_time_slices must be greater than 0".to_string(),
            ));
        }
        if self.eigs.expansion_order == 0 {
            return Err(ConfigError::ValidationError(
                "expansion_order must be greater than 0".to_string(),
            ));
        }
        if let Some(t) = self.eigs.evo_time {
            if !t.is_finite() || t <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "evo_time must be a positive number, got {t}"
                )));
            }
        }
        if !self.reciprocal.scale.is_finite() || self.reciprocal.scale < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "reciprocal scale must be non-negative, got {}",
                self.reciprocal.scale
            )));
        }
        if self.backend.shots == 0 {
            return Err(ConfigError::ValidationError(
                "shots must be greater than 0".to_string(),
            ));
        }
        if self.backend.max_qubits == 0 {
            return Err(ConfigError::ValidationError(
                "max_qubits must be greater than 0".to_string(),
            ));
        }

        for (section, name) in [
            ("eigs", &self.eigs.name),
            ("init_state", &self.init_state.name),
            ("reciprocal", &self.reciprocal.name),
            ("tomography", &self.tomography.fitter),
            ("backend", &self.backend.name),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{section} name must not be empty"
                )));
            }
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
