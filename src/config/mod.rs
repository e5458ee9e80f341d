//! Run configuration loaded from TOML, with environment overrides applied on top.
//!
//! ```toml
//! root = "."
//! capability = "spike_train"
//!
//! [simulation]
//! dt = 0.025
//! celsius = 37
//! tstop = 1000
//! v_init = -65
//!
//! [stimulation.current1]
//! amp = 0.5
//! dur = 500
//! delay = 100
//!
//! [regions]
//! vm_soma = 0.0
//! vm_NOR3 = 0.0
//! ```

use std::{
    collections::BTreeMap,
    env,
    fs,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};
use crate::error::{CerebellumModelsError, ConfigError};
use crate::recorder::{CellRegions, ResponseType};
use crate::simulation::{ordered_stimuli, SimulationConfig, StimulusSpec};


/// Environment variable overriding the root directory
pub const ROOT_ENV_VAR: &str = "CEREBELLUM_MODELS_ROOT";

/// Channel knockouts and morphology changes applied before running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockoutConfig {
    pub ais: bool,
    pub cav2_1: bool,
    pub disconnect_dendrites: bool,
}

/// Mechanism build tool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Build tool program
    pub program: String,
    /// Fail when the compiled library is still missing after the build
    pub require_library: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        ToolchainConfig {
            program: String::from("nrnivmodl"),
            require_library: true,
        }
    }
}

/// Optional exports written after the run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Path of the NWB document, relative paths are resolved against the root
    pub nwb: Option<PathBuf>,
}

/// A complete run description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory containing `models` and `model-predictions`
    pub root: PathBuf,
    /// Prediction to produce
    pub capability: ResponseType,
    pub simulation: SimulationConfig,
    /// Stimuli keyed `current1`, `current2`, ...
    pub stimulation: BTreeMap<String, StimulusSpec>,
    pub regions: CellRegions,
    pub knockout: KnockoutConfig,
    pub toolchain: ToolchainConfig,
    pub export: ExportConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            root: PathBuf::from("."),
            capability: ResponseType::default(),
            simulation: SimulationConfig::default(),
            stimulation: BTreeMap::new(),
            regions: CellRegions::default(),
            knockout: KnockoutConfig::default(),
            toolchain: ToolchainConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl RunConfig {
    /// Stimuli in `current1`, `current2`, ... order
    pub fn stimuli(&self) -> Result<Vec<StimulusSpec>, CerebellumModelsError> {
        Ok(ordered_stimuli(&self.stimulation)?)
    }

    /// Checks simulation settings and stimulus keys
    pub fn validate(&self) -> Result<(), CerebellumModelsError> {
        self.simulation.validate()?;
        for stimulus in self.stimuli()? {
            stimulus.validate()?;
        }

        Ok(())
    }

    /// Resolves the NWB export path against the root
    pub fn nwb_path(&self) -> Option<PathBuf> {
        self.export.nwb.as_ref().map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                self.root.join(path)
            }
        })
    }
}

/// Parses a run configuration from TOML text
pub fn parse_config(content: &str, path: &Path) -> Result<RunConfig, ConfigError> {
    toml::from_str(content)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// Loads a run configuration and applies environment overrides
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let content = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;

    let mut config = parse_config(&content, path)?;
    apply_environment_overrides(&mut config);

    Ok(config)
}

/// Applies environment overrides, `CEREBELLUM_MODELS_ROOT` replaces `root`
pub fn apply_environment_overrides(config: &mut RunConfig) {
    if let Ok(value) = env::var(ROOT_ENV_VAR) {
        if !value.is_empty() {
            config.root = PathBuf::from(value);
        }
    }
}
