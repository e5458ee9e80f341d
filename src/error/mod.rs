//! Error sets for every stage of the model pipeline, folded into
//! [`CerebellumModelsError`].

use std::{io, path::PathBuf};
use thiserror::Error;


/// Error set for path resolution and directory creation
#[derive(Debug, Error)]
pub enum PathError {
    /// No directory names were given to build a chain from
    #[error("Must have at least one argument as a string for a directory name")]
    EmptyDirectoryChain,
    /// Underlying filesystem error
    #[error("Could not access {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Error set for compiling and loading the native mechanism library
#[derive(Debug, Error)]
pub enum CompilerError {
    /// Compiled library could not be found at load time, usually the
    /// result of a silently failed build
    #[error("Mechanism library not found at {0}")]
    MechanismLibraryMissing(PathBuf),
}

/// Error set for capability checks
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// Method is not declared by the capability interface
    #[error("{interface} has no method {method}")]
    CapabilityMissing {
        interface: &'static str,
        method: String,
    },
}

/// Error set for simulation setup and running
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Simulation parameter is out of range or not finite
    #[error("Invalid simulation parameter {name}: {value}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
    },
    /// Stimulus parameter is out of range or not finite
    #[error("Invalid stimulus parameter {name}: {value}")]
    InvalidStimulus {
        name: &'static str,
        value: f64,
    },
    /// Stimulus table keys must be `current1`, `current2`, ... without gaps
    #[error("Stimulus key {0} does not follow the current1, current2, ... sequence")]
    UnexpectedStimulusKey(String),
    /// Section name cannot be found on the cell template
    #[error("Section not found: {0}")]
    SectionNotFound(String),
}

/// Error set for writing predictions
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Region has no corresponding recorded vector on the cell template
    #[error("Cell template does not record region {0}")]
    RegionNotRecorded(String),
    /// Spike train requested for saving before it was computed
    #[error("Spike train for region {0} has not been computed")]
    SpikeTrainNotComputed(String),
    /// Text file could not be written or read
    #[error("Could not access prediction file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// A row in a prediction file could not be parsed
    #[error("Malformed prediction file {path} at row {row}")]
    MalformedRow {
        path: PathBuf,
        row: usize,
    },
}

/// Error set for loading a run configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Configuration file is not valid TOML for a run configuration
    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Unknown capability requested in the configuration
    #[error("Unknown capability {0}, expected voltage_response or spike_train")]
    UnknownCapability(String),
}

/// Error set for NWB exports
#[derive(Debug, Error)]
pub enum NwbError {
    /// JSON document could not be serialized
    #[error("Could not serialize NWB document: {0}")]
    Serialize(#[from] serde_json::Error),
    /// Output file could not be written
    #[error("Could not write NWB document to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// HDF5 layer failure
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
    /// String cannot be stored as an HDF5 variable length string
    #[cfg(feature = "hdf5")]
    #[error("Invalid HDF5 string: {0}")]
    Hdf5String(String),
}

/// Error set for plotting saved predictions
#[derive(Debug, Error)]
pub enum PlotError {
    /// Prediction file could not be found for the model
    #[error("No prediction file {file_name} for model {model_name}")]
    PredictionFileNotFound {
        model_name: String,
        file_name: String,
    },
    /// Prediction file holds no samples to plot
    #[error("Prediction file {0} has no samples")]
    NoSamples(PathBuf),
    /// Drawing backend failure
    #[error("Could not draw {path}: {message}")]
    Drawing {
        path: PathBuf,
        message: String,
    },
}

/// A set of errors that may occur when using the library
#[derive(Debug, Error)]
pub enum CerebellumModelsError {
    /// Errors related to paths
    #[error(transparent)]
    PathRelatedError(#[from] PathError),
    /// Errors related to compiling or loading the mechanism library
    #[error(transparent)]
    CompilerRelatedError(#[from] CompilerError),
    /// Errors related to capabilities
    #[error(transparent)]
    CapabilityRelatedError(#[from] CapabilityError),
    /// Errors related to simulations
    #[error(transparent)]
    SimulationRelatedError(#[from] SimulationError),
    /// Errors related to prediction files
    #[error(transparent)]
    RecorderRelatedError(#[from] RecorderError),
    /// Errors related to configuration
    #[error(transparent)]
    ConfigRelatedError(#[from] ConfigError),
    /// Errors related to NWB export
    #[error(transparent)]
    NwbRelatedError(#[from] NwbError),
    /// Errors related to plotting
    #[error(transparent)]
    PlotRelatedError(#[from] PlotError),
}
