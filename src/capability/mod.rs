//! Capability interfaces consumed by the external validation harness and the
//! runtime check that a model still exposes the methods it claims to.
//!
//! Each interface is declared twice: as a [`CapabilityInterface`] constant that
//! the harness can inspect by name, and as a single method trait that the model
//! implements. [`verify_capability_surface`] ties the two together.

use log::info;
use crate::error::{CapabilityError, CerebellumModelsError};


/// A named set of methods a model must expose to take part in validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityInterface {
    /// Name of the interface
    pub name: &'static str,
    /// Names of the methods declared by the interface
    pub methods: &'static [&'static str],
}

impl CapabilityInterface {
    /// Whether `method` is declared by the interface
    pub fn declares(&self, method: &str) -> bool {
        self.methods.iter().any(|declared| *declared == method)
    }
}

pub const PRODUCES_ELECTRICAL_RESPONSE: CapabilityInterface = CapabilityInterface {
    name: "ProducesElectricalResponse",
    methods: &["produce_voltage_response"],
};

pub const PRODUCES_SPIKE_TRAIN: CapabilityInterface = CapabilityInterface {
    name: "ProducesSpikeTrain",
    methods: &["produce_spike_train"],
};

pub const CAN_KO_AIS_CHANNELS: CapabilityInterface = CapabilityInterface {
    name: "CanKOAISChannels",
    methods: &["ko_AIS_channels"],
};

pub const CAN_KO_CAV2PT1_CHANNELS: CapabilityInterface = CapabilityInterface {
    name: "CanKOCav2pt1Channels",
    methods: &["ko_Cav2_1_channels"],
};

pub const CAN_DISCONNECT_DENDRITES: CapabilityInterface = CapabilityInterface {
    name: "CanDisconnectDendrites",
    methods: &["disconnect_dendrites_from_soma"],
};

/// Every interface known to the harness
pub const ALL_CAPABILITIES: [CapabilityInterface; 5] = [
    PRODUCES_ELECTRICAL_RESPONSE,
    PRODUCES_SPIKE_TRAIN,
    CAN_KO_AIS_CHANNELS,
    CAN_KO_CAV2PT1_CHANNELS,
    CAN_DISCONNECT_DENDRITES,
];

/// Checks that `name` is a declared member of `interface`
pub fn check_capability(name: &str, interface: &CapabilityInterface) -> Result<(), CapabilityError> {
    if !interface.declares(name) {
        return Err(
            CapabilityError::CapabilityMissing {
                interface: interface.name,
                method: name.to_string(),
            }
        );
    }

    info!("{} has the method {}", interface.name, name);

    Ok(())
}

/// Basic model metadata expected by the validation harness
pub trait Model {
    /// Human readable model name
    fn name(&self) -> &str;
    /// Longer description of the model and its provenance
    fn description(&self) -> &str;
}

/// Model produces a membrane voltage response
pub trait ProducesElectricalResponse {
    /// Name of the capability method as declared by the interface
    const METHOD: &'static str = "produce_voltage_response";
    /// Runs the model and stores its voltage response
    fn produce_voltage_response(&mut self) -> Result<(), CerebellumModelsError>;
}

/// Model produces a spike train
pub trait ProducesSpikeTrain {
    /// Name of the capability method as declared by the interface
    const METHOD: &'static str = "produce_spike_train";
    /// Runs the model and stores spike trains extracted from its voltage response
    fn produce_spike_train(&mut self) -> Result<(), CerebellumModelsError>;
}

/// Model channels in the axon initial segment can be knocked out
pub trait CanKOAISChannels {
    /// Name of the capability method as declared by the interface
    const METHOD: &'static str = "ko_AIS_channels";
    /// Removes sodium and calcium conductances from the axon initial segment
    fn ko_ais_channels(&mut self) -> Result<(), CerebellumModelsError>;
}

/// Model Cav2.1 (P/Q-type calcium) channels can be knocked out
pub trait CanKOCav2pt1Channels {
    /// Name of the capability method as declared by the interface
    const METHOD: &'static str = "ko_Cav2_1_channels";
    /// Removes Cav2.1 conductance everywhere on the cell
    fn ko_cav2_1_channels(&mut self) -> Result<(), CerebellumModelsError>;
}

/// Model dendrites can be disconnected from the soma
pub trait CanDisconnectDendrites {
    /// Name of the capability method as declared by the interface
    const METHOD: &'static str = "disconnect_dendrites_from_soma";
    /// Detaches the dendritic tree from the soma
    fn disconnect_dendrites_from_soma(&mut self) -> Result<(), CerebellumModelsError>;
}

/// Lists the capability interfaces a model claims to implement, paired with
/// the method name it implements for each
pub trait Capabilities {
    fn implemented_capabilities(&self) -> Vec<(CapabilityInterface, &'static str)>;
}

/// Checks every claimed capability against its interface declaration
pub fn verify_capability_surface<T: Capabilities>(model: &T) -> Result<(), CapabilityError> {
    model.implemented_capabilities()
        .iter()
        .try_for_each(|(interface, method)| check_capability(method, interface))
}
