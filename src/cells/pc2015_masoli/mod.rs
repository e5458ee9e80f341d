//! Masoli et al. 2015 Purkinje cell wrapped with validation capabilities.
//!
//! ```no_run
//! use cerebellum_models::cells::{PurkinjeCell, PurkinjeCellOptions};
//! use cerebellum_models::capability::ProducesSpikeTrain;
//! use cerebellum_models::simulation::SimulationConfig;
//!
//! let mut pc = PurkinjeCell::new(PurkinjeCellOptions::default())?;
//! pc.set_simulation_properties(SimulationConfig { dt: 0.025, celsius: 37., tstop: 1000., v_init: -65. })?;
//! pc.produce_spike_train()?;
//! # Ok::<(), cerebellum_models::error::CerebellumModelsError>(())
//! ```

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use log::{debug, info};
use crate::capability::{
    check_capability, verify_capability_surface, Capabilities, CapabilityInterface, Model,
    CanDisconnectDendrites, CanKOAISChannels, CanKOCav2pt1Channels,
    ProducesElectricalResponse, ProducesSpikeTrain,
    CAN_DISCONNECT_DENDRITES, CAN_KO_AIS_CHANNELS, CAN_KO_CAV2PT1_CHANNELS,
    PRODUCES_ELECTRICAL_RESPONSE, PRODUCES_SPIKE_TRAIN,
};
use crate::cell::{CellTemplate, PurkinjeTemplate, StimulusHandle};
use crate::cell::channels::ChannelKind;
use crate::compiler::{ensure_compiled, load_mechanisms, CompileOutcome, Nrnivmodl, Toolchain};
use crate::error::{CerebellumModelsError, PathError};
use crate::nwb::NwbFile;
use crate::paths::{ensure_directory_chain, resolve_model_library, ModelDescriptor};
use crate::recorder::{record_spikes, record_voltage, voltage_file_path, CellRegions, PredictionStore};
use crate::simulation::{ordered_stimuli, SimulationConfig, Simulator, StimulusSpec};
use crate::spikes::extract_spikes;
use super::MODEL_SCALE;


/// Name of the model directory
pub const MODEL_NAME: &str = "PC2015Masoli";

/// Sections carrying Cav2.1 besides the dendrites
const CAV2_1_SECTIONS: [&str; 7] = [
    "soma", "axonAIS", "axonNOR", "axonNOR2", "axonNOR3", "axoncoll", "axoncoll2",
];

/// Lifecycle of a [`PurkinjeCell`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Paths resolved, mechanisms not yet built or loaded
    Uninitialized,
    /// Mechanism library present and loaded
    Compiled,
    Instantiated,
    Configured,
    Ran,
    Recorded,
}

/// Construction options of a [`PurkinjeCell`]
pub struct PurkinjeCellOptions {
    /// Directory containing `models` and `model-predictions`
    pub root: PathBuf,
    /// Build tool used when the mechanism library is missing
    pub toolchain: Box<dyn Toolchain>,
    /// Fail construction when the mechanism library is still missing after the build
    pub require_library: bool,
    /// Run section updates on a thread pool sized to the available cores
    pub discover_cores: bool,
}

impl Default for PurkinjeCellOptions {
    fn default() -> Self {
        PurkinjeCellOptions {
            root: PathBuf::from("."),
            toolchain: Box::new(Nrnivmodl::default()),
            require_library: true,
            discover_cores: true,
        }
    }
}

impl PurkinjeCellOptions {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        PurkinjeCellOptions { root: root.into(), ..PurkinjeCellOptions::default() }
    }
}

/// Purkinje cell model exposing voltage response, spike train, knockout and
/// dendrite disconnection capabilities
pub struct PurkinjeCell {
    descriptor: ModelDescriptor,
    root: PathBuf,
    mod_path: PathBuf,
    lib_path: PathBuf,
    compile_outcome: CompileOutcome,
    cell: PurkinjeTemplate,
    simulator: Simulator,
    stimuli: Vec<StimulusSpec>,
    lifecycle: Vec<ModelState>,
    prediction_dir_path: PathBuf,
    predicted_files: Vec<PathBuf>,
    /// Regions to record and their spike thresholds (mV)
    pub cell_regions: CellRegions,
    /// Predictions produced so far, keyed by region
    pub predictions: PredictionStore,
}

impl PurkinjeCell {
    /// Compiles and loads mechanisms if needed, instantiates the cell and creates
    /// the prediction directory `model-predictions/cells/PC2015Masoli`
    pub fn new(options: PurkinjeCellOptions) -> Result<Self, CerebellumModelsError> {
        let descriptor = ModelDescriptor::new(MODEL_SCALE, MODEL_NAME);
        let root = options.root;

        let (mod_path, lib_path) = resolve_model_library(&root, descriptor.scale(), descriptor.name());
        let mut lifecycle = vec![ModelState::Uninitialized];

        let compile_outcome = ensure_compiled(&mod_path, &lib_path, options.toolchain.as_ref());
        load_mechanisms(&lib_path, options.require_library)?;
        lifecycle.push(ModelState::Compiled);

        let simulator = if options.discover_cores {
            Simulator::default().discover_cores()
        } else {
            Simulator::default()
        };

        let prediction_dir_path = ensure_directory_chain(&root, &descriptor.prediction_dir_names())?;

        let mut pc = PurkinjeCell {
            descriptor,
            root,
            mod_path,
            lib_path,
            compile_outcome,
            cell: PurkinjeTemplate::new(),
            simulator,
            stimuli: vec![],
            lifecycle,
            prediction_dir_path,
            predicted_files: vec![],
            cell_regions: CellRegions::default(),
            predictions: PredictionStore::default(),
        };

        pc.enter(ModelState::Instantiated);
        verify_capability_surface(&pc)?;

        Ok(pc)
    }

    pub fn state(&self) -> ModelState {
        self.lifecycle.last().copied().unwrap_or(ModelState::Uninitialized)
    }

    /// States entered since construction or the last reset, oldest first
    pub fn lifecycle(&self) -> &[ModelState] {
        &self.lifecycle
    }

    fn enter(&mut self, state: ModelState) {
        debug!("{} entering {:?}", self.descriptor.name(), state);
        self.lifecycle.push(state);
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Mechanism source directory and compiled library path
    pub fn library_paths(&self) -> (&Path, &Path) {
        (&self.mod_path, &self.lib_path)
    }

    /// Whether the build tool had to be run during construction
    pub fn compile_outcome(&self) -> CompileOutcome {
        self.compile_outcome
    }

    /// Directory predictions are written to
    pub fn prediction_dir_path(&self) -> &Path {
        &self.prediction_dir_path
    }

    /// Every file written so far, in write order
    pub fn predicted_files(&self) -> &[PathBuf] {
        &self.predicted_files
    }

    /// Underlying cell template
    pub fn cell(&self) -> &PurkinjeTemplate {
        &self.cell
    }

    /// Stimuli currently attached to the soma
    pub fn stimuli(&self) -> &[StimulusSpec] {
        &self.stimuli
    }

    pub fn simulation_properties(&self) -> &SimulationConfig {
        self.simulator.config()
    }

    /// Sets `dt`, `celsius`, `tstop` and `v_init` for the following runs
    pub fn set_simulation_properties(&mut self, config: SimulationConfig) -> Result<(), CerebellumModelsError> {
        self.simulator.configure(config)?;
        self.enter(ModelState::Configured);

        Ok(())
    }

    /// Replaces the stimuli attached to the soma with one current clamp per stimulus,
    /// the attached stimuli are left untouched if any new stimulus is invalid
    pub fn set_stimulation_properties(&mut self, specs: &[StimulusSpec]) -> Result<Vec<StimulusHandle>, CerebellumModelsError> {
        for spec in specs {
            spec.validate()?;
        }

        self.cell.clear_clamps();
        self.stimuli.clear();

        let handles = self.simulator.attach_stimuli(&mut self.cell, specs)?;
        self.stimuli = specs.to_vec();
        self.enter(ModelState::Configured);

        Ok(handles)
    }

    /// Same as [`PurkinjeCell::set_stimulation_properties`] for a table keyed
    /// `current1`, `current2`, ...
    pub fn set_stimulation_table(&mut self, table: &BTreeMap<String, StimulusSpec>) -> Result<Vec<StimulusHandle>, CerebellumModelsError> {
        let specs = ordered_stimuli(table)?;

        self.set_stimulation_properties(&specs)
    }

    /// Creates a fresh cell, dropping stimuli and predictions, simulation
    /// settings and regions are kept
    pub fn reset(&mut self) {
        self.cell = PurkinjeTemplate::new();
        self.stimuli.clear();
        self.predictions.clear();
        self.lifecycle.clear();
        self.enter(ModelState::Instantiated);
    }

    /// Deletes every file written so far, returns how many were removed
    pub fn remove_predicted_files(&mut self) -> Result<usize, CerebellumModelsError> {
        let mut removed = 0;
        for path in self.predicted_files.drain(..) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {},
                Err(source) => return Err(PathError::Filesystem { path, source }.into()),
            }
        }

        Ok(removed)
    }

    /// Writes the predictions as an NWB document in JSON form
    pub fn export_nwb(&self, path: &Path) -> Result<NwbFile, CerebellumModelsError> {
        let nwb = self.nwb_document();
        nwb.write_json(path)?;

        Ok(nwb)
    }

    /// Writes the predictions as an NWB document in HDF5 form
    #[cfg(feature = "hdf5")]
    pub fn export_nwb_hdf5(&self, path: &Path) -> Result<NwbFile, CerebellumModelsError> {
        let nwb = self.nwb_document();
        nwb.write_hdf5(path)?;

        Ok(nwb)
    }

    fn nwb_document(&self) -> NwbFile {
        let session_start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or(0);

        NwbFile::from_predictions(
            &self.descriptor,
            self.simulator.config(),
            &self.stimuli,
            &self.predictions,
            session_start_time,
        )
    }

    fn run_and_record(&mut self) -> Result<(), CerebellumModelsError> {
        info!("Running {} {} ...", self.descriptor.name(), self.descriptor.scale());

        self.simulator.run(&mut self.cell);
        self.enter(ModelState::Ran);

        record_voltage(
            &self.cell,
            &self.cell_regions,
            &self.prediction_dir_path,
            &mut self.predictions,
            &mut self.predicted_files,
        )?;
        self.enter(ModelState::Recorded);

        Ok(())
    }
}

impl Model for PurkinjeCell {
    fn name(&self) -> &str {
        "Masoli et al. 2015 model of PurkinjeCell"
    }

    fn description(&self) -> &str {
        "Masoli et al. 2015 model of PurkinjeCell (PC) and published in 10.3389/fncel.2015.00047 \
        This is general PC model unlike special Z+ or Z- models. The model is based on adult \
        (P90 or 3 months) Guinea pig. PC in younger ones are not mature and they grow until P90. \
        This model is the SciUnit wrapped version of the NEURON model in modelDB accession # 229585."
    }
}

impl ProducesElectricalResponse for PurkinjeCell {
    fn produce_voltage_response(&mut self) -> Result<(), CerebellumModelsError> {
        check_capability(<Self as ProducesElectricalResponse>::METHOD, &PRODUCES_ELECTRICAL_RESPONSE)?;

        self.run_and_record()
    }
}

impl ProducesSpikeTrain for PurkinjeCell {
    fn produce_spike_train(&mut self) -> Result<(), CerebellumModelsError> {
        self.produce_voltage_response()?;
        check_capability(<Self as ProducesSpikeTrain>::METHOD, &PRODUCES_SPIKE_TRAIN)?;

        for (region, threshold) in self.cell_regions.iter() {
            let path = voltage_file_path(&self.prediction_dir_path, region);
            let spikes = extract_spikes(&path, threshold)?;

            self.predictions.spike_train.insert(region.to_string(), spikes);
        }

        record_spikes(
            &self.predictions,
            &self.cell_regions,
            &self.prediction_dir_path,
            &mut self.predicted_files,
        )?;

        Ok(())
    }
}

impl CanKOAISChannels for PurkinjeCell {
    fn ko_ais_channels(&mut self) -> Result<(), CerebellumModelsError> {
        check_capability(<Self as CanKOAISChannels>::METHOD, &CAN_KO_AIS_CHANNELS)?;

        let ais = self.cell.section_mut("axonAIS")?;
        for kind in [ChannelKind::Cav31, ChannelKind::Nav16, ChannelKind::Cav21] {
            ais.knock_out(kind);
        }

        Ok(())
    }
}

impl CanKOCav2pt1Channels for PurkinjeCell {
    fn ko_cav2_1_channels(&mut self) -> Result<(), CerebellumModelsError> {
        check_capability(<Self as CanKOCav2pt1Channels>::METHOD, &CAN_KO_CAV2PT1_CHANNELS)?;

        for name in CAV2_1_SECTIONS {
            self.cell.section_mut(name)?.knock_out(ChannelKind::Cav21);
        }
        for dendrite in self.cell.dendrites_mut() {
            dendrite.knock_out(ChannelKind::Cav21);
        }

        Ok(())
    }
}

impl CanDisconnectDendrites for PurkinjeCell {
    fn disconnect_dendrites_from_soma(&mut self) -> Result<(), CerebellumModelsError> {
        check_capability(<Self as CanDisconnectDendrites>::METHOD, &CAN_DISCONNECT_DENDRITES)?;

        // dend[0] is the root of the whole dendritic tree
        self.cell.disconnect("dend[0]")?;

        Ok(())
    }
}

impl Capabilities for PurkinjeCell {
    fn implemented_capabilities(&self) -> Vec<(CapabilityInterface, &'static str)> {
        vec![
            (PRODUCES_ELECTRICAL_RESPONSE, <Self as ProducesElectricalResponse>::METHOD),
            (PRODUCES_SPIKE_TRAIN, <Self as ProducesSpikeTrain>::METHOD),
            (CAN_KO_AIS_CHANNELS, <Self as CanKOAISChannels>::METHOD),
            (CAN_KO_CAV2PT1_CHANNELS, <Self as CanKOCav2pt1Channels>::METHOD),
            (CAN_DISCONNECT_DENDRITES, <Self as CanDisconnectDendrites>::METHOD),
        ]
    }
}
