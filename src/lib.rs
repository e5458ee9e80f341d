//! # Cerebellum Models
//!
//! `cerebellum_models` wraps compartmental cerebellar cell models so they can be
//! driven by an automated validation harness. Each model exposes capability
//! methods (producing a voltage response or a spike train, knocking out ion
//! channels, disconnecting dendrites) and saves its predictions as text files
//! under `model-predictions/<scale>/<model>`.
//!
//! Currently implements the Masoli et al. 2015 Purkinje cell (`PC2015Masoli`).
//!
//! ## Example Code
//!
//! ### Spike trains at the soma and the third node of Ranvier
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use cerebellum_models::{
//!     capability::ProducesSpikeTrain,
//!     cells::{PurkinjeCell, PurkinjeCellOptions},
//!     simulation::StimulusSpec,
//! };
//!
//! let mut pc = PurkinjeCell::new(PurkinjeCellOptions::with_root("."))?;
//! pc.set_stimulation_table(&BTreeMap::from([
//!     (String::from("current1"), StimulusSpec::Step { amp: 0.5, dur: 500., delay: 100. }),
//! ]))?;
//! pc.produce_spike_train()?;
//!
//! println!("{:?}", pc.predictions.spike_train.get("vm_soma"));
//! # Ok::<(), cerebellum_models::error::CerebellumModelsError>(())
//! ```
//!
//! ### Knocking out channels
//!
//! ```no_run
//! use cerebellum_models::{
//!     capability::{CanKOAISChannels, ProducesElectricalResponse},
//!     cells::{PurkinjeCell, PurkinjeCellOptions},
//! };
//!
//! let mut pc = PurkinjeCell::new(PurkinjeCellOptions::default())?;
//! pc.ko_ais_channels()?;
//! pc.produce_voltage_response()?;
//! # Ok::<(), cerebellum_models::error::CerebellumModelsError>(())
//! ```

pub mod error;
pub mod paths;
pub mod compiler;
pub mod capability;
pub mod cell;
pub mod simulation;
pub mod recorder;
pub mod spikes;
pub mod nwb;
pub mod plot;
pub mod config;
pub mod cells;
