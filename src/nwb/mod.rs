//! Exporting a session's predictions as a Neurodata Without Borders style document.
//!
//! The document is always available as JSON, with the `hdf5` feature it can also
//! be written as an HDF5 file laid out with NWB group names (`acquisition`,
//! `analysis`, `intervals/epochs`, `general/extracellular_ephys`).

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use serde::{Deserialize, Serialize};
use crate::error::NwbError;
use crate::paths::ModelDescriptor;
use crate::recorder::PredictionStore;
use crate::simulation::{SimulationConfig, StimulusSpec};


/// Labelled interval of the session (ms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    pub start_time: f64,
    pub stop_time: f64,
    pub tags: Vec<String>,
}

/// Recording site metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Electrode {
    pub name: String,
    pub description: String,
    pub location: String,
}

/// Values sampled at the given timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub timestamps: Vec<f64>,
    pub data: Vec<f64>,
}

/// A complete session, voltage traces are kept as acquisitions and spike
/// trains as analysis results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NwbFile {
    pub session_description: String,
    pub identifier: String,
    /// Seconds since the Unix epoch
    pub session_start_time: u64,
    pub epochs: Vec<Epoch>,
    pub electrode: Electrode,
    pub acquisition: Vec<TimeSeries>,
    pub analysis: Vec<TimeSeries>,
}

impl NwbFile {
    /// Builds a document from the predictions of a session
    pub fn from_predictions(
        model: &ModelDescriptor,
        config: &SimulationConfig,
        stimuli: &[StimulusSpec],
        store: &PredictionStore,
        session_start_time: u64,
    ) -> Self {
        let mut epochs = vec![
            Epoch {
                start_time: 0.,
                stop_time: config.tstop,
                tags: vec![String::from("simulation")],
            }
        ];
        for (n, stimulus) in stimuli.iter().enumerate() {
            let (dur, delay) = match *stimulus {
                StimulusSpec::Step { dur, delay, .. } => (dur, delay),
                StimulusSpec::Ramp { dur, delay, .. } => (dur, delay),
            };

            epochs.push(
                Epoch {
                    start_time: delay,
                    stop_time: delay + dur,
                    tags: vec![format!("current{}", n + 1)],
                }
            );
        }

        let acquisition = store.voltage_response.iter()
            .map(|(region, response)| TimeSeries {
                name: region.clone(),
                description: format!("membrane potential recorded at {}", region),
                unit: String::from("mV"),
                timestamps: response.column(0).to_vec(),
                data: response.column(1).to_vec(),
            })
            .collect();

        let analysis = store.spike_train.iter()
            .map(|(region, spikes)| TimeSeries {
                name: format!("spikes_{}", region),
                description: format!("spike times detected at {}", region),
                unit: String::from("ms"),
                timestamps: spikes.clone(),
                data: vec![1.; spikes.len()],
            })
            .collect();

        NwbFile {
            session_description: format!(
                "{} {} simulated for {} ms at {} degrees C",
                model.scale(), model.name(), config.tstop, config.celsius,
            ),
            identifier: format!("{}-{}", model.name(), session_start_time),
            session_start_time,
            epochs,
            electrode: Electrode {
                name: String::from("virtual_electrode"),
                description: String::from("simulated intracellular recording"),
                location: model.name().to_string(),
            },
            acquisition,
            analysis,
        }
    }

    /// Writes the document as pretty printed JSON
    pub fn write_json(&self, path: &Path) -> Result<(), NwbError> {
        let to_error = |source| NwbError::Io { path: path.to_path_buf(), source };

        let file = File::create(path).map_err(to_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(to_error)
    }

    /// Reads a document previously written with [`NwbFile::write_json`]
    pub fn read_json(path: &Path) -> Result<Self, NwbError> {
        let file = File::open(path)
            .map_err(|source| NwbError::Io { path: path.to_path_buf(), source })?;

        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Writes the document as an HDF5 file
    #[cfg(feature = "hdf5")]
    pub fn write_hdf5(&self, path: &Path) -> Result<(), NwbError> {
        use hdf5::types::VarLenUnicode;

        fn unicode(value: &str) -> Result<VarLenUnicode, NwbError> {
            value.parse::<VarLenUnicode>()
                .map_err(|e| NwbError::Hdf5String(e.to_string()))
        }

        fn write_string_attr(location: &hdf5::Location, name: &str, value: &str) -> Result<(), NwbError> {
            location.new_attr::<VarLenUnicode>()
                .create(name)?
                .write_scalar(&unicode(value)?)?;

            Ok(())
        }

        fn write_series(group: &hdf5::Group, series: &TimeSeries) -> Result<(), NwbError> {
            let series_group = group.create_group(&series.name)?;
            write_string_attr(&series_group, "description", &series.description)?;
            series_group.new_dataset_builder()
                .with_data(series.timestamps.as_slice())
                .create("timestamps")?;
            let data = series_group.new_dataset_builder()
                .with_data(series.data.as_slice())
                .create("data")?;
            write_string_attr(&data, "unit", &series.unit)?;

            Ok(())
        }

        let file = hdf5::File::create(path)?;
        write_string_attr(&file, "session_description", &self.session_description)?;
        write_string_attr(&file, "identifier", &self.identifier)?;
        file.new_attr::<u64>()
            .create("session_start_time")?
            .write_scalar(&self.session_start_time)?;

        let acquisition = file.create_group("acquisition")?;
        for series in &self.acquisition {
            write_series(&acquisition, series)?;
        }

        let analysis = file.create_group("analysis")?;
        for series in &self.analysis {
            write_series(&analysis, series)?;
        }

        let epochs = file.create_group("intervals")?.create_group("epochs")?;
        let start_times: Vec<f64> = self.epochs.iter().map(|epoch| epoch.start_time).collect();
        let stop_times: Vec<f64> = self.epochs.iter().map(|epoch| epoch.stop_time).collect();
        epochs.new_dataset_builder().with_data(start_times.as_slice()).create("start_time")?;
        epochs.new_dataset_builder().with_data(stop_times.as_slice()).create("stop_time")?;
        let tags = self.epochs.iter()
            .map(|epoch| unicode(&epoch.tags.join(",")))
            .collect::<Result<Vec<VarLenUnicode>, NwbError>>()?;
        epochs.new_dataset_builder().with_data(tags.as_slice()).create("tags")?;

        let electrode = file.create_group("general")?
            .create_group("extracellular_ephys")?
            .create_group(&self.electrode.name)?;
        write_string_attr(&electrode, "description", &self.electrode.description)?;
        write_string_attr(&electrode, "location", &self.electrode.location)?;

        Ok(())
    }
}
