//! Saving recorded voltages and spike trains as whitespace delimited text files
//! and keeping the in memory copies the validation harness reads.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr,
};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use crate::cell::{CellTemplate, TIME_VECTOR};
use crate::error::{ConfigError, RecorderError};


/// Kind of prediction a run produces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    VoltageResponse,
    #[default]
    SpikeTrain,
}

impl ResponseType {
    /// Key of the response type in the prediction store
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::VoltageResponse => "voltage_response",
            ResponseType::SpikeTrain => "spike_train",
        }
    }
}

impl FromStr for ResponseType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voltage_response" => Ok(ResponseType::VoltageResponse),
            "spike_train" => Ok(ResponseType::SpikeTrain),
            _ => Err(ConfigError::UnknownCapability(s.to_string())),
        }
    }
}

/// Regions to record from, each paired with its spike detection threshold (mV)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellRegions(pub BTreeMap<String, f64>);

impl Default for CellRegions {
    fn default() -> Self {
        CellRegions(
            BTreeMap::from([
                (String::from("vm_soma"), 0.),
                (String::from("vm_NOR3"), 0.),
            ])
        )
    }
}

impl CellRegions {
    /// Creates an empty set of regions
    pub fn empty() -> Self {
        CellRegions(BTreeMap::new())
    }

    /// Adds or updates a region and its threshold
    pub fn insert(&mut self, region: impl Into<String>, threshold: f64) {
        self.0.insert(region.into(), threshold);
    }

    /// Removes a region, returning its threshold if it was present
    pub fn remove(&mut self, region: &str) -> Option<f64> {
        self.0.remove(region)
    }

    /// Threshold of a region
    pub fn threshold(&self, region: &str) -> Option<f64> {
        self.0.get(region).copied()
    }

    /// Iterates over regions and thresholds in region order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(region, threshold)| (region.as_str(), *threshold))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// In memory predictions, accumulated until cleared
#[derive(Debug, Clone, Default)]
pub struct PredictionStore {
    /// Region to an N by 2 array of time (ms) and membrane potential (mV)
    pub voltage_response: BTreeMap<String, Array2<f64>>,
    /// Region to spike times (ms)
    pub spike_train: BTreeMap<String, Vec<f64>>,
}

impl PredictionStore {
    pub fn clear(&mut self) {
        self.voltage_response.clear();
        self.spike_train.clear();
    }
}

/// Formats a value with 18 digits after the decimal point and a signed two digit
/// exponent, for example `-6.500000000000000000e+01`
pub fn format_scientific(value: f64) -> String {
    let formatted = format!("{:.18e}", value);

    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };

            format!("{}e{}{:0>2}", mantissa, sign, digits)
        },
        // inf and NaN carry no exponent
        None => formatted,
    }
}

fn write_rows(path: &Path, rows: impl Iterator<Item = Vec<f64>>) -> Result<(), RecorderError> {
    let to_error = |source: csv::Error| RecorderError::File { path: path.to_path_buf(), source };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .from_path(path)
        .map_err(to_error)?;

    for row in rows {
        writer.write_record(row.into_iter().map(format_scientific))
            .map_err(to_error)?;
    }

    writer.flush()
        .map_err(|source| to_error(source.into()))
}

fn read_rows(path: &Path, columns: usize) -> Result<Vec<Vec<f64>>, RecorderError> {
    let to_error = |source: csv::Error| RecorderError::File { path: path.to_path_buf(), source };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(to_error)?;

    let mut rows = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(to_error)?;
        let malformed = || RecorderError::MalformedRow { path: path.to_path_buf(), row };

        let values = record.iter()
            .filter(|field| !field.is_empty())
            .map(|field| field.parse::<f64>().map_err(|_| malformed()))
            .collect::<Result<Vec<f64>, RecorderError>>()?;

        if values.len() != columns {
            return Err(malformed());
        }

        rows.push(values);
    }

    Ok(rows)
}

/// Path of the voltage file of a region
pub fn voltage_file_path(out_dir: &Path, region: &str) -> PathBuf {
    out_dir.join(format!("{}.txt", region))
}

/// Path of the spike file of a region
pub fn spike_file_path(out_dir: &Path, region: &str) -> PathBuf {
    out_dir.join(format!("spikes_{}.txt", region))
}

/// Pairs the recorded time vector with each region's voltage vector, writes
/// `<out_dir>/<region>.txt` and stores the same array in `store`
pub fn record_voltage<T: CellTemplate>(
    cell: &T,
    regions: &CellRegions,
    out_dir: &Path,
    store: &mut PredictionStore,
    predicted_files: &mut Vec<PathBuf>,
) -> Result<(), RecorderError> {
    let times = cell.recorded_vector(TIME_VECTOR)
        .ok_or_else(|| RecorderError::RegionNotRecorded(TIME_VECTOR.to_string()))?;

    for (region, _) in regions.iter() {
        let voltages = cell.recorded_vector(region)
            .ok_or_else(|| RecorderError::RegionNotRecorded(region.to_string()))?;

        let samples = times.len().min(voltages.len());
        let response = Array2::from_shape_fn(
            (samples, 2),
            |(i, j)| if j == 0 { times[i] } else { voltages[i] },
        );

        let path = voltage_file_path(out_dir, region);
        write_rows(&path, response.rows().into_iter().map(|row| row.to_vec()))?;

        store.voltage_response.insert(region.to_string(), response);
        predicted_files.push(path);
    }

    Ok(())
}

/// Writes the stored spike train of each region to `<out_dir>/spikes_<region>.txt`
pub fn record_spikes(
    store: &PredictionStore,
    regions: &CellRegions,
    out_dir: &Path,
    predicted_files: &mut Vec<PathBuf>,
) -> Result<(), RecorderError> {
    for (region, _) in regions.iter() {
        let spikes = store.spike_train.get(region)
            .ok_or_else(|| RecorderError::SpikeTrainNotComputed(region.to_string()))?;

        let path = spike_file_path(out_dir, region);
        write_rows(&path, spikes.iter().map(|spike| vec![*spike]))?;

        predicted_files.push(path);
    }

    Ok(())
}

/// Reads a two column voltage file into times (ms) and voltages (mV)
pub fn load_voltage_file(path: &Path) -> Result<(Vec<f64>, Vec<f64>), RecorderError> {
    Ok(
        read_rows(path, 2)?
            .into_iter()
            .map(|row| (row[0], row[1]))
            .unzip()
    )
}

/// Reads a single column spike file into spike times (ms)
pub fn load_spike_file(path: &Path) -> Result<Vec<f64>, RecorderError> {
    Ok(
        read_rows(path, 1)?
            .into_iter()
            .map(|row| row[0])
            .collect()
    )
}
