//! Threshold based spike detection on saved voltage traces.

use std::path::Path;
use crate::error::RecorderError;
use crate::recorder::load_voltage_file;


/// Polarity of the threshold crossing that counts as a spike
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpikeSign {
    /// Peaks above the threshold
    Above,
    /// Troughs below the threshold
    Below,
}

impl SpikeSign {
    /// Non-negative thresholds detect peaks above, negative thresholds detect troughs below
    pub fn from_threshold(threshold: f64) -> Self {
        if threshold >= 0. {
            SpikeSign::Above
        } else {
            SpikeSign::Below
        }
    }

    fn crosses(&self, value: f64, threshold: f64) -> bool {
        match self {
            SpikeSign::Above => value > threshold,
            SpikeSign::Below => value < threshold,
        }
    }

    fn is_more_extreme(&self, value: f64, current: f64) -> bool {
        match self {
            SpikeSign::Above => value > current,
            SpikeSign::Below => value < current,
        }
    }
}

/// A signal sampled at arbitrary times, times in ms and values in mV
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrregularlySampledSignal {
    pub times: Vec<f64>,
    pub values: Vec<f64>,
}

impl IrregularlySampledSignal {
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Self {
        IrregularlySampledSignal { times, values }
    }

    pub fn len(&self) -> usize {
        self.times.len().min(self.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Returns the time of the most extreme sample of every contiguous run of samples
/// past the threshold
pub fn peak_detection(signal: &IrregularlySampledSignal, threshold: f64, sign: SpikeSign) -> Vec<f64> {
    let mut peaks = Vec::new();
    // index and value of the extreme of the run in progress
    let mut run: Option<(usize, f64)> = None;

    for (n, value) in signal.values.iter().take(signal.len()).enumerate() {
        if sign.crosses(*value, threshold) {
            run = match run {
                Some((_, extreme)) if sign.is_more_extreme(*value, extreme) => Some((n, *value)),
                Some(current) => Some(current),
                None => Some((n, *value)),
            };
        } else if let Some((index, _)) = run.take() {
            peaks.push(signal.times[index]);
        }
    }

    if let Some((index, _)) = run {
        peaks.push(signal.times[index]);
    }

    peaks
}

/// Loads a two column voltage file and detects spikes with an explicit polarity
pub fn extract_spikes_with_sign(path: &Path, threshold: f64, sign: SpikeSign) -> Result<Vec<f64>, RecorderError> {
    let (times, values) = load_voltage_file(path)?;
    let signal = IrregularlySampledSignal::new(times, values);

    Ok(peak_detection(&signal, threshold, sign))
}

/// Loads a two column voltage file and detects spikes with the polarity implied
/// by the threshold
pub fn extract_spikes(path: &Path, threshold: f64) -> Result<Vec<f64>, RecorderError> {
    extract_spikes_with_sign(path, threshold, SpikeSign::from_threshold(threshold))
}
