//! Configuring and running a cell template, simulation settings are passed
//! explicitly into every run rather than kept as process-wide state.

use std::{
    collections::BTreeMap,
    time::{Duration, Instant},
};
use log::{info, debug};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use crate::cell::{CellTemplate, StimulusHandle};
use crate::cell::channels::{temperature_factor, DEFAULT_Q10};
use crate::error::SimulationError;


/// Global settings of a run, recognized keys are `dt`, `celsius`, `tstop` and `v_init`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Timestep (ms)
    pub dt: f64,
    /// Temperature (degrees C)
    pub celsius: f64,
    /// Stop time (ms)
    pub tstop: f64,
    /// Initial membrane potential (mV)
    pub v_init: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            dt: 0.025,
            celsius: 37.,
            tstop: 1000.,
            v_init: -65.,
        }
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<(), SimulationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter { name, value })
    }
}

impl SimulationConfig {
    /// Checks that every parameter is finite, `dt` is positive and `tstop` is not negative
    pub fn validate(&self) -> Result<(), SimulationError> {
        check_finite("dt", self.dt)?;
        check_finite("celsius", self.celsius)?;
        check_finite("tstop", self.tstop)?;
        check_finite("v_init", self.v_init)?;

        if self.dt <= 0. {
            return Err(SimulationError::InvalidParameter { name: "dt", value: self.dt });
        }
        if self.tstop < 0. {
            return Err(SimulationError::InvalidParameter { name: "tstop", value: self.tstop });
        }

        Ok(())
    }

    /// Number of fixed steps needed to reach `tstop`
    pub fn steps(&self) -> usize {
        (self.tstop / self.dt).round() as usize
    }
}

/// A current injection, `amp` in nA, `dur` and `delay` in ms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StimulusSpec {
    /// Linear ramp from `amp_initial` to `amp_final` over the duration
    Ramp {
        amp_initial: f64,
        amp_final: f64,
        dur: f64,
        delay: f64,
    },
    /// Constant current over the duration
    Step {
        amp: f64,
        dur: f64,
        delay: f64,
    },
}

impl StimulusSpec {
    /// Injected current (nA) at time `t` (ms), the clamp is on for
    /// `delay <= t < delay + dur`
    pub fn current_at(&self, t: f64) -> f64 {
        match *self {
            StimulusSpec::Step { amp, dur, delay } => {
                if t >= delay && t < delay + dur { amp } else { 0. }
            },
            StimulusSpec::Ramp { amp_initial, amp_final, dur, delay } => {
                if t >= delay && t < delay + dur {
                    amp_initial + (amp_final - amp_initial) * (t - delay) / dur
                } else {
                    0.
                }
            },
        }
    }

    /// Checks that every field is finite and durations are not negative
    pub fn validate(&self) -> Result<(), SimulationError> {
        let (amps, dur, delay) = match *self {
            StimulusSpec::Step { amp, dur, delay } => (vec![("amp", amp)], dur, delay),
            StimulusSpec::Ramp { amp_initial, amp_final, dur, delay } => {
                (vec![("amp_initial", amp_initial), ("amp_final", amp_final)], dur, delay)
            },
        };

        for (name, value) in amps.into_iter().chain([("dur", dur), ("delay", delay)]) {
            if !value.is_finite() {
                return Err(SimulationError::InvalidStimulus { name, value });
            }
        }
        if dur < 0. {
            return Err(SimulationError::InvalidStimulus { name: "dur", value: dur });
        }
        if delay < 0. {
            return Err(SimulationError::InvalidStimulus { name: "delay", value: delay });
        }

        Ok(())
    }
}

/// Orders a `current1`, `current2`, ... stimulus table into a list,
/// every key must be part of an unbroken sequence starting at `current1`
pub fn ordered_stimuli(table: &BTreeMap<String, StimulusSpec>) -> Result<Vec<StimulusSpec>, SimulationError> {
    let mut indexed: Vec<(usize, StimulusSpec)> = Vec::with_capacity(table.len());

    for (key, spec) in table {
        let index = key.strip_prefix("current")
            .and_then(|number| number.parse::<usize>().ok())
            .filter(|index| *index >= 1 && *index <= table.len())
            .ok_or_else(|| SimulationError::UnexpectedStimulusKey(key.clone()))?;

        indexed.push((index, *spec));
    }

    indexed.sort_by_key(|(index, _)| *index);
    for (position, (index, _)) in indexed.iter().enumerate() {
        if *index != position + 1 {
            return Err(SimulationError::UnexpectedStimulusKey(format!("current{}", index)));
        }
    }

    Ok(indexed.into_iter().map(|(_, spec)| spec).collect())
}

/// Summary of a completed run
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    /// Number of fixed steps taken
    pub steps: usize,
    /// Simulated time reached (ms)
    pub simulated_time: f64,
    /// Wall clock duration of the run
    pub elapsed: Duration,
}

/// Runs cell templates with an explicit configuration, optionally spreading
/// per-section updates over a dedicated thread pool
pub struct Simulator {
    config: SimulationConfig,
    pool: Option<ThreadPool>,
}

impl Default for Simulator {
    fn default() -> Self {
        Simulator { config: SimulationConfig::default(), pool: None }
    }
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        Ok(Simulator { config, pool: None })
    }

    /// Builds a thread pool with one thread per available core for section updates,
    /// falls back to the global pool if the dedicated pool cannot be built
    pub fn discover_cores(mut self) -> Self {
        let cores = std::thread::available_parallelism()
            .map(|cores| cores.get())
            .unwrap_or(1);

        match ThreadPoolBuilder::new().num_threads(cores).build() {
            Ok(pool) => {
                debug!("running sections across {} threads", cores);
                self.pool = Some(pool);
            },
            Err(e) => debug!("could not build thread pool, using global pool: {}", e),
        }

        self
    }

    /// Gets the configuration used for the next run
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Sets the configuration used for the next run
    pub fn configure(&mut self, config: SimulationConfig) -> Result<(), SimulationError> {
        config.validate()?;
        self.config = config;

        Ok(())
    }

    /// Attaches one current clamp per stimulus to the soma of the cell, the cell
    /// owns the clamps so they stay attached for as long as the cell lives
    pub fn attach_stimuli<T: CellTemplate>(
        &self,
        cell: &mut T,
        specs: &[StimulusSpec],
    ) -> Result<Vec<StimulusHandle>, SimulationError> {
        for spec in specs {
            spec.validate()?;
        }

        Ok(specs.iter().map(|spec| cell.add_clamp(*spec)).collect())
    }

    fn run_steps<T: CellTemplate>(config: &SimulationConfig, cell: &mut T) -> usize {
        let factor = temperature_factor(config.celsius, DEFAULT_Q10);
        let steps = config.steps();

        cell.finitialize(config.v_init);
        for _ in 0..steps {
            cell.fadvance(config.dt, factor);
        }

        steps
    }

    /// Initializes the cell and runs it to `tstop`, blocking until done
    pub fn run<T: CellTemplate>(&self, cell: &mut T) -> RunReport {
        let start_time = Instant::now();

        let config = &self.config;
        let steps = match &self.pool {
            Some(pool) => pool.install(|| Simulator::run_steps(config, cell)),
            None => Simulator::run_steps(config, cell),
        };

        let elapsed = start_time.elapsed();
        info!("--- {} seconds ---", elapsed.as_secs_f64());

        RunReport { steps, simulated_time: cell.time(), elapsed }
    }
}
