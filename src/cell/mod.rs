//! A reduced compartmental Purkinje cell template built from named sections,
//! each section is a single isopotential compartment with inserted ion channel
//! mechanisms and axial coupling to its parent section.
//!
//! The template records the time vector `rec_t` and a voltage vector for each
//! recordable region (`vm_soma`, `vm_dend`, `vm_AIS`, `vm_NOR`, `vm_NOR2`,
//! `vm_NOR3`, `vm_coll`) on every step.

use std::f64::consts::PI;
use rayon::prelude::*;
pub mod channels;
use channels::{ChannelConductance, ChannelKind, IonChannel, Nav16, Kv, Cav21, Cav31, Leak};
/// Derive macros for ion channel mechanisms.
pub mod channel_traits {
    pub use channel_traits::*;
}
use crate::error::SimulationError;
use crate::simulation::StimulusSpec;


/// Name of the recorded time vector
pub const TIME_VECTOR: &str = "rec_t";

/// Recordable regions paired with the section each one records from
pub const RECORDED_REGIONS: [(&str, &str); 7] = [
    ("vm_soma", "soma"),
    ("vm_dend", "dend[0]"),
    ("vm_AIS", "axonAIS"),
    ("vm_NOR", "axonNOR"),
    ("vm_NOR2", "axonNOR2"),
    ("vm_NOR3", "axonNOR3"),
    ("vm_coll", "axoncoll"),
];

/// A cylindrical section of the morphology
#[derive(Debug)]
pub struct Section {
    /// Section name
    pub name: String,
    /// Length (um)
    pub length: f64,
    /// Diameter (um)
    pub diameter: f64,
    /// Specific membrane capacitance (uF/cm^2)
    pub c_m: f64,
    /// Axial resistivity (ohm cm)
    pub r_a: f64,
    /// Membrane potential (mV)
    pub voltage: f64,
    /// Inserted mechanisms
    pub channels: Vec<Box<dyn IonChannel>>,
}

impl Clone for Section {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            length: self.length,
            diameter: self.diameter,
            c_m: self.c_m,
            r_a: self.r_a,
            voltage: self.voltage,
            channels: self.channels.iter()
                .map(|channel| channel.clone_box())
                .collect(),
        }
    }
}

impl Section {
    /// Creates a section without mechanisms
    pub fn new(name: &str, length: f64, diameter: f64) -> Self {
        Section {
            name: name.to_string(),
            length,
            diameter,
            c_m: 1.,
            r_a: 122.,
            voltage: -65.,
            channels: vec![],
        }
    }

    /// Sets the specific membrane capacitance (uF/cm^2)
    pub fn with_capacitance(mut self, c_m: f64) -> Self {
        self.c_m = c_m;
        self
    }

    /// Inserts a mechanism into the section
    pub fn insert<T: IonChannel + 'static>(mut self, channel: T) -> Self {
        self.channels.push(Box::new(channel));
        self
    }

    /// Membrane area (cm^2)
    pub fn area(&self) -> f64 {
        PI * self.diameter * self.length * 1e-8
    }

    /// Axial resistance from the center to one end of the section (ohm)
    pub fn half_resistance(&self) -> f64 {
        let radius = self.diameter / 2. * 1e-4;
        self.r_a * (self.length / 2. * 1e-4) / (PI * radius.powi(2))
    }

    /// Gets the maximal conductance of the first mechanism of the given kind
    pub fn get_max_conductance(&self, kind: ChannelKind) -> Option<f64> {
        self.channels.iter()
            .find(|channel| channel.kind() == kind)
            .map(|channel| channel.get_max_conductance())
    }

    /// Sets the maximal conductance of every mechanism of the given kind to zero,
    /// returns how many mechanisms were affected
    pub fn knock_out(&mut self, kind: ChannelKind) -> usize {
        let mut affected = 0;
        for channel in self.channels.iter_mut().filter(|channel| channel.kind() == kind) {
            channel.set_max_conductance(0.);
            affected += 1;
        }

        affected
    }

    /// Total ionic current density (uA/cm^2)
    pub fn ionic_current(&self) -> f64 {
        self.channels.iter()
            .map(|channel| channel.get_current())
            .sum()
    }

    fn initialize(&mut self, v_init: f64) {
        self.voltage = v_init;
        self.channels.iter_mut()
            .for_each(|channel| channel.initialize(v_init));
    }

    fn update_gates(&mut self, dt: f64, temperature_factor: f64) {
        let voltage = self.voltage;
        self.channels.iter_mut()
            .for_each(|channel| channel.update_gates(voltage, dt, temperature_factor));
    }

    fn update_currents(&mut self) {
        let voltage = self.voltage;
        self.channels.iter_mut()
            .for_each(|channel| channel.update_current(voltage));
    }

    /// Calculates the next voltage with ionic conductances taken implicitly and
    /// neighboring voltages taken from the previous step, keeping the new voltage
    /// a positively weighted average of reversal potentials, neighbors and the
    /// present voltage plus the injected current
    fn next_voltage(&self, dt: f64, coupling: &[(usize, f64)], voltages: &[f64], injected: f64) -> f64 {
        let area = self.area();
        let capacitance = self.c_m * area / dt;

        // nA to uA
        let mut numerator = capacitance * self.voltage + injected * 1e-3;
        let mut denominator = capacitance;

        for channel in &self.channels {
            let (conductance, reversal) = channel.conductance_and_reversal();
            numerator += conductance * area * reversal;
            denominator += conductance * area;
        }

        for (neighbor, conductance) in coupling {
            numerator += conductance * voltages[*neighbor];
            denominator += conductance;
        }

        numerator / denominator
    }
}

/// Axial connection of a child section to its parent
#[derive(Debug, Clone, Copy)]
pub struct Connection {
    /// Index of the child section
    pub child: usize,
    /// Index of the parent section
    pub parent: usize,
    /// Axial conductance (mS)
    pub conductance: f64,
}

/// Index of a current clamp attached to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StimulusHandle(pub usize);

/// Current clamp injecting into a section, sections are isopotential so the
/// current enters the whole compartment
#[derive(Debug, Clone)]
pub struct CurrentClamp {
    /// Index of the section the clamp is attached to
    pub section: usize,
    /// Waveform of the injected current
    pub stimulus: StimulusSpec,
}

/// Recorded time and voltage vectors
#[derive(Debug, Clone, Default)]
pub struct Recordings {
    /// Time (ms) of each sample
    pub rec_t: Vec<f64>,
    /// Region name, recorded section index and voltage (mV) of each sample
    pub regions: Vec<(String, usize, Vec<f64>)>,
}

impl Recordings {
    fn clear(&mut self) {
        self.rec_t.clear();
        self.regions.iter_mut()
            .for_each(|(_, _, values)| values.clear());
    }
}

/// Cell template that can be initialized, advanced and read back by the simulator
pub trait CellTemplate: Send {
    /// Sets every section to `v_init` (mV) and gates to steady state,
    /// clears recordings and resets time to zero
    fn finitialize(&mut self, v_init: f64);
    /// Advances the cell by `dt` (ms) at the given temperature factor
    fn fadvance(&mut self, dt: f64, temperature_factor: f64);
    /// Current simulation time (ms)
    fn time(&self) -> f64;
    /// Attaches a current clamp to the soma
    fn add_clamp(&mut self, stimulus: StimulusSpec) -> StimulusHandle;
    /// Removes every attached current clamp
    fn clear_clamps(&mut self);
    /// Recorded time vector (ms)
    fn recorded_time(&self) -> &[f64];
    /// Recorded vector by attribute name, `None` if the attribute is not recorded
    fn recorded_vector(&self, attribute: &str) -> Option<&[f64]>;
}

/// Reduced Purkinje cell morphology with a soma, a dendritic tree rooted at a
/// single primary dendrite and a myelinated axon with nodes of Ranvier and
/// collaterals
#[derive(Debug, Clone)]
pub struct PurkinjeTemplate {
    sections: Vec<Section>,
    connections: Vec<Connection>,
    clamps: Vec<CurrentClamp>,
    recordings: Recordings,
    t: f64,
}

impl Default for PurkinjeTemplate {
    fn default() -> Self {
        PurkinjeTemplate::new()
    }
}

impl PurkinjeTemplate {
    /// Builds the morphology, inserts mechanisms and sets up recordings
    pub fn new() -> Self {
        let mut template = PurkinjeTemplate {
            sections: vec![],
            connections: vec![],
            clamps: vec![],
            recordings: Recordings::default(),
            t: 0.,
        };

        template.push_section(
            Section::new("soma", 29.8, 29.8)
                .insert(Nav16::with_conductance(120.))
                .insert(Kv::with_conductance(36.))
                .insert(Cav21::with_conductance(0.2))
                .insert(Cav31::with_conductance(0.05))
                .insert(Leak::default()),
            None,
        );

        // primary dendrite, every other dendrite descends from it
        let dendrites: [(&str, f64, f64, &str); 7] = [
            ("dend[0]", 30., 4., "soma"),
            ("dend[1]", 60., 2.5, "dend[0]"),
            ("dend[2]", 60., 2.5, "dend[0]"),
            ("dend[3]", 80., 1.5, "dend[1]"),
            ("dend[4]", 80., 1.5, "dend[1]"),
            ("dend[5]", 80., 1.5, "dend[2]"),
            ("dend[6]", 80., 1.5, "dend[2]"),
        ];
        for (name, length, diameter, parent) in dendrites {
            template.push_section(
                Section::new(name, length, diameter)
                    .insert(Kv::with_conductance(5.))
                    .insert(Cav21::with_conductance(0.5))
                    .insert(Cav31::with_conductance(0.05))
                    .insert(Leak::with_conductance(0.1)),
                Some(parent),
            );
        }

        template.push_section(
            Section::new("axonAIS", 17., 0.97)
                .insert(Nav16::with_conductance(300.))
                .insert(Kv::with_conductance(50.))
                .insert(Cav21::with_conductance(0.2))
                .insert(Cav31::with_conductance(0.1))
                .insert(Leak::default()),
            Some("soma"),
        );

        let axon: [(&str, &str); 6] = [
            ("axonmyelin", "axonAIS"),
            ("axonNOR", "axonmyelin"),
            ("axonmyelin2", "axonNOR"),
            ("axonNOR2", "axonmyelin2"),
            ("axonmyelin3", "axonNOR2"),
            ("axonNOR3", "axonmyelin3"),
        ];
        for (name, parent) in axon {
            let section = if name.starts_with("axonmyelin") {
                Section::new(name, 100., 0.73)
                    .with_capacitance(0.02)
                    .insert(Leak::with_conductance(0.005))
            } else {
                Section::new(name, 4., 0.73)
                    .insert(Nav16::with_conductance(150.))
                    .insert(Kv::with_conductance(40.))
                    .insert(Cav21::with_conductance(0.1))
                    .insert(Leak::default())
            };

            template.push_section(section, Some(parent));
        }

        for (name, parent) in [("axoncoll", "axonNOR2"), ("axoncoll2", "axoncoll")] {
            template.push_section(
                Section::new(name, 100., 0.6)
                    .insert(Nav16::with_conductance(60.))
                    .insert(Kv::with_conductance(30.))
                    .insert(Cav21::with_conductance(0.1))
                    .insert(Leak::default()),
                Some(parent),
            );
        }

        template.recordings.regions = RECORDED_REGIONS.iter()
            .filter_map(|(region, section)| {
                template.index_of(section).map(|index| (region.to_string(), index, vec![]))
            })
            .collect();

        template
    }

    fn push_section(&mut self, section: Section, parent: Option<&str>) {
        let child = self.sections.len();
        let parent = parent.and_then(|name| self.index_of(name));

        if let Some(parent) = parent {
            let resistance = section.half_resistance() + self.sections[parent].half_resistance();
            self.connections.push(
                Connection { child, parent, conductance: 1e3 / resistance }
            );
        }

        self.sections.push(section);
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.name == name)
    }

    /// All sections in creation order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Axial connections between sections
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Attached current clamps
    pub fn clamps(&self) -> &[CurrentClamp] {
        &self.clamps
    }

    /// Gets a section by name
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Gets a mutable section by name
    pub fn section_mut(&mut self, name: &str) -> Result<&mut Section, SimulationError> {
        self.sections.iter_mut()
            .find(|section| section.name == name)
            .ok_or_else(|| SimulationError::SectionNotFound(name.to_string()))
    }

    /// Iterates over every dendritic section
    pub fn dendrites_mut(&mut self) -> impl Iterator<Item = &mut Section> {
        self.sections.iter_mut()
            .filter(|section| section.name.starts_with("dend"))
    }

    /// Whether the named section is attached to a parent section
    pub fn has_parent(&self, name: &str) -> bool {
        match self.index_of(name) {
            Some(index) => self.connections.iter().any(|connection| connection.child == index),
            None => false,
        }
    }

    /// Detaches the named section (and everything distal to it) from its parent,
    /// returns whether a connection was removed
    pub fn disconnect(&mut self, name: &str) -> Result<bool, SimulationError> {
        let index = self.index_of(name)
            .ok_or_else(|| SimulationError::SectionNotFound(name.to_string()))?;

        let before = self.connections.len();
        self.connections.retain(|connection| connection.child != index);

        Ok(self.connections.len() != before)
    }

    fn injected_currents(&self) -> Vec<f64> {
        let mut injected = vec![0.; self.sections.len()];
        for clamp in &self.clamps {
            injected[clamp.section] += clamp.stimulus.current_at(self.t);
        }

        injected
    }

    fn coupling(&self) -> Vec<Vec<(usize, f64)>> {
        let mut coupling = vec![vec![]; self.sections.len()];
        for connection in &self.connections {
            coupling[connection.child].push((connection.parent, connection.conductance));
            coupling[connection.parent].push((connection.child, connection.conductance));
        }

        coupling
    }

    fn record(&mut self) {
        self.recordings.rec_t.push(self.t);
        for (_, index, values) in self.recordings.regions.iter_mut() {
            values.push(self.sections[*index].voltage);
        }
    }
}

impl CellTemplate for PurkinjeTemplate {
    fn finitialize(&mut self, v_init: f64) {
        self.t = 0.;
        self.sections.par_iter_mut()
            .for_each(|section| section.initialize(v_init));
        self.recordings.clear();
        self.record();
    }

    fn fadvance(&mut self, dt: f64, temperature_factor: f64) {
        self.sections.par_iter_mut()
            .for_each(|section| section.update_gates(dt, temperature_factor));

        let injected = self.injected_currents();
        let coupling = self.coupling();
        let voltages: Vec<f64> = self.sections.iter()
            .map(|section| section.voltage)
            .collect();

        let next_voltages: Vec<f64> = self.sections.par_iter()
            .enumerate()
            .map(|(index, section)| section.next_voltage(dt, &coupling[index], &voltages, injected[index]))
            .collect();

        self.sections.par_iter_mut()
            .zip(next_voltages.par_iter())
            .for_each(|(section, voltage)| {
                section.voltage = *voltage;
                section.update_currents();
            });

        self.t += dt;
        self.record();
    }

    fn time(&self) -> f64 {
        self.t
    }

    fn add_clamp(&mut self, stimulus: StimulusSpec) -> StimulusHandle {
        let section = self.index_of("soma").unwrap_or(0);
        self.clamps.push(CurrentClamp { section, stimulus });

        StimulusHandle(self.clamps.len() - 1)
    }

    fn clear_clamps(&mut self) {
        self.clamps.clear();
    }

    fn recorded_time(&self) -> &[f64] {
        &self.recordings.rec_t
    }

    fn recorded_vector(&self, attribute: &str) -> Option<&[f64]> {
        if attribute == TIME_VECTOR {
            return Some(self.recordings.rec_t.as_slice());
        }

        self.recordings.regions.iter()
            .find(|(region, _, _)| region == attribute)
            .map(|(_, _, values)| values.as_slice())
    }
}
