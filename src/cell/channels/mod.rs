//! Ion channel mechanisms inserted into cell sections, gating follows
//! alpha/beta or steady state/time constant kinetics with rates defined at
//! [`TEMPERATURE_REFERENCE`] and scaled by a Q10 temperature factor.

use std::fmt::Debug;
use super::channel_traits::ChannelBase;


/// Temperature (degrees C) at which channel rates are defined
pub const TEMPERATURE_REFERENCE: f64 = 37.;
/// Default Q10 for channel gating
pub const DEFAULT_Q10: f64 = 3.;

/// Scaling factor for gating rates at a given temperature
pub fn temperature_factor(celsius: f64, q10: f64) -> f64 {
    q10.powf((celsius - TEMPERATURE_REFERENCE) / 10.)
}

/// Evaluates `x / (exp(x / y) - 1)` while avoiding the singularity at `x = 0`
fn vtrap(x: f64, y: f64) -> f64 {
    if (x / y).abs() < 1e-6 {
        y * (1. - x / y / 2.)
    } else {
        x / ((x / y).exp() - 1.)
    }
}

fn boltzmann(voltage: f64, half: f64, slope: f64) -> f64 {
    1. / (1. + (-(voltage - half) / slope).exp())
}

/// Gating variable of an ion channel
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    /// Open fraction of the gate
    pub state: f64,
}

impl Default for Gate {
    fn default() -> Self {
        Gate { state: 0. }
    }
}

impl Gate {
    /// Sets the gate to its steady state given opening and closing rates
    pub fn init_rates(&mut self, alpha: f64, beta: f64) {
        self.state = alpha / (alpha + beta);
    }

    /// Advances the gate given opening and closing rates (1/ms) over `dt` (ms)
    pub fn update_rates(&mut self, alpha: f64, beta: f64, dt: f64) {
        let tau = 1. / (alpha + beta);
        self.update_steady_state(alpha * tau, tau, dt);
    }

    /// Advances the gate toward `steady_state` with time constant `tau` (ms)
    /// using exponential Euler, unconditionally stable for any `dt`
    pub fn update_steady_state(&mut self, steady_state: f64, tau: f64, dt: f64) {
        self.state = steady_state + (self.state - steady_state) * (-dt / tau).exp();
    }
}

/// Identifies a mechanism for knockouts and inspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Nav1.6 voltage gated sodium channel (`gbar_Nav1_6`)
    Nav16,
    /// Delayed rectifier potassium channel
    Kv,
    /// Cav2.1 P/Q-type calcium channel (`pcabar_Cav2_1`)
    Cav21,
    /// Cav3.1 T-type calcium channel (`pcabar_Cav3_1`)
    Cav31,
    /// Passive leak
    Leak,
}

/// Maximal conductance and current accessors, derived with `ChannelBase`
pub trait ChannelConductance {
    /// Gets maximal conductance (mS/cm^2)
    fn get_max_conductance(&self) -> f64;
    /// Sets maximal conductance (mS/cm^2)
    fn set_max_conductance(&mut self, conductance: f64);
    /// Gets last calculated current density (uA/cm^2)
    fn get_current(&self) -> f64;
}

/// Handles dynamics of a mechanism inserted into a section
pub trait IonChannel: ChannelConductance + Debug + Send + Sync {
    /// Kind of mechanism
    fn kind(&self) -> ChannelKind;
    /// Sets gates to their steady state at the given voltage (mV)
    fn initialize(&mut self, voltage: f64);
    /// Advances gates over `dt` (ms) given the voltage (mV) and temperature factor
    fn update_gates(&mut self, voltage: f64, dt: f64, temperature_factor: f64);
    /// Returns the present conductance (mS/cm^2) and reversal potential (mV)
    fn conductance_and_reversal(&self) -> (f64, f64);
    /// Recalculates current density from the present conductance
    fn update_current(&mut self, voltage: f64);
    /// Returns a boxed copy of the mechanism
    fn clone_box(&self) -> Box<dyn IonChannel>;
}

macro_rules! impl_ohmic_current {
    () => {
        fn update_current(&mut self, voltage: f64) {
            let (conductance, reversal) = self.conductance_and_reversal();
            self.current = conductance * (voltage - reversal);
        }

        fn clone_box(&self) -> Box<dyn IonChannel> {
            Box::new(self.clone())
        }
    };
}

/// Transient sodium channel, `m^3 h` kinetics
#[derive(Debug, Clone, ChannelBase)]
pub struct Nav16 {
    /// Maximal conductance (mS/cm^2)
    #[conductance]
    pub gbar: f64,
    /// Reversal potential (mV)
    pub e_na: f64,
    /// Activation gate
    pub m: Gate,
    /// Inactivation gate
    pub h: Gate,
    /// Current density (uA/cm^2)
    pub current: f64,
}

impl Default for Nav16 {
    fn default() -> Self {
        Nav16 { gbar: 120., e_na: 50., m: Gate::default(), h: Gate::default(), current: 0. }
    }
}

impl Nav16 {
    pub fn with_conductance(gbar: f64) -> Self {
        Nav16 { gbar, ..Nav16::default() }
    }

    fn m_rates(voltage: f64) -> (f64, f64) {
        (0.1 * vtrap(-(voltage + 40.), 10.), 4. * (-(voltage + 65.) / 18.).exp())
    }

    fn h_rates(voltage: f64) -> (f64, f64) {
        (0.07 * (-(voltage + 65.) / 20.).exp(), 1. / ((-(voltage + 35.) / 10.).exp() + 1.))
    }
}

impl IonChannel for Nav16 {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Nav16
    }

    fn initialize(&mut self, voltage: f64) {
        let (alpha_m, beta_m) = Nav16::m_rates(voltage);
        let (alpha_h, beta_h) = Nav16::h_rates(voltage);
        self.m.init_rates(alpha_m, beta_m);
        self.h.init_rates(alpha_h, beta_h);
        self.update_current(voltage);
    }

    fn update_gates(&mut self, voltage: f64, dt: f64, temperature_factor: f64) {
        let (alpha_m, beta_m) = Nav16::m_rates(voltage);
        let (alpha_h, beta_h) = Nav16::h_rates(voltage);
        self.m.update_rates(alpha_m * temperature_factor, beta_m * temperature_factor, dt);
        self.h.update_rates(alpha_h * temperature_factor, beta_h * temperature_factor, dt);
    }

    fn conductance_and_reversal(&self) -> (f64, f64) {
        (self.gbar * self.m.state.powi(3) * self.h.state, self.e_na)
    }

    impl_ohmic_current!();
}

/// Delayed rectifier potassium channel, `n^4` kinetics
#[derive(Debug, Clone, ChannelBase)]
pub struct Kv {
    /// Maximal conductance (mS/cm^2)
    #[conductance]
    pub gbar: f64,
    /// Reversal potential (mV)
    pub e_k: f64,
    /// Activation gate
    pub n: Gate,
    /// Current density (uA/cm^2)
    pub current: f64,
}

impl Default for Kv {
    fn default() -> Self {
        Kv { gbar: 36., e_k: -77., n: Gate::default(), current: 0. }
    }
}

impl Kv {
    pub fn with_conductance(gbar: f64) -> Self {
        Kv { gbar, ..Kv::default() }
    }

    fn n_rates(voltage: f64) -> (f64, f64) {
        (0.01 * vtrap(-(voltage + 55.), 10.), 0.125 * (-(voltage + 65.) / 80.).exp())
    }
}

impl IonChannel for Kv {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Kv
    }

    fn initialize(&mut self, voltage: f64) {
        let (alpha, beta) = Kv::n_rates(voltage);
        self.n.init_rates(alpha, beta);
        self.update_current(voltage);
    }

    fn update_gates(&mut self, voltage: f64, dt: f64, temperature_factor: f64) {
        let (alpha, beta) = Kv::n_rates(voltage);
        self.n.update_rates(alpha * temperature_factor, beta * temperature_factor, dt);
    }

    fn conductance_and_reversal(&self) -> (f64, f64) {
        (self.gbar * self.n.state.powi(4), self.e_k)
    }

    impl_ohmic_current!();
}

/// P/Q-type high voltage activated calcium channel, single activation gate
#[derive(Debug, Clone, ChannelBase)]
pub struct Cav21 {
    /// Maximal conductance (mS/cm^2)
    #[conductance]
    pub pcabar: f64,
    /// Reversal potential (mV)
    pub e_ca: f64,
    /// Activation gate
    pub m: Gate,
    /// Current density (uA/cm^2)
    pub current: f64,
}

impl Default for Cav21 {
    fn default() -> Self {
        Cav21 { pcabar: 0.2, e_ca: 137.5, m: Gate::default(), current: 0. }
    }
}

impl Cav21 {
    pub fn with_conductance(pcabar: f64) -> Self {
        Cav21 { pcabar, ..Cav21::default() }
    }

    fn m_inf(voltage: f64) -> f64 {
        boltzmann(voltage, -19., 5.5)
    }

    fn tau_m(voltage: f64) -> f64 {
        0.2 + 0.8 * (-((voltage + 20.) / 25.).powi(2)).exp()
    }
}

impl IonChannel for Cav21 {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Cav21
    }

    fn initialize(&mut self, voltage: f64) {
        self.m.state = Cav21::m_inf(voltage);
        self.update_current(voltage);
    }

    fn update_gates(&mut self, voltage: f64, dt: f64, temperature_factor: f64) {
        self.m.update_steady_state(Cav21::m_inf(voltage), Cav21::tau_m(voltage) / temperature_factor, dt);
    }

    fn conductance_and_reversal(&self) -> (f64, f64) {
        (self.pcabar * self.m.state, self.e_ca)
    }

    impl_ohmic_current!();
}

/// T-type low voltage activated calcium channel, `m^2 h` kinetics
#[derive(Debug, Clone, ChannelBase)]
pub struct Cav31 {
    /// Maximal conductance (mS/cm^2)
    #[conductance]
    pub pcabar: f64,
    /// Reversal potential (mV)
    pub e_ca: f64,
    /// Activation gate
    pub m: Gate,
    /// Inactivation gate
    pub h: Gate,
    /// Current density (uA/cm^2)
    pub current: f64,
}

impl Default for Cav31 {
    fn default() -> Self {
        Cav31 { pcabar: 0.05, e_ca: 137.5, m: Gate::default(), h: Gate::default(), current: 0. }
    }
}

impl Cav31 {
    pub fn with_conductance(pcabar: f64) -> Self {
        Cav31 { pcabar, ..Cav31::default() }
    }

    fn m_inf(voltage: f64) -> f64 {
        boltzmann(voltage, -52., 5.)
    }

    fn h_inf(voltage: f64) -> f64 {
        boltzmann(voltage, -72., -4.)
    }
}

impl IonChannel for Cav31 {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Cav31
    }

    fn initialize(&mut self, voltage: f64) {
        self.m.state = Cav31::m_inf(voltage);
        self.h.state = Cav31::h_inf(voltage);
        self.update_current(voltage);
    }

    fn update_gates(&mut self, voltage: f64, dt: f64, temperature_factor: f64) {
        self.m.update_steady_state(Cav31::m_inf(voltage), 1. / temperature_factor, dt);
        self.h.update_steady_state(Cav31::h_inf(voltage), 15. / temperature_factor, dt);
    }

    fn conductance_and_reversal(&self) -> (f64, f64) {
        (self.pcabar * self.m.state.powi(2) * self.h.state, self.e_ca)
    }

    impl_ohmic_current!();
}

/// Passive leak conductance
#[derive(Debug, Clone, ChannelBase)]
pub struct Leak {
    /// Conductance (mS/cm^2)
    #[conductance]
    pub gbar: f64,
    /// Reversal potential (mV)
    pub e_leak: f64,
    /// Current density (uA/cm^2)
    pub current: f64,
}

impl Default for Leak {
    fn default() -> Self {
        Leak { gbar: 0.3, e_leak: -54.3, current: 0. }
    }
}

impl Leak {
    pub fn with_conductance(gbar: f64) -> Self {
        Leak { gbar, ..Leak::default() }
    }
}

impl IonChannel for Leak {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Leak
    }

    fn initialize(&mut self, voltage: f64) {
        self.update_current(voltage);
    }

    fn update_gates(&mut self, _: f64, _: f64, _: f64) {}

    fn conductance_and_reversal(&self) -> (f64, f64) {
        (self.gbar, self.e_leak)
    }

    impl_ohmic_current!();
}
