#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use cerebellum_models::{
        cell::{CellTemplate, PurkinjeTemplate, StimulusHandle, TIME_VECTOR},
        cell::channels::{temperature_factor, DEFAULT_Q10},
        error::{CerebellumModelsError, SimulationError},
        simulation::{ordered_stimuli, SimulationConfig, Simulator, StimulusSpec},
    };

    #[test]
    pub fn test_config_validation() {
        assert!(SimulationConfig::default().validate().is_ok());

        let invalid = [
            SimulationConfig { dt: 0., ..SimulationConfig::default() },
            SimulationConfig { dt: -0.025, ..SimulationConfig::default() },
            SimulationConfig { tstop: -1., ..SimulationConfig::default() },
            SimulationConfig { celsius: f64::NAN, ..SimulationConfig::default() },
            SimulationConfig { v_init: f64::INFINITY, ..SimulationConfig::default() },
        ];
        for config in invalid {
            assert!(matches!(config.validate(), Err(SimulationError::InvalidParameter { .. })));
        }

        let mut simulator = Simulator::default();
        assert!(simulator.configure(SimulationConfig { dt: 0., ..SimulationConfig::default() }).is_err());
        assert_eq!(*simulator.config(), SimulationConfig::default());
    }

    #[test]
    pub fn test_stimulus_waveforms() {
        let step = StimulusSpec::Step { amp: 0.5, dur: 10., delay: 5. };
        assert_eq!(step.current_at(4.9), 0.);
        assert_eq!(step.current_at(5.), 0.5);
        assert_eq!(step.current_at(14.9), 0.5);
        assert_eq!(step.current_at(15.), 0.);

        let ramp = StimulusSpec::Ramp { amp_initial: 0., amp_final: 1., dur: 10., delay: 0. };
        assert!((ramp.current_at(5.) - 0.5).abs() < 1e-12);
        assert_eq!(ramp.current_at(10.), 0.);

        assert!(StimulusSpec::Step { amp: 1., dur: -1., delay: 0. }.validate().is_err());
    }

    #[test]
    pub fn test_stimulus_table_order() -> Result<(), SimulationError> {
        let table = BTreeMap::from([
            (String::from("current10"), StimulusSpec::Step { amp: 10., dur: 1., delay: 0. }),
            (String::from("current2"), StimulusSpec::Step { amp: 2., dur: 1., delay: 0. }),
            (String::from("current1"), StimulusSpec::Step { amp: 1., dur: 1., delay: 0. }),
        ]);
        // current10 without current3 to current9
        assert!(matches!(ordered_stimuli(&table), Err(SimulationError::UnexpectedStimulusKey(_))));

        let table: BTreeMap<String, StimulusSpec> = (1..=10)
            .map(|n| (format!("current{}", n), StimulusSpec::Step { amp: n as f64, dur: 1., delay: 0. }))
            .collect();
        let amps: Vec<f64> = ordered_stimuli(&table)?
            .into_iter()
            .map(|spec| match spec {
                StimulusSpec::Step { amp, .. } => amp,
                StimulusSpec::Ramp { amp_final, .. } => amp_final,
            })
            .collect();
        assert_eq!(amps, (1..=10).map(|n| n as f64).collect::<Vec<f64>>());

        let table = BTreeMap::from([
            (String::from("stim1"), StimulusSpec::Step { amp: 1., dur: 1., delay: 0. }),
        ]);
        assert!(matches!(ordered_stimuli(&table), Err(SimulationError::UnexpectedStimulusKey(key)) if key == "stim1"));

        Ok(())
    }

    #[test]
    pub fn test_temperature_factor() {
        assert_eq!(temperature_factor(37., DEFAULT_Q10), 1.);
        assert!((temperature_factor(27., DEFAULT_Q10) - 1. / 3.).abs() < 1e-12);
    }

    #[test]
    pub fn test_run_records_every_step() -> Result<(), CerebellumModelsError> {
        let config = SimulationConfig { dt: 0.05, tstop: 20., ..SimulationConfig::default() };
        let simulator = Simulator::new(config)?;
        let mut cell = PurkinjeTemplate::new();

        let handles = simulator.attach_stimuli(
            &mut cell,
            &[
                StimulusSpec::Step { amp: 0.2, dur: 5., delay: 2. },
                StimulusSpec::Ramp { amp_initial: 0., amp_final: 0.4, dur: 5., delay: 10. },
            ],
        )?;
        assert_eq!(handles, vec![StimulusHandle(0), StimulusHandle(1)]);
        assert_eq!(cell.clamps().len(), 2);

        let report = simulator.run(&mut cell);

        assert_eq!(report.steps, 400);
        assert!((report.simulated_time - 20.).abs() < 1e-9);
        assert_eq!(cell.recorded_time().len(), 401);
        assert_eq!(cell.recorded_time()[0], 0.);

        for region in ["vm_soma", "vm_dend", "vm_AIS", "vm_NOR", "vm_NOR2", "vm_NOR3", "vm_coll"] {
            let values = cell.recorded_vector(region).unwrap();
            assert_eq!(values.len(), 401, "{}", region);
            assert_eq!(values[0], -65.);
            assert!(values.iter().all(|v| v.is_finite()), "{}", region);
        }
        assert!(cell.recorded_vector(TIME_VECTOR).is_some());
        assert!(cell.recorded_vector("vm_spine").is_none());

        // a second run starts over
        simulator.run(&mut cell);
        assert_eq!(cell.recorded_time().len(), 401);

        Ok(())
    }

    #[test]
    pub fn test_dedicated_pool_matches_global_pool() -> Result<(), CerebellumModelsError> {
        let config = SimulationConfig { tstop: 10., ..SimulationConfig::default() };
        let stimulus = [StimulusSpec::Step { amp: 1., dur: 5., delay: 1. }];

        let global = Simulator::new(config)?;
        let mut first = PurkinjeTemplate::new();
        global.attach_stimuli(&mut first, &stimulus)?;
        global.run(&mut first);

        let pooled = Simulator::new(config)?.discover_cores();
        let mut second = PurkinjeTemplate::new();
        pooled.attach_stimuli(&mut second, &stimulus)?;
        pooled.run(&mut second);

        assert_eq!(first.recorded_vector("vm_soma"), second.recorded_vector("vm_soma"));

        Ok(())
    }
}
