#[cfg(test)]
mod tests {
    use std::{fs, path::{Path, PathBuf}};
    use tempfile::TempDir;
    use cerebellum_models::{
        config::{load_config, parse_config, RunConfig},
        error::{CerebellumModelsError, ConfigError},
        recorder::{CellRegions, ResponseType},
        simulation::{SimulationConfig, StimulusSpec},
    };

    const FULL_CONFIG: &str = r#"
        root = "/data/cerebellum"
        capability = "voltage_response"

        [simulation]
        dt = 0.01
        celsius = 32
        tstop = 200
        v_init = -70

        [stimulation.current1]
        amp = 0.5
        dur = 50
        delay = 10

        [stimulation.current2]
        amp_initial = 0.0
        amp_final = 1.0
        dur = 100
        delay = 80

        [regions]
        vm_soma = 0.0
        vm_AIS = -20.0

        [knockout]
        ais = true

        [toolchain]
        program = "/opt/neuron/bin/nrnivmodl"
        require_library = false

        [export]
        nwb = "session.nwb.json"
    "#;

    #[test]
    pub fn test_full_config() -> Result<(), CerebellumModelsError> {
        let config = parse_config(FULL_CONFIG, Path::new("run.toml"))?;
        config.validate()?;

        assert_eq!(config.root, PathBuf::from("/data/cerebellum"));
        assert_eq!(config.capability, ResponseType::VoltageResponse);
        assert_eq!(config.simulation, SimulationConfig { dt: 0.01, celsius: 32., tstop: 200., v_init: -70. });
        assert_eq!(
            config.stimuli()?,
            vec![
                StimulusSpec::Step { amp: 0.5, dur: 50., delay: 10. },
                StimulusSpec::Ramp { amp_initial: 0., amp_final: 1., dur: 100., delay: 80. },
            ],
        );
        assert_eq!(config.regions.threshold("vm_AIS"), Some(-20.));
        assert_eq!(config.regions.threshold("vm_NOR3"), None);
        assert!(config.knockout.ais && !config.knockout.cav2_1 && !config.knockout.disconnect_dendrites);
        assert_eq!(config.toolchain.program, "/opt/neuron/bin/nrnivmodl");
        assert!(!config.toolchain.require_library);
        assert_eq!(config.nwb_path(), Some(PathBuf::from("/data/cerebellum/session.nwb.json")));

        Ok(())
    }

    #[test]
    pub fn test_defaults_fill_missing_tables() -> Result<(), ConfigError> {
        let config = parse_config("[simulation]\ntstop = 50\n", Path::new("run.toml"))?;

        assert_eq!(config.simulation, SimulationConfig { tstop: 50., ..SimulationConfig::default() });
        assert_eq!(config.regions, CellRegions::default());
        assert_eq!(config.capability, ResponseType::SpikeTrain);
        assert!(config.stimulation.is_empty());
        assert!(config.toolchain.require_library);
        assert_eq!(config.nwb_path(), None);

        assert_eq!(parse_config("", Path::new("empty.toml"))?, RunConfig::default());

        Ok(())
    }

    #[test]
    pub fn test_invalid_configs() {
        assert!(matches!(
            parse_config("capability = \"membrane_potential\"", Path::new("run.toml")),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            "membrane_potential".parse::<ResponseType>(),
            Err(ConfigError::UnknownCapability(_))
        ));

        let gap = "[stimulation.current2]\namp = 1.0\ndur = 1.0\ndelay = 0.0\n";
        let config = parse_config(gap, Path::new("run.toml")).unwrap();
        assert!(config.validate().is_err());

        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_config(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    pub fn test_load_config_from_file() -> Result<(), ConfigError> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.toml");
        fs::write(&path, "capability = \"spike_train\"\n[regions]\nvm_NOR3 = 0.0\n").unwrap();

        let config = load_config(&path)?;
        assert_eq!(config.capability, ResponseType::SpikeTrain);
        assert_eq!(config.regions.len(), 1);

        Ok(())
    }
}
