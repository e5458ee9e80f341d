#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use tempfile::TempDir;
    use cerebellum_models::{
        cell::{CellTemplate, PurkinjeTemplate},
        error::{CerebellumModelsError, RecorderError},
        recorder::{
            format_scientific, load_spike_file, load_voltage_file, record_spikes, record_voltage,
            spike_file_path, voltage_file_path, CellRegions, PredictionStore,
        },
        simulation::{SimulationConfig, Simulator},
    };

    fn short_run() -> Result<PurkinjeTemplate, CerebellumModelsError> {
        let mut cell = PurkinjeTemplate::new();
        let simulator = Simulator::new(SimulationConfig { tstop: 5., ..SimulationConfig::default() })?;
        simulator.run(&mut cell);

        Ok(cell)
    }

    #[test]
    pub fn test_scientific_format() {
        assert_eq!(format_scientific(-65.), "-6.500000000000000000e+01");
        assert_eq!(format_scientific(0.), "0.000000000000000000e+00");
        assert_eq!(format_scientific(0.025), "2.500000000000000139e-02");
    }

    #[test]
    pub fn test_voltage_round_trip() -> Result<(), CerebellumModelsError> {
        let dir = TempDir::new().unwrap();
        let cell = short_run()?;
        let regions = CellRegions::default();
        let mut store = PredictionStore::default();
        let mut files: Vec<PathBuf> = vec![];

        record_voltage(&cell, &regions, dir.path(), &mut store, &mut files)?;

        assert_eq!(files.len(), 2);
        for (region, _) in regions.iter() {
            let path = voltage_file_path(dir.path(), region);
            assert!(files.contains(&path));

            let (times, volts) = load_voltage_file(&path)?;
            let response = &store.voltage_response[region];

            assert_eq!(response.ncols(), 2);
            assert_eq!(times, response.column(0).to_vec());
            assert_eq!(volts, response.column(1).to_vec());
            assert_eq!(times.as_slice(), cell.recorded_time());
            assert_eq!(Some(volts.as_slice()), cell.recorded_vector(region));
        }

        Ok(())
    }

    #[test]
    pub fn test_unrecorded_region_fails_at_save() -> Result<(), CerebellumModelsError> {
        let dir = TempDir::new().unwrap();
        let cell = short_run()?;
        let mut regions = CellRegions::empty();
        regions.insert("vm_spine", 0.);

        let result = record_voltage(&cell, &regions, dir.path(), &mut PredictionStore::default(), &mut vec![]);
        assert!(matches!(result, Err(RecorderError::RegionNotRecorded(region)) if region == "vm_spine"));

        Ok(())
    }

    #[test]
    pub fn test_spike_round_trip() -> Result<(), CerebellumModelsError> {
        let dir = TempDir::new().unwrap();
        let regions = CellRegions::default();
        let mut store = PredictionStore::default();
        let mut files = vec![];

        assert!(matches!(
            record_spikes(&store, &regions, dir.path(), &mut files),
            Err(RecorderError::SpikeTrainNotComputed(_))
        ));

        store.spike_train.insert(String::from("vm_soma"), vec![12.5, 37.125, 61.8]);
        store.spike_train.insert(String::from("vm_NOR3"), vec![]);
        record_spikes(&store, &regions, dir.path(), &mut files)?;

        assert_eq!(load_spike_file(&spike_file_path(dir.path(), "vm_soma"))?, vec![12.5, 37.125, 61.8]);
        assert!(load_spike_file(&spike_file_path(dir.path(), "vm_NOR3"))?.is_empty());
        assert!(files.iter().all(|path| path.file_name().unwrap().to_string_lossy().starts_with("spikes_")));

        Ok(())
    }
}
