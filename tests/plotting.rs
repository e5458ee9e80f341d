#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};
    use tempfile::TempDir;
    use cerebellum_models::{
        error::{CerebellumModelsError, PlotError},
        plot::{visualize_spikes, visualize_voltages},
    };

    fn saved_predictions(root: &TempDir) -> PathBuf {
        let dir = root.path().join("model-predictions").join("cells").join("PC2015Masoli");
        fs::create_dir_all(&dir).unwrap();

        fs::write(
            dir.join("vm_soma.txt"),
            "0.000000000000000000e+00 -6.500000000000000000e+01\n\
            2.500000000000000139e-02 -2.000000000000000000e+01\n\
            5.000000000000000278e-02 3.000000000000000000e+01\n\
            7.500000000000000000e-02 -6.000000000000000000e+01\n",
        ).unwrap();
        fs::write(
            dir.join("spikes_vm_soma.txt"),
            "1.250000000000000000e+01\n4.000000000000000000e+01\n",
        ).unwrap();

        dir
    }

    #[test]
    pub fn test_plots_from_saved_predictions() -> Result<(), CerebellumModelsError> {
        let root = TempDir::new().unwrap();
        let dir = saved_predictions(&root);

        let raster = root.path().join("spikes.svg");
        let source = visualize_spikes(root.path(), "PC2015Masoli", "vm_soma", &raster)?;
        assert_eq!(source, dir.join("spikes_vm_soma.txt"));

        let raster = fs::read_to_string(&raster).unwrap();
        assert!(raster.contains("<svg"));
        assert!(raster.contains("Spike Train from vm_soma, PC2015Masoli"));

        let trace = root.path().join("voltages.svg");
        let source = visualize_voltages(root.path(), "PC2015Masoli", "vm_soma", &trace)?;
        assert_eq!(source, dir.join("vm_soma.txt"));

        let trace = fs::read_to_string(&trace).unwrap();
        assert!(trace.contains("<svg"));
        assert!(trace.contains("Voltage response from vm_soma, PC2015Masoli"));

        Ok(())
    }

    #[test]
    pub fn test_missing_prediction_file() {
        let root = TempDir::new().unwrap();
        saved_predictions(&root);

        let result = visualize_spikes(
            root.path(), "PC2015Masoli", "vm_NOR3", &root.path().join("missing.svg"),
        );

        assert!(matches!(
            result,
            Err(CerebellumModelsError::PlotRelatedError(PlotError::PredictionFileNotFound { .. }))
        ));
        assert!(!root.path().join("missing.svg").exists());
    }
}
