#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};
    use tempfile::TempDir;
    use cerebellum_models::{
        error::RecorderError,
        spikes::{
            extract_spikes, extract_spikes_with_sign, peak_detection,
            IrregularlySampledSignal, SpikeSign,
        },
    };

    fn write_trace(dir: &TempDir, rows: &[(f64, f64)]) -> PathBuf {
        let path = dir.path().join("vm_soma.txt");
        let content: String = rows.iter()
            .map(|(t, v)| format!("{:e} {:e}\n", t, v))
            .collect();
        fs::write(&path, content).unwrap();

        path
    }

    #[test]
    pub fn test_no_crossing_gives_no_spikes() -> Result<(), RecorderError> {
        let dir = TempDir::new().unwrap();
        let path = write_trace(&dir, &[(0., -65.), (0.025, -64.), (0.05, -10.), (0.075, -65.)]);

        assert!(extract_spikes(&path, 0.)?.is_empty());

        Ok(())
    }

    #[test]
    pub fn test_single_crossing_gives_its_peak_time() -> Result<(), RecorderError> {
        let dir = TempDir::new().unwrap();
        let path = write_trace(
            &dir,
            &[(0., -65.), (1., -20.), (2., 10.), (3., 35.), (4., 20.), (5., -60.), (6., -65.)],
        );

        assert_eq!(extract_spikes(&path, 0.)?, vec![3.]);

        Ok(())
    }

    #[test]
    pub fn test_negative_threshold_detects_troughs() -> Result<(), RecorderError> {
        let dir = TempDir::new().unwrap();
        let path = write_trace(
            &dir,
            &[(0., -60.), (1., -72.), (2., -80.), (3., -75.), (4., -60.), (5., -71.), (6., -62.)],
        );

        assert_eq!(extract_spikes(&path, -70.)?, vec![2., 5.]);
        assert_eq!(extract_spikes_with_sign(&path, -70., SpikeSign::Above)?, vec![0., 4., 6.]);

        Ok(())
    }

    #[test]
    pub fn test_polarity_from_threshold() {
        assert_eq!(SpikeSign::from_threshold(0.), SpikeSign::Above);
        assert_eq!(SpikeSign::from_threshold(-20.), SpikeSign::Below);
    }

    #[test]
    pub fn test_run_at_end_of_signal_counts() {
        let signal = IrregularlySampledSignal::new(
            vec![0., 0.5, 2., 2.5, 4.],
            vec![5., -10., -5., 12., 30.],
        );

        assert_eq!(peak_detection(&signal, 0., SpikeSign::Above), vec![0., 4.]);
        assert!(peak_detection(&IrregularlySampledSignal::default(), 0., SpikeSign::Above).is_empty());
    }

    #[test]
    pub fn test_malformed_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vm_soma.txt");
        fs::write(&path, "0.0 -65.0\n0.025 not-a-number\n").unwrap();

        assert!(matches!(
            extract_spikes(&path, 0.),
            Err(RecorderError::MalformedRow { row: 1, .. })
        ));
        assert!(matches!(
            extract_spikes(&dir.path().join("missing.txt"), 0.),
            Err(RecorderError::File { .. })
        ));
    }
}
