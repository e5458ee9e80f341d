use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};
use cerebellum_models::{
    capability::{
        CanDisconnectDendrites, CanKOAISChannels, CanKOCav2pt1Channels,
        ProducesElectricalResponse, ProducesSpikeTrain,
    },
    cells::{PurkinjeCell, PurkinjeCellOptions, MODEL_SCALE},
    compiler::Nrnivmodl,
    config::{load_config, RunConfig},
    error::CerebellumModelsError,
    paths::{get_available_models, get_prediction_file},
    plot::{visualize_spikes, visualize_voltages},
    recorder::ResponseType,
    spikes::{extract_spikes, extract_spikes_with_sign, SpikeSign},
};


/// Polarity of detected spikes
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Sign {
    /// Peaks above the threshold
    Above,
    /// Troughs below the threshold
    Below,
}

impl From<Sign> for SpikeSign {
    fn from(sign: Sign) -> Self {
        match sign {
            Sign::Above => SpikeSign::Above,
            Sign::Below => SpikeSign::Below,
        }
    }
}

/// Kind of figure drawn from saved predictions
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Figure {
    /// Raster of `spikes_<region>.txt`
    Spikes,
    /// Trace of `<region>.txt`
    Voltages,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lists the models available at a scale
    ListModels {
        /// Directory containing `models`
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Modelling scale
        #[arg(long, default_value = MODEL_SCALE)]
        scale: String,
    },
    /// Runs a model as described by a TOML file
    Run {
        /// Run configuration
        config: PathBuf,
    },
    /// Extracts spike times from a saved two column voltage file
    Spikes {
        /// Voltage file
        file: PathBuf,
        /// Detection threshold (mV)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        threshold: f64,
        /// Overrides the polarity implied by the threshold
        #[arg(long)]
        sign: Option<Sign>,
    },
    /// Finds a saved prediction file of a model
    Locate {
        /// Model name
        model: String,
        /// Prediction file name
        file: String,
        /// Directory containing `model-predictions`
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Draws saved predictions of a model region as an SVG figure
    Plot {
        /// Figure to draw
        figure: Figure,
        /// Model name
        model: String,
        /// Recorded region
        #[arg(long, default_value = "vm_soma")]
        region: String,
        /// Output SVG file
        #[arg(long, short)]
        out: PathBuf,
        /// Directory containing `model-predictions`
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}

/// Runs cerebellar cell models and handles their saved predictions
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

/// Writes HDF5 for `.nwb` and `.h5` paths, JSON otherwise
#[cfg(feature = "hdf5")]
fn export_nwb(pc: &PurkinjeCell, path: &Path) -> Result<(), CerebellumModelsError> {
    match path.extension().and_then(|extension| extension.to_str()) {
        Some("nwb") | Some("h5") => pc.export_nwb_hdf5(path)?,
        _ => pc.export_nwb(path)?,
    };

    Ok(())
}

#[cfg(not(feature = "hdf5"))]
fn export_nwb(pc: &PurkinjeCell, path: &Path) -> Result<(), CerebellumModelsError> {
    pc.export_nwb(path)?;

    Ok(())
}

fn run_model(config: RunConfig) -> Result<(), CerebellumModelsError> {
    config.validate()?;

    let mut pc = PurkinjeCell::new(
        PurkinjeCellOptions {
            root: config.root.clone(),
            toolchain: Box::new(Nrnivmodl::new(config.toolchain.program.clone())),
            require_library: config.toolchain.require_library,
            discover_cores: true,
        }
    )?;

    pc.set_simulation_properties(config.simulation)?;
    let stimuli = config.stimuli()?;
    if !stimuli.is_empty() {
        pc.set_stimulation_properties(&stimuli)?;
    }
    pc.cell_regions = config.regions.clone();

    if config.knockout.ais {
        pc.ko_ais_channels()?;
    }
    if config.knockout.cav2_1 {
        pc.ko_cav2_1_channels()?;
    }
    if config.knockout.disconnect_dendrites {
        pc.disconnect_dendrites_from_soma()?;
    }

    match config.capability {
        ResponseType::VoltageResponse => pc.produce_voltage_response()?,
        ResponseType::SpikeTrain => {
            pc.produce_spike_train()?;
            for (region, spikes) in &pc.predictions.spike_train {
                println!("{}: {} spikes", region, spikes.len());
            }
        },
    }

    for path in pc.predicted_files() {
        info!("wrote {}", path.display());
    }

    if let Some(nwb_path) = config.nwb_path() {
        export_nwb(&pc, &nwb_path)?;
        info!("wrote {}", nwb_path.display());
    }

    Ok(())
}

fn execute(command: Command) -> Result<(), CerebellumModelsError> {
    match command {
        Command::ListModels { root, scale } => {
            for model in get_available_models(&root, &scale)? {
                println!("{}", model);
            }
        },
        Command::Run { config } => run_model(load_config(&config)?)?,
        Command::Spikes { file, threshold, sign } => {
            let spikes = match sign {
                Some(sign) => extract_spikes_with_sign(&file, threshold, sign.into())?,
                None => extract_spikes(&file, threshold)?,
            };

            for spike in spikes {
                println!("{}", spike);
            }
        },
        Command::Locate { model, file, root } => {
            if let Some(path) = get_prediction_file(&root, &model, &file) {
                println!("{}", path.display());
            }
        },
        Command::Plot { figure, model, region, out, root } => {
            match figure {
                Figure::Spikes => visualize_spikes(&root, &model, &region, &out)?,
                Figure::Voltages => visualize_voltages(&root, &model, &region, &out)?,
            };
            info!("wrote {}", out.display());
        },
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match execute(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
