//! Renders saved predictions as SVG figures, a spike raster from
//! `spikes_<region>.txt` and a voltage trace from `<region>.txt`.

use std::path::{Path, PathBuf};
use plotters::coord::Shift;
use plotters::prelude::*;
use log::info;
use crate::error::{CerebellumModelsError, PlotError};
use crate::paths::get_prediction_file;
use crate::recorder::{load_spike_file, load_voltage_file};


/// Width and height of rendered figures (px)
pub const PLOT_SIZE: (u32, u32) = (800, 600);

fn locate(root: &Path, model_name: &str, file_name: &str) -> Result<PathBuf, PlotError> {
    get_prediction_file(root, model_name, file_name)
        .ok_or_else(|| PlotError::PredictionFileNotFound {
            model_name: model_name.to_string(),
            file_name: file_name.to_string(),
        })
}

/// Pads a range so a single value still spans a visible interval
fn padded_range(min: f64, max: f64, pad: f64) -> (f64, f64) {
    if max - min > f64::EPSILON {
        (min - pad, max + pad)
    } else {
        (min - pad - 1., max + pad + 1.)
    }
}

fn draw_spike_raster<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    spikes: &[f64],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let x_max = spikes.iter().copied().fold(1., f64::max) * 1.05;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 16))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..x_max, -0.1f64..1.1f64)?;

    chart
        .configure_mesh()
        .x_desc("Times (ms)")
        .y_desc("All or None")
        .axis_desc_style(("sans-serif", 14))
        .y_labels(2)
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()?;

    chart.draw_series(
        spikes.iter().map(|t| PathElement::new(vec![(*t, 0.), (*t, 1.)], BLUE.stroke_width(2)))
    )?;

    root.present()
}

fn draw_voltage_trace<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    times: &[f64],
    volts: &[f64],
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let (t_min, t_max) = times.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), t| (low.min(*t), high.max(*t)));
    let (v_min, v_max) = volts.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), v| (low.min(*v), high.max(*v)));
    let (t_low, t_high) = padded_range(t_min, t_max, 0.);
    let (v_low, v_high) = padded_range(v_min, v_max, 5.);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 16))
        .margin(15)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(t_low..t_high, v_low..v_high)?;

    chart
        .configure_mesh()
        .x_desc("Times (ms)")
        .y_desc("Voltage (mV)")
        .axis_desc_style(("sans-serif", 14))
        .draw()?;

    chart.draw_series(LineSeries::new(
        times.iter().copied().zip(volts.iter().copied()),
        BLUE.stroke_width(1),
    ))?;

    root.present()
}

fn drawing_error(out: &Path, message: String) -> PlotError {
    PlotError::Drawing { path: out.to_path_buf(), message }
}

/// Draws the saved spike train of a region as a raster into the SVG file `out`,
/// returns the spike file that was read
pub fn visualize_spikes(
    root: &Path,
    model_name: &str,
    region: &str,
    out: &Path,
) -> Result<PathBuf, CerebellumModelsError> {
    let source = locate(root, model_name, &format!("spikes_{}.txt", region))?;
    let spikes = load_spike_file(&source)?;

    let title = format!("Spike Train from {}, {}", region, model_name);
    let area = SVGBackend::new(out, PLOT_SIZE).into_drawing_area();
    draw_spike_raster(&area, &title, &spikes)
        .map_err(|e| drawing_error(out, e.to_string()))?;

    info!("plotted {} spikes from {} to {}", spikes.len(), source.display(), out.display());

    Ok(source)
}

/// Draws the saved voltage trace of a region into the SVG file `out`,
/// returns the voltage file that was read
pub fn visualize_voltages(
    root: &Path,
    model_name: &str,
    region: &str,
    out: &Path,
) -> Result<PathBuf, CerebellumModelsError> {
    let source = locate(root, model_name, &format!("{}.txt", region))?;
    let (times, volts) = load_voltage_file(&source)?;
    if times.is_empty() {
        return Err(PlotError::NoSamples(source).into());
    }

    let title = format!("Voltage response from {}, {}", region, model_name);
    let area = SVGBackend::new(out, PLOT_SIZE).into_drawing_area();
    draw_voltage_trace(&area, &title, &times, &volts)
        .map_err(|e| drawing_error(out, e.to_string()))?;

    info!("plotted {} samples from {} to {}", times.len(), source.display(), out.display());

    Ok(source)
}
