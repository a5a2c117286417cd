mod bootstrap;
mod render;

use anyhow::{bail, Result};
use shift_core::settings::Settings;
use shift_data::collection::DayCollection;
use shift_data::export::{ChartMetric, ChartSeries};
use shift_data::reader::find_input_files;

use crate::render::{render_days, render_pivot, JsonReport};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("CNC report v{} starting", env!("CARGO_PKG_VERSION"));

    let files = find_input_files(&settings.inputs);
    if files.is_empty() {
        bail!("No spreadsheet files found in the given inputs");
    }
    tracing::info!("Ingesting {} file(s)", files.len());

    // Each file is read and extracted in isolation; failures only land in
    // the report.
    let mut collection = DayCollection::new();
    let report = collection.ingest(&files);

    for (path, error) in report.failed() {
        eprintln!("skipped {}: {}", path.display(), error);
    }
    if report.skipped_rows() > 0 {
        eprintln!(
            "{} row(s) with an unrecognised User field were left out",
            report.skipped_rows()
        );
    }

    if collection.is_empty() {
        if report.failed().next().is_some() {
            bail!("None of the {} file(s) could be loaded", files.len());
        }
        tracing::info!("All inputs were empty");
    }

    let pivot = collection.pivot();

    match settings.view.as_str() {
        "pivot" => print!("{}", render_pivot(&pivot)),
        "days" => print!("{}", render_days(collection.summaries())),
        "json" => {
            let json = serde_json::to_string_pretty(&JsonReport {
                files: &report,
                days: collection.summaries(),
                pivot: &pivot,
            })?;
            println!("{}", json);
        }
        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    let exports = [
        (ChartMetric::Parts, settings.export_parts.as_ref()),
        (ChartMetric::Minutes, settings.export_minutes.as_ref()),
    ];
    for (metric, path) in exports {
        if let Some(path) = path {
            ChartSeries::from_summaries(collection.summaries(), metric).export(path)?;
        }
    }

    Ok(())
}
