use std::{
    path::PathBuf,
    thread::{self, JoinHandle},
};

use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender};
use cropyield::{
    build_grid, densest_segment, load_telemetry, partition_records, quantize_field, write_geojson,
    Config, CropYieldResult, FieldIndex, FieldSamples, MeasurementRecord, QuantizeParams,
};
use log::LevelFilter;
use simple_logger::SimpleLogger;

const CHANNEL_SIZE: usize = 16;

/*-------------------------------------------------------------------------------------------------
 *                               Parse Command Line Arguments
 *-----------------------------------------------------------------------------------------------*/
///
/// Quantize harvest cart telemetry into yield intensity samples.
///
/// This program reads the raw cart CSV exports, restricts them to the configured field
/// boundaries, runs the distance windowed quantization pipeline for each field, and writes the
/// filtered samples out as GeoJSON and CSV along with the aggregation grid for the field set.
///
#[derive(Debug, Parser)]
#[clap(name = "yieldmap")]
#[clap(author, version, about)]
struct YieldMapOptions {
    /// The path to the JSON configuration file.
    ///
    /// If this is not specified, then the program will check for it in the "YIELDMAP_CONFIG"
    /// environment variable before falling back to "config.json" in the working directory.
    #[clap(short, long)]
    #[clap(env = "YIELDMAP_CONFIG")]
    #[clap(default_value = "config.json")]
    config: PathBuf,

    /// Override the telemetry data location from the configuration file.
    ///
    /// May be a single CSV file or a directory of CSV files.
    #[clap(short, long)]
    data: Option<PathBuf>,

    /// The directory to write output files into.
    #[clap(short, long)]
    #[clap(default_value = ".")]
    output_dir: PathBuf,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> CropYieldResult<()> {
    let opts = YieldMapOptions::parse();

    let level = if opts.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .with_module_level("cropyield", level)
        .with_module_level("yieldmap", level)
        .init()?;

    let config = Config::load(&opts.config)?;
    let index = FieldIndex::build(config.field_boundaries())?;
    let params = config.params();

    let data_path = opts.data.as_ref().unwrap_or(&config.csv_filepath);
    let rows = load_telemetry(data_path);
    log::info!("loaded {} raw rows from {}", rows.len(), data_path.display());

    let partitioned = partition_records(rows, &index);
    for (name, points) in &partitioned {
        log::info!("{}: {} points in field", name, points.len());
    }

    let all_samples = quantize_parallel(partitioned.into_iter().collect(), &index, params)?;

    std::fs::create_dir_all(&opts.output_dir)?;
    write_outputs(&opts.output_dir, &all_samples)?;
    write_grid(&opts.output_dir, &config, &index)?;

    log_summary(&all_samples);

    Ok(())
}

/*-------------------------------------------------------------------------------------------------
 *                               Per-field Worker Threads
 *-----------------------------------------------------------------------------------------------*/
/// Fan the per-field pipelines out over worker threads.
///
/// Each field owns its point list and produces its own output, so there is no shared mutable
/// state, fields are simply dealt to workers over a channel and the results collected over
/// another.
fn quantize_parallel(
    fields: Vec<(String, Vec<MeasurementRecord>)>,
    index: &FieldIndex,
    params: QuantizeParams,
) -> CropYieldResult<Vec<FieldSamples>> {
    let num_workers = num_cpus::get().min(fields.len()).max(1);

    let (to_workers, worker_rx) = bounded::<(String, Vec<MeasurementRecord>)>(CHANNEL_SIZE);
    let (to_collector, from_workers) = bounded::<FieldSamples>(CHANNEL_SIZE);

    let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(num_workers);
    for i in 0..num_workers {
        handles.push(start_quantize_thread(
            i,
            worker_rx.clone(),
            to_collector.clone(),
            index.clone(),
            params,
        )?);
    }
    drop(worker_rx);
    drop(to_collector);

    // Feed the workers from a separate thread so collecting results below can never deadlock
    // against the bounded channels.
    let feeder = thread::Builder::new()
        .name("yieldmap-feed".to_owned())
        .spawn(move || {
            for field in fields {
                to_workers.send(field).unwrap();
            }
        })?;

    let mut all_samples: Vec<FieldSamples> = from_workers.into_iter().collect();
    all_samples.sort_by(|a, b| a.field_name.cmp(&b.field_name));

    feeder.join().unwrap();
    for handle in handles {
        handle.join().unwrap();
    }

    Ok(all_samples)
}

fn start_quantize_thread(
    worker_num: usize,
    from_main: Receiver<(String, Vec<MeasurementRecord>)>,
    to_collector: Sender<FieldSamples>,
    index: FieldIndex,
    params: QuantizeParams,
) -> CropYieldResult<JoinHandle<()>> {
    let jh = thread::Builder::new()
        .name(format!("yieldmap-quantize-{}", worker_num))
        .spawn(move || {
            for (field_name, points) in from_main {
                let samples = quantize_field(&field_name, &points, &params, &index);
                to_collector.send(samples).unwrap();
            }
        })?;

    Ok(jh)
}

/*-------------------------------------------------------------------------------------------------
 *                                       Output Files
 *-----------------------------------------------------------------------------------------------*/
/// Write the per-field GeoJSON files and the combined samples CSV.
fn write_outputs(output_dir: &PathBuf, all_samples: &[FieldSamples]) -> CropYieldResult<()> {
    let csv_path = output_dir.join("yield_samples.csv");
    let mut writer = csv::Writer::from_path(&csv_path)?;

    writer.write_record([
        "field",
        "start_lat",
        "start_long",
        "end_lat",
        "end_long",
        "distance",
        "delta_weight",
        "intensity",
    ])?;

    for samples in all_samples {
        for segment in &samples.segments {
            let record = vec![
                segment.field_name.clone(),
                segment.start.lat.to_string(),
                segment.start.lon.to_string(),
                segment.end.lat.to_string(),
                segment.end.lon.to_string(),
                segment.distance.to_string(),
                segment.delta_weight.to_string(),
                segment.intensity.to_string(),
            ];
            writer.write_record(&record)?;
        }

        let geojson_path = output_dir.join(format!("{}_samples.geojson", samples.field_name));
        write_geojson(&geojson_path, &samples.segments)?;
        log::info!(
            "{}: wrote {} samples to {}",
            samples.field_name,
            samples.segments.len(),
            geojson_path.display()
        );
    }

    writer.flush()?;
    log::info!("wrote combined samples to {}", csv_path.display());

    Ok(())
}

/// Write the aggregation grid over the combined extent of the configured fields.
fn write_grid(output_dir: &PathBuf, config: &Config, index: &FieldIndex) -> CropYieldResult<()> {
    let bbox = match index.combined_bounding_box() {
        Some(bbox) => bbox,
        None => {
            log::warn!("no fields configured, skipping grid output");
            return Ok(());
        }
    };

    let cells = build_grid(bbox, config.grid_interval);

    let grid_path = output_dir.join("grid_cells.csv");
    let mut writer = csv::Writer::from_path(&grid_path)?;

    writer.write_record([
        "cell", "lat_0", "long_0", "lat_1", "long_1", "lat_2", "long_2", "lat_3", "long_3",
    ])?;

    for (i, cell) in cells.iter().enumerate() {
        let mut record = vec![i.to_string()];
        for corner in cell.corners {
            record.push(corner.lat.to_string());
            record.push(corner.lon.to_string());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    log::info!("wrote {} grid cells to {}", cells.len(), grid_path.display());

    Ok(())
}

/*-------------------------------------------------------------------------------------------------
 *                                         Summary
 *-----------------------------------------------------------------------------------------------*/
fn log_summary(all_samples: &[FieldSamples]) {
    if let Some(segment) = densest_segment(all_samples) {
        log::info!("");
        log::info!("Densest sample in this run:");
        log::info!("         field - {:>15}", segment.field_name);
        log::info!("      latitude - {:>15.6}", segment.start.lat);
        log::info!("     longitude - {:>15.6}", segment.start.lon);
        log::info!("     intensity - {:>15.2}", segment.intensity);
        log::info!("  delta weight - {:>15.2}", segment.delta_weight);
        log::info!("");
    } else {
        log::warn!("");
        log::warn!("No samples survived filtering in this run!");
        log::warn!("");
    }

    for samples in all_samples {
        log::info!(
            "{}: {} samples, {} skipped ({} weight, {} degenerate)",
            samples.field_name,
            samples.segments.len(),
            samples.skips.total(),
            samples.skips.unparsable_weight,
            samples.skips.degenerate
        );
    }
}
