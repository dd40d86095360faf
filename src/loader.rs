/*!
 * CSV ingestion for harvest cart telemetry.
 *
 * The carts export one CSV per load, and a season's worth of exports ends up as a directory of
 * files that are processed as one concatenated stream. The exports are not clean UTF-8 (the
 * vendor tool writes Latin-1), so cells are decoded lossily; the weight parser downstream strips
 * everything non-numeric anyway.
 */

use std::path::{Path, PathBuf};

use crate::{error::CropYieldResult, record::RawRecord};

/**
 * Collect the telemetry CSV paths under `path`.
 *
 * A plain file is returned as-is. A directory is walked recursively and every file with a
 * `.csv` extension (case-insensitive) is collected, sorted by path so the concatenation order is
 * reproducible run to run.
 */
pub fn collect_csv_paths(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|res| res.ok())
        .filter(|entry| entry.path().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .to_lowercase()
                .ends_with(".csv")
        })
        .map(|entry| entry.into_path())
        .collect();

    paths.sort();
    paths
}

/**
 * Read the raw telemetry rows out of one CSV file.
 *
 * The file must carry `lat`, `long`, and `weight` columns; any other columns are ignored, the
 * cart exports a dozen of them. Rows that fail to parse at the CSV level are skipped with a log
 * message rather than failing the file. Cell text is decoded lossily so Latin-1 exports load.
 */
pub fn read_raw_records(path: &Path) -> CropYieldResult<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = reader.byte_headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| String::from_utf8_lossy(h).trim().eq_ignore_ascii_case(name))
    };

    let lat_idx = column("lat").ok_or("missing 'lat' column")?;
    let long_idx = column("long").ok_or("missing 'long' column")?;
    let weight_idx = column("weight").ok_or("missing 'weight' column")?;

    let mut rows = Vec::new();
    for result in reader.byte_records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                log::debug!("{}: skipping unreadable row: {}", path.display(), err);
                continue;
            }
        };

        let cell = |idx: usize| {
            record
                .get(idx)
                .map(|bytes| String::from_utf8_lossy(bytes).trim().to_owned())
                .unwrap_or_default()
        };

        rows.push(RawRecord {
            lat: cell(lat_idx),
            long: cell(long_idx),
            weight: cell(weight_idx),
        });
    }

    Ok(rows)
}

/// Read and concatenate every telemetry file under `path` in sorted path order.
///
/// A file that cannot be read at all is logged and skipped, the rest of the batch proceeds.
pub fn load_telemetry(path: &Path) -> Vec<RawRecord> {
    let mut all_rows = Vec::new();

    for csv_path in collect_csv_paths(path) {
        match read_raw_records(&csv_path) {
            Ok(mut rows) => {
                log::info!("loaded {} rows from {}", rows.len(), csv_path.display());
                all_rows.append(&mut rows);
            }
            Err(err) => {
                log::warn!("skipping {}: {}", csv_path.display(), err);
            }
        }
    }

    all_rows
}
