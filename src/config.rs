/*!
 * Run configuration.
 *
 * The configuration lives in a JSON file whose shape follows the original field notebook setup:
 * a list of field boundaries given corner by corner, the engine tuning values, and the location
 * of the telemetry CSV data. Corner keys use the original's `NW_corner` style naming so existing
 * config files keep working.
 */

use std::{fs::File, io::BufReader, path::{Path, PathBuf}};

use serde::Deserialize;

use crate::{
    error::CropYieldResult,
    field::FieldBoundary,
    geo::Coord,
    pipeline::QuantizeParams,
};

/// One corner of a field boundary as written in the config file.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CornerConfig {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<CornerConfig> for Coord {
    fn from(c: CornerConfig) -> Coord {
        Coord {
            lat: c.latitude,
            lon: c.longitude,
        }
    }
}

/// One field boundary entry in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldBoundaryConfig {
    /// Optional field name. Unnamed fields get "field_1", "field_2", ... by position, which is
    /// what the original config files relied on.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "NW_corner")]
    pub nw_corner: CornerConfig,
    #[serde(rename = "NE_corner")]
    pub ne_corner: CornerConfig,
    #[serde(rename = "SE_corner")]
    pub se_corner: CornerConfig,
    #[serde(rename = "SW_corner")]
    pub sw_corner: CornerConfig,
}

/// The full run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// A CSV file, or a directory of CSV files, holding the raw telemetry rows.
    pub csv_filepath: PathBuf,
    /// The configured field boundaries.
    pub field_boundaries: Vec<FieldBoundaryConfig>,
    /// Travel distance that closes a segment window, in degrees.
    pub distance_interval: f64,
    /// Pooling region half width, in degrees.
    pub pool_height: f64,
    /// Upper bound on plausible intensity. The lower bound is implicitly 0, a harvesting cart
    /// does not lose weight.
    pub max_yield_intensity: f64,
    /// Side length of the aggregation grid cells, in degrees.
    pub grid_interval: f64,
}

impl Config {
    /// Load and deserialize a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> CropYieldResult<Self> {
        let file = File::open(path.as_ref())?;
        let config: Config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// The configured boundaries as engine types, filling in positional names where needed.
    pub fn field_boundaries(&self) -> Vec<FieldBoundary> {
        self.field_boundaries
            .iter()
            .enumerate()
            .map(|(i, fb)| FieldBoundary {
                name: fb
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("field_{}", i + 1)),
                nw: fb.nw_corner.into(),
                ne: fb.ne_corner.into(),
                se: fb.se_corner.into(),
                sw: fb.sw_corner.into(),
            })
            .collect()
    }

    /// The engine tuning values from this configuration.
    pub fn params(&self) -> QuantizeParams {
        QuantizeParams {
            distance_interval: self.distance_interval,
            pool_height: self.pool_height,
            min_intensity: 0.0,
            max_intensity: self.max_yield_intensity,
        }
    }
}
