pub use config::{Config, CornerConfig, FieldBoundaryConfig};
pub use error::{ConfigError, CropYieldResult, SegmentSkip};
pub use field::{FieldBoundary, FieldIndex};
pub use geo::{planar_distance, BoundingBox, Coord, Polygon};
pub use geojson::{segments_to_geojson, write_geojson};
pub use grid::{build_grid, GridCell};
pub use loader::{collect_csv_paths, load_telemetry, read_raw_records};
pub use noise::filter_noise;
pub use pipeline::{
    densest_segment, quantize_field, quantize_fields, FieldSamples, QuantizeParams, SkipCounts,
};
pub use pooling::pooling_region;
pub use record::{partition_records, MeasurementRecord, RawRecord};
pub use segment::{compute_intensity, segment_by_distance, YieldSegment};

/**************************************************************************************************
 * Private Implementation
 *************************************************************************************************/
mod config;
mod error;
mod field;
mod geo;
mod geojson;
mod grid;
mod loader;
mod noise;
mod pipeline;
mod pooling;
mod record;
mod segment;
