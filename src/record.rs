/*!
 * Raw telemetry rows and the ingestion filter that partitions them by field.
 *
 * The cart exports one row per scale reading with a latitude, a longitude, and a cumulative
 * weight column. All three arrive as text, and all three are routinely garbage: blank rows while
 * the cart boots, "NaN" fixes when the GPS loses lock, and weight strings with units or stray
 * bytes from the export encoding. Ingestion is therefore best effort, a row that cannot yield a
 * finite coordinate is dropped without failing the batch.
 */

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    error::SegmentSkip,
    field::FieldIndex,
    geo::Coord,
};

/// One raw row as it comes out of the cart's CSV export.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    /// The latitude column, text as exported.
    pub lat: String,
    /// The longitude column, text as exported.
    pub long: String,
    /// The cumulative weight column, freeform text that may include units.
    pub weight: String,
}

/**
 * A validated telemetry record with a parsed location.
 *
 * The weight is deliberately kept as raw text. Points are filtered by field before any segment
 * ever looks at its weight, and most points never end a segment, so weight parsing is deferred to
 * [parse_weight](MeasurementRecord::parse_weight) at the moment a segment needs the value.
 */
#[derive(Debug, Clone)]
pub struct MeasurementRecord {
    /// Where the reading was taken.
    pub location: Coord,
    /// The weight text exactly as exported.
    pub raw_weight: String,
}

impl MeasurementRecord {
    /**
     * Parse the raw weight text into pounds.
     *
     * Every character that is not an ASCII digit or a decimal point is stripped before parsing,
     * so "123.4 lbs" parses to 123.4. Text with nothing numeric left after stripping, or with
     * more than one decimal point, fails with [SegmentSkip::UnparsableWeight].
     */
    pub fn parse_weight(&self) -> Result<f64, SegmentSkip> {
        let cleaned: String = self
            .raw_weight
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        cleaned
            .parse::<f64>()
            .map_err(|_| SegmentSkip::UnparsableWeight)
    }
}

/**
 * Partition raw rows into per-field ordered point lists.
 *
 * Rows whose latitude or longitude is unparsable or non-finite are silently dropped. Every field
 * whose boundary contains the point receives its own copy of the record, and within each field
 * the input row order is preserved. Row order is the only proxy for the cart's physical travel
 * path, so the segmenter downstream depends on it.
 */
pub fn partition_records<I>(rows: I, index: &FieldIndex) -> BTreeMap<String, Vec<MeasurementRecord>>
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut partitioned: BTreeMap<String, Vec<MeasurementRecord>> = BTreeMap::new();

    let mut dropped: usize = 0;
    for row in rows {
        let lat: f64 = match row.lat.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };
        let lon: f64 = match row.long.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };

        if !lat.is_finite() || !lon.is_finite() {
            dropped += 1;
            continue;
        }

        let location = Coord { lat, lon };

        for field_name in index.contains_any(location) {
            partitioned
                .entry(field_name.to_owned())
                .or_default()
                .push(MeasurementRecord {
                    location,
                    raw_weight: row.weight.clone(),
                });
        }
    }

    if dropped > 0 {
        log::debug!("dropped {} rows with invalid coordinates", dropped);
    }

    partitioned
}
