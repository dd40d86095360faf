/*!
 * GeoJSON export of yield intensity samples.
 *
 * Very simple functions producing GeoJSON specifically suited to the outputs of this crate, not
 * a general GeoJSON solution. Each sample becomes a LineString feature between its endpoints
 * with the intensity and pooling region carried as properties, which is the shape the mapping
 * notebooks downstream already consume.
 *
 * GeoJSON mandates longitude-first positions while everything inside this crate is
 * latitude-first, so the axis swap happens here at the serialization boundary and nowhere else.
 */

use std::{fs::File, io::BufWriter, path::Path};

use serde_json::{json, Value};

use crate::{error::CropYieldResult, geo::Coord, segment::YieldSegment};

/// A coordinate as a GeoJSON position, longitude first.
fn position(c: Coord) -> Value {
    json!([c.lon, c.lat])
}

/// The pooling region as a GeoJSON polygon ring, closed by repeating the first vertex.
fn region_ring(segment: &YieldSegment) -> Value {
    let verts = segment.pooling_region.vertices();

    let mut ring: Vec<Value> = verts.iter().map(|v| position(*v)).collect();
    if let Some(first) = verts.first() {
        ring.push(position(*first));
    }

    Value::Array(ring)
}

/// Build the FeatureCollection for one set of samples.
pub fn segments_to_geojson(segments: &[YieldSegment]) -> Value {
    let features: Vec<Value> = segments
        .iter()
        .map(|segment| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": [position(segment.start), position(segment.end)],
                },
                "properties": {
                    "field": segment.field_name,
                    "intensity": segment.intensity,
                    "distance": segment.distance,
                    "delta_weight": segment.delta_weight,
                    "pooling_region": region_ring(segment),
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Serialize the samples to a GeoJSON file.
pub fn write_geojson<P: AsRef<Path>>(path: P, segments: &[YieldSegment]) -> CropYieldResult<()> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer(BufWriter::new(file), &segments_to_geojson(segments))?;
    Ok(())
}
