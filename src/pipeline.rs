/*!
 * The per-field quantization pipeline.
 *
 * Composes the segmenter, the intensity calculation, the pooling region generator, and the noise
 * filter for one field's point list. Each field is fully independent of every other: it owns its
 * own points and builds its own output, so a caller is free to run fields on parallel worker
 * threads with nothing shared.
 */

use std::collections::BTreeMap;

use crate::{
    error::SegmentSkip,
    field::FieldIndex,
    record::MeasurementRecord,
    segment::{compute_intensity, segment_by_distance, YieldSegment},
};

/// The tuning knobs of the quantization engine, normally read from the config file.
#[derive(Debug, Clone, Copy)]
pub struct QuantizeParams {
    /// Accumulated planar travel distance that closes a segment window, in degrees.
    pub distance_interval: f64,
    /// Half width of each sample's pooling region, perpendicular to travel, in degrees.
    pub pool_height: f64,
    /// Intensities below this are rejected as noise. Implicitly 0 in the telemetry this was
    /// built for, the cart only ever gains weight while harvesting.
    pub min_intensity: f64,
    /// Intensities above this are rejected as noise.
    pub max_intensity: f64,
}

/// Tally of segments excluded from a field's output, kept so bad telemetry is countable instead
/// of silently vanishing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    /// Segments skipped because an endpoint weight would not parse.
    pub unparsable_weight: usize,
    /// Segments skipped because the travel vector had zero length.
    pub degenerate: usize,
}

impl SkipCounts {
    fn record(&mut self, skip: SegmentSkip) {
        match skip {
            SegmentSkip::UnparsableWeight => self.unparsable_weight += 1,
            SegmentSkip::DegenerateSegment => self.degenerate += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.unparsable_weight + self.degenerate
    }
}

/// The finished output of the engine for one field.
#[derive(Debug, Clone)]
pub struct FieldSamples {
    /// The field's name.
    pub field_name: String,
    /// The noise filtered intensity samples in travel order.
    pub segments: Vec<YieldSegment>,
    /// How many candidate segments were skipped before the noise filter ever saw them.
    pub skips: SkipCounts,
}

/**
 * Run the full quantization pipeline for one field.
 *
 * #Arguments
 * field_name - the owning field, used to label samples and look up the clipping polygon.
 * points - the field's telemetry points in travel order, as produced by
 * [partition_records](crate::record::partition_records).
 * params - the engine tuning values.
 * index - the boundary index; the field's polygon, when present, clips each pooling region.
 *
 * Segment level failures are counted and logged at debug, they never abort the field. The anchor
 * advance in the segmenter is independent of those failures, so malformed weight text cannot
 * stall the walk.
 */
pub fn quantize_field(
    field_name: &str,
    points: &[MeasurementRecord],
    params: &QuantizeParams,
    index: &FieldIndex,
) -> FieldSamples {
    let field_polygon = index.polygon(field_name);

    let mut skips = SkipCounts::default();
    let mut segments = Vec::new();

    for (start_idx, end_idx) in segment_by_distance(points, params.distance_interval) {
        let start = &points[start_idx];
        let end = &points[end_idx];

        let (distance, delta_weight, intensity) = match compute_intensity(start, end) {
            Ok(v) => v,
            Err(skip) => {
                log::debug!(
                    "{}: skipping segment at rows {}..{}: {}",
                    field_name,
                    start_idx,
                    end_idx,
                    skip
                );
                skips.record(skip);
                continue;
            }
        };

        let pooling_region = match crate::pooling::pooling_region(
            start.location,
            end.location,
            params.pool_height,
            field_polygon,
        ) {
            Ok(region) => region,
            Err(skip) => {
                log::debug!(
                    "{}: skipping segment at rows {}..{}: {}",
                    field_name,
                    start_idx,
                    end_idx,
                    skip
                );
                skips.record(skip);
                continue;
            }
        };

        segments.push(YieldSegment {
            field_name: field_name.to_owned(),
            start: start.location,
            end: end.location,
            distance,
            delta_weight,
            intensity,
            pooling_region,
        });
    }

    let before = segments.len();
    let segments = crate::noise::filter_noise(segments, params.min_intensity, params.max_intensity);

    log::debug!(
        "{}: {} samples ({} rejected as noise, {} skipped)",
        field_name,
        segments.len(),
        before - segments.len(),
        skips.total()
    );

    FieldSamples {
        field_name: field_name.to_owned(),
        segments,
        skips,
    }
}

/**
 * The highest intensity segment across all fields, for end of run summaries.
 *
 * Ordering uses `total_cmp` so a NaN intensity cannot panic the comparison. NaN can reach the
 * summary: it survives the noise filter because neither of the range comparisons is true for it.
 */
pub fn densest_segment(all_samples: &[FieldSamples]) -> Option<&YieldSegment> {
    all_samples
        .iter()
        .flat_map(|samples| samples.segments.iter())
        .max_by(|a, b| a.intensity.total_cmp(&b.intensity))
}

/**
 * Run every field in the partition through the pipeline sequentially.
 *
 * The binaries fan the same work out over worker threads instead; this is the simple entry point
 * for library callers and tests. Output order follows the partition's key order.
 */
pub fn quantize_fields(
    partitioned: &BTreeMap<String, Vec<MeasurementRecord>>,
    params: &QuantizeParams,
    index: &FieldIndex,
) -> Vec<FieldSamples> {
    partitioned
        .iter()
        .map(|(name, points)| quantize_field(name, points, params, index))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        field::FieldBoundary,
        geo::Coord,
        record::{partition_records, RawRecord},
    };

    fn big_field(name: &str) -> FieldBoundary {
        FieldBoundary {
            name: name.to_owned(),
            nw: Coord {
                lat: 100.0,
                lon: 0.0,
            },
            ne: Coord {
                lat: 100.0,
                lon: 100.0,
            },
            se: Coord {
                lat: 0.0,
                lon: 100.0,
            },
            sw: Coord { lat: 0.0, lon: 0.0 },
        }
    }

    fn params() -> QuantizeParams {
        QuantizeParams {
            distance_interval: 1.0,
            pool_height: 0.5,
            min_intensity: 0.0,
            max_intensity: 250.0,
        }
    }

    fn rec(lat: f64, lon: f64, weight: &str) -> MeasurementRecord {
        MeasurementRecord {
            location: Coord { lat, lon },
            raw_weight: weight.to_owned(),
        }
    }

    #[test]
    fn test_quantize_field_end_to_end() {
        let index = FieldIndex::build(vec![big_field("a")]).unwrap();

        // Cart driving up the field, gaining 30 units of weight every 1.5 degrees of travel.
        let points = vec![
            rec(10.0, 10.0, "100 lbs"),
            rec(11.5, 10.0, "130 lbs"),
            rec(13.0, 10.0, "160 lbs"),
            rec(14.5, 10.0, "190 lbs"),
        ];

        let out = quantize_field("a", &points, &params(), &index);

        assert_eq!(out.segments.len(), 3);
        assert_eq!(out.skips, SkipCounts::default());

        for segment in &out.segments {
            assert_eq!(segment.field_name, "a");
            assert!((segment.distance - 1.5).abs() < 1.0e-12);
            assert!((segment.delta_weight - 30.0).abs() < 1.0e-12);
            assert!((segment.intensity - 20.0).abs() < 1.0e-12);
            assert!(!segment.pooling_region.is_empty());
        }
    }

    #[test]
    fn test_bad_weight_skips_one_segment_not_the_run() {
        let index = FieldIndex::build(vec![big_field("a")]).unwrap();

        let points = vec![
            rec(10.0, 10.0, "100"),
            rec(11.5, 10.0, "garbage"),
            rec(13.0, 10.0, "160"),
            rec(14.5, 10.0, "190"),
        ];

        let out = quantize_field("a", &points, &params(), &index);

        // The two windows touching the garbage endpoint are skipped, the last one survives.
        assert_eq!(out.skips.unparsable_weight, 2);
        assert_eq!(out.segments.len(), 1);
        assert!((out.segments[0].intensity - 20.0).abs() < 1.0e-12);
    }

    #[test]
    fn test_noise_filter_is_applied() {
        let index = FieldIndex::build(vec![big_field("a")]).unwrap();

        // The middle window loses weight, so it and both neighbors must go.
        let points = vec![
            rec(10.0, 10.0, "100"),
            rec(11.5, 10.0, "130"),
            rec(13.0, 10.0, "90"),
            rec(14.5, 10.0, "120"),
        ];

        let out = quantize_field("a", &points, &params(), &index);
        assert!(out.segments.is_empty());
    }

    #[test]
    fn test_empty_and_singleton_fields() {
        let index = FieldIndex::build(vec![big_field("a")]).unwrap();

        let out = quantize_field("a", &[], &params(), &index);
        assert!(out.segments.is_empty());

        let out = quantize_field("a", &[rec(1.0, 1.0, "5")], &params(), &index);
        assert!(out.segments.is_empty());
    }

    #[test]
    fn test_densest_segment_tolerates_nan_intensity() {
        use crate::geo::Polygon;

        let segment = |intensity: f64| crate::segment::YieldSegment {
            field_name: "a".to_owned(),
            start: Coord { lat: 0.0, lon: 0.0 },
            end: Coord { lat: 1.0, lon: 0.0 },
            distance: 1.0,
            delta_weight: intensity,
            intensity,
            pooling_region: Polygon::new(Vec::new()),
        };

        let clean = vec![FieldSamples {
            field_name: "a".to_owned(),
            segments: vec![segment(10.0), segment(50.0), segment(20.0)],
            skips: SkipCounts::default(),
        }];
        assert_eq!(densest_segment(&clean).unwrap().intensity, 50.0);

        // Both endpoint weights overflowing leaves a NaN intensity that the noise filter passes
        // through. The ordering must not panic on it.
        let with_nan = vec![FieldSamples {
            field_name: "a".to_owned(),
            segments: vec![segment(10.0), segment(f64::NAN), segment(20.0)],
            skips: SkipCounts::default(),
        }];
        assert!(densest_segment(&with_nan).is_some());

        assert!(densest_segment(&[]).is_none());
    }

    #[test]
    fn test_quantize_fields_covers_every_partition() {
        let index = FieldIndex::build(vec![big_field("a")]).unwrap();

        let rows = vec![
            RawRecord {
                lat: "10.0".to_owned(),
                long: "10.0".to_owned(),
                weight: "100".to_owned(),
            },
            RawRecord {
                lat: "11.5".to_owned(),
                long: "10.0".to_owned(),
                weight: "130".to_owned(),
            },
        ];

        let partitioned = partition_records(rows, &index);
        let all = quantize_fields(&partitioned, &params(), &index);

        assert_eq!(all.len(), 1);
        assert_eq!(all[0].field_name, "a");
        assert_eq!(all[0].segments.len(), 1);
    }
}
