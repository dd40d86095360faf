/*!
 * Distance windowed segmentation and the yield intensity calculation.
 *
 * The cart reports cumulative weight, so the interesting quantity is how fast the weight grows
 * per unit of travel. Consecutive GPS fixes are far too close together for a stable quotient, so
 * the point stream is first chopped into windows of accumulated planar travel distance and one
 * intensity value is computed per window.
 */

use crate::{
    error::SegmentSkip,
    geo::{planar_distance, Coord, Polygon},
    record::MeasurementRecord,
};

/**
 * One yield intensity sample anchored between two telemetry points.
 *
 * Immutable once constructed. The noise filter downstream builds a new, reduced sequence rather
 * than mutating or tombstoning samples in place.
 */
#[derive(Debug, Clone)]
pub struct YieldSegment {
    /// The field this sample belongs to.
    pub field_name: String,
    /// The anchor point the distance window started from.
    pub start: Coord,
    /// The point that closed the distance window.
    pub end: Coord,
    /// The planar distance between start and end, in degrees.
    pub distance: f64,
    /// The change in cumulative cart weight across the window.
    pub delta_weight: f64,
    /// delta_weight / distance, the yield intensity of this sample. May be negative, the noise
    /// filter is the one that judges plausibility.
    pub intensity: f64,
    /// The spatial footprint assigned to this sample for later interpolation. May be empty if
    /// clipping to the field boundary left nothing.
    pub pooling_region: Polygon,
}

/**
 * Chop an ordered point list into distance windows.
 *
 * #Arguments
 * points - the field's telemetry points in travel order.
 * distance_interval - the travel distance that closes a window, in the same degree units as the
 * coordinates.
 *
 * #Returns
 * Pairs of indexes into `points`, each pair being the anchor and closing point of one window, in
 * travel order.
 *
 * The walk keeps a rolling anchor starting at the first point. Each subsequent point is compared
 * against the anchor and a window is emitted once the planar distance strictly exceeds the
 * interval, the closing point becoming the next anchor. The comparison is strict, a point at
 * exactly the interval does not close a window. Duplicate coordinates contribute zero distance
 * and are walked over without advancing the anchor. Whatever remains when the list ends is
 * dropped, there is no partial trailing window.
 */
pub fn segment_by_distance(
    points: &[MeasurementRecord],
    distance_interval: f64,
) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();

    if points.len() < 2 {
        return pairs;
    }

    let mut anchor = 0;
    for current in 1..points.len() {
        let dist = planar_distance(points[anchor].location, points[current].location);

        if dist > distance_interval {
            pairs.push((anchor, current));
            anchor = current;
        }
    }

    pairs
}

/**
 * Compute the intensity sample for one segment pair.
 *
 * The weight of both endpoint records is parsed lazily here, failure skips only this segment.
 * The returned tuple is (distance, delta_weight, intensity); the caller attaches the pooling
 * region and field name to build the full [YieldSegment].
 */
pub fn compute_intensity(
    start: &MeasurementRecord,
    end: &MeasurementRecord,
) -> Result<(f64, f64, f64), SegmentSkip> {
    let distance = planar_distance(start.location, end.location);
    if distance <= 0.0 {
        return Err(SegmentSkip::DegenerateSegment);
    }

    let start_weight = start.parse_weight()?;
    let end_weight = end.parse_weight()?;

    let delta_weight = end_weight - start_weight;

    // No clamping here. Negative and absurd values are preserved for the noise filter to judge.
    Ok((distance, delta_weight, delta_weight / distance))
}

#[cfg(test)]
mod test {
    use super::*;

    fn rec(lat: f64, lon: f64, weight: &str) -> MeasurementRecord {
        MeasurementRecord {
            location: Coord { lat, lon },
            raw_weight: weight.to_owned(),
        }
    }

    #[test]
    fn test_fewer_than_two_points_yield_no_segments() {
        assert!(segment_by_distance(&[], 1.0).is_empty());
        assert!(segment_by_distance(&[rec(0.0, 0.0, "1")], 1.0).is_empty());
    }

    #[test]
    fn test_windows_close_on_strict_excess_only() {
        // Two points exactly one interval apart never close a window, the comparison is strict.
        let points = vec![rec(0.0, 0.0, "1"), rec(1.0, 0.0, "2")];
        assert!(segment_by_distance(&points, 1.0).is_empty());

        // Barely past the interval closes it.
        let points = vec![rec(0.0, 0.0, "1"), rec(1.0 + 1.0e-9, 0.0, "2")];
        assert_eq!(segment_by_distance(&points, 1.0), vec![(0, 1)]);
    }

    #[test]
    fn test_distance_accumulates_from_the_anchor() {
        // Spacing of exactly one interval never closes a window against the previous point, but
        // the anchor does not move, so every second point sits 2.0 from it and closes one.
        let points: Vec<_> = (0..5).map(|i| rec(i as f64, 0.0, "1")).collect();
        assert_eq!(segment_by_distance(&points, 1.0), vec![(0, 2), (2, 4)]);
    }

    #[test]
    fn test_anchor_resets_greedily() {
        let points = vec![
            rec(0.0, 0.0, "a"),
            rec(1.5, 0.0, "b"), // closes (0, 1)
            rec(2.0, 0.0, "c"), // 0.5 from new anchor, open
            rec(3.5, 0.0, "d"), // closes (1, 3)
            rec(4.0, 0.0, "e"), // trailing partial window, dropped
        ];

        assert_eq!(segment_by_distance(&points, 1.0), vec![(0, 1), (1, 3)]);
    }

    #[test]
    fn test_duplicate_points_are_walked_over() {
        let points = vec![
            rec(0.0, 0.0, "a"),
            rec(0.0, 0.0, "a"),
            rec(0.0, 0.0, "a"),
            rec(2.0, 0.0, "b"),
        ];

        assert_eq!(segment_by_distance(&points, 1.0), vec![(0, 3)]);
    }

    #[test]
    fn test_compute_intensity() {
        let start = rec(0.0, 0.0, "100 lbs");
        let end = rec(0.0, 2.0, "150 lbs");

        let (distance, delta, intensity) = compute_intensity(&start, &end).unwrap();
        assert_eq!(distance, 2.0);
        assert_eq!(delta, 50.0);
        assert_eq!(intensity, 25.0);
    }

    #[test]
    fn test_compute_intensity_preserves_negative_values() {
        let start = rec(0.0, 0.0, "150");
        let end = rec(0.0, 2.0, "100");

        let (_, delta, intensity) = compute_intensity(&start, &end).unwrap();
        assert_eq!(delta, -50.0);
        assert_eq!(intensity, -25.0);
    }

    #[test]
    fn test_compute_intensity_bad_weight_skips_segment() {
        let start = rec(0.0, 0.0, "abc");
        let end = rec(0.0, 2.0, "100");

        assert_eq!(
            compute_intensity(&start, &end),
            Err(SegmentSkip::UnparsableWeight)
        );
    }

    #[test]
    fn test_compute_intensity_zero_travel_is_degenerate() {
        let a = rec(1.0, 1.0, "100");

        assert_eq!(
            compute_intensity(&a, &a.clone()),
            Err(SegmentSkip::DegenerateSegment)
        );
    }
}
