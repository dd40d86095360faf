/*!
 * Pooling region construction.
 *
 * Each intensity sample gets a rectangular spatial footprint aligned with the cart's direction of
 * travel across that segment. The footprint is what later interpolation steps pool over, hence
 * the name. The configured `pool_height` is a half width: the rectangle extends that far to
 * either side of the travel line.
 */

use crate::{
    error::SegmentSkip,
    geo::{Coord, Polygon},
};

/**
 * Build the oriented rectangular footprint for one segment.
 *
 * #Arguments
 * start, end - the segment's endpoints.
 * pool_height - the rectangle's half width, perpendicular to the travel direction.
 * field_polygon - when supplied, the rectangle is clipped to the field boundary. A clip that
 * leaves nothing produces an empty polygon, which is still a valid region; the caller keeps the
 * segment either way.
 *
 * #Returns
 * The footprint polygon, or [SegmentSkip::DegenerateSegment] when start and end coincide and no
 * travel direction exists.
 *
 * The unit normal is derived from the travel vector (lx, ly) = end - start. A purely horizontal
 * travel vector (ly == 0) takes the normal (0, 1) directly instead of dividing by ly.
 */
pub fn pooling_region(
    start: Coord,
    end: Coord,
    pool_height: f64,
    field_polygon: Option<&Polygon>,
) -> Result<Polygon, SegmentSkip> {
    let lx = end.lat - start.lat;
    let ly = end.lon - start.lon;

    if lx == 0.0 && ly == 0.0 {
        return Err(SegmentSkip::DegenerateSegment);
    }

    let (nx, ny) = if ly == 0.0 {
        (0.0, 1.0)
    } else {
        // (-1, lx / ly) is perpendicular to (lx, ly); scale it to unit length.
        let raw_ny = lx / ly;
        let norm = (1.0 + raw_ny * raw_ny).sqrt();
        (-1.0 / norm, raw_ny / norm)
    };

    let offset_lat = nx * pool_height;
    let offset_lon = ny * pool_height;

    let rectangle = Polygon::new(vec![
        Coord {
            lat: start.lat + offset_lat,
            lon: start.lon + offset_lon,
        },
        Coord {
            lat: end.lat + offset_lat,
            lon: end.lon + offset_lon,
        },
        Coord {
            lat: end.lat - offset_lat,
            lon: end.lon - offset_lon,
        },
        Coord {
            lat: start.lat - offset_lat,
            lon: start.lon - offset_lon,
        },
    ]);

    match field_polygon {
        Some(field) => Ok(rectangle.clip_to(field)),
        None => Ok(rectangle),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geo::planar_distance;

    #[test]
    fn test_region_width_is_twice_pool_height() {
        let cases = [
            (Coord { lat: 0.0, lon: 0.0 }, Coord { lat: 0.0, lon: 3.0 }),
            (Coord { lat: 0.0, lon: 0.0 }, Coord { lat: 3.0, lon: 0.0 }),
            (Coord { lat: 1.0, lon: 1.0 }, Coord { lat: 4.0, lon: 5.0 }),
            (Coord { lat: 2.0, lon: 7.0 }, Coord { lat: -1.0, lon: 3.0 }),
        ];

        for (start, end) in cases {
            let h = 0.25;
            let region = pooling_region(start, end, h, None).unwrap();
            let verts = region.vertices();
            assert_eq!(verts.len(), 4);

            // Vertices 0 and 3 are start +/- normal * h, so their separation is the width.
            let width = planar_distance(verts[0], verts[3]);
            assert!((width - 2.0 * h).abs() < 1.0e-12, "width was {}", width);

            // And the long sides keep the segment's length.
            let length = planar_distance(verts[0], verts[1]);
            assert!((length - planar_distance(start, end)).abs() < 1.0e-12);
        }
    }

    #[test]
    fn test_normal_is_perpendicular_to_travel() {
        let start = Coord { lat: 1.0, lon: 2.0 };
        let end = Coord { lat: 5.0, lon: -1.0 };

        let region = pooling_region(start, end, 1.0, None).unwrap();
        let verts = region.vertices();

        let travel = (end.lat - start.lat, end.lon - start.lon);
        let side = (verts[3].lat - verts[0].lat, verts[3].lon - verts[0].lon);

        let dot = travel.0 * side.0 + travel.1 * side.1;
        assert!(dot.abs() < 1.0e-12, "dot product was {}", dot);
    }

    #[test]
    fn test_horizontal_travel_uses_vertical_normal() {
        // ly == 0, the case the unguarded division would blow up on.
        let start = Coord { lat: 0.0, lon: 5.0 };
        let end = Coord { lat: 2.0, lon: 5.0 };

        let region = pooling_region(start, end, 0.5, None).unwrap();
        let verts = region.vertices();

        assert_eq!(verts[0], Coord { lat: 0.0, lon: 5.5 });
        assert_eq!(verts[1], Coord { lat: 2.0, lon: 5.5 });
        assert_eq!(verts[2], Coord { lat: 2.0, lon: 4.5 });
        assert_eq!(verts[3], Coord { lat: 0.0, lon: 4.5 });
    }

    #[test]
    fn test_zero_length_travel_is_degenerate() {
        let p = Coord { lat: 1.0, lon: 1.0 };
        assert_eq!(
            pooling_region(p, p, 1.0, None),
            Err(SegmentSkip::DegenerateSegment)
        );
    }

    #[test]
    fn test_clipping_to_field() {
        let field = Polygon::new(vec![
            Coord { lat: 0.0, lon: 0.0 },
            Coord { lat: 10.0, lon: 0.0 },
            Coord {
                lat: 10.0,
                lon: 10.0,
            },
            Coord { lat: 0.0, lon: 10.0 },
        ]);

        // A segment running along the southern fence line, the region sticks out of the field.
        let start = Coord { lat: 0.0, lon: 2.0 };
        let end = Coord { lat: 0.0, lon: 8.0 };

        let clipped = pooling_region(start, end, 1.0, Some(&field)).unwrap();
        let bbox = clipped.bounding_box().unwrap();

        assert!(bbox.ll.lat >= -1.0e-12);
        assert!((bbox.ur.lat - 1.0).abs() < 1.0e-12);
    }

    #[test]
    fn test_clip_outside_field_is_empty_but_ok() {
        let field = Polygon::new(vec![
            Coord { lat: 0.0, lon: 0.0 },
            Coord { lat: 1.0, lon: 0.0 },
            Coord { lat: 1.0, lon: 1.0 },
            Coord { lat: 0.0, lon: 1.0 },
        ]);

        let start = Coord {
            lat: 50.0,
            lon: 50.0,
        };
        let end = Coord {
            lat: 51.0,
            lon: 50.0,
        };

        let region = pooling_region(start, end, 0.1, Some(&field)).unwrap();
        assert!(region.is_empty());
    }
}
