/*!
 * Planar geographic primitives.
 *
 * All of the geometry in this crate works directly on latitude / longitude degree values as if
 * they were planar x / y coordinates, with x = latitude and y = longitude. That is numerically
 * informal, but it is the behavior of the telemetry pipeline this crate reimplements, and the
 * distance thresholds in the configuration are expressed in the same degree units. Fields are a
 * few hundred meters across, so the planar approximation is well within the noise of the cart's
 * GPS fix.
 */

/// Tolerance for deciding a point sits on a polygon edge, in degrees.
const EDGE_EPS: f64 = 1.0e-9;

/// A latitude / longitude pair, treated as a planar coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    /// Latitude in degrees, the planar x axis.
    pub lat: f64,
    /// Longitude in degrees, the planar y axis.
    pub lon: f64,
}

impl Coord {
    /// Are both components finite numbers?
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/**
 * The planar Euclidean distance between two coordinates, in degrees.
 *
 * This is NOT a great circle or projected distance. The source data this crate was built for
 * configures its distance window in raw degree units, so the straight planar value is the
 * contract.
 */
pub fn planar_distance(a: Coord, b: Coord) -> f64 {
    let dx = b.lat - a.lat;
    let dy = b.lon - a.lon;
    dx.hypot(dy)
}

/// An axis aligned rectangle described by its lower left and upper right corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// The lower left corner (minimum lat, minimum lon).
    pub ll: Coord,
    /// The upper right corner (maximum lat, maximum lon).
    pub ur: Coord,
}

impl BoundingBox {
    /// Build the smallest box covering every coordinate in the iterator.
    ///
    /// Returns `None` for an empty iterator.
    pub fn from_coords<I: IntoIterator<Item = Coord>>(coords: I) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;

        let mut bbox = BoundingBox {
            ll: first,
            ur: first,
        };

        for c in iter {
            bbox.ll.lat = bbox.ll.lat.min(c.lat);
            bbox.ll.lon = bbox.ll.lon.min(c.lon);
            bbox.ur.lat = bbox.ur.lat.max(c.lat);
            bbox.ur.lon = bbox.ur.lon.max(c.lon);
        }

        Some(bbox)
    }

    /// The smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            ll: Coord {
                lat: self.ll.lat.min(other.ll.lat),
                lon: self.ll.lon.min(other.ll.lon),
            },
            ur: Coord {
                lat: self.ur.lat.max(other.ur.lat),
                lon: self.ur.lon.max(other.ur.lon),
            },
        }
    }

    /// Is the coordinate inside the box? Points on the edge count as inside.
    pub fn contains(&self, c: Coord) -> bool {
        c.lat >= self.ll.lat && c.lat <= self.ur.lat && c.lon >= self.ll.lon && c.lon <= self.ur.lon
    }
}

/**
 * An ordered list of vertices describing a simple polygon.
 *
 * Vertices may wind in either direction. An empty vertex list is a valid polygon with no area;
 * clipping can legitimately produce one.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon(Vec<Coord>);

impl Polygon {
    pub fn new(vertices: Vec<Coord>) -> Self {
        Polygon(vertices)
    }

    pub fn vertices(&self) -> &[Coord] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The axis aligned bounding box of the polygon, or `None` if it has no vertices.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_coords(self.0.iter().copied())
    }

    /**
     * Test whether a coordinate is inside the polygon.
     *
     * The test is inclusive: a point exactly on an edge or vertex is contained. This matches the
     * "intersects" semantics used when assigning telemetry points to fields, where a cart driving
     * along the fence line is still in the field.
     */
    pub fn contains(&self, pt: Coord) -> bool {
        let verts = &self.0;
        let n = verts.len();
        if n < 3 {
            return false;
        }

        // Points on the boundary are contained, so check the edges before ray casting.
        let mut j = n - 1;
        for i in 0..n {
            if point_on_segment(verts[j], verts[i], pt) {
                return true;
            }
            j = i;
        }

        // Standard even-odd ray cast, casting along the +x (latitude) axis.
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = (verts[i].lat, verts[i].lon);
            let (xj, yj) = (verts[j].lat, verts[j].lon);

            if (yi > pt.lon) != (yj > pt.lon) {
                let x_cross = xi + (pt.lon - yi) * (xj - xi) / (yj - yi);
                if pt.lat < x_cross {
                    inside = !inside;
                }
            }

            j = i;
        }

        inside
    }

    /**
     * Clip this polygon to a convex clip polygon using Sutherland-Hodgman.
     *
     * Field boundaries are simple quadrilaterals entered corner by corner, so convexity of the
     * clip polygon is a safe assumption here. The result may be empty when the polygons do not
     * overlap at all, and callers must treat an empty result as a valid outcome rather than an
     * error.
     */
    pub fn clip_to(&self, clip: &Polygon) -> Polygon {
        if self.0.is_empty() || clip.0.len() < 3 {
            return Polygon(Vec::new());
        }

        // The inside test below assumes counterclockwise winding of the clip polygon.
        let mut clip_verts = clip.0.clone();
        if signed_area(&clip_verts) < 0.0 {
            clip_verts.reverse();
        }

        let mut output = self.0.clone();

        let nc = clip_verts.len();
        for i in 0..nc {
            let a = clip_verts[i];
            let b = clip_verts[(i + 1) % nc];

            let input = std::mem::take(&mut output);
            if input.is_empty() {
                break;
            }

            let ni = input.len();
            for j in 0..ni {
                let p = input[j];
                let q = input[(j + 1) % ni];

                let p_in = cross(a, b, p) >= -EDGE_EPS;
                let q_in = cross(a, b, q) >= -EDGE_EPS;

                if q_in {
                    if !p_in {
                        output.push(line_intersection(a, b, p, q));
                    }
                    output.push(q);
                } else if p_in {
                    output.push(line_intersection(a, b, p, q));
                }
            }
        }

        Polygon(output)
    }
}

/// The z component of (b - a) x (p - a).
fn cross(a: Coord, b: Coord, p: Coord) -> f64 {
    (b.lat - a.lat) * (p.lon - a.lon) - (b.lon - a.lon) * (p.lat - a.lat)
}

/// Twice the signed area of the polygon via the shoelace formula. Positive is counterclockwise.
fn signed_area(verts: &[Coord]) -> f64 {
    let n = verts.len();
    let mut sum = 0.0;
    let mut j = n - 1;
    for i in 0..n {
        sum += (verts[j].lat + verts[i].lat) * (verts[i].lon - verts[j].lon);
        j = i;
    }
    sum
}

/// Is `p` on the closed segment from `a` to `b`?
fn point_on_segment(a: Coord, b: Coord, p: Coord) -> bool {
    if cross(a, b, p).abs() > EDGE_EPS {
        return false;
    }

    p.lat >= a.lat.min(b.lat) - EDGE_EPS
        && p.lat <= a.lat.max(b.lat) + EDGE_EPS
        && p.lon >= a.lon.min(b.lon) - EDGE_EPS
        && p.lon <= a.lon.max(b.lon) + EDGE_EPS
}

/// The intersection of the infinite line through `a` and `b` with the segment from `p` to `q`.
///
/// Only called by the clipper when the segment is known to straddle the line, so the denominator
/// cannot vanish.
fn line_intersection(a: Coord, b: Coord, p: Coord, q: Coord) -> Coord {
    let d1 = cross(a, b, p);
    let d2 = cross(a, b, q);
    let t = d1 / (d1 - d2);

    Coord {
        lat: p.lat + t * (q.lat - p.lat),
        lon: p.lon + t * (q.lon - p.lon),
    }
}
