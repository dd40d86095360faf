/*!
 * Field boundaries and the containment index built from them.
 *
 * A field is configured as four corner coordinates entered clockwise from the northwest corner.
 * Fields are allowed to overlap, so a single telemetry point may belong to zero, one, or several
 * fields, and every owning field processes its own copy of the point independently.
 */

use crate::{
    error::ConfigError,
    geo::{BoundingBox, Coord, Polygon},
};

/// A user configured polygon delimiting one managed field.
#[derive(Debug, Clone)]
pub struct FieldBoundary {
    /// The unique name of the field.
    pub name: String,
    /// The northwest corner.
    pub nw: Coord,
    /// The northeast corner.
    pub ne: Coord,
    /// The southeast corner.
    pub se: Coord,
    /// The southwest corner.
    pub sw: Coord,
}

impl FieldBoundary {
    /// The corner coordinates in configuration order.
    pub fn corners(&self) -> [Coord; 4] {
        [self.nw, self.ne, self.se, self.sw]
    }

    /// The field polygon, corners in configuration order.
    pub fn polygon(&self) -> Polygon {
        Polygon::new(self.corners().to_vec())
    }

    /// The axis aligned extent of the field.
    pub fn bounding_box(&self) -> BoundingBox {
        // Four corners, never empty.
        BoundingBox::from_coords(self.corners()).unwrap()
    }
}

/**
 * An index over the configured field boundaries answering containment queries.
 *
 * Building the index validates the configuration: field names must be unique and every corner
 * must be a finite coordinate. Containment itself is inclusive of the boundary, a point on the
 * fence line belongs to the field.
 */
#[derive(Debug, Clone)]
pub struct FieldIndex {
    fields: Vec<(FieldBoundary, Polygon)>,
}

impl FieldIndex {
    /**
     * Build an index from the configured boundaries.
     *
     * #Arguments
     * boundaries - the field boundaries in configuration order. The order is preserved by
     * [field_names](Self::field_names) so output is reproducible run to run.
     *
     * #Returns
     * The index, or a [ConfigError] if two boundaries share a name or a boundary has a
     * non-finite corner.
     */
    pub fn build(boundaries: Vec<FieldBoundary>) -> Result<Self, ConfigError> {
        let mut fields: Vec<(FieldBoundary, Polygon)> = Vec::with_capacity(boundaries.len());

        for boundary in boundaries {
            if fields.iter().any(|(b, _)| b.name == boundary.name) {
                return Err(ConfigError::DuplicateFieldName(boundary.name));
            }

            if boundary.corners().iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::MalformedBoundary {
                    field: boundary.name,
                    msg: "corner coordinates must be finite",
                });
            }

            let polygon = boundary.polygon();
            fields.push((boundary, polygon));
        }

        Ok(FieldIndex { fields })
    }

    /// Is the point inside the named field? Unknown field names are simply not containing.
    pub fn contains(&self, pt: Coord, field_name: &str) -> bool {
        self.fields
            .iter()
            .find(|(b, _)| b.name == field_name)
            .map(|(_, poly)| poly.contains(pt))
            .unwrap_or(false)
    }

    /// The names of every field containing the point, in configuration order.
    pub fn contains_any(&self, pt: Coord) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, poly)| poly.contains(pt))
            .map(|(b, _)| b.name.as_str())
            .collect()
    }

    /// The field names in configuration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(b, _)| b.name.as_str())
    }

    /// The polygon of the named field.
    pub fn polygon(&self, field_name: &str) -> Option<&Polygon> {
        self.fields
            .iter()
            .find(|(b, _)| b.name == field_name)
            .map(|(_, poly)| poly)
    }

    /// The combined extent of every configured field, or `None` if no fields are configured.
    pub fn combined_bounding_box(&self) -> Option<BoundingBox> {
        self.fields
            .iter()
            .map(|(b, _)| b.bounding_box())
            .reduce(|acc, bbox| acc.union(&bbox))
    }
}
