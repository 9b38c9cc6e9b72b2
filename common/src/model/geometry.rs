use serde::{Deserialize, Serialize};

/// A `[longitude, latitude]` pair, in GeoJSON axis order.
pub type Position = [f64; 2];

/// The subset of GeoJSON geometries stored for wards and areas.
///
/// Ward and area boundaries are `Polygon`s; an area's centroid is a `Point`.
/// The first ring of a polygon is its exterior boundary, any further rings are
/// holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    Polygon { coordinates: Vec<Vec<Position>> },
}

/// Reasons a geometry is rejected at registration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    NotAPolygon,
    NoRings,
    RingTooShort { ring: usize },
    RingNotClosed { ring: usize },
    NonFinite,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAPolygon => write!(f, "geometry must be a Polygon"),
            Self::NoRings => write!(f, "polygon has no rings"),
            Self::RingTooShort { ring } => {
                write!(f, "ring {ring} needs at least four positions")
            }
            Self::RingNotClosed { ring } => {
                write!(f, "ring {ring} must start and end on the same position")
            }
            Self::NonFinite => write!(f, "coordinates must be finite numbers"),
        }
    }
}

impl std::error::Error for GeometryError {}

impl Geometry {
    pub fn point(lng: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: [lng, lat],
        }
    }

    /// Checks that this is a well-formed polygon: at least one ring, every ring
    /// closed with four or more finite positions.
    pub fn validate_polygon(&self) -> Result<(), GeometryError> {
        let Geometry::Polygon { coordinates } = self else {
            return Err(GeometryError::NotAPolygon);
        };
        if coordinates.is_empty() {
            return Err(GeometryError::NoRings);
        }
        for (ring_idx, ring) in coordinates.iter().enumerate() {
            if ring.len() < 4 {
                return Err(GeometryError::RingTooShort { ring: ring_idx });
            }
            if ring.iter().flatten().any(|c| !c.is_finite()) {
                return Err(GeometryError::NonFinite);
            }
            if ring.first() != ring.last() {
                return Err(GeometryError::RingNotClosed { ring: ring_idx });
            }
        }
        Ok(())
    }

    /// Returns true when `point` lies inside the exterior ring and outside
    /// every hole. Points are never contained by a `Point` geometry.
    pub fn contains(&self, point: Position) -> bool {
        match self {
            Geometry::Point { .. } => false,
            Geometry::Polygon { coordinates } => match coordinates.split_first() {
                Some((exterior, holes)) => {
                    ring_contains(exterior, point)
                        && !holes.iter().any(|hole| ring_contains(hole, point))
                }
                None => false,
            },
        }
    }

    /// Area-weighted centroid of the exterior ring. Degenerate (zero-area)
    /// rings fall back to the mean of their distinct vertices.
    pub fn centroid(&self) -> Option<Geometry> {
        let exterior = match self {
            Geometry::Point { coordinates } => {
                return Some(Geometry::point(coordinates[0], coordinates[1]));
            }
            Geometry::Polygon { coordinates } => coordinates.first()?,
        };
        if exterior.is_empty() {
            return None;
        }

        let mut twice_area = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;
        for pair in exterior.windows(2) {
            let [x0, y0] = pair[0];
            let [x1, y1] = pair[1];
            let cross = x0 * y1 - x1 * y0;
            twice_area += cross;
            cx += (x0 + x1) * cross;
            cy += (y0 + y1) * cross;
        }

        if twice_area.abs() < f64::EPSILON {
            let vertices = if exterior.len() > 1 && exterior.first() == exterior.last() {
                &exterior[..exterior.len() - 1]
            } else {
                &exterior[..]
            };
            let n = vertices.len() as f64;
            let (sx, sy) = vertices
                .iter()
                .fold((0.0, 0.0), |(sx, sy), [x, y]| (sx + x, sy + y));
            return Some(Geometry::point(sx / n, sy / n));
        }

        Some(Geometry::point(
            cx / (3.0 * twice_area),
            cy / (3.0 * twice_area),
        ))
    }
}

// Even-odd ray casting along +x.
fn ring_contains(ring: &[Position], [px, py]: Position) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > py) != (yj > py) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
