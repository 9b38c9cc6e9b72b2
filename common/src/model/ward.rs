use crate::model::geometry::Geometry;
use serde::{Deserialize, Serialize};

/// Reference row mapping a ward number to its administrative area code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ward {
    pub ward_number: i64,
    pub ward_area_code: i64,
    pub geometry: Geometry,
}
