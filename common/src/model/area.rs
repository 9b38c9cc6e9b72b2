use crate::model::geometry::Geometry;
use serde::{Deserialize, Serialize};

/// Assignment state of an area.
///
/// Transitions: `Unassigned -> Pending` when a user requests the area,
/// `Pending -> Assigned` on admin approval, and back to `Unassigned` on
/// rejection or withdrawal. An assigned or pending area always has an owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaStatus {
    Unassigned,
    Pending,
    Assigned,
}

impl AreaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaStatus::Unassigned => "unassigned",
            AreaStatus::Pending => "pending",
            AreaStatus::Assigned => "assigned",
        }
    }

    pub fn parse(value: &str) -> Option<AreaStatus> {
        match value {
            "unassigned" => Some(AreaStatus::Unassigned),
            "pending" => Some(AreaStatus::Pending),
            "assigned" => Some(AreaStatus::Assigned),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub code: i64,
    pub ward_number: i64,
    pub geometry: Geometry,
    pub centroid: Geometry,
    pub status: AreaStatus,
    pub assigned_to: Option<String>,
}
