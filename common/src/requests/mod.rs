//! Request payloads accepted by the backend API.
//!
//! Selections coming from dashboard dropdowns use `Option<String>`: JSON
//! `null`, an empty string and the literal `"none"` all mean "clear this
//! reference".

use crate::model::entity::InvalidFlag;
use crate::model::geometry::Geometry;
use crate::model::token::TokenStatus;
use crate::model::user::Role;
use serde::{Deserialize, Serialize};

/// Normalizes a dropdown selection, mapping the "none" spellings to `None`.
pub fn selected(value: Option<&str>) -> Option<&str> {
    let value = value?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(value)
    }
}

/// Raw values captured on a survey form before any reference is resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeRequest {
    pub tmp_ward_number: Option<String>,
    pub tmp_area_code: Option<String>,
    pub tmp_enumerator_id: Option<String>,
}

/// A ward picked on the dashboard: the number itself, or its text from a
/// dropdown (which may be a "none" spelling).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WardSelection {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignWardRequest {
    pub ward: Option<WardSelection>,
}

/// Area and token are always submitted together so a token can never outlive
/// the area it was allocated under.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignAreaRequest {
    pub area_id: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignEnumeratorRequest {
    pub enumerator: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvalidEntitiesQuery {
    pub ward: Option<i64>,
    pub area_id: Option<String>,
    pub enumerator_id: Option<String>,
    pub flag: Option<InvalidFlag>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterWardRequest {
    pub ward_number: i64,
    pub ward_area_code: i64,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAreaRequest {
    pub code: i64,
    pub ward_number: i64,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterTokensRequest {
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenListQuery {
    pub status: Option<TokenStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub id: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocateQuery {
    pub lng: f64,
    pub lat: f64,
}
