use serde::{Deserialize, Serialize};

/// The three survey subjects that carry ward/area/enumerator/token references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Building,
    Business,
    Family,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Building,
        EntityKind::Business,
        EntityKind::Family,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Building => "building",
            EntityKind::Business => "business",
            EntityKind::Family => "family",
        }
    }
}

/// One of the four per-reference validity flags of an entity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidFlag {
    Ward,
    Area,
    Enumerator,
    Token,
}

/// A building, business or family record as stored by the survey intake.
///
/// The `is_*_valid` flags mirror whether the matching reference currently
/// resolves; the `tmp_*` fields keep the raw values typed in the field so an
/// admin can see what the enumerator meant when a reference did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub kind: EntityKind,
    pub ward_id: Option<i64>,
    pub area_id: Option<String>,
    pub enumerator_id: Option<String>,
    pub enumerator_name: Option<String>,
    pub building_token: Option<String>,
    pub is_ward_valid: bool,
    pub is_area_valid: bool,
    pub is_enumerator_valid: bool,
    pub is_building_token_valid: bool,
    pub tmp_ward_number: Option<String>,
    pub tmp_area_code: Option<String>,
    pub tmp_enumerator_id: Option<String>,
}

impl EntityRecord {
    /// Flags that are currently false, in ward/area/enumerator/token order.
    pub fn invalid_flags(&self) -> Vec<InvalidFlag> {
        [
            (self.is_ward_valid, InvalidFlag::Ward),
            (self.is_area_valid, InvalidFlag::Area),
            (self.is_enumerator_valid, InvalidFlag::Enumerator),
            (self.is_building_token_valid, InvalidFlag::Token),
        ]
        .into_iter()
        .filter(|(valid, _)| !valid)
        .map(|(_, flag)| flag)
        .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.invalid_flags().is_empty()
    }
}

/// Number of matching entities with each flag false. An entity with several
/// false flags is counted once per flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidCounts {
    pub ward: u64,
    pub area: u64,
    pub enumerator: u64,
    pub token: u64,
}

impl InvalidCounts {
    pub fn sum(&self) -> u64 {
        self.ward + self.area + self.enumerator + self.token
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
    pub total: u64,
    pub has_more: bool,
}

/// One page of entities needing remediation, with counts taken from the same
/// snapshot as the rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidEntitiesPage {
    pub rows: Vec<EntityRecord>,
    pub counts: InvalidCounts,
    pub pagination: Pagination,
}
