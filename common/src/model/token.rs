use serde::{Deserialize, Serialize};

/// Whether a pre-printed token has been handed to a surveyed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Allocated,
    Unallocated,
}

impl TokenStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenStatus::Allocated => "allocated",
            TokenStatus::Unallocated => "unallocated",
        }
    }

    pub fn parse(value: &str) -> Option<TokenStatus> {
        match value {
            "allocated" => Some(TokenStatus::Allocated),
            "unallocated" => Some(TokenStatus::Unallocated),
            _ => None,
        }
    }
}

/// A token belongs to exactly one area for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token: String,
    pub area_id: String,
    pub status: TokenStatus,
}
