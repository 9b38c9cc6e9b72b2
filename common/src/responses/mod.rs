//! Response payloads returned by the backend API.

use serde::{Deserialize, Serialize};

/// Success flag returned by the assignment and area-status procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Ack { success: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevalidateSummary {
    /// Rows whose stored flags disagreed with their references and were fixed.
    pub corrected: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocateResult {
    pub ward_number: i64,
    pub area_id: Option<String>,
    pub area_code: Option<i64>,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
