//! Condition assessment result
//!
//! Produced by a `ConditionAssessor` and persisted as the `vehicle_comparison.json`
//! artifact, so the serialized field names follow that file's format.

use serde::{Deserialize, Serialize};

/// Vehicle identifier reported when none could be determined
pub const UNKNOWN_VEHICLE: &str = "Unknown";

/// Damage condition derived from the target caption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "not good")]
    NotGood,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Condition {
    /// Operability derived from condition: only an undamaged vehicle is assumed drivable
    pub fn operability(&self) -> Operability {
        match self {
            Condition::Good => Operability::Yes,
            Condition::NotGood => Operability::No,
            Condition::Unknown => Operability::Unknown,
        }
    }
}

/// Whether the vehicle can still move under its own power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operability {
    Yes,
    No,
    Unknown,
}

/// Structured output of a condition assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub vehicle_number: String,
    pub condition: Condition,
    pub operative: Operability,
    #[serde(rename = "same-vehicle")]
    pub same_vehicle: bool,
    /// Similarity to the reference image in [0, 1]
    pub overall_similarity: f64,
    pub explanation: String,
}

impl AssessmentResult {
    /// Degraded result used whenever assessment fails
    pub fn unknown(explanation: impl Into<String>) -> Self {
        Self {
            vehicle_number: UNKNOWN_VEHICLE.to_string(),
            condition: Condition::Unknown,
            operative: Operability::Unknown,
            same_vehicle: false,
            overall_similarity: 0.0,
            explanation: explanation.into(),
        }
    }
}
