//! Triage case record
//!
//! A `Case` is created from a `CaseInput` at the start of every workflow run and
//! mutated by each node. Nothing is shared between runs.

use serde::{Deserialize, Serialize};

use super::assessment::{AssessmentResult, Operability};

/// Location used when the caller gives none
pub const DEFAULT_LOCATION: &str = "Unknown";

/// Case initialization object (all fields optional)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseInput {
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub inoperative: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl CaseInput {
    pub fn new(
        vehicle_number: impl Into<String>,
        inoperative: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            vehicle_number: Some(vehicle_number.into()),
            inoperative: Some(inoperative.into()),
            location: Some(location.into()),
        }
    }

    /// Build a case from a condition assessment
    ///
    /// The claimed vehicle number (from the reporter) takes precedence over the
    /// assessed one. The assessed operability is inverted into the `inoperative`
    /// signal; `unknown` stays `unknown` so the case lands in manual review.
    pub fn from_assessment(
        assessment: &AssessmentResult,
        claimed_vehicle: Option<String>,
        location: Option<String>,
    ) -> Self {
        let vehicle_number = claimed_vehicle
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| assessment.vehicle_number.clone());

        let inoperative = match assessment.operative {
            Operability::Yes => "no",
            Operability::No => "yes",
            Operability::Unknown => "unknown",
        };

        Self {
            vehicle_number: Some(vehicle_number),
            inoperative: Some(inoperative.to_string()),
            location,
        }
    }
}

/// Mutable per-invocation case record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub vehicle_number: String,
    pub inoperative: String,
    pub location: String,
    pub vehicle_owner: Option<String>,
    pub insurance_number: Option<String>,
    /// Response of the last node that produced one
    pub response: String,
}

impl From<CaseInput> for Case {
    fn from(input: CaseInput) -> Self {
        let location = input
            .location
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        Self {
            vehicle_number: input.vehicle_number.unwrap_or_default(),
            inoperative: input.inoperative.unwrap_or_default(),
            location,
            vehicle_owner: None,
            insurance_number: None,
            response: String::new(),
        }
    }
}
