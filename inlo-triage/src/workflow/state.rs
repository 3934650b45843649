//! Triage workflow states and routing
//!
//! VEHICLE_VERIFICATION → OPERABILITY_NORMALIZATION → {SEVERE | MANAGEABLE | UNCLEAR} → END

use serde::{Deserialize, Serialize};

/// Workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriageState {
    /// Registry lookup of the vehicle number
    VehicleVerification,
    /// Strip and lowercase the inoperative signal
    OperabilityNormalization,
    /// Inoperative: police, ambulance and service agent, plus notification
    Severe,
    /// Still drivable: service agent only
    Manageable,
    /// Anything else: manual assessment
    Unclear,
    /// Terminal state; the case response is final
    End,
}

impl TriageState {
    /// Entry point of every run
    pub const ENTRY: TriageState = TriageState::VehicleVerification;

    pub fn is_terminal(&self) -> bool {
        matches!(self, TriageState::End)
    }

    /// Branch this state represents, if it is one of the outcome nodes
    pub fn branch(&self) -> Option<Branch> {
        match self {
            TriageState::Severe => Some(Branch::Severe),
            TriageState::Manageable => Some(Branch::Manageable),
            TriageState::Unclear => Some(Branch::Unclear),
            TriageState::VehicleVerification
            | TriageState::OperabilityNormalization
            | TriageState::End => None,
        }
    }
}

/// Mutually exclusive terminal outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Severe,
    Manageable,
    Unclear,
}

impl Branch {
    /// Select the branch for a normalized inoperative signal
    ///
    /// Total over all strings: only exact `"yes"` and `"no"` leave the
    /// manual-assessment fallback.
    pub fn route(normalized_signal: &str) -> Branch {
        match normalized_signal {
            "yes" => Branch::Severe,
            "no" => Branch::Manageable,
            _ => Branch::Unclear,
        }
    }

    pub fn state(&self) -> TriageState {
        match self {
            Branch::Severe => TriageState::Severe,
            Branch::Manageable => TriageState::Manageable,
            Branch::Unclear => TriageState::Unclear,
        }
    }
}

/// Normalize a raw inoperative signal; absent input becomes `""`
pub fn normalize_operability(raw: Option<&str>) -> String {
    raw.map(|s| s.trim().to_lowercase()).unwrap_or_default()
}
