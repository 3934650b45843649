//! Workflow node bodies
//!
//! Each node mutates the case it is given. Nodes never choose the next state;
//! that is the transition function's job.

use crate::models::{Case, NotificationPayload};
use crate::registry::{normalize_vehicle_number, VehicleRegistry};

use super::state::normalize_operability;

/// Static recipients and subject for severe-case notifications
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportDistribution {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
}

impl From<&inlo_common::config::NotificationConfig> for SupportDistribution {
    fn from(config: &inlo_common::config::NotificationConfig) -> Self {
        Self {
            to: config.to.clone(),
            cc: config.cc.clone(),
            subject: config.subject.clone(),
        }
    }
}

impl Default for SupportDistribution {
    fn default() -> Self {
        Self::from(&inlo_common::config::NotificationConfig::default())
    }
}

/// Look the vehicle up; a miss is an ordinary outcome (insurance opt-in assumed)
pub fn verify_vehicle(case: &mut Case, registry: &dyn VehicleRegistry) {
    let number = normalize_vehicle_number(&case.vehicle_number);

    match registry.lookup(&number) {
        Some(record) => {
            case.response = format!(
                "Vehicle {} verified. Owner: {}, Insurance: {}",
                number, record.owner, record.insurance
            );
            case.vehicle_owner = Some(record.owner);
            case.insurance_number = Some(record.insurance);
        }
        None => {
            case.vehicle_owner = None;
            case.insurance_number = None;
            case.response = format!(
                "Vehicle {} not found. Insurance opt-in accepted. Proceeding...",
                number
            );
        }
    }
}

/// Normalize the inoperative signal in place; the response is left alone
pub fn normalize_signal(case: &mut Case) {
    case.inoperative = normalize_operability(Some(case.inoperative.as_str()));
}

pub fn severe_response(case: &mut Case) {
    case.response = format!(
        "Fatal & serious condition at {}. Arrange call to police, ambulance & service agent. Email sent to owner.",
        case.location
    );
}

pub fn manageable_response(case: &mut Case) {
    case.response = format!(
        "Fatal but manageable condition at {}. Arrange call to service agent only.",
        case.location
    );
}

pub fn unclear_response(case: &mut Case) {
    case.response = format!(
        "Condition unclear: inoperative='{}' at {}. Please arrange manual assessment.",
        case.inoperative, case.location
    );
}

/// Compose the severe-case notification
pub fn compose_notification(case: &Case, distribution: &SupportDistribution) -> NotificationPayload {
    let greeting = match &case.vehicle_owner {
        Some(owner) => format!("Hello {},", owner),
        None => "Hello,".to_string(),
    };

    NotificationPayload {
        to: distribution.to.clone(),
        cc: distribution.cc.clone(),
        subject: distribution.subject.clone(),
        body: format!(
            "{}\n\nAn ambulance has been dispatched to your location at {}. Additionally, your car \
             will be picked up for towing in 15 minutes and will arrive at the service centre \
             within 45 minutes.\n\nStay safe,\nSupport Team",
            greeting, case.location
        ),
    }
}
