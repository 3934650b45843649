//! Triage decision workflow
//!
//! A single-pass state machine over a `Case`. `TriageWorkflow::transition` is the
//! whole graph: every state has exactly one outgoing edge, except
//! `OPERABILITY_NORMALIZATION`, which routes on the normalized signal alone.
//! Runs are synchronous and share nothing but the read-only registry.

pub mod nodes;
pub mod state;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{Case, CaseInput, NotificationPayload};
use crate::registry::VehicleRegistry;
use crate::services::notifier::NotificationSink;

pub use nodes::SupportDistribution;
pub use state::{normalize_operability, Branch, TriageState};

/// Notification produced by the severe branch, with its delivery result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dispatch {
    pub payload: NotificationPayload,
    pub delivered: bool,
}

/// Result of one transition
#[derive(Debug, Clone)]
pub struct Step {
    pub next: TriageState,
    pub case: Case,
    pub dispatch: Option<Dispatch>,
}

impl Step {
    fn to(next: TriageState, case: Case) -> Self {
        Self {
            next,
            case,
            dispatch: None,
        }
    }
}

/// Structured result of a workflow run
#[derive(Debug, Clone, Serialize)]
pub struct TriageOutcome {
    pub case_id: Uuid,
    /// Always `END`
    pub state: TriageState,
    pub branch: Branch,
    /// States executed, in order (excluding `END`)
    pub visited: Vec<TriageState>,
    /// Final human-readable response
    pub response: String,
    pub case: Case,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_delivered: Option<bool>,
    pub completed_at: DateTime<Utc>,
}

/// Triage workflow with its injected collaborators
pub struct TriageWorkflow {
    registry: Arc<dyn VehicleRegistry>,
    notifier: Arc<dyn NotificationSink>,
    distribution: SupportDistribution,
}

impl TriageWorkflow {
    pub fn new(
        registry: Arc<dyn VehicleRegistry>,
        notifier: Arc<dyn NotificationSink>,
        distribution: SupportDistribution,
    ) -> Self {
        Self {
            registry,
            notifier,
            distribution,
        }
    }

    pub fn registry(&self) -> &dyn VehicleRegistry {
        self.registry.as_ref()
    }

    /// Run a case from `VEHICLE_VERIFICATION` to `END`
    ///
    /// Never fails: every input reaches exactly one branch and yields a response.
    pub fn run(&self, input: CaseInput) -> TriageOutcome {
        let case_id = Uuid::new_v4();
        let mut case = Case::from(input);
        let mut state = TriageState::ENTRY;
        let mut visited = Vec::with_capacity(3);
        let mut branch = Branch::Unclear;
        let mut dispatch = None;

        while !state.is_terminal() {
            debug_assert!(!visited.contains(&state), "state {:?} visited twice", state);
            visited.push(state);
            if let Some(b) = state.branch() {
                branch = b;
            }

            let step = self.transition(state, case);
            debug!(case_id = %case_id, from = ?state, to = ?step.next, "Triage transition");

            state = step.next;
            case = step.case;
            if step.dispatch.is_some() {
                dispatch = step.dispatch;
            }
        }

        info!(
            case_id = %case_id,
            branch = ?branch,
            vehicle = %case.vehicle_number,
            location = %case.location,
            "Triage completed"
        );

        let (notification, notification_delivered) = match dispatch {
            Some(d) => (Some(d.payload), Some(d.delivered)),
            None => (None, None),
        };

        TriageOutcome {
            case_id,
            state,
            branch,
            visited,
            response: case.response.clone(),
            case,
            notification,
            notification_delivered,
            completed_at: Utc::now(),
        }
    }

    /// Execute `state`'s node on `case` and pick the next state
    pub fn transition(&self, state: TriageState, mut case: Case) -> Step {
        match state {
            TriageState::VehicleVerification => {
                nodes::verify_vehicle(&mut case, self.registry.as_ref());
                Step::to(TriageState::OperabilityNormalization, case)
            }
            TriageState::OperabilityNormalization => {
                nodes::normalize_signal(&mut case);
                let next = Branch::route(&case.inoperative).state();
                Step::to(next, case)
            }
            TriageState::Severe => {
                let payload = nodes::compose_notification(&case, &self.distribution);
                let delivered = self.notify(&payload);
                nodes::severe_response(&mut case);
                Step {
                    next: TriageState::End,
                    case,
                    dispatch: Some(Dispatch { payload, delivered }),
                }
            }
            TriageState::Manageable => {
                nodes::manageable_response(&mut case);
                Step::to(TriageState::End, case)
            }
            TriageState::Unclear => {
                nodes::unclear_response(&mut case);
                Step::to(TriageState::End, case)
            }
            TriageState::End => Step::to(TriageState::End, case),
        }
    }

    /// Best-effort send; failures are logged and reported as `false`
    fn notify(&self, payload: &NotificationPayload) -> bool {
        match self.notifier.send(payload) {
            Ok(()) => {
                info!(to = ?payload.to, subject = %payload.subject, "Severe-case notification sent");
                true
            }
            Err(e) => {
                warn!(error = %e, to = ?payload.to, "Severe-case notification failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticVehicleRegistry;
    use crate::services::notifier::LogNotifier;
    use inlo_common::config::default_vehicles;

    fn workflow() -> TriageWorkflow {
        TriageWorkflow::new(
            Arc::new(StaticVehicleRegistry::from_entries(default_vehicles())),
            Arc::new(LogNotifier),
            SupportDistribution::default(),
        )
    }

    #[test]
    fn test_verification_always_moves_to_normalization() {
        let wf = workflow();
        for number in ["KA01AB1234", "KA03EF9999", ""] {
            let case = Case::from(CaseInput::new(number, "yes", "X"));
            let step = wf.transition(TriageState::VehicleVerification, case);
            assert_eq!(step.next, TriageState::OperabilityNormalization);
            assert!(step.dispatch.is_none());
        }
    }

    #[test]
    fn test_normalization_routes_on_signal() {
        let wf = workflow();
        let cases = [
            (" Yes", TriageState::Severe),
            ("NO ", TriageState::Manageable),
            ("maybe", TriageState::Unclear),
            ("", TriageState::Unclear),
        ];
        for (signal, expected) in cases {
            let case = Case::from(CaseInput::new("KA01AB1234", signal, "X"));
            let step = wf.transition(TriageState::OperabilityNormalization, case);
            assert_eq!(step.next, expected, "signal {:?}", signal);
        }
    }

    #[test]
    fn test_branch_nodes_end_the_run() {
        let wf = workflow();
        for state in [TriageState::Severe, TriageState::Manageable, TriageState::Unclear] {
            let case = Case::from(CaseInput::new("KA01AB1234", "yes", "X"));
            let step = wf.transition(state, case);
            assert_eq!(step.next, TriageState::End);
            assert_eq!(step.dispatch.is_some(), state == TriageState::Severe);
        }
    }

    #[test]
    fn test_run_visits_three_states() {
        let outcome = workflow().run(CaseInput::new("KA02CD5678", "No", "Whitefield"));
        assert_eq!(
            outcome.visited,
            vec![
                TriageState::VehicleVerification,
                TriageState::OperabilityNormalization,
                TriageState::Manageable,
            ]
        );
        assert_eq!(outcome.state, TriageState::End);
        assert_eq!(outcome.response, outcome.case.response);
    }
}
