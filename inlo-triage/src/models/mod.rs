//! Data models for triage cases

pub mod assessment;
pub mod case;
pub mod notification;

pub use assessment::{AssessmentResult, Condition, Operability};
pub use case::{Case, CaseInput, DEFAULT_LOCATION};
pub use notification::NotificationPayload;
