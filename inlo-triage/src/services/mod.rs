//! Collaborators around the triage workflow

pub mod assessment_store;
pub mod assessor;
pub mod crash_assist;
pub mod image_analyzer;
pub mod notifier;

pub use assessment_store::AssessmentStore;
pub use assessor::{
    assess_or_unknown, AnalysisError, CaptionAssessor, ConditionAssessor, ImageAnalyzer,
    DEGRADED_EXPLANATION,
};
pub use crash_assist::{AssessRequest, AssessedTriage, CrashAssist};
pub use image_analyzer::LocalImageAnalyzer;
pub use notifier::{LogNotifier, NotificationSink, NotifyError, WebhookNotifier};
