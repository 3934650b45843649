//! Crash-assist pipeline: assessment → case → triage workflow

use std::path::{Path, PathBuf};
use std::sync::Arc;

use inlo_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{AssessmentResult, CaseInput};
use crate::workflow::{TriageOutcome, TriageWorkflow};

use super::assessment_store::AssessmentStore;
use super::assessor::{assess_or_unknown, ConditionAssessor};

/// Photo submitted for assessment and triage
#[derive(Debug, Clone, Deserialize)]
pub struct AssessRequest {
    pub target_image: PathBuf,
    /// Overrides the configured reference image
    #[serde(default)]
    pub reference_image: Option<PathBuf>,
    /// Vehicle number claimed by the reporter
    #[serde(default)]
    pub vehicle_number: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessedTriage {
    pub assessment: AssessmentResult,
    pub outcome: TriageOutcome,
}

/// Assessment plus workflow, with the reference asset and artifact store
pub struct CrashAssist {
    workflow: Arc<TriageWorkflow>,
    assessor: Arc<dyn ConditionAssessor>,
    reference_image: Option<PathBuf>,
    /// Request-supplied images must resolve under this directory when set
    image_dir: Option<PathBuf>,
    store: AssessmentStore,
}

impl CrashAssist {
    pub fn new(
        workflow: Arc<TriageWorkflow>,
        assessor: Arc<dyn ConditionAssessor>,
        reference_image: Option<PathBuf>,
        store: AssessmentStore,
    ) -> Self {
        Self {
            workflow,
            assessor,
            reference_image,
            image_dir: None,
            store,
        }
    }

    /// Confine request-supplied image paths to `dir` (relative paths are joined onto it)
    pub fn with_image_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.image_dir = dir;
        self
    }

    pub fn workflow(&self) -> &TriageWorkflow {
        &self.workflow
    }

    /// Triage a case given directly (no image)
    pub fn triage(&self, input: CaseInput) -> TriageOutcome {
        self.workflow.run(input)
    }

    /// Assess the photo and triage the resulting case
    ///
    /// Only a missing reference image is an error; every assessment failure
    /// degrades to an unknown condition and still reaches a triage response.
    pub fn assess_and_triage(&self, request: AssessRequest) -> Result<AssessedTriage> {
        let target = self.confine(&request.target_image)?;
        let reference = match &request.reference_image {
            Some(path) => Some(self.confine(path)?),
            None => None,
        };
        let reference = reference
            .or_else(|| self.reference_image.clone())
            .ok_or_else(|| {
                Error::InvalidInput(
                    "no reference image given and none configured ([assessment] reference_image)"
                        .to_string(),
                )
            })?;

        info!(
            target = %target.display(),
            reference = %reference.display(),
            "Assessing vehicle condition"
        );

        let assessment = assess_or_unknown(self.assessor.as_ref(), &target, &reference);
        self.store.save_best_effort(&assessment);

        let input = CaseInput::from_assessment(&assessment, request.vehicle_number, request.location);
        let outcome = self.workflow.run(input);

        Ok(AssessedTriage { assessment, outcome })
    }

    /// Resolve a request-supplied image path against the image directory
    ///
    /// Paths that do not exist and paths outside the directory get the same error.
    fn confine(&self, requested: &Path) -> Result<PathBuf> {
        let Some(dir) = &self.image_dir else {
            return Ok(requested.to_path_buf());
        };

        let root = dir.canonicalize().map_err(|e| {
            Error::Config(format!("image directory {} unavailable: {}", dir.display(), e))
        })?;
        let candidate = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            root.join(requested)
        };

        match candidate.canonicalize() {
            Ok(resolved) if resolved.starts_with(&root) => Ok(resolved),
            _ => Err(Error::InvalidInput(format!(
                "image not available in the image directory: {}",
                requested.display()
            ))),
        }
    }
}
