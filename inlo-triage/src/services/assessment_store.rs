//! Persisted assessment artifact (`vehicle_comparison.json`)

use std::path::{Path, PathBuf};

use inlo_common::Result;
use tracing::{debug, warn};

use crate::models::AssessmentResult;

/// Writes each assessment to a fixed JSON file, overwriting the previous one
#[derive(Debug, Clone)]
pub struct AssessmentStore {
    path: Option<PathBuf>,
}

impl AssessmentStore {
    /// `None` or an empty path disables persistence
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path: path.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn save(&self, result: &AssessmentResult) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(result)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "Assessment saved");
        Ok(())
    }

    /// Save, logging instead of failing
    pub fn save_best_effort(&self, result: &AssessmentResult) {
        if let Err(e) = self.save(result) {
            warn!(error = %e, "Failed to persist assessment result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Condition, Operability};
    use tempfile::TempDir;

    fn sample() -> AssessmentResult {
        AssessmentResult {
            vehicle_number: "GJ01 JY0887".to_string(),
            condition: Condition::NotGood,
            operative: Operability::No,
            same_vehicle: false,
            overall_similarity: 0.71,
            explanation: "Reference: a car | Target: a broken car".to_string(),
        }
    }

    #[test]
    fn test_save_writes_pretty_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vehicle_comparison.json");
        let store = AssessmentStore::new(Some(path.clone()));

        store.save(&sample()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"same-vehicle\": false"));
        let saved: AssessmentResult = serde_json::from_str(&content).unwrap();
        assert_eq!(saved, sample());
    }

    #[test]
    fn test_empty_path_disables_store() {
        let store = AssessmentStore::new(Some(PathBuf::new()));
        assert!(store.path().is_none());
        assert!(store.save(&sample()).is_ok());
    }

    #[test]
    fn test_unwritable_path_is_error_but_best_effort_is_silent() {
        let store = AssessmentStore::new(Some(PathBuf::from("/nonexistent/dir/out.json")));
        assert!(store.save(&sample()).is_err());
        store.save_best_effort(&sample());
    }
}
