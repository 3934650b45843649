//! Configuration resolution for inlo-triage
//!
//! Webhook URL priority: ENV (`INLO_WEBHOOK_URL`) → TOML `[notification] webhook_url`.
//! With neither, severe-case notifications are only logged.

use std::sync::Arc;
use std::time::Duration;

use inlo_common::config::TomlConfig;
use inlo_common::{Error, Result};
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::registry::StaticVehicleRegistry;
use crate::services::{
    AssessmentStore, CaptionAssessor, CrashAssist, LocalImageAnalyzer, LogNotifier,
    NotificationSink, WebhookNotifier,
};
use crate::workflow::{SupportDistribution, TriageWorkflow};

pub const WEBHOOK_ENV_VAR: &str = "INLO_WEBHOOK_URL";

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve the notification webhook URL (ENV → TOML)
pub fn resolve_webhook_url(toml_config: &TomlConfig) -> Option<String> {
    let env_url = non_empty(std::env::var(WEBHOOK_ENV_VAR).ok());
    let toml_url = non_empty(toml_config.notification.webhook_url.clone());

    if env_url.is_some() && toml_url.is_some() {
        warn!(
            "Webhook URL found in both environment and TOML config. Using {} (highest priority).",
            WEBHOOK_ENV_VAR
        );
    }

    if let Some(url) = env_url {
        info!("Webhook URL loaded from environment variable");
        return Some(url);
    }
    if let Some(url) = toml_url {
        info!("Webhook URL loaded from TOML config");
        return Some(url);
    }
    None
}

/// Build the notification sink for this configuration
pub fn build_notifier(toml_config: &TomlConfig, runtime: Handle) -> Result<Arc<dyn NotificationSink>> {
    match resolve_webhook_url(toml_config) {
        Some(url) => {
            let timeout = Duration::from_secs(toml_config.notification.timeout_seconds);
            let notifier = WebhookNotifier::new(url, timeout, runtime)
                .map_err(|e| Error::Config(e.to_string()))?;
            info!(url = %notifier.url(), "Severe-case notifications go to webhook");
            Ok(Arc::new(notifier))
        }
        None => {
            warn!("No webhook URL configured; severe-case notifications will only be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

/// Build the workflow from configuration
pub fn build_workflow(toml_config: &TomlConfig, notifier: Arc<dyn NotificationSink>) -> TriageWorkflow {
    let registry = StaticVehicleRegistry::from_entries(toml_config.vehicle_entries());
    info!(vehicles = registry.len(), "Vehicle registry loaded");

    TriageWorkflow::new(
        Arc::new(registry),
        notifier,
        SupportDistribution::from(&toml_config.notification),
    )
}

/// Build the complete crash-assist pipeline from configuration
pub fn build_crash_assist(toml_config: &TomlConfig, runtime: Handle) -> Result<CrashAssist> {
    let notifier = build_notifier(toml_config, runtime)?;
    let workflow = build_workflow(toml_config, notifier);

    let reference_image = toml_config.assessment.reference_image.clone();
    if reference_image.is_none() {
        warn!("No reference image configured; assessment requests must supply one");
    }

    Ok(CrashAssist::new(
        Arc::new(workflow),
        Arc::new(CaptionAssessor::new(LocalImageAnalyzer::new())),
        reference_image,
        AssessmentStore::new(toml_config.assessment.output_file.clone()),
    )
    .with_image_dir(toml_config.assessment.image_dir.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn config_with_webhook(url: Option<&str>) -> TomlConfig {
        let mut config = TomlConfig::default();
        config.notification.webhook_url = url.map(str::to_string);
        config
    }

    #[test]
    #[serial]
    fn test_env_webhook_overrides_toml() {
        std::env::set_var(WEBHOOK_ENV_VAR, "http://env.example.com/hook");
        let url = resolve_webhook_url(&config_with_webhook(Some("http://toml.example.com/hook")));
        std::env::remove_var(WEBHOOK_ENV_VAR);

        assert_eq!(url.as_deref(), Some("http://env.example.com/hook"));
    }

    #[test]
    #[serial]
    fn test_blank_values_mean_no_webhook() {
        std::env::set_var(WEBHOOK_ENV_VAR, "  ");
        let url = resolve_webhook_url(&config_with_webhook(Some("")));
        std::env::remove_var(WEBHOOK_ENV_VAR);

        assert!(url.is_none());
    }

    #[test]
    #[serial]
    fn test_invalid_webhook_url_is_config_error() {
        std::env::remove_var(WEBHOOK_ENV_VAR);
        let runtime = tokio::runtime::Runtime::new().unwrap();

        let result = build_notifier(&config_with_webhook(Some("mailto:desk@example.com")), runtime.handle().clone());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn test_configured_vehicles_replace_defaults() {
        std::env::remove_var(WEBHOOK_ENV_VAR);
        let config: TomlConfig = toml::from_str(
            r#"
            [[vehicles]]
            number = "mh12ab0001"
            owner = "Priya"
            insurance = "INS000001"
            "#,
        )
        .unwrap();

        let workflow = build_workflow(&config, Arc::new(LogNotifier));
        assert!(workflow.registry().lookup("MH12AB0001").is_some());
        assert!(workflow.registry().lookup("KA01AB1234").is_none());
    }
}
