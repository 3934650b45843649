//! Configuration loading and config file resolution
//!
//! Bootstrap configuration comes from a single TOML file. Every section is optional
//! and falls back to compiled defaults. Only an explicit `--config` path must exist.
//!
//! # Config File Priority
//!
//! 1. Command-line argument (`--config`)
//! 2. Environment variable (`INLO_CONFIG`)
//! 3. Platform config directory (`~/.config/inlo/config.toml` on Linux)
//! 4. Compiled defaults (no file)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "INLO_CONFIG";

/// Default HTTP port for the triage service
pub const DEFAULT_PORT: u16 = 5780;

/// Default name of the persisted assessment artifact
pub const DEFAULT_ASSESSMENT_FILE: &str = "vehicle_comparison.json";

/// Platform config file location (`<config dir>/inlo/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("inlo").join("config.toml"))
}

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub assessment: AssessmentConfig,

    /// Vehicle registry entries. Empty means "use the compiled registry".
    #[serde(default)]
    pub vehicles: Vec<VehicleEntry>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            logging: LoggingConfig::default(),
            notification: NotificationConfig::default(),
            assessment: AssessmentConfig::default(),
            vehicles: Vec::new(),
        }
    }
}

impl TomlConfig {
    /// Registry entries to load: configured vehicles, or the compiled set
    pub fn vehicle_entries(&self) -> Vec<VehicleEntry> {
        if self.vehicles.is_empty() {
            default_vehicles()
        } else {
            self.vehicles.clone()
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr only if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Support distribution for severe-case notifications
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Webhook receiving the notification payload as JSON
    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default = "default_recipients")]
    pub to: Vec<String>,

    #[serde(default = "default_cc")]
    pub cc: Vec<String>,

    #[serde(default = "default_subject")]
    pub subject: String,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            to: default_recipients(),
            cc: default_cc(),
            subject: default_subject(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Condition assessment assets
#[derive(Debug, Clone, Deserialize)]
pub struct AssessmentConfig {
    /// Reference image of the vehicle in good condition
    #[serde(default)]
    pub reference_image: Option<PathBuf>,

    /// Directory that request-supplied image paths must resolve under
    #[serde(default)]
    pub image_dir: Option<PathBuf>,

    /// Where the assessment result is written; `None` disables persistence
    #[serde(default = "default_output_file")]
    pub output_file: Option<PathBuf>,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            reference_image: None,
            image_dir: None,
            output_file: default_output_file(),
        }
    }
}

/// One registered vehicle
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VehicleEntry {
    pub number: String,
    pub owner: String,
    pub insurance: String,
}

impl VehicleEntry {
    fn new(number: &str, owner: &str, insurance: &str) -> Self {
        Self {
            number: number.to_string(),
            owner: owner.to_string(),
            insurance: insurance.to_string(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_recipients() -> Vec<String> {
    vec!["support@example.com".to_string()]
}

fn default_cc() -> Vec<String> {
    vec![
        "ccperson1@example.com".to_string(),
        "ccperson2@example.com".to_string(),
    ]
}

fn default_subject() -> String {
    "reg: Your car is ready for pick up".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_output_file() -> Option<PathBuf> {
    Some(PathBuf::from(DEFAULT_ASSESSMENT_FILE))
}

/// Compiled vehicle registry used when the TOML file lists no vehicles
pub fn default_vehicles() -> Vec<VehicleEntry> {
    vec![
        VehicleEntry::new("KA01AB1234", "Shajee", "INS123456"),
        VehicleEntry::new("KA02CD5678", "Anand", "INS987654"),
        VehicleEntry::new("GJ01 JY0887", "Shajee", "INS123456"),
        VehicleEntry::new("GJ01 JY0888", "Anand", "INS987655"),
    ]
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// `INLO_CONFIG` named a file that does not exist; defaults were used
    Missing(PathBuf),
    /// No config file anywhere; defaults were used
    Defaults,
}

impl ConfigSource {
    /// Log the source. Called once tracing is initialized, since loading comes first.
    pub fn log(&self, module_name: &str) {
        match self {
            ConfigSource::File(path) => {
                info!(module = %module_name, path = %path.display(), "Loaded config file")
            }
            ConfigSource::Missing(path) => warn!(
                module = %module_name,
                path = %path.display(),
                "Config file not found, using compiled defaults"
            ),
            ConfigSource::Defaults => {
                info!(module = %module_name, "No config file found, using compiled defaults")
            }
        }
    }
}

/// Configuration together with its source
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

/// Config file resolution for one service
pub struct ConfigResolver {
    module_name: String,
}

impl ConfigResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Resolve which config file to read, if any
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Platform config directory
        default_config_path().filter(|p| p.exists())
    }

    /// Resolve and load configuration
    ///
    /// An explicit `--config` path that does not exist is an error. A missing
    /// `INLO_CONFIG` file falls back to defaults and is reported as
    /// `ConfigSource::Missing`. A file that exists but does not parse is an error.
    pub fn load(&self, cli_arg: Option<&Path>) -> Result<LoadedConfig> {
        if let Some(path) = cli_arg {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file given on the command line does not exist: {}",
                    path.display()
                )));
            }
        }

        let Some(path) = self.resolve(cli_arg) else {
            return Ok(LoadedConfig {
                config: TomlConfig::default(),
                source: ConfigSource::Defaults,
            });
        };

        if !path.exists() {
            return Ok(LoadedConfig {
                config: TomlConfig::default(),
                source: ConfigSource::Missing(path),
            });
        }

        let config = load_toml_config(&path)?;
        Ok(LoadedConfig {
            config,
            source: ConfigSource::File(path),
        })
    }
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
}
