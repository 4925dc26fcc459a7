//! Configuration loading for beancounterd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.beancounter/config.toml` (user)
//! 3. `/etc/beancounter/config.toml` (system)
//!
//! Credentials are loaded separately with mandatory permission checks:
//! 1. `~/.beancounter/secrets.toml` (user, must be 0600)
//! 2. `/etc/beancounter/secrets.toml` (system, must be 0600)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{BeancounterError, Result};

/// Daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8160).
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8160".to_string()
}

/// Backend selection.
///
/// Exactly one emission backend is active per process. The default is the
/// OpenTelemetry pipeline with the stdout exporter, which needs no
/// credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub mode: BackendMode,
    #[serde(default)]
    pub monitoring: Option<MonitoringConfig>,
    #[serde(default)]
    pub otel: Option<OtelConfig>,
}

/// Which emission backend is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Direct monitoring-API push.
    Monitoring,
    /// OpenTelemetry pipeline (stdout or collector exporter).
    #[default]
    Otel,
}

/// Direct monitoring-API backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Project identifier scoping timeseries writes.
    pub project_id: String,
    /// Namespace prefix joined onto metric identity paths.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Monitoring API base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// OpenTelemetry pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    /// Exporter selection (default: stdout).
    #[serde(default)]
    pub exporter: OtelExporter,
    /// Collector endpoint, e.g. `https://collector.example.com/v1/metrics`.
    /// Required for the collector exporter.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Audience claim the collector credential must be minted for. Recorded
    /// for operators; token exchange happens outside this process.
    #[serde(default)]
    pub audience: Option<String>,
    /// Fixed per-call export timeout in seconds (default: 10).
    #[serde(default = "default_export_timeout")]
    pub timeout_secs: u64,
    /// Export interval in seconds (default: 60).
    #[serde(default = "default_export_interval")]
    pub export_interval_secs: u64,
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            exporter: OtelExporter::default(),
            endpoint: None,
            audience: None,
            timeout_secs: default_export_timeout(),
            export_interval_secs: default_export_interval(),
        }
    }
}

/// Exporter variant for the OpenTelemetry pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtelExporter {
    /// Text exporter reporting on stdout.
    #[default]
    Stdout,
    /// Authenticated remote OTLP exporter.
    Collector,
}

fn default_export_timeout() -> u64 {
    10
}

fn default_export_interval() -> u64 {
    60
}

/// Credential configuration (bearer tokens).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub monitoring: Option<TokenSecret>,
    #[serde(default)]
    pub collector: Option<TokenSecret>,
}

/// A single bearer token secret.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSecret {
    pub token: String,
}

/// Credential name → environment variable name mapping.
const TOKEN_ENV_VARS: &[(&str, &str)] = &[
    ("monitoring", "BEANCOUNTER_MONITORING_TOKEN"),
    ("collector", "BEANCOUNTER_COLLECTOR_TOKEN"),
];

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.beancounter/config.toml`
    /// 3. `/etc/beancounter/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            BeancounterError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            BeancounterError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(BeancounterError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".beancounter").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/beancounter/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(BeancounterError::Configuration(
            "No config file found. Create ~/.beancounter/config.toml or /etc/beancounter/config.toml"
                .to_string(),
        ))
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.beancounter/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/beancounter/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (tokens may come from env vars).
    pub fn load() -> Result<Self> {
        // Try user secrets first
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".beancounter").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        // Try system secrets
        let system_secrets = PathBuf::from("/etc/beancounter/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        // No secrets file — return empty (tokens can fall back to env vars)
        Ok(Secrets::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BeancounterError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            BeancounterError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            BeancounterError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(BeancounterError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        // Permission check not available on non-Unix platforms
        Ok(())
    }

    /// Get the bearer token for a backend, falling back to the corresponding
    /// environment variable.
    pub fn token(&self, backend: &str) -> Option<String> {
        // Try secrets file first
        let from_file = match backend {
            "monitoring" => self.monitoring.as_ref(),
            "collector" => self.collector.as_ref(),
            _ => None,
        }
        .map(|s| s.token.clone());

        // Fall back to env var
        from_file.or_else(|| {
            TOKEN_ENV_VARS
                .iter()
                .find(|(name, _)| *name == backend)
                .and_then(|(_, env_var)| std::env::var(env_var).ok())
        })
    }
}
