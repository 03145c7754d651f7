use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::{AuthContext, DEFAULT_BASE_URL};
use crate::error::FlowError;
use crate::request::{Tweaks, DEFAULT_IO_TYPE};

/// Configuration for flowctl, read from ~/.flowctl/config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default)]
    pub langflow: LangflowConfig,
    #[serde(default)]
    pub flow: FlowDefaults,
    /// Default tweaks sent with every invocation
    #[serde(default)]
    pub tweaks: Tweaks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LangflowConfig {
    pub base_url: Option<String>,
    pub tenant_id: Option<String>,
    pub flow_id: Option<String>,
    /// Named endpoint from the flow settings; takes precedence over flow_id
    pub endpoint: Option<String>,
    pub application_token: Option<String>,
    /// Total request timeout; unset means no timeout
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowDefaults {
    pub output_type: Option<String>,
    pub input_type: Option<String>,
}

/// Values supplied by flags or environment; these win over the file
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub base_url: Option<String>,
    pub tenant_id: Option<String>,
    pub flow_id: Option<String>,
    pub endpoint: Option<String>,
    pub application_token: Option<String>,
    /// Raw JSON; replaces the configured tweaks when present
    pub tweaks: Option<String>,
    pub output_type: Option<String>,
    pub input_type: Option<String>,
}

/// Fully resolved settings for one process
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub auth: AuthContext,
    /// Empty means "use auth.flow_id"
    pub endpoint: String,
    pub output_type: String,
    pub input_type: String,
    pub tweaks: Tweaks,
    pub timeout: Option<Duration>,
}

impl FlowConfig {
    /// Load ~/.flowctl/config.toml; a missing file yields defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        if !config_path.exists() {
            debug!("No config file at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        Self::from_toml_str(&content)
            .context(format!("Failed to parse config file {:?} (invalid TOML)", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_variables();
        Ok(config)
    }

    /// ~/.flowctl
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".flowctl")
    }

    /// ~/.flowctl/config.toml
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Expand ${VAR} references from the environment
    fn expand_variables(&mut self) {
        let lf = &mut self.langflow;
        for field in [
            &mut lf.base_url,
            &mut lf.tenant_id,
            &mut lf.flow_id,
            &mut lf.endpoint,
            &mut lf.application_token,
        ] {
            if let Some(value) = field.as_mut() {
                *value = expand_string(value);
            }
        }
    }

    /// Merge overrides over the file and built-in defaults
    pub fn resolve(&self, overrides: ConnectionOverrides) -> std::result::Result<ResolvedSettings, FlowError> {
        let lf = &self.langflow;
        let pick = |over: Option<String>, file: &Option<String>| {
            over.or_else(|| file.clone()).filter(|v| !v.trim().is_empty())
        };

        let base_url = pick(overrides.base_url, &lf.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let tenant_id = pick(overrides.tenant_id, &lf.tenant_id).unwrap_or_default();
        let flow_id = pick(overrides.flow_id, &lf.flow_id).unwrap_or_default();
        let endpoint = pick(overrides.endpoint, &lf.endpoint).unwrap_or_default();
        let token = overrides
            .application_token
            .or_else(|| lf.application_token.clone())
            .filter(|t| !t.is_empty());

        let tweaks = match overrides.tweaks {
            Some(raw) => Tweaks::from_json(&raw)?,
            None => self.tweaks.clone(),
        };

        let output_type = pick(overrides.output_type, &self.flow.output_type)
            .unwrap_or_else(|| DEFAULT_IO_TYPE.to_string());
        let input_type = pick(overrides.input_type, &self.flow.input_type)
            .unwrap_or_else(|| DEFAULT_IO_TYPE.to_string());

        Ok(ResolvedSettings {
            auth: AuthContext::new(base_url, tenant_id, flow_id).with_token(token),
            endpoint,
            output_type,
            input_type,
            tweaks,
            timeout: lf.timeout_secs.map(Duration::from_secs),
        })
    }
}

/// Replace every `${NAME}` with the value of env var NAME (empty if unset)
pub fn expand_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                result.push_str(&env::var(name).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated reference, keep literally
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

/// Load environment variables from .env files and return the files read.
///
/// Priority order (highest to lowest):
/// 1. Environment variables already set
/// 2. Current directory .env
/// 3. ~/.flowctl/.env
///
/// Runs before logging is configured, so callers log the result.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded = Vec::new();
    if let Ok(path) = dotenvy::dotenv() {
        loaded.push(path);
    }
    loaded.extend(load_env_files(&[FlowConfig::config_dir().join(".env")]));
    loaded
}

/// Load each existing file in order; dotenvy never overwrites set vars
fn load_env_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| path.exists())
        .filter(|path| dotenvy::from_path(path).is_ok())
        .cloned()
        .collect()
}
