//! Connection and credential context for a Langflow deployment

use std::fmt;

use crate::error::{FlowError, Result};

/// Hosted Langflow API root
pub const DEFAULT_BASE_URL: &str = "https://api.langflow.astra.datastax.com";

/// Where and as whom to invoke flows.
///
/// Built once at startup from configuration and passed into the invoker.
/// There is no process-wide instance.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub base_url: String,
    /// Tenant/organization routing segment (`/lf/<tenant_id>`)
    pub tenant_id: String,
    /// Flow used when a caller does not name an endpoint
    pub flow_id: String,
    pub application_token: Option<String>,
}

impl AuthContext {
    pub fn new(
        base_url: impl Into<String>,
        tenant_id: impl Into<String>,
        flow_id: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            tenant_id: tenant_id.into(),
            flow_id: flow_id.into(),
            application_token: None,
        }
    }

    /// Only the empty string counts as no token; anything else is sent as-is.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.application_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.application_token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.application_token.is_some()
    }

    /// `Authorization` header value, if a token is configured
    pub fn bearer(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {}", t))
    }

    /// Endpoint to call: the explicit one, else the default flow id
    pub fn resolve_endpoint<'a>(&'a self, endpoint: &'a str) -> Result<&'a str> {
        let endpoint = endpoint.trim();
        if !endpoint.is_empty() {
            return Ok(endpoint);
        }
        let flow_id = self.flow_id.trim();
        if flow_id.is_empty() {
            return Err(FlowError::configuration(
                "No endpoint given and no default flow id configured (set --endpoint or LANGFLOW_FLOW_ID)",
            ));
        }
        Ok(flow_id)
    }

    /// `<base_url>/lf/<tenant_id>/api/v1/run/<endpoint>`
    pub fn run_url(&self, endpoint: &str) -> Result<String> {
        self.api_url("run", endpoint)
    }

    /// `<base_url>/lf/<tenant_id>/api/v1/upload/<endpoint>`
    pub fn upload_url(&self, endpoint: &str) -> Result<String> {
        self.api_url("upload", endpoint)
    }

    fn api_url(&self, action: &str, endpoint: &str) -> Result<String> {
        if self.tenant_id.trim().is_empty() {
            return Err(FlowError::configuration(
                "No tenant id configured (set --langflow-id or LANGFLOW_ID)",
            ));
        }
        let endpoint = self.resolve_endpoint(endpoint)?;
        Ok(format!(
            "{}/lf/{}/api/v1/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.tenant_id.trim(),
            action,
            endpoint
        ))
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("base_url", &self.base_url)
            .field("tenant_id", &self.tenant_id)
            .field("flow_id", &self.flow_id)
            .field(
                "application_token",
                &self.application_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
