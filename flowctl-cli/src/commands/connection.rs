//! Connection flags shared by `run`, `chat` and `config show`

use anyhow::{Context, Result};
use clap::Args;
use flowctl_core::{ConnectionOverrides, FlowConfig, FlowInvoker, ReqwestTransport, ResolvedSettings};
use tracing::debug;

#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Langflow base URL (default: https://api.langflow.astra.datastax.com)
    #[arg(long, env = "LANGFLOW_BASE_URL")]
    pub base_url: Option<String>,

    /// Organization id used in the /lf/<id>/ route
    #[arg(long, env = "LANGFLOW_ID")]
    pub langflow_id: Option<String>,

    /// Flow id to run when no endpoint name is given
    #[arg(long, env = "LANGFLOW_FLOW_ID")]
    pub flow_id: Option<String>,

    /// Flow endpoint name or id (default: the flow id)
    #[arg(long, env = "LANGFLOW_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Application token sent as a bearer credential
    #[arg(
        long,
        alias = "application_token",
        env = "LANGFLOW_APPLICATION_TOKEN",
        hide_env_values = true
    )]
    pub application_token: Option<String>,

    /// Tweaks as a JSON object keyed by component id
    #[arg(long, env = "LANGFLOW_TWEAKS", value_name = "JSON")]
    pub tweaks: Option<String>,

    /// Output type sent with each run (default: chat)
    #[arg(long, alias = "output_type")]
    pub output_type: Option<String>,

    /// Input type sent with each run (default: chat)
    #[arg(long, alias = "input_type")]
    pub input_type: Option<String>,
}

impl ConnectionArgs {
    fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            base_url: self.base_url.clone(),
            tenant_id: self.langflow_id.clone(),
            flow_id: self.flow_id.clone(),
            endpoint: self.endpoint.clone(),
            application_token: self.application_token.clone(),
            tweaks: self.tweaks.clone(),
            output_type: self.output_type.clone(),
            input_type: self.input_type.clone(),
        }
    }

    /// Layer these flags over ~/.flowctl/config.toml
    pub fn resolve(&self) -> Result<ResolvedSettings> {
        let config = FlowConfig::load()?;
        let settings = config.resolve(self.overrides())?;
        debug!(auth = ?settings.auth, endpoint = %settings.endpoint, "resolved connection settings");
        Ok(settings)
    }
}

pub fn build_invoker(settings: &ResolvedSettings) -> Result<FlowInvoker<ReqwestTransport>> {
    let transport = ReqwestTransport::with_timeout(settings.timeout)
        .context("Failed to build HTTP client")?;
    Ok(FlowInvoker::new(settings.auth.clone(), transport))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_map_langflow_id_to_tenant() {
        let args = ConnectionArgs {
            langflow_id: Some("org-1".into()),
            tweaks: Some("{}".into()),
            ..Default::default()
        };
        let overrides = args.overrides();
        assert_eq!(overrides.tenant_id.as_deref(), Some("org-1"));
        assert_eq!(overrides.tweaks.as_deref(), Some("{}"));
        assert!(overrides.base_url.is_none());
    }

    #[test]
    fn settings_from_overrides_build_an_invoker() {
        let args = ConnectionArgs {
            base_url: Some("http://localhost:7860".into()),
            langflow_id: Some("org-1".into()),
            flow_id: Some("flow-1".into()),
            ..Default::default()
        };
        let settings = FlowConfig::default().resolve(args.overrides()).unwrap();
        let invoker = build_invoker(&settings).unwrap();
        assert_eq!(
            invoker.auth().run_url("").unwrap(),
            "http://localhost:7860/lf/org-1/api/v1/run/flow-1"
        );
    }
}
