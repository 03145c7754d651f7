//! `flowctl run` - one message in, one flow result out
//!
//! ```bash
//! flowctl run "What are your hours?" --tweaks '{"ChatInput-ivyVt": {}}'
//! flowctl run "Summarize this" --upload-file report.pdf --components File-oYNDr --format text
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, ValueEnum};
use flowctl_core::upload::parse_components;
use flowctl_core::{
    message_text, AuthContext, FileUploader, FlowError, InvocationRequest, InvocationResult,
    ResolvedSettings, Tweaks,
};
use tracing::info;

use super::connection::{build_invoker, ConnectionArgs};
use crate::ui;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON response
    #[default]
    Json,
    /// Message text only
    Text,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Message to send to the flow
    pub message: String,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Local file to upload before running the flow
    #[arg(long, value_name = "PATH")]
    pub upload_file: Option<PathBuf>,

    /// Components that receive the uploaded file path (comma-separated)
    #[arg(long, value_name = "IDS")]
    pub components: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

pub async fn run_run(args: RunArgs) -> Result<()> {
    let settings = args.connection.resolve()?;

    let tweaks = match &args.upload_file {
        Some(path) => {
            let components = args.components.as_deref().map(parse_components).unwrap_or_default();
            upload_file(&settings, path, &components).await?
        }
        None => settings.tweaks.clone(),
    };

    let request = InvocationRequest::new(args.message.as_str())
        .with_output_type(settings.output_type.as_str())
        .with_input_type(settings.input_type.as_str())
        .with_tweaks(tweaks);

    let invoker = build_invoker(&settings)?;
    let pb = ui::spinner("Running flow...");
    let result = match invoker.invoke(&settings.endpoint, &request).await {
        Ok(result) => {
            ui::finish_success(pb, "Flow completed");
            result
        }
        Err(e) => {
            ui::finish_error(pb, "Flow failed");
            return Err(e.into());
        }
    };

    println!("{}", render(&result, args.format)?);
    Ok(())
}

async fn upload_file(settings: &ResolvedSettings, path: &Path, components: &[String]) -> Result<Tweaks> {
    if components.is_empty() {
        return Err(FlowError::configuration(
            "You need to provide the components to upload the file to (--components)",
        )
        .into());
    }

    let uploader = uploader(settings.auth.clone(), &settings.endpoint);
    let pb = ui::spinner(format!("Uploading {}...", path.display()));
    match uploader.upload(path, components, settings.tweaks.clone()).await {
        Ok(tweaks) => {
            ui::finish_success(pb, format!("Uploaded {}", path.display()));
            info!(components = components.len(), "uploaded file wired into tweaks");
            Ok(tweaks)
        }
        Err(e) => {
            ui::finish_error(pb, "Upload failed");
            Err(e.into())
        }
    }
}

#[cfg(feature = "upload")]
fn uploader(auth: AuthContext, endpoint: &str) -> Box<dyn FileUploader> {
    Box::new(flowctl_core::HttpUploader::new(auth, endpoint))
}

#[cfg(not(feature = "upload"))]
fn uploader(_auth: AuthContext, _endpoint: &str) -> Box<dyn FileUploader> {
    Box::new(flowctl_core::NoUploader)
}

fn render(result: &InvocationResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Text => message_text(result)
            .map(String::from)
            .ok_or_else(|| anyhow!("Flow response has no message text; rerun with --format json")),
    }
}
