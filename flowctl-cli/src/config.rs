use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use flowctl_core::FlowConfig;

use crate::commands::connection::ConnectionArgs;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a starter config to ~/.flowctl/config.toml
    Init(InitArgs),
    /// Show config file path
    Path,
    /// Show the settings a run would use (token redacted)
    Show(ShowArgs),
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show(args) => run_show(args),
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let config_path = FlowConfig::config_path();

    if config_path.exists() && !args.force {
        return Err(anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            config_path
        ));
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create {}", parent.display()))?;
    }

    let template = include_str!("../../.flowctl-config.template.toml");
    std::fs::write(&config_path, template)
        .context(format!("Failed to write config file: {:?}", config_path))?;

    println!("✅ Created config at: {:?}", config_path);
    println!("\nNext steps:");
    println!("  1. Put LANGFLOW_ID, LANGFLOW_FLOW_ID and LANGFLOW_APPLICATION_TOKEN in ~/.flowctl/.env");
    println!("  2. Run: flowctl config show");

    Ok(())
}

fn run_path() -> Result<()> {
    println!("{}", FlowConfig::config_path().display());
    Ok(())
}

fn run_show(args: ShowArgs) -> Result<()> {
    let settings = args.connection.resolve()?;
    let auth = &settings.auth;

    let or_unset = |v: &str| if v.is_empty() { "(unset)".to_string() } else { v.to_string() };
    let endpoint = match auth.resolve_endpoint(&settings.endpoint) {
        Ok(endpoint) => endpoint.to_string(),
        Err(_) => "(unset)".to_string(),
    };

    println!("config file:       {}", FlowConfig::config_path().display());
    println!("base_url:          {}", auth.base_url);
    println!("tenant_id:         {}", or_unset(&auth.tenant_id));
    println!("flow_id:           {}", or_unset(&auth.flow_id));
    println!("endpoint:          {}", endpoint);
    println!(
        "application_token: {}",
        if auth.is_authenticated() { "***" } else { "(unset)" }
    );
    println!("output_type:       {}", settings.output_type);
    println!("input_type:        {}", settings.input_type);
    match settings.timeout {
        Some(timeout) => println!("timeout:           {}s", timeout.as_secs()),
        None => println!("timeout:           (none)"),
    }
    if settings.tweaks.is_empty() {
        println!("tweaks:            (none)");
    } else {
        println!(
            "tweaks:            {}",
            serde_json::to_string(&settings.tweaks).context("Failed to serialize tweaks")?
        );
    }

    Ok(())
}
