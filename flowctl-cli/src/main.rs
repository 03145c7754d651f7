//! flowctl - run hosted Langflow flows from the command line
//!
//! - `run`: send one message and print the result
//! - `chat`: interactive session with history
//! - `config`: create and inspect ~/.flowctl/config.toml
//! - `completions`: shell completion scripts

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

mod commands;
mod config;
mod tracing_setup;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "flowctl",
    author,
    version,
    about = "Run hosted Langflow flows from the command line",
    long_about = "Send messages to a Langflow flow over its HTTP run API, with optional \
                  per-component tweaks and file uploads, one shot or as an interactive chat."
)]
struct Cli {
    /// Suppress progress spinners (for scripts and pipes)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces via OpenTelemetry OTLP (requires the telemetry feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one message to a flow and print the response
    Run(commands::run::RunArgs),
    /// Chat with a flow interactively
    Chat(commands::chat::ChatArgs),
    /// Manage flowctl configuration (init, path, show)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing, so .env values feed the LANGFLOW_* flag defaults
    let env_files = flowctl_core::config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();
    if env_files.is_empty() {
        debug!("No .env files found (current dir or ~/.flowctl)");
    } else {
        debug!(files = ?env_files, "Loaded environment from .env files");
    }
    ui::init_quiet_mode(cli.quiet);

    let outcome = match cli.command {
        Commands::Run(args) => commands::run_run(args).await,
        Commands::Chat(args) => commands::run_chat(args).await,
        Commands::Config(args) => config::run_config(args),
        Commands::Completions(args) => run_completions(args),
    };

    tracing_setup::shutdown_otel();
    outcome
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
