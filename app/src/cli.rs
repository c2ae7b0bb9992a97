use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "healthcheck")]
#[command(about = "mainsim CMMS HealthCheck - audit automatico per la manutenzione", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (default: ~/.healthcheck/settings.json)
    #[arg(long, global = true, env = "HEALTHCHECK_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// AI provider: google, openai, anthropic, ollama, groq, mistral, deepseek
    #[arg(long, global = true, env = "HEALTHCHECK_PROVIDER")]
    pub provider: Option<String>,

    /// Model identifier
    #[arg(long, global = true, env = "HEALTHCHECK_MODEL")]
    pub model: Option<String>,

    /// Provider API key
    #[arg(long, global = true, env = "HEALTHCHECK_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Provider endpoint override
    #[arg(long, global = true, env = "HEALTHCHECK_BASE_URL")]
    pub base_url: Option<String>,

    /// Verbose logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one health check and print or export the report
    Run(RunArgs),

    /// Fill in the form interactively
    Interactive {
        /// Pre-fill the form from a JSON inputs file
        #[arg(long)]
        inputs: Option<PathBuf>,
    },

    /// List the form fields
    Fields,

    /// Print the output schema sent to the provider
    Schema,

    /// Store provider, model, key and endpoint given as flags or environment
    Configure,
}

#[derive(Args)]
pub struct RunArgs {
    /// JSON inputs file (camelCase keys; null or "" for unknown values)
    #[arg(long)]
    pub inputs: Option<PathBuf>,

    /// Set a field, e.g. --set backlog=35 (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub set: Vec<String>,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value = "markdown")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
}
