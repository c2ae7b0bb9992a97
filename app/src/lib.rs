pub mod cli;
pub mod controller;
pub mod presenter;
pub mod session;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use healthcheck_advisor::ReportRequester;
use healthcheck_core::{HealthCheckInputs, InputField, Settings};

use crate::cli::{Cli, Command, OutputFormat, RunArgs};
use crate::controller::FormController;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries the report; logs go to stderr
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn settings_file(cli: &Cli) -> PathBuf {
    cli.settings
        .clone()
        .unwrap_or_else(healthcheck_core::settings_path)
}

/// Stored settings with command-line and environment overrides applied.
/// An empty key on the command line keeps the stored one.
pub fn resolve_settings(cli: &Cli) -> Settings {
    let mut settings = healthcheck_core::read_settings_from(&settings_file(cli));
    if let Some(provider) = &cli.provider {
        settings.provider = provider.clone();
    }
    if let Some(model) = &cli.model {
        settings.model = model.clone();
    }
    if let Some(key) = cli.api_key.as_ref().filter(|k| !k.is_empty()) {
        settings.api_key = key.clone();
    }
    if let Some(url) = &cli.base_url {
        settings.base_url = Some(url.clone()).filter(|u| !u.is_empty());
    }
    settings
}

/// Inputs from an optional file, then `FIELD=VALUE` assignments on top.
pub fn load_inputs(file: Option<&Path>, assignments: &[String]) -> Result<HealthCheckInputs> {
    let mut inputs = match file {
        Some(path) => healthcheck_core::read_inputs(path)?,
        None => HealthCheckInputs::default(),
    };
    for assignment in assignments {
        let Some((name, raw)) = assignment.split_once('=') else {
            bail!("expected FIELD=VALUE, got '{assignment}'");
        };
        let field: InputField = name.parse()?;
        inputs
            .set_raw(field, raw)
            .with_context(|| format!("--set {assignment}"))?;
    }
    Ok(inputs)
}

fn render(report: &healthcheck_core::HealthCheckReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Markdown => presenter::render_markdown(report),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    })
}

async fn run_once(settings: Settings, args: RunArgs) -> Result<()> {
    let inputs = load_inputs(args.inputs.as_deref(), &args.set)?;
    let requester = Arc::new(ReportRequester::from_settings(settings)?);
    let controller = FormController::new(requester).with_inputs(inputs);

    let report = controller.generate().await?;
    let body = render(&report, args.format)?;

    match args.output {
        Some(path) => {
            healthcheck_core::write_atomic(&path, &body)
                .with_context(|| format!("export to {}", path.display()))?;
            info!(path = %path.display(), "report exported");
            eprintln!("Report esportato in {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{body}")?;
        }
    }
    Ok(())
}

async fn interactive(settings: Settings, inputs: Option<&Path>) -> Result<()> {
    let inputs = load_inputs(inputs, &[])?;
    let requester = Arc::new(ReportRequester::from_settings(settings)?);
    let controller = FormController::new(requester).with_inputs(inputs);

    let reader = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    session::run_session(&controller, reader, &mut stdout).await
}

fn configure(path: &Path, settings: &Settings) -> Result<()> {
    healthcheck_core::write_settings_to(path, settings)?;

    // never echo the key itself
    let summary = serde_json::json!({
        "provider": settings.provider,
        "model": settings.model,
        "baseUrl": settings.base_url,
        "hasKey": !settings.api_key.is_empty(),
        "configured": settings.is_configured(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!("Impostazioni salvate in {}", path.display());
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let settings_file = settings_file(&cli);
    let settings = resolve_settings(&cli);

    match cli.command {
        Command::Fields => {
            print!("{}", presenter::render_fields());
            Ok(())
        }
        Command::Schema => {
            println!(
                "{}",
                serde_json::to_string_pretty(healthcheck_core::report_schema())?
            );
            Ok(())
        }
        Command::Configure => configure(&settings_file, &settings),
        Command::Run(args) => runtime()?.block_on(run_once(settings, args)),
        Command::Interactive { inputs } => {
            runtime()?.block_on(interactive(settings, inputs.as_deref()))
        }
    }
}
