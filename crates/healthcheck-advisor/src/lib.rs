pub mod engine;
pub mod gemini;
mod parse;
mod prompt;

use std::sync::Arc;

use healthcheck_core::{report_schema, HealthCheckInputs, HealthCheckReport, Settings};
use thiserror::Error;
use tracing::{error, info, warn};

pub use engine::{backend_for, BackendError, CompletionBackend, CompletionRequest, LlmBackend};
pub use gemini::GeminiBackend;
pub use parse::ParseError;
pub use prompt::PHASES;

/// What the user gets to see when a report cannot be produced. Provider
/// detail only goes to the log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("API Key mancante. Verifica la configurazione dell'ambiente.")]
    MissingCredential,
    #[error("Provider AI non supportato: {0}")]
    UnsupportedProvider(String),
    #[error("Impossibile generare il report al momento. Riprova.")]
    Unavailable,
}

#[derive(Debug, Error)]
enum Failure {
    #[error("serialize inputs: {0}")]
    Inputs(#[from] serde_json::Error),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("parse reply: {0}")]
    Parse(#[from] ParseError),
}

/// Turns KPI inputs into a report through one provider call.
pub struct ReportRequester {
    settings: Settings,
    backend: Arc<dyn CompletionBackend>,
}

impl ReportRequester {
    pub fn new(settings: Settings, backend: Arc<dyn CompletionBackend>) -> Self {
        Self { settings, backend }
    }

    /// Build a requester with the backend `settings.provider` asks for.
    pub fn from_settings(settings: Settings) -> Result<Self, RequestError> {
        let backend = backend_for(&settings).map_err(|e| match e {
            BackendError::UnknownProvider(p) => RequestError::UnsupportedProvider(p),
            other => {
                error!(error = %other, "could not set up the AI backend");
                RequestError::Unavailable
            }
        })?;
        Ok(Self::new(settings, backend))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Generate a report. Either the whole validated report comes back or a
    /// [`RequestError`]; nothing in between.
    pub async fn generate(
        &self,
        inputs: &HealthCheckInputs,
    ) -> Result<HealthCheckReport, RequestError> {
        if !self.settings.is_configured() {
            warn!(provider = %self.settings.provider, "AI provider is not configured");
            return Err(RequestError::MissingCredential);
        }

        info!(
            provider = %self.settings.provider,
            model = %self.settings.model,
            known_fields = inputs.set_count(),
            "requesting health check report"
        );

        match self.request(inputs).await {
            Ok(report) => {
                info!(
                    score = report.overall_score,
                    level = %report.overall_maturity_level,
                    kpis = report.kpi_analyses.len(),
                    "report generated"
                );
                Ok(report)
            }
            Err(e) => {
                error!(error = %e, "error generating report");
                Err(RequestError::Unavailable)
            }
        }
    }

    async fn request(&self, inputs: &HealthCheckInputs) -> Result<HealthCheckReport, Failure> {
        let system = prompt::system_prompt();
        let user_msg = prompt::user_message(inputs)?;

        let raw = self
            .backend
            .complete(&CompletionRequest {
                model: &self.settings.model,
                system: &system,
                prompt: &user_msg,
                schema: report_schema(),
            })
            .await?;

        Ok(parse::parse_report(&raw)?)
    }
}
