use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use healthcheck_advisor::{ReportRequester, RequestError};
use healthcheck_core::{HealthCheckInputs, HealthCheckReport, InputError, InputField, InputValue};

#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("Un'analisi è già in corso.")]
    AlreadyLoading,
    #[error(transparent)]
    Request(#[from] RequestError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
}

/// Everything the form shows at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub inputs: HealthCheckInputs,
    pub report: Option<HealthCheckReport>,
    pub loading: bool,
    pub error: Option<String>,
}

impl FormState {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.report.is_some() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }
}

/// Owns the form state and drives report generation.
///
/// The lock is never held across the provider call, so readers see
/// `Loading` while a request is in flight. A second `generate` during that
/// window is rejected rather than queued.
pub struct FormController {
    requester: Arc<ReportRequester>,
    state: Mutex<FormState>,
}

impl FormController {
    pub fn new(requester: Arc<ReportRequester>) -> Self {
        Self {
            requester,
            state: Mutex::new(FormState::default()),
        }
    }

    pub fn with_inputs(self, inputs: HealthCheckInputs) -> Self {
        self.state.lock().inputs = inputs;
        self
    }

    pub fn snapshot(&self) -> FormState {
        self.state.lock().clone()
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase()
    }

    pub fn inputs(&self) -> HealthCheckInputs {
        self.state.lock().inputs.clone()
    }

    pub fn report(&self) -> Option<HealthCheckReport> {
        self.state.lock().report.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn set_field(&self, field: InputField, value: InputValue) -> Result<(), FormError> {
        self.state.lock().inputs.set(field, value)?;
        Ok(())
    }

    pub fn set_field_raw(&self, field: InputField, raw: &str) -> Result<(), FormError> {
        let value = InputValue::parse(field, raw)?;
        self.set_field(field, value)
    }

    /// "Avvia Health Check".
    pub async fn generate(&self) -> Result<HealthCheckReport, FormError> {
        let inputs = {
            let mut state = self.state.lock();
            if state.loading {
                warn!("generate requested while a report is already loading");
                return Err(FormError::AlreadyLoading);
            }
            state.loading = true;
            state.error = None;
            state.report = None;
            state.inputs.clone()
        };
        let guard = LoadingGuard {
            state: &self.state,
            armed: true,
        };

        let outcome = self.requester.generate(&inputs).await;

        let mut state = self.state.lock();
        state.loading = false;
        guard.disarm();
        match outcome {
            Ok(report) => {
                state.report = Some(report.clone());
                info!("form ready");
                Ok(report)
            }
            Err(e) => {
                state.error = Some(e.to_string());
                info!(error = %e, "form back to idle");
                Err(e.into())
            }
        }
    }

    /// "Nuova Analisi": drop the report, keep the inputs.
    pub fn reset(&self) {
        self.state.lock().report = None;
    }
}

/// Leaves `Loading` when a `generate` future is dropped before it finishes.
struct LoadingGuard<'a> {
    state: &'a Mutex<FormState>,
    armed: bool,
}

impl LoadingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("report request abandoned");
            self.state.lock().loading = false;
        }
    }
}
