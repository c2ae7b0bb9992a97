//! Shared fixtures for advisor tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use healthcheck_advisor::{BackendError, CompletionBackend, CompletionRequest};
use healthcheck_core::Settings;
use serde_json::{json, Value};

/// What the fake saw for one call.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub schema: Value,
}

/// Backend that replays a canned reply and records every request.
pub struct FakeBackend {
    reply: Result<String, String>,
    pub captured: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeBackend {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.captured.lock().unwrap().len()
    }

    pub fn last(&self) -> CapturedRequest {
        self.captured.lock().unwrap().last().cloned().expect("no request captured")
    }
}

#[async_trait]
impl CompletionBackend for FakeBackend {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, BackendError> {
        self.captured.lock().unwrap().push(CapturedRequest {
            model: request.model.to_string(),
            system: request.system.to_string(),
            prompt: request.prompt.to_string(),
            schema: request.schema.clone(),
        });
        match &self.reply {
            Ok(text) if text.trim().is_empty() => Err(BackendError::EmptyText),
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(BackendError::Chat(message.clone())),
        }
    }
}

pub fn configured_settings() -> Settings {
    Settings {
        api_key: "test-api-key".to_string(),
        model: "test-model".to_string(),
        ..Settings::default()
    }
}

pub fn report_json() -> Value {
    json!({
        "executiveSummary": "Il CMMS è utilizzato in modo discontinuo.",
        "overallMaturityLevel": "Livello 2 – Intermedio",
        "overallScore": 55,
        "kpiAnalyses": [
            {"kpi": "Backlog", "value": "35 WO", "evaluation": "Buono", "score": 4, "notes": "Sotto controllo"},
            {"kpi": "% Preventiva", "value": "60%", "evaluation": "Buono", "score": 3, "notes": "Migliorabile"},
            {"kpi": "Completezza Anagrafica", "value": "80%", "evaluation": "Attenzione", "score": 3, "notes": "Campi mancanti"}
        ],
        "recommendations": [
            {"category": "Dati", "suggestion": "Completare l'anagrafica asset"},
            {"category": "Processi", "suggestion": "Introdurre checklist standard"}
        ],
        "quickWins": ["Attivare le notifiche sui WO scaduti", "Chiudere i WO duplicati"],
        "strategy90Days": [
            {"phase": "Giorni 1-30", "action": "Stabilizzazione", "details": "Pulizia backlog"},
            {"phase": "Giorni 31-60", "action": "Ottimizzazione", "details": "Piani preventivi"},
            {"phase": "Giorni 61-90", "action": "Automazione", "details": "Regole automatiche"}
        ]
    })
}

/// Report a faithful collaborator would send for a large backlog and little
/// preventive work.
pub fn critical_report_json() -> Value {
    let mut report = report_json();
    report["overallMaturityLevel"] = json!("Livello 1 – Base");
    report["overallScore"] = json!(22);
    report["kpiAnalyses"] = json!([
        {"kpi": "Backlog", "value": "900 WO", "evaluation": "Critico", "score": 1, "notes": "Fuori controllo"},
        {"kpi": "% Preventiva", "value": "5%", "evaluation": "Critico", "score": 1, "notes": "Solo correttiva"},
        {"kpi": "MTTR", "value": "stima 8 h", "evaluation": "Attenzione", "score": 2, "notes": "Stimato"}
    ]);
    report
}
