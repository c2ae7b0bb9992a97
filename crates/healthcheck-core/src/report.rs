use std::fmt;
use std::sync::OnceLock;

use schemars::generate::SchemaSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::schema::{self, SchemaViolation};

/// Number of phases in the 30/60/90-day plan.
pub const STRATEGY_PHASES: usize = 3;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report does not match the declared schema: {0}")]
    Schema(#[from] SchemaViolation),
    #[error("report could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum MaturityLevel {
    #[serde(rename = "Livello 1 – Base")]
    Base,
    #[serde(rename = "Livello 2 – Intermedio")]
    Intermediate,
    #[serde(rename = "Livello 3 – Avanzato")]
    Advanced,
    #[serde(rename = "Livello 4 – Best in class")]
    BestInClass,
}

impl MaturityLevel {
    pub fn label(self) -> &'static str {
        match self {
            MaturityLevel::Base => "Livello 1 – Base",
            MaturityLevel::Intermediate => "Livello 2 – Intermedio",
            MaturityLevel::Advanced => "Livello 3 – Avanzato",
            MaturityLevel::BestInClass => "Livello 4 – Best in class",
        }
    }
}

impl fmt::Display for MaturityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict on a single KPI, best first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Evaluation {
    Eccellente,
    Buono,
    Attenzione,
    Critico,
}

impl Evaluation {
    pub fn label(self) -> &'static str {
        match self {
            Evaluation::Eccellente => "Eccellente",
            Evaluation::Buono => "Buono",
            Evaluation::Attenzione => "Attenzione",
            Evaluation::Critico => "Critico",
        }
    }

    /// `Attenzione` and `Critico` both call for action.
    pub fn needs_action(self) -> bool {
        matches!(self, Evaluation::Attenzione | Evaluation::Critico)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiAnalysis {
    pub kpi: String,
    /// Value as shown to the reader, e.g. "35 WO" or "4 h".
    pub value: String,
    pub evaluation: Evaluation,
    /// Score from 1 to 5
    #[schemars(range(min = 1, max = 5))]
    pub score: u8,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StrategyStep {
    pub phase: String,
    pub action: String,
    pub details: String,
}

// These types are the only definition of the report shape: the schema sent to
// the provider and the validator applied to its reply both come from
// `report_schema()`. Doc comments below end up in the schema as descriptions.

/// Structured CMMS health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckReport {
    /// A professional executive summary of the CMMS health state.
    pub executive_summary: String,
    pub overall_maturity_level: MaturityLevel,
    /// A calculated maturity score out of 100 based on the inputs.
    #[schemars(range(min = 0, max = 100))]
    pub overall_score: u8,
    pub kpi_analyses: Vec<KpiAnalysis>,
    pub recommendations: Vec<Recommendation>,
    pub quick_wins: Vec<String>,
    /// Stabilizzazione, Ottimizzazione, Automazione: one step each for days 30, 60 and 90.
    #[serde(rename = "strategy90Days")]
    #[schemars(length(min = 3, max = 3))]
    pub strategy_90_days: Vec<StrategyStep>,
}

impl HealthCheckReport {
    /// Check `value` against the report schema, then decode it.
    pub fn from_json_value(value: Value) -> Result<Self, ReportError> {
        schema::validate_report(&value)?;
        Ok(serde_json::from_value(value)?)
    }
}

/// JSON schema of [`HealthCheckReport`] with every subschema inlined.
pub fn report_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let generator = SchemaSettings::draft07()
            .with(|s| s.inline_subschemas = true)
            .into_generator();
        let schema = generator.into_root_schema_for::<HealthCheckReport>();
        schema.to_value()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "executiveSummary": "Backlog elevato, preventiva insufficiente.",
            "overallMaturityLevel": "Livello 2 – Intermedio",
            "overallScore": 48,
            "kpiAnalyses": [
                {"kpi": "Backlog", "value": "350 WO", "evaluation": "Critico", "score": 1, "notes": "Fuori controllo"},
                {"kpi": "MTTR", "value": "4 h", "evaluation": "Buono", "score": 4, "notes": "In linea"}
            ],
            "recommendations": [{"category": "Processi", "suggestion": "Piano di smaltimento backlog"}],
            "quickWins": ["Chiudere i WO duplicati"],
            "strategy90Days": [
                {"phase": "30 giorni", "action": "Stabilizzazione", "details": "..."},
                {"phase": "60 giorni", "action": "Ottimizzazione", "details": "..."},
                {"phase": "90 giorni", "action": "Automazione", "details": "..."}
            ]
        })
    }

    #[test]
    fn decodes_a_conforming_report() {
        let report = HealthCheckReport::from_json_value(sample()).unwrap();
        assert_eq!(report.overall_maturity_level, MaturityLevel::Intermediate);
        assert_eq!(report.overall_score, 48);
        assert_eq!(report.kpi_analyses[0].evaluation, Evaluation::Critico);
        assert_eq!(report.kpi_analyses[1].kpi, "MTTR");
        assert_eq!(report.strategy_90_days.len(), STRATEGY_PHASES);
    }

    #[test]
    fn schema_declares_enumerations_and_ranges() {
        let schema = report_schema();
        let props = &schema["properties"];
        assert_eq!(
            props["overallMaturityLevel"]["enum"],
            json!([
                "Livello 1 – Base",
                "Livello 2 – Intermedio",
                "Livello 3 – Avanzato",
                "Livello 4 – Best in class"
            ])
        );
        assert_eq!(props["overallScore"]["minimum"], json!(0));
        assert_eq!(props["overallScore"]["maximum"], json!(100));

        let kpi = &props["kpiAnalyses"]["items"];
        assert_eq!(
            kpi["properties"]["evaluation"]["enum"],
            json!(["Eccellente", "Buono", "Attenzione", "Critico"])
        );
        assert_eq!(kpi["properties"]["score"]["minimum"], json!(1));
        assert_eq!(kpi["properties"]["score"]["maximum"], json!(5));
        assert_eq!(props["strategy90Days"]["minItems"], json!(3));

        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 7);
        assert!(schema.to_string().find("$ref").is_none());
    }

    #[test]
    fn schema_is_a_real_object_and_rejects_non_reports() {
        let schema = report_schema();
        assert!(schema.is_object());
        assert_eq!(schema["type"], json!("object"));
        assert!(HealthCheckReport::from_json_value(json!(null)).is_err());
        assert!(HealthCheckReport::from_json_value(json!({})).is_err());
    }

    #[test]
    fn rejects_out_of_range_scores() {
        let mut value = sample();
        value["overallScore"] = json!(101);
        assert!(matches!(
            HealthCheckReport::from_json_value(value),
            Err(ReportError::Schema(_))
        ));

        let mut value = sample();
        value["kpiAnalyses"][1]["score"] = json!(0);
        let err = HealthCheckReport::from_json_value(value).unwrap_err();
        assert!(err.to_string().contains("kpiAnalyses[1].score"));
    }

    #[test]
    fn rejects_unknown_labels() {
        let mut value = sample();
        value["overallMaturityLevel"] = json!("Livello 5");
        assert!(HealthCheckReport::from_json_value(value).is_err());

        let mut value = sample();
        value["kpiAnalyses"][0]["evaluation"] = json!("Pessimo");
        assert!(HealthCheckReport::from_json_value(value).is_err());
    }

    #[test]
    fn rejects_partial_reports() {
        let mut value = sample();
        value.as_object_mut().unwrap().remove("quickWins");
        let err = HealthCheckReport::from_json_value(value).unwrap_err();
        assert!(err.to_string().contains("quickWins"));
    }

    #[test]
    fn rejects_wrong_phase_count() {
        let mut value = sample();
        value["strategy90Days"].as_array_mut().unwrap().pop();
        assert!(HealthCheckReport::from_json_value(value).is_err());
    }

    #[test]
    fn evaluations_order_best_first() {
        assert!(Evaluation::Eccellente < Evaluation::Critico);
        assert!(MaturityLevel::Base < MaturityLevel::BestInClass);
        assert!(Evaluation::Critico.needs_action());
        assert!(!Evaluation::Buono.needs_action());
    }
}
