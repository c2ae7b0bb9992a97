use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("field {field} expects a {expected} value")]
    KindMismatch {
        field: &'static str,
        expected: FieldKind,
    },
    #[error("field {field}: '{raw}' is not a number")]
    InvalidNumber { field: &'static str, raw: String },
    #[error("unknown login frequency: '{0}' (expected Giornaliera, Settimanale, Mensile or Saltuaria)")]
    InvalidFrequency(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Metric,
    Frequency,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Metric => f.write_str("numeric"),
            FieldKind::Frequency => f.write_str("login-frequency"),
        }
    }
}

/// Form section a field is grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    General,
    WorkOrders,
    Performance,
    Adoption,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::General,
        Section::WorkOrders,
        Section::Performance,
        Section::Adoption,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::General => "Profilo Generale",
            Section::WorkOrders => "Ordini di Lavoro (WO)",
            Section::Performance => "Performance & SLA",
            Section::Adoption => "Adozione & Qualità Dati",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    ActiveAssets,
    Technicians,
    Backlog,
    WoCreated30Days,
    WoClosed30Days,
    Mttr,
    PreventivePercentage,
    SlaCompliance,
    DataCompleteness,
    ChecklistUsage,
    AutomationCount,
    AvgLoginFrequency,
}

impl InputField {
    pub const ALL: [InputField; 12] = [
        InputField::ActiveAssets,
        InputField::Technicians,
        InputField::Backlog,
        InputField::WoCreated30Days,
        InputField::WoClosed30Days,
        InputField::Mttr,
        InputField::PreventivePercentage,
        InputField::SlaCompliance,
        InputField::DataCompleteness,
        InputField::ChecklistUsage,
        InputField::AutomationCount,
        InputField::AvgLoginFrequency,
    ];

    /// Wire key, as it appears in inputs files and in the prompt.
    pub fn key(self) -> &'static str {
        match self {
            InputField::ActiveAssets => "activeAssets",
            InputField::Technicians => "technicians",
            InputField::Backlog => "backlog",
            InputField::WoCreated30Days => "woCreated30Days",
            InputField::WoClosed30Days => "woClosed30Days",
            InputField::Mttr => "mttr",
            InputField::PreventivePercentage => "preventivePercentage",
            InputField::SlaCompliance => "slaCompliance",
            InputField::DataCompleteness => "dataCompleteness",
            InputField::ChecklistUsage => "checklistUsage",
            InputField::AutomationCount => "automationCount",
            InputField::AvgLoginFrequency => "avgLoginFrequency",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            InputField::AvgLoginFrequency => FieldKind::Frequency,
            _ => FieldKind::Metric,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InputField::ActiveAssets => "Asset Attivi",
            InputField::Technicians => "Numero Tecnici",
            InputField::Backlog => "Backlog Attuale",
            InputField::WoCreated30Days => "WO Creati (30gg)",
            InputField::WoClosed30Days => "WO Chiusi (30gg)",
            InputField::Mttr => "MTTR (ore)",
            InputField::PreventivePercentage => "% Manutenzione Preventiva",
            InputField::SlaCompliance => "Rispetto SLA",
            InputField::DataCompleteness => "Completezza Anagrafica",
            InputField::ChecklistUsage => "Uso Checklist",
            InputField::AutomationCount => "Automazioni Attive",
            InputField::AvgLoginFrequency => "Frequenza Login Utenti",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            InputField::ActiveAssets => "Numero totale di asset/macchinari censiti a sistema",
            InputField::Technicians => "Utenti operativi che eseguono manutenzioni",
            InputField::Backlog => "Numero totale di WO aperti in attesa",
            InputField::WoCreated30Days => "Nuovi ordini di lavoro nell'ultimo mese",
            InputField::WoClosed30Days => "Ordini completati nell'ultimo mese",
            InputField::Mttr => "Tempo medio di risoluzione guasti",
            InputField::PreventivePercentage => "Rapporto tra preventiva e correttiva",
            InputField::SlaCompliance => "Percentuale di WO chiusi entro i termini",
            InputField::DataCompleteness => "Stima % campi compilati per asset",
            InputField::ChecklistUsage => "% WO che includono una checklist",
            InputField::AutomationCount => "Numero di regole automatiche attive",
            InputField::AvgLoginFrequency => "Quanto spesso accedono i tecnici",
        }
    }

    pub fn unit(self) -> Option<&'static str> {
        match self {
            InputField::Mttr => Some("h"),
            InputField::PreventivePercentage
            | InputField::SlaCompliance
            | InputField::DataCompleteness
            | InputField::ChecklistUsage => Some("%"),
            _ => None,
        }
    }

    /// Example value shown as a hint next to empty fields.
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            InputField::ActiveAssets => Some("150"),
            InputField::Technicians => Some("5"),
            InputField::Backlog => Some("35"),
            InputField::WoCreated30Days => Some("120"),
            InputField::WoClosed30Days => Some("110"),
            InputField::Mttr => Some("4"),
            InputField::PreventivePercentage => Some("60"),
            InputField::SlaCompliance => Some("95"),
            InputField::DataCompleteness => Some("80"),
            InputField::ChecklistUsage => Some("45"),
            InputField::AutomationCount => Some("3"),
            InputField::AvgLoginFrequency => None,
        }
    }

    pub fn section(self) -> Section {
        match self {
            InputField::ActiveAssets | InputField::Technicians => Section::General,
            InputField::Backlog | InputField::WoCreated30Days | InputField::WoClosed30Days => {
                Section::WorkOrders
            }
            InputField::Mttr | InputField::PreventivePercentage | InputField::SlaCompliance => {
                Section::Performance
            }
            InputField::DataCompleteness
            | InputField::ChecklistUsage
            | InputField::AutomationCount
            | InputField::AvgLoginFrequency => Section::Adoption,
        }
    }
}

impl FromStr for InputField {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        InputField::ALL
            .iter()
            .copied()
            .find(|f| f.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| InputError::UnknownField(wanted.to_string()))
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginFrequency {
    #[serde(rename = "Giornaliera")]
    Daily,
    #[serde(rename = "Settimanale")]
    Weekly,
    #[serde(rename = "Mensile")]
    Monthly,
    #[serde(rename = "Saltuaria")]
    Occasional,
}

impl LoginFrequency {
    pub const ALL: [LoginFrequency; 4] = [
        LoginFrequency::Daily,
        LoginFrequency::Weekly,
        LoginFrequency::Monthly,
        LoginFrequency::Occasional,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LoginFrequency::Daily => "Giornaliera",
            LoginFrequency::Weekly => "Settimanale",
            LoginFrequency::Monthly => "Mensile",
            LoginFrequency::Occasional => "Saltuaria",
        }
    }
}

impl FromStr for LoginFrequency {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "giornaliera" | "daily" => Ok(LoginFrequency::Daily),
            "settimanale" | "weekly" => Ok(LoginFrequency::Weekly),
            "mensile" | "monthly" => Ok(LoginFrequency::Monthly),
            "saltuaria" | "occasional" | "rarely" => Ok(LoginFrequency::Occasional),
            _ => Err(InputError::InvalidFrequency(s.trim().to_string())),
        }
    }
}

impl fmt::Display for LoginFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single field value. `None` inside either variant means "unknown".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputValue {
    Metric(Option<f64>),
    Frequency(Option<LoginFrequency>),
}

impl InputValue {
    /// Parse raw user text for `field`. Blank text yields the unset value.
    pub fn parse(field: InputField, raw: &str) -> Result<Self, InputError> {
        match field.kind() {
            FieldKind::Metric => parse_metric(raw)
                .map(InputValue::Metric)
                .ok_or_else(|| InputError::InvalidNumber {
                    field: field.key(),
                    raw: raw.trim().to_string(),
                }),
            FieldKind::Frequency => {
                if raw.trim().is_empty() {
                    Ok(InputValue::Frequency(None))
                } else {
                    raw.parse().map(|f| InputValue::Frequency(Some(f)))
                }
            }
        }
    }

    pub fn unset(field: InputField) -> Self {
        match field.kind() {
            FieldKind::Metric => InputValue::Metric(None),
            FieldKind::Frequency => InputValue::Frequency(None),
        }
    }

    pub fn is_set(&self) -> bool {
        match self {
            InputValue::Metric(v) => v.is_some(),
            InputValue::Frequency(v) => v.is_some(),
        }
    }
}

impl fmt::Display for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Metric(Some(v)) => write!(f, "{}", format_metric(*v)),
            InputValue::Frequency(Some(v)) => write!(f, "{v}"),
            InputValue::Metric(None) | InputValue::Frequency(None) => f.write_str("-"),
        }
    }
}

/// `Some(None)` for blank text, `None` when the text is not a finite number.
fn parse_metric(raw: &str) -> Option<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(None);
    }
    let normalized = trimmed.replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(Some(v)),
        _ => None,
    }
}

fn format_metric(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// The KPI values a user knows about their facility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckInputs {
    #[serde(default, with = "metric")]
    pub active_assets: Option<f64>,
    #[serde(default, with = "metric")]
    pub technicians: Option<f64>,
    #[serde(default, with = "metric")]
    pub backlog: Option<f64>,
    #[serde(default, with = "metric", rename = "woCreated30Days")]
    pub wo_created_30_days: Option<f64>,
    #[serde(default, with = "metric", rename = "woClosed30Days")]
    pub wo_closed_30_days: Option<f64>,
    /// Hours.
    #[serde(default, with = "metric")]
    pub mttr: Option<f64>,
    #[serde(default, with = "metric")]
    pub preventive_percentage: Option<f64>,
    #[serde(default, with = "metric")]
    pub sla_compliance: Option<f64>,
    #[serde(default, with = "metric")]
    pub data_completeness: Option<f64>,
    #[serde(default, with = "metric")]
    pub checklist_usage: Option<f64>,
    #[serde(default, with = "metric")]
    pub automation_count: Option<f64>,
    #[serde(default, with = "frequency")]
    pub avg_login_frequency: Option<LoginFrequency>,
}

impl HealthCheckInputs {
    pub fn get(&self, field: InputField) -> InputValue {
        match field {
            InputField::AvgLoginFrequency => InputValue::Frequency(self.avg_login_frequency),
            other => InputValue::Metric(self.metric_ref(other).copied().flatten()),
        }
    }

    /// Replace one field. Only the value category is checked.
    pub fn set(&mut self, field: InputField, value: InputValue) -> Result<(), InputError> {
        match (field.kind(), value) {
            (FieldKind::Frequency, InputValue::Frequency(v)) => {
                self.avg_login_frequency = v;
                Ok(())
            }
            (FieldKind::Metric, InputValue::Metric(v)) => match self.metric_mut(field) {
                Some(slot) => {
                    *slot = v;
                    Ok(())
                }
                None => Err(InputError::KindMismatch {
                    field: field.key(),
                    expected: FieldKind::Frequency,
                }),
            },
            (expected, _) => Err(InputError::KindMismatch {
                field: field.key(),
                expected,
            }),
        }
    }

    /// Parse `raw` for `field` and store it.
    pub fn set_raw(&mut self, field: InputField, raw: &str) -> Result<(), InputError> {
        let value = InputValue::parse(field, raw)?;
        self.set(field, value)
    }

    pub fn set_count(&self) -> usize {
        InputField::ALL
            .iter()
            .filter(|f| self.get(**f).is_set())
            .count()
    }

    /// `None` for the frequency field.
    fn metric_ref(&self, field: InputField) -> Option<&Option<f64>> {
        let slot = match field {
            InputField::ActiveAssets => &self.active_assets,
            InputField::Technicians => &self.technicians,
            InputField::Backlog => &self.backlog,
            InputField::WoCreated30Days => &self.wo_created_30_days,
            InputField::WoClosed30Days => &self.wo_closed_30_days,
            InputField::Mttr => &self.mttr,
            InputField::PreventivePercentage => &self.preventive_percentage,
            InputField::SlaCompliance => &self.sla_compliance,
            InputField::DataCompleteness => &self.data_completeness,
            InputField::ChecklistUsage => &self.checklist_usage,
            InputField::AutomationCount => &self.automation_count,
            InputField::AvgLoginFrequency => return None,
        };
        Some(slot)
    }

    /// `None` for the frequency field.
    fn metric_mut(&mut self, field: InputField) -> Option<&mut Option<f64>> {
        let slot = match field {
            InputField::ActiveAssets => &mut self.active_assets,
            InputField::Technicians => &mut self.technicians,
            InputField::Backlog => &mut self.backlog,
            InputField::WoCreated30Days => &mut self.wo_created_30_days,
            InputField::WoClosed30Days => &mut self.wo_closed_30_days,
            InputField::Mttr => &mut self.mttr,
            InputField::PreventivePercentage => &mut self.preventive_percentage,
            InputField::SlaCompliance => &mut self.sla_compliance,
            InputField::DataCompleteness => &mut self.data_completeness,
            InputField::ChecklistUsage => &mut self.checklist_usage,
            InputField::AutomationCount => &mut self.automation_count,
            InputField::AvgLoginFrequency => return None,
        };
        Some(slot)
    }
}

/// Numeric fields: unset travels as `null`, whole numbers as integers.
/// On input, `""` and numeric strings are accepted as a web form posts them.
mod metric {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            None => s.serialize_none(),
            Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => s.serialize_i64(*v as i64),
            Some(v) => s.serialize_f64(*v),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        match Option::<Raw>::deserialize(d)? {
            None => Ok(None),
            Some(Raw::Number(n)) => Ok(Some(n)),
            Some(Raw::Text(t)) => super::parse_metric(&t)
                .ok_or_else(|| de::Error::custom(format!("'{t}' is not a number"))),
        }
    }
}

mod frequency {
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    use super::LoginFrequency;

    pub fn serialize<S: Serializer>(
        value: &Option<LoginFrequency>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<LoginFrequency>, D::Error> {
        match Option::<String>::deserialize(d)? {
            None => Ok(None),
            Some(t) if t.trim().is_empty() => Ok(None),
            Some(t) => t.parse().map(Some).map_err(de::Error::custom),
        }
    }
}
