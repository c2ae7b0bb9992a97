use healthcheck_core::{HealthCheckReport, ReportError};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("reply is empty")]
    Empty,
    #[error("no JSON object in reply")]
    NoJsonObject,
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Parse raw LLM output into a validated report. All or nothing: any
/// missing field or out-of-range value rejects the whole reply.
pub fn parse_report(raw: &str) -> Result<HealthCheckReport, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let json_str = extract_json_object(raw).ok_or(ParseError::NoJsonObject)?;
    let value: Value = serde_json::from_str(json_str)?;
    Ok(HealthCheckReport::from_json_value(value)?)
}

/// Extract the outermost JSON object, tolerating code fences or chatter
/// around it.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}
