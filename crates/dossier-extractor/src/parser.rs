//! Parse model output into typed records

use dossier_domain::{EntityFields, Judgment, PromptRecord, Violation, ViolationJudgments};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Fields the biography prompt asks for, in output column order
pub const BIOGRAPHY_FIELDS: [&str; 5] = [
    "College Major",
    "Undergraduate Institution",
    "Highest Degree and Institution",
    "Work History",
    "Confidence Level",
];

/// Model output that did not have the expected shape
///
/// Carries the response exactly as received so it can be inspected by hand.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to parse response: {reason}")]
pub struct ParseError {
    /// Response text, verbatim
    pub raw_response: String,

    /// Decoder message
    pub reason: String,
}

impl ParseError {
    fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self {
            raw_response: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Identity fields every parsed biography starts from
pub fn base_fields(prompt: &PromptRecord) -> EntityFields {
    let candidate = &prompt.entity.candidate;
    let mut fields = EntityFields::new();
    fields.insert("Full Name", candidate.full_name.clone());
    fields.insert("Min Year", candidate.min_year.clone());
    fields.insert("State", candidate.state.clone());
    fields.insert("Candid", candidate.candid.clone());
    fields.insert(
        "Sources",
        Value::Array(
            prompt
                .entity
                .source_urls()
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
    );
    fields
}

/// Decode a biography response and merge it onto the entity identity
///
/// Keys present in the response overwrite or extend the base fields. Missing
/// keys are not an error; they are simply absent from the result.
pub fn parse_biography(prompt: &PromptRecord, raw: &str) -> Result<EntityFields, ParseError> {
    let object = decode_object(raw)?;
    let mut fields = base_fields(prompt);
    fields.merge(object);

    let missing = BIOGRAPHY_FIELDS
        .iter()
        .filter(|k| !fields.contains(k))
        .count();
    if missing > 0 {
        debug!(id = %prompt.entity.id(), missing, "response omitted expected fields");
    }
    Ok(fields)
}

/// Decode a classification response
///
/// Known keys are coerced to 1/0/-1; unknown keys are ignored and absent keys
/// stay absent.
pub fn parse_classification(raw: &str) -> Result<ViolationJudgments, ParseError> {
    let object = decode_object(raw)?;
    let mut judgments = ViolationJudgments::new();
    for (key, value) in &object {
        match Violation::parse(key) {
            Some(violation) => judgments.insert(violation, Judgment::from_value(value)),
            None => warn!("Ignoring unknown classification key '{}'", key),
        }
    }
    Ok(judgments)
}

/// Clean a plain-text summary response
pub fn parse_summary(raw: &str) -> String {
    let cleaned = strip_code_fence(raw.trim());
    let cleaned = cleaned
        .strip_prefix("trouble_summary:")
        .unwrap_or(cleaned.as_str())
        .trim();
    cleaned.to_string()
}

fn decode_object(raw: &str) -> Result<Map<String, Value>, ParseError> {
    let json_str = strip_code_fence(raw.trim()).replace('\n', "");
    match serde_json::from_str::<Value>(&json_str) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ParseError::new(
            raw,
            format!("expected a JSON object, got {}", kind(&other)),
        )),
        Err(e) => Err(ParseError::new(raw, format!("JSON parse error: {}", e))),
    }
}

/// Strip a surrounding markdown code block, if any
fn strip_code_fence(trimmed: &str) -> String {
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let lines: Vec<&str> = trimmed.lines().collect();
    if lines.len() < 2 {
        return trimmed.trim_matches('`').to_string();
    }
    let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
        lines.len() - 1
    } else {
        lines.len()
    };
    lines[1..end].join("\n")
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_domain::{Candidate, EntityRecord, SourceReference};

    fn prompt() -> PromptRecord {
        let c = Candidate::from_parts("ann", "", "lee", "", "2012", "Utah", "9");
        let mut e = EntityRecord::new(c).unwrap();
        e.sources.push(SourceReference::new("https://a.example"));
        PromptRecord::new(e, "prompt")
    }

    #[test]
    fn test_parse_complete_response() {
        let raw = "{\"College Major\": \"History\",\n\"Undergraduate Institution\": \"BYU\", \"Highest Degree and Institution\": \"JD, Utah\", \"Work History\": \"Attorney\", \"Confidence Level\": 85}";
        let fields = parse_biography(&prompt(), raw).unwrap();
        assert_eq!(fields.get_text("College Major").as_deref(), Some("History"));
        assert_eq!(fields.get_text("Confidence Level").as_deref(), Some("85"));
        assert_eq!(fields.get_text("Full Name").as_deref(), Some("ann lee"));
        assert_eq!(fields.get_text("Candid").as_deref(), Some("9"));
        assert_eq!(
            fields.get_text("Sources").as_deref(),
            Some("[\"https://a.example\"]")
        );
    }

    #[test]
    fn test_incomplete_json_still_succeeds() {
        let fields = parse_biography(&prompt(), r#"{"College Major": "N/A"}"#).unwrap();
        assert!(fields.contains("College Major"));
        assert!(!fields.contains("Work History"));
    }

    #[test]
    fn test_malformed_json_keeps_raw_response() {
        let raw = "Sorry, I cannot help with that.";
        let err = parse_biography(&prompt(), raw).unwrap_err();
        assert_eq!(err.raw_response, raw);
        assert!(err.reason.contains("JSON parse error"));
    }

    #[test]
    fn test_non_object_json_is_parse_error() {
        let err = parse_biography(&prompt(), "[1, 2]").unwrap_err();
        assert!(err.reason.contains("an array"));
    }

    #[test]
    fn test_code_fence_stripped() {
        let raw = "```json\n{\"Work History\": \"Teacher\"}\n```";
        let fields = parse_biography(&prompt(), raw).unwrap();
        assert_eq!(fields.get_text("Work History").as_deref(), Some("Teacher"));
    }

    #[test]
    fn test_response_keys_override_base() {
        let fields = parse_biography(&prompt(), r#"{"State": "Nevada"}"#).unwrap();
        assert_eq!(fields.get_text("State").as_deref(), Some("Nevada"));
    }

    #[test]
    fn test_parse_classification() {
        let raw = r#"{"fraud_case": 1, "dea_case": "0", "proactive": -1, "extra": 1}"#;
        let judgments = parse_classification(raw).unwrap();
        assert_eq!(judgments.get(Violation::FraudCase), Some(Judgment::Yes));
        assert_eq!(judgments.get(Violation::DeaCase), Some(Judgment::No));
        assert_eq!(judgments.get(Violation::Proactive), Some(Judgment::Unsure));
        assert_eq!(judgments.get(Violation::LicenseIssues), None);
        assert_eq!(judgments.len(), 3);
    }

    #[test]
    fn test_parse_classification_malformed() {
        assert!(parse_classification("fraud: yes").is_err());
    }

    #[test]
    fn test_parse_summary() {
        assert_eq!(parse_summary("  Revoked for fraud.\n"), "Revoked for fraud.");
        assert_eq!(
            parse_summary("trouble_summary: Suspended."),
            "Suspended."
        );
    }
}
