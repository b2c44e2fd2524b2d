use serde::Deserialize;
use serde_json::Value;

use crate::models::{Analysis, Rewrite, SusReport, REPORT_VERSION, SUS_VERSION};

/// Payload accepted from the rewrite agent, before catalog/workshop metadata
/// is attached. Field-level defaults make individual omissions non-fatal;
/// wrong types fail validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelPayload {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub analysis: Analysis,
    #[serde(default)]
    pub rewrite: Rewrite,
}

/// Strictly validate a raw rewrite payload.
///
/// Accepts only a JSON object whose present fields have the expected types;
/// anything else is rejected with a reason. The caller decides what to do
/// with a rejection - the pipeline substitutes a blocked-output fallback.
pub fn validate_rewrite_payload(value: &Value) -> Result<ModelPayload, String> {
    if !value.is_object() {
        return Err(format!("expected a JSON object, got {}", json_kind(value)));
    }
    serde_json::from_value(value.clone()).map_err(|e| e.to_string())
}

/// Strictly validate a raw sanity-check payload into a `SusReport`.
pub fn validate_sus_payload(value: &Value) -> Result<SusReport, String> {
    if !value.is_object() {
        return Err(format!("expected a JSON object, got {}", json_kind(value)));
    }
    let mut report: SusReport = serde_json::from_value(value.clone()).map_err(|e| e.to_string())?;
    if report.version.is_empty() {
        report.version = SUS_VERSION.to_string();
    }
    Ok(report)
}

/// Guarantee the minimum shape downstream components rely on: version set,
/// tone populated, severities inside [0, 1]. Existing non-empty values are
/// never overwritten.
pub fn normalize_payload(payload: &mut ModelPayload) {
    if payload
        .version
        .as_deref()
        .map_or(true, |v| v.trim().is_empty())
    {
        payload.version = Some(REPORT_VERSION.to_string());
    }

    let tone = &mut payload.analysis.tone;
    if tone.polarity.trim().is_empty() {
        tone.polarity = "neutral".to_string();
    }
    tone.confidence = clamp_unit(tone.confidence, 0.5);

    for finding in &mut payload.analysis.findings {
        finding.severity = clamp_unit(finding.severity, 0.0);
        finding.confidence = clamp_unit(finding.confidence, 0.0);
    }
}

fn clamp_unit(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

fn json_kind(value: &Value) -> &'static str {
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
    use serde_json::json;

    use super::*;

    #[test]
    fn test_rejects_non_object() {
        assert!(validate_rewrite_payload(&json!("just a string")).is_err());
        assert!(validate_rewrite_payload(&json!([1, 2, 3])).is_err());
        assert!(validate_rewrite_payload(&Value::Null).is_err());
    }

    #[test]
    fn test_rejects_wrong_types() {
        let err = validate_rewrite_payload(&json!({"analysis": "oops"})).unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn test_missing_substructures_become_defaults() {
        let mut payload = validate_rewrite_payload(&json!({})).unwrap();
        normalize_payload(&mut payload);

        assert_eq!(payload.version.as_deref(), Some(REPORT_VERSION));
        assert!(payload.analysis.findings.is_empty());
        assert_eq!(payload.analysis.tone.polarity, "neutral");
        assert_eq!(payload.analysis.tone.confidence, 0.5);
        assert_eq!(payload.rewrite.text, "");
        assert!(payload.rewrite.rationale.is_empty());
        assert!(payload.rewrite.ops.is_empty());
    }

    #[test]
    fn test_existing_values_not_overwritten() {
        let mut payload = validate_rewrite_payload(&json!({
            "version": "custom/v9",
            "analysis": {"tone": {"polarity": "negative", "confidence": 0.7}},
            "rewrite": {"text": "Kept text."}
        }))
        .unwrap();
        normalize_payload(&mut payload);

        assert_eq!(payload.version.as_deref(), Some("custom/v9"));
        assert_eq!(payload.analysis.tone.polarity, "negative");
        assert_eq!(payload.analysis.tone.confidence, 0.7);
        assert_eq!(payload.rewrite.text, "Kept text.");
    }

    #[test]
    fn test_severities_clamped_to_unit_interval() {
        let mut payload = validate_rewrite_payload(&json!({
            "analysis": {"findings": [
                {"rule_id": "a", "severity": 3.5, "confidence": -0.2}
            ]}
        }))
        .unwrap();
        normalize_payload(&mut payload);

        assert_eq!(payload.analysis.findings[0].severity, 1.0);
        assert_eq!(payload.analysis.findings[0].confidence, 0.0);
    }

    #[test]
    fn test_sus_payload_validation() {
        let report = validate_sus_payload(&json!({
            "flags": [{"term": "Godzilla", "category": "fictionality", "level": "high", "reason": "fictional"}]
        }))
        .unwrap();
        assert_eq!(report.version, SUS_VERSION);
        assert_eq!(report.flags.len(), 1);

        assert!(validate_sus_payload(&json!(42)).is_err());
    }
}
