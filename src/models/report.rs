use serde::{Deserialize, Serialize};

use super::sus::SusReport;

/// Report schema version expected from the rewrite agent.
pub const REPORT_VERSION: &str = "ap-demo/v2";

/// Severity class of a finding - restricted enum to reduce hallucination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingLevel {
    /// Style guidance; the rewrite may keep the material
    #[default]
    Soft,
    /// Mandatory exclusion or correction
    Hard,
}

/// A single detected issue in the source text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Rule that triggered, e.g. "extraordinary-claim" or "sus-gate"
    pub rule_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub level: FindingLevel,
    /// Severity in [0, 1]
    #[serde(default)]
    pub severity: f64,
    /// Confidence in [0, 1]
    #[serde(default)]
    pub confidence: f64,
    /// Short excerpt (<= 40 chars by prompt contract, not enforced here)
    #[serde(default)]
    pub evidence_snippet: String,
    #[serde(default)]
    pub cues_matched: Vec<String>,
    #[serde(default)]
    pub guard_hits: Vec<String>,
}

/// Tone assessment of the source text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tone {
    pub polarity: String,
    pub confidence: f64,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            polarity: "neutral".to_string(),
            confidence: 0.5,
        }
    }
}

/// Analysis block of a report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub tone: Tone,
}

/// Audit record of one text transformation applied by a gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edit {
    pub rule_id: String,
    pub before: String,
    pub after: String,
}

/// Verbatim substrings extracted from the input text, grouped by role.
/// Requested from the rewrite agent at stage >= 5 and used to build a
/// replacement lede without inventing content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spans {
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default, rename = "where")]
    pub where_: Vec<String>,
    #[serde(default)]
    pub when: Vec<String>,
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub numbers: Vec<String>,
}

/// Rewrite block of a report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rewrite {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub rationale: Vec<String>,
    #[serde(default)]
    pub ops: Vec<Edit>,
    /// Present only when the spans appendix was in effect (stage >= 5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spans: Option<Spans>,
    /// Candidate opening sentence assembled from spans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lede_candidate: Option<String>,
}

/// Processing metadata attached to every result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workshop {
    /// Effective stage after clamping
    pub stage: u8,
    /// Titles of the rule chunks that were in effect
    #[serde(default)]
    pub stage_titles: Vec<String>,
    /// Sanity-check report, when the sanity call ran (stage >= 6)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sus: Option<SusReport>,
    /// Model identifier used for the rewrite call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Wall-clock stamp set by the hosting process, never by the core
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// Severity of a human-review recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSeverity {
    High,
    Critical,
}

/// Advisory flag attached when aggregated risk signals exceed a threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanReviewRecommendation {
    pub flag: bool,
    pub severity: ReviewSeverity,
    pub reason: String,
    #[serde(default)]
    pub details: Vec<String>,
    pub recommendation: String,
}

/// Complete result of one pipeline run.
///
/// Always structurally valid on return from the core, even after internal
/// failure. Created fresh per request; the core holds no reference to it
/// after returning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteResult {
    pub version: String,
    pub analysis: Analysis,
    pub rewrite: Rewrite,
    /// Content hash of the ruleset used for this run
    pub catalog_version: String,
    pub workshop: Workshop,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_review_recommended: Option<HumanReviewRecommendation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_report() {
        let json = r#"{
            "version": "ap-demo/v2",
            "analysis": {
                "findings": [{
                    "rule_id": "extraordinary-claim",
                    "title": "Unattributed extraordinary claim",
                    "level": "hard",
                    "severity": 0.9,
                    "confidence": 0.8,
                    "evidence_snippet": "a 40-story lizard",
                    "cues_matched": ["improbable-scale"],
                    "guard_hits": []
                }],
                "tone": {"polarity": "negative", "confidence": 0.7}
            },
            "rewrite": {
                "text": "Officials opened two shelters Friday.",
                "rationale": ["Removed unattributed claim."],
                "ops": [{"rule_id": "extraordinary-claim", "before": "x", "after": ""}]
            },
            "catalog_version": "abc123",
            "workshop": {"stage": 2, "stage_titles": ["a", "b", "c"]}
        }"#;

        let result: RewriteResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.version, REPORT_VERSION);
        assert_eq!(result.analysis.findings.len(), 1);
        assert_eq!(result.analysis.findings[0].level, FindingLevel::Hard);
        assert_eq!(result.workshop.stage, 2);
        assert!(result.human_review_recommended.is_none());
    }

    #[test]
    fn test_finding_defaults_are_lenient() {
        let json = r#"{"rule_id": "style-numbers"}"#;
        let finding: Finding = serde_json::from_str(json).unwrap();

        assert_eq!(finding.level, FindingLevel::Soft);
        assert_eq!(finding.severity, 0.0);
        assert!(finding.cues_matched.is_empty());
    }

    #[test]
    fn test_tone_default_is_neutral() {
        let tone = Tone::default();
        assert_eq!(tone.polarity, "neutral");
        assert_eq!(tone.confidence, 0.5);
    }

    #[test]
    fn test_spans_where_field_name() {
        let json = r#"{"subjects": ["the mayor"], "where": ["Tokyo"]}"#;
        let spans: Spans = serde_json::from_str(json).unwrap();
        assert_eq!(spans.where_, vec!["Tokyo"]);
    }
}
