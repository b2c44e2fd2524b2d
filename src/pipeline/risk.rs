use tracing::info;

use crate::models::{HumanReviewRecommendation, ReviewSeverity, RewriteResult};
use crate::pipeline::sus_gate::SUS_GATE_RULE;

/// Suspicion score at or above which review is recommended
const REVIEW_THRESHOLD: u32 = 5;
/// Suspicion score at or above which the recommendation is critical
const CRITICAL_THRESHOLD: u32 = 8;

/// Aggregate the final findings into a human-review recommendation
/// (stage >= 3). A recommendation already present - set by the invoker's
/// malformed-output path - is never overwritten.
pub fn score_risk(result: &mut RewriteResult) {
    if result.human_review_recommended.is_some() {
        return;
    }

    let findings = &result.analysis.findings;
    let high_severity = findings.iter().filter(|f| f.severity >= 0.8).count() as u32;
    let sus_gate_hits = findings.iter().filter(|f| f.rule_id == SUS_GATE_RULE).count() as u32;
    let temporal_violations = findings
        .iter()
        .filter(|f| {
            f.rule_id == "temporal-coherence"
                || (f.evidence_snippet.to_lowercase().contains("after")
                    && f.title.to_lowercase().contains("coher"))
        })
        .count() as u32;
    let extraordinary_claims = findings
        .iter()
        .filter(|f| f.rule_id.contains("extraordinary"))
        .count() as u32;

    let suspicion_score = 2 * high_severity
        + 3 * sus_gate_hits
        + 2 * temporal_violations
        + 2 * extraordinary_claims;

    if suspicion_score < REVIEW_THRESHOLD && !(sus_gate_hits > 0 && high_severity > 2) {
        return;
    }

    let mut details = Vec::new();
    if high_severity > 0 {
        details.push(format!("{high_severity} high-severity finding(s)"));
    }
    if sus_gate_hits > 0 {
        details.push(format!("{sus_gate_hits} SUS gate hit(s)"));
    }
    if temporal_violations > 0 {
        details.push(format!("{temporal_violations} temporal coherence violation(s)"));
    }
    if extraordinary_claims > 0 {
        details.push(format!("{extraordinary_claims} extraordinary claim(s)"));
    }

    let severity = if suspicion_score >= CRITICAL_THRESHOLD {
        ReviewSeverity::Critical
    } else {
        ReviewSeverity::High
    };

    info!(
        "Risk scorer: suspicion score {} -> {:?} review recommended",
        suspicion_score, severity
    );

    result.human_review_recommended = Some(HumanReviewRecommendation {
        flag: true,
        severity,
        reason: "Multiple credibility issues detected".to_string(),
        details,
        recommendation: "Contains multiple red flags.".to_string(),
    });
}
