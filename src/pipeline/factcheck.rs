use tracing::info;

use crate::heuristics::{has_finite_verb, split_sentences};
use crate::models::{Edit, Finding, FindingLevel, RewriteResult, VerificationPayload};
use crate::pipeline::FACTCHECK_GATE_STAGE;

/// Rule ids recorded by the fact-check fold
pub const FACTCHECK_DISPUTE_RULE: &str = "factcheck-dispute";
pub const FACTCHECK_GATE_RULE: &str = "factcheck-gate";

/// At most this many dispute findings are folded per run
const MAX_DISPUTE_FINDINGS: usize = 3;

/// Claim candidates for external verification: bounds on sentence length
const CLAIM_MIN_LEN: usize = 40;
const CLAIM_MAX_LEN: usize = 240;
const MAX_CLAIMS: usize = 5;

/// Select the sentences worth sending to an external fact-check service:
/// long enough to be a claim, short enough to be one claim, and carrying a
/// finite verb. Pure helper for hosts; the core never fetches.
pub fn select_claim_candidates(text: &str) -> Vec<String> {
    split_sentences(text)
        .into_iter()
        .filter(|s| s.len() >= CLAIM_MIN_LEN && s.len() <= CLAIM_MAX_LEN && has_finite_verb(s))
        .take(MAX_CLAIMS)
        .collect()
}

/// Fold pre-fetched verification payloads into the result: a hard finding per
/// disputed claim, and at stage >= 6 removal of rewrite sentences containing
/// a disputed query substring. This is the only gating driven by data the
/// core does not itself produce.
pub fn fold_verification(result: &mut RewriteResult, payloads: &[VerificationPayload], stage: u8) {
    let disputed: Vec<&VerificationPayload> =
        payloads.iter().filter(|p| p.is_disputed()).collect();
    if disputed.is_empty() {
        return;
    }

    info!("Fact-check fold: {} disputed claim(s)", disputed.len());

    for payload in disputed.iter().take(MAX_DISPUTE_FINDINGS) {
        result.analysis.findings.push(Finding {
            rule_id: FACTCHECK_DISPUTE_RULE.to_string(),
            title: "Claim disputed by external fact-checks".to_string(),
            level: FindingLevel::Hard,
            severity: 0.85,
            confidence: 0.6,
            evidence_snippet: payload.query.chars().take(80).collect(),
            cues_matched: vec!["fact-check-tools".to_string()],
            guard_hits: vec![],
        });
    }

    if stage < FACTCHECK_GATE_STAGE || result.rewrite.text.trim().is_empty() {
        return;
    }

    let text = result.rewrite.text.clone();
    let queries: Vec<String> = disputed.iter().map(|p| p.query.to_lowercase()).collect();
    let kept: Vec<String> = split_sentences(&text)
        .into_iter()
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            !queries.iter().any(|q| !q.is_empty() && lower.contains(q))
        })
        .collect();

    let filtered = kept.join(" ");
    if filtered.is_empty() || filtered == text {
        return;
    }

    result.rewrite.ops.push(Edit {
        rule_id: FACTCHECK_GATE_RULE.to_string(),
        before: text,
        after: filtered.clone(),
    });
    result
        .rewrite
        .rationale
        .push("Applied fact-check gate: removed sentence(s) disputed by external reviews.".to_string());
    result.rewrite.text = filtered;
}
