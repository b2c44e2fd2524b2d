use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::heuristics::{
    has_finite_verb, lacks_subject, split_sentences, strip_reporting_prefix, TermMatcher,
};
use crate::models::{Edit, Finding, FindingLevel, RewriteResult};

/// Rule id recorded by this gate on edits and findings
pub const SUS_GATE_RULE: &str = "sus-gate";

static SUBORDINATE_THAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i) that ").unwrap());

/// Remove or salvage rewrite sentences containing flagged terms (stage >= 7).
///
/// Sentences with no whole-word term match are kept verbatim. Matching
/// sentences are dropped, or, when salvage mode is on, redacted and kept only
/// if a safe, verb-bearing, subject-bearing remainder survives. If the text
/// changes, the gate records an edit, a rationale note, and a hard finding.
pub fn apply_sus_gate(result: &mut RewriteResult, terms: &[String], salvage: bool) {
    let matcher = TermMatcher::new(terms);
    if matcher.is_empty() || result.rewrite.text.trim().is_empty() {
        return;
    }

    let original = result.rewrite.text.clone();
    let sentences = split_sentences(&original);
    let mut kept: Vec<String> = Vec::new();
    let mut matched_terms: Vec<String> = Vec::new();

    for sentence in &sentences {
        let hits = matcher.matched_terms(sentence);
        if hits.is_empty() {
            kept.push(sentence.clone());
            continue;
        }
        for hit in hits {
            if !matched_terms.iter().any(|t| t == hit) {
                matched_terms.push(hit.to_string());
            }
        }
        if salvage {
            if let Some(fragment) = salvage_sentence(sentence, &matcher) {
                kept.push(fragment);
            }
        }
    }

    if matched_terms.is_empty() {
        return;
    }

    let gated = kept.join(" ");
    if gated == original {
        return;
    }

    info!(
        "SUS gate: {} of {} sentence(s) affected by {} term(s)",
        sentences.len() - kept.len(),
        sentences.len(),
        matched_terms.len()
    );

    result.rewrite.ops.push(Edit {
        rule_id: SUS_GATE_RULE.to_string(),
        before: original,
        after: gated.clone(),
    });
    result.rewrite.rationale.push(format!(
        "Applied SUS gate (salvage {}): removed or salvaged sentence(s) containing flagged term(s).",
        if salvage { "on" } else { "off" }
    ));
    result.analysis.findings.push(Finding {
        rule_id: SUS_GATE_RULE.to_string(),
        title: "Sentences gated on sanity-check terms".to_string(),
        level: FindingLevel::Hard,
        severity: 0.9,
        confidence: 0.7,
        evidence_snippet: matched_terms
            .iter()
            .take(2)
            .cloned()
            .collect::<Vec<_>>()
            .join(", "),
        cues_matched: matched_terms,
        guard_hits: vec![],
    });
    result.rewrite.text = gated;
}

/// Attempt to reconstruct a flagged sentence without its flagged terms.
///
/// Conservative by design: any sign that the redaction removed the subject
/// drops the sentence rather than risking a fabricated one.
fn salvage_sentence(sentence: &str, matcher: &TermMatcher) -> Option<String> {
    let redacted = matcher.redact(sentence);

    // A subordinate clause after "that" usually carries the factual content.
    let remainder = match SUBORDINATE_THAT.find(&redacted) {
        Some(m) => redacted[m.end()..].to_string(),
        None => redacted,
    };
    let remainder = strip_reporting_prefix(&remainder);

    if remainder.is_empty() || lacks_subject(remainder) {
        return None;
    }
    if !has_finite_verb(remainder) {
        return None;
    }
    if remainder.split_whitespace().count() < 5 {
        return None;
    }

    Some(finalize_fragment(remainder))
}

/// Capitalize and terminally punctuate an accepted fragment
fn finalize_fragment(fragment: &str) -> String {
    let mut chars = fragment.chars();
    let mut out = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };
    if !out.ends_with(['.', '!', '?']) {
        out.push('.');
    }
    out
}
