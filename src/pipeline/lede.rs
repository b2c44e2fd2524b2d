use tracing::info;

use crate::heuristics::{has_finite_verb, is_weak_lead, split_sentences, TermMatcher};
use crate::models::{Edit, Finding, FindingLevel, RewriteResult};

/// Rule id recorded by the lede reconstructor
pub const LEDE_FALLBACK_RULE: &str = "lede-fallback";

/// Replace a weak opening sentence with the span-built candidate (stage >= 7).
///
/// Runs after the SUS gate. The replacement is all-or-nothing: the candidate
/// must be non-empty, contain none of the flagged terms, and carry a finite
/// verb, and the current lead must test weak - otherwise the text is left
/// untouched.
pub fn apply_lede_fallback(result: &mut RewriteResult, candidate: Option<&str>, terms: &[String]) {
    let text = result.rewrite.text.clone();
    let sentences = split_sentences(&text);
    let lead = sentences.first().map(String::as_str).unwrap_or("");

    if !is_weak_lead(lead) {
        return;
    }

    let Some(candidate) = candidate.map(str::trim).filter(|c| !c.is_empty()) else {
        return;
    };
    if TermMatcher::new(terms).matches(candidate) {
        return;
    }
    if !has_finite_verb(candidate) {
        return;
    }

    let mut rebuilt = vec![candidate.to_string()];
    rebuilt.extend(sentences.into_iter().skip(1));
    let after = rebuilt.join(" ");
    if after == text {
        return;
    }

    info!("Lede fallback: replaced weak lead with span-built candidate");

    result.rewrite.ops.push(Edit {
        rule_id: LEDE_FALLBACK_RULE.to_string(),
        before: text,
        after: after.clone(),
    });
    result
        .rewrite
        .rationale
        .push("Replaced weak lead sentence with span-built candidate.".to_string());
    result.analysis.findings.push(Finding {
        rule_id: LEDE_FALLBACK_RULE.to_string(),
        title: "Weak lead replaced with span-built candidate".to_string(),
        level: FindingLevel::Soft,
        severity: 0.3,
        confidence: 0.8,
        evidence_snippet: candidate.chars().take(40).collect(),
        cues_matched: vec![],
        guard_hits: vec![],
    });
    result.rewrite.text = after;
}

#[cfg(test)]
mod tests {
    use crate::models::{Analysis, Rewrite, Workshop};

    use super::*;

    fn result_with_text(text: &str) -> RewriteResult {
        RewriteResult {
            version: "ap-demo/v2".to_string(),
            analysis: Analysis::default(),
            rewrite: Rewrite {
                text: text.to_string(),
                ..Default::default()
            },
            catalog_version: "test".to_string(),
            workshop: Workshop::default(),
            human_review_recommended: None,
        }
    }

    #[test]
    fn test_weak_lead_is_replaced() {
        let mut result = result_with_text(
            "There is a plan to expand services. Officials confirmed the timeline Friday.",
        );
        apply_lede_fallback(
            &mut result,
            Some("Officials will expand services Friday."),
            &[],
        );

        assert_eq!(
            result.rewrite.text,
            "Officials will expand services Friday. Officials confirmed the timeline Friday."
        );
        assert_eq!(result.rewrite.ops.len(), 1);
        assert_eq!(result.rewrite.ops[0].rule_id, LEDE_FALLBACK_RULE);
        assert_eq!(result.analysis.findings.len(), 1);
        assert_eq!(result.analysis.findings[0].severity, 0.3);
    }

    #[test]
    fn test_strong_lead_is_never_replaced() {
        let original = "Officials will open two centers Friday. More details follow.";
        let mut result = result_with_text(original);
        apply_lede_fallback(
            &mut result,
            Some("A perfectly good candidate is here."),
            &[],
        );

        assert_eq!(result.rewrite.text, original);
        assert!(result.rewrite.ops.is_empty());
        assert!(result.analysis.findings.is_empty());
    }

    #[test]
    fn test_candidate_with_flagged_term_is_rejected() {
        let original = "There is a plan to expand services. More details follow.";
        let mut result = result_with_text(original);
        apply_lede_fallback(
            &mut result,
            Some("Godzilla will expand services Friday."),
            &["Godzilla".to_string()],
        );

        assert_eq!(result.rewrite.text, original);
        assert!(result.rewrite.ops.is_empty());
    }

    #[test]
    fn test_verbless_candidate_is_rejected() {
        let original = "There is a plan to expand services.";
        let mut result = result_with_text(original);
        apply_lede_fallback(&mut result, Some("A new chapter for the city."), &[]);

        assert_eq!(result.rewrite.text, original);
    }

    #[test]
    fn test_missing_candidate_leaves_text() {
        let original = "There is a plan to expand services.";
        let mut result = result_with_text(original);
        apply_lede_fallback(&mut result, None, &[]);

        assert_eq!(result.rewrite.text, original);
    }

    #[test]
    fn test_empty_text_takes_candidate() {
        let mut result = result_with_text("");
        apply_lede_fallback(
            &mut result,
            Some("Officials will open two centers Friday."),
            &[],
        );

        assert_eq!(
            result.rewrite.text,
            "Officials will open two centers Friday."
        );
    }

    #[test]
    fn test_evidence_snippet_truncated_to_forty_chars() {
        let mut result = result_with_text("There is a plan to expand services.");
        let candidate = "Officials will expand neighborhood services across nine districts Friday.";
        apply_lede_fallback(&mut result, Some(candidate), &[]);

        let snippet = &result.analysis.findings[0].evidence_snippet;
        assert_eq!(snippet.chars().count(), 40);
        assert!(candidate.starts_with(snippet.as_str()));
    }
}
