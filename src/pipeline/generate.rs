use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CollaboratorError;
use crate::llm::{
    assemble_system_prompt, build_sus_user_payload, build_user_payload, normalize_payload,
    validate_rewrite_payload, validate_sus_payload, Collaborator, ModelPayload, SUS_SYSTEM_PROMPT,
};
use crate::models::{
    HumanReviewRecommendation, ReviewSeverity, RulesetBundle, Rewrite, SusReport, REPORT_VERSION,
};
use crate::pipeline::SANITY_CHECK_STAGE;

/// What the invoker hands to the rest of the pipeline: a payload that is
/// always well-formed, the sanity report when the sanity call ran, and a
/// review recommendation when the rewrite agent returned garbage.
#[derive(Debug)]
pub struct GenerationOutcome {
    pub payload: ModelPayload,
    pub sus: Option<SusReport>,
    pub review: Option<HumanReviewRecommendation>,
}

/// Issue the rewrite call and, at stage >= 6, the sanity-check call
/// concurrently. Each call owns its own fallback: a failure in one never
/// blocks or corrupts the other, and no error escapes this function.
pub async fn invoke_generation(
    collaborator: &dyn Collaborator,
    bundle: &RulesetBundle,
    text: &str,
    stage: u8,
) -> GenerationOutcome {
    let system_prompt = assemble_system_prompt(stage);
    let user_payload = build_user_payload(text, bundle, stage);

    if stage >= SANITY_CHECK_STAGE {
        let sus_payload = build_sus_user_payload(text);
        let (rewrite_res, sus_res) = tokio::join!(
            collaborator.rewrite(&system_prompt, &user_payload),
            collaborator.sanity_check(SUS_SYSTEM_PROMPT, &sus_payload),
        );
        let (payload, review) = settle_rewrite(rewrite_res);
        GenerationOutcome {
            payload,
            sus: Some(settle_sanity(sus_res)),
            review,
        }
    } else {
        let rewrite_res = collaborator.rewrite(&system_prompt, &user_payload).await;
        let (payload, review) = settle_rewrite(rewrite_res);
        GenerationOutcome {
            payload,
            sus: None,
            review,
        }
    }
}

/// Resolve the rewrite call into a well-formed payload. An invocation
/// failure substitutes the blocked-output fallback; a malformed payload does
/// the same and additionally recommends human review so ungated content is
/// never silently surfaced.
fn settle_rewrite(
    result: Result<Value, CollaboratorError>,
) -> (ModelPayload, Option<HumanReviewRecommendation>) {
    match result {
        Ok(value) => match validate_rewrite_payload(&value) {
            Ok(mut payload) => {
                normalize_payload(&mut payload);
                debug!(
                    "Rewrite agent returned {} finding(s)",
                    payload.analysis.findings.len()
                );
                (payload, None)
            }
            Err(reason) => {
                warn!("Rewrite payload rejected: {}", reason);
                (
                    fallback_payload("invalid payload from rewrite agent"),
                    Some(invalid_output_review(&reason)),
                )
            }
        },
        Err(CollaboratorError::Malformed(detail)) => {
            warn!("Rewrite output malformed: {}", detail);
            (
                fallback_payload("malformed output from rewrite agent"),
                Some(invalid_output_review(&detail)),
            )
        }
        Err(CollaboratorError::Invocation(detail)) => {
            warn!("Rewrite call failed: {}", detail);
            (
                fallback_payload(&format!("rewrite call failed - {detail}")),
                None,
            )
        }
    }
}

/// Resolve the sanity call into a report. Failures yield a report that gates
/// nothing; the rewrite path is never affected.
fn settle_sanity(result: Result<Value, CollaboratorError>) -> SusReport {
    match result {
        Ok(value) => match validate_sus_payload(&value) {
            Ok(report) => report,
            Err(reason) => {
                warn!("Sanity payload rejected: {}", reason);
                SusReport::unavailable(&reason)
            }
        },
        Err(e) => {
            warn!("Sanity call failed: {}", e);
            SusReport::unavailable(&e.to_string())
        }
    }
}

/// Deterministic blocked-output substitute for a failed rewrite call
pub fn fallback_payload(detail: &str) -> ModelPayload {
    ModelPayload {
        version: Some(REPORT_VERSION.to_string()),
        analysis: Default::default(),
        rewrite: Rewrite {
            text: String::new(),
            rationale: vec![
                "fallback: blocked output".to_string(),
                format!("details: {detail}"),
            ],
            ops: vec![],
            spans: None,
            lede_candidate: None,
        },
    }
}

fn invalid_output_review(detail: &str) -> HumanReviewRecommendation {
    HumanReviewRecommendation {
        flag: true,
        severity: ReviewSeverity::High,
        reason: "invalid output from rewrite agent".to_string(),
        details: vec![detail.to_string()],
        recommendation: "Manual review required before publication.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;

    struct CountingStub {
        rewrite_calls: AtomicUsize,
        sanity_calls: AtomicUsize,
        rewrite_value: Value,
        sanity_value: Value,
        fail_rewrite: bool,
        fail_sanity: bool,
    }

    impl CountingStub {
        fn new(rewrite_value: Value, sanity_value: Value) -> Self {
            Self {
                rewrite_calls: AtomicUsize::new(0),
                sanity_calls: AtomicUsize::new(0),
                rewrite_value,
                sanity_value,
                fail_rewrite: false,
                fail_sanity: false,
            }
        }
    }

    #[async_trait::async_trait]
    impl Collaborator for CountingStub {
        async fn rewrite(&self, _system: &str, _user: &str) -> Result<Value, CollaboratorError> {
            self.rewrite_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_rewrite {
                return Err(CollaboratorError::Invocation("boom".to_string()));
            }
            Ok(self.rewrite_value.clone())
        }

        async fn sanity_check(
            &self,
            _system: &str,
            _user: &str,
        ) -> Result<Value, CollaboratorError> {
            self.sanity_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_sanity {
                return Err(CollaboratorError::Invocation("boom".to_string()));
            }
            Ok(self.sanity_value.clone())
        }
    }

    fn good_rewrite() -> Value {
        json!({
            "analysis": {"findings": [], "tone": {"polarity": "neutral", "confidence": 0.5}},
            "rewrite": {"text": "A clean rewrite.", "rationale": [], "ops": []}
        })
    }

    #[tokio::test]
    async fn test_sanity_call_only_at_stage_six_and_up() {
        let bundle = RulesetBundle::empty();

        let stub = CountingStub::new(good_rewrite(), json!({"flags": [], "block_terms": []}));
        let outcome = invoke_generation(&stub, &bundle, "Some text.", 5).await;
        assert_eq!(stub.rewrite_calls.load(Ordering::SeqCst), 1);
        assert_eq!(stub.sanity_calls.load(Ordering::SeqCst), 0);
        assert!(outcome.sus.is_none());

        let stub = CountingStub::new(good_rewrite(), json!({"flags": [], "block_terms": []}));
        let outcome = invoke_generation(&stub, &bundle, "Some text.", 6).await;
        assert_eq!(stub.rewrite_calls.load(Ordering::SeqCst), 1);
        assert_eq!(stub.sanity_calls.load(Ordering::SeqCst), 1);
        assert!(outcome.sus.is_some());
    }

    #[tokio::test]
    async fn test_rewrite_failure_substitutes_blocked_output() {
        let bundle = RulesetBundle::empty();
        let mut stub = CountingStub::new(good_rewrite(), json!({"flags": [], "block_terms": []}));
        stub.fail_rewrite = true;

        let outcome = invoke_generation(&stub, &bundle, "Some text.", 0).await;

        assert_eq!(outcome.payload.rewrite.text, "");
        assert!(outcome.payload.analysis.findings.is_empty());
        assert!(outcome.payload.rewrite.rationale[0].starts_with("fallback:"));
        // A plain invocation failure is not a malformed-output event.
        assert!(outcome.review.is_none());
    }

    #[tokio::test]
    async fn test_malformed_rewrite_raises_review() {
        let bundle = RulesetBundle::empty();
        let stub =
            CountingStub::new(json!("not an object"), json!({"flags": [], "block_terms": []}));

        let outcome = invoke_generation(&stub, &bundle, "Some text.", 0).await;

        assert_eq!(outcome.payload.rewrite.text, "");
        let review = outcome.review.expect("review should be recommended");
        assert!(review.flag);
        assert_eq!(review.severity, ReviewSeverity::High);
        assert_eq!(review.reason, "invalid output from rewrite agent");
    }

    #[tokio::test]
    async fn test_sanity_failure_never_blocks_rewrite() {
        let bundle = RulesetBundle::empty();
        let mut stub = CountingStub::new(good_rewrite(), Value::Null);
        stub.fail_sanity = true;

        let outcome = invoke_generation(&stub, &bundle, "Some text.", 7).await;

        assert_eq!(outcome.payload.rewrite.text, "A clean rewrite.");
        let sus = outcome.sus.expect("sanity report should be present");
        assert!(sus.flags.is_empty());
        assert!(sus.rationale[0].contains("sanity check unavailable"));
    }
}
