pub mod factcheck;
pub mod generate;
pub mod lede;
pub mod risk;
pub mod sus_gate;

pub use factcheck::*;
pub use generate::*;
pub use lede::*;
pub use risk::*;
pub use sus_gate::*;

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::llm::{resolve_stage, stage_titles, Collaborator};
use crate::models::{
    RewriteResult, RulesetCache, VerificationPayload, Workshop, REPORT_VERSION,
};

/// Stage at which the sanity-check call is issued
pub const SANITY_CHECK_STAGE: u8 = 6;
/// Stage at which fact-check gating removes disputed sentences
pub const FACTCHECK_GATE_STAGE: u8 = 6;
/// Stage at which the SUS gate and lede reconstructor run
pub const TERM_GATING_STAGE: u8 = 7;
/// Stage at which findings are aggregated into a review recommendation
pub const RISK_SCORING_STAGE: u8 = 3;

/// Per-process pipeline dependencies, constructed once by the hosting
/// process. The pipeline holds no writable state of its own: the ruleset
/// cache is read-only after first load, and everything else is per-run.
pub struct PipelineContext {
    pub collaborator: Arc<dyn Collaborator>,
    pub ruleset: RulesetCache,
    pub options: PipelineOptions,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Salvage flagged sentences instead of dropping them outright
    pub salvage: bool,
}

/// One unit of work for the pipeline
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub text: String,
    /// Raw requested stage; clamped into [0, 7], missing or non-finite -> 0
    pub stage: Option<f64>,
    /// Pre-fetched fact-verification payloads, keyed by claim string
    pub verification: Vec<VerificationPayload>,
}

/// Run the full pipeline: assemble instructions, invoke the collaborator(s),
/// normalize, gate, and score. Never returns an error - every failure mode
/// resolves to a structurally valid, conservative result.
pub async fn run_pipeline(ctx: &PipelineContext, request: &RunRequest) -> RewriteResult {
    let run_id = Uuid::new_v4();
    let stage = resolve_stage(request.stage);
    let bundle = ctx.ruleset.get();

    info!(
        "run {}: stage {}, catalog {}",
        run_id,
        stage,
        &bundle.sha[..12.min(bundle.sha.len())]
    );

    let outcome =
        invoke_generation(ctx.collaborator.as_ref(), bundle, &request.text, stage).await;

    let gated_terms: Vec<String> = outcome
        .sus
        .as_ref()
        .map(|report| report.gated_terms())
        .unwrap_or_default();

    let mut result = RewriteResult {
        version: outcome
            .payload
            .version
            .unwrap_or_else(|| REPORT_VERSION.to_string()),
        analysis: outcome.payload.analysis,
        rewrite: outcome.payload.rewrite,
        catalog_version: bundle.sha.clone(),
        workshop: Workshop {
            stage,
            stage_titles: stage_titles(stage),
            sus: outcome.sus,
            model: ctx.collaborator.model(),
            generated_at: None,
        },
        human_review_recommended: outcome.review,
    };

    fold_verification(&mut result, &request.verification, stage);

    if stage >= TERM_GATING_STAGE {
        apply_sus_gate(&mut result, &gated_terms, ctx.options.salvage);
        let candidate = result.rewrite.lede_candidate.clone();
        apply_lede_fallback(&mut result, candidate.as_deref(), &gated_terms);
    }

    if stage >= RISK_SCORING_STAGE {
        score_risk(&mut result);
    }

    info!(
        "run {}: complete - {} finding(s), {} edit(s), review={}",
        run_id,
        result.analysis.findings.len(),
        result.rewrite.ops.len(),
        result.human_review_recommended.is_some()
    );

    result
}
