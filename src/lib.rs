pub mod error;
pub mod heuristics;
pub mod llm;
pub mod models;
pub mod pipeline;

pub use error::{CollaboratorError, RulesetError};
pub use heuristics::{
    has_finite_verb, is_weak_lead, lacks_subject, split_sentences, strip_reporting_prefix,
    TermMatcher,
};
pub use llm::{
    assemble_system_prompt, clamp_stage, resolve_stage, stage_titles, AnthropicClient,
    AnthropicConfig, Collaborator, ModelPayload, STAGE_CHUNKS, SUS_SYSTEM_PROMPT,
};
pub use models::{
    Analysis, Edit, Finding, FindingLevel, Flag, FlagCategory, FlagLevel,
    HumanReviewRecommendation, RatingBuckets, ReviewSeverity, ReviewSignals, Rewrite,
    RewriteResult, RulesetBundle, RulesetCache, Spans, SusReport, Tone, VerificationPayload,
    Workshop,
};
pub use pipeline::{
    fold_verification, run_pipeline, select_claim_candidates, PipelineContext, PipelineOptions,
    RunRequest,
};
