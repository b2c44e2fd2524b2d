use serde_json::json;

use crate::models::RulesetBundle;

/// Highest stage in the catalog
pub const MAX_STAGE: u8 = 7;

/// Stage at which the spans appendix is added to the instructions
pub const SPANS_APPENDIX_STAGE: u8 = 5;

/// Stage at which the override note is added
pub const OVERRIDE_NOTE_STAGE: u8 = 2;

/// One escalating editorial policy chunk
#[derive(Debug, Clone, Copy)]
pub struct StageChunk {
    pub id: u8,
    pub title: &'static str,
    pub body: &'static str,
}

/// Base instructions for the rewrite agent (non-negotiable constraints)
const BASE_PROMPT: &[&str] = &[
    "ROLE: You are a senior newsroom copy editor responsible for consistency, clarity, and high editorial standards.",
    "AUTHORITATIVE CONTEXT: A RULESET (array of rules) is provided for style and quality decisions.",
    "OBJECTIVES:",
    "- Detect and explain issues against the RULESET (analysis.findings).",
    "- Produce a rewrite that adheres to the RULESET and journalism principles, improving clarity, concision, and consistency.",
    "- Use a news voice: concise, specific, active, third-person; avoid sensational or loaded language.",
    "CORE PRINCIPLES:",
    "- Accuracy and fairness; avoid speculation; preserve meaning.",
    "- Attribution for non-obvious claims; avoid plagiarism; respect context.",
    "- Accountability and harm minimization; avoid stereotypes and undue emphasis.",
    "NEWS DISCOURSE HINT:",
    "- Lead with who/what/when/where/why/how; follow with main event, background, consequences/next steps, reactions/attribution.",
    "- Do not label sections; reflect this structure in the flow.",
    "REWRITE SHAPE:",
    "- When appropriate, reshape into a brief: a short lede and compact follow-up paragraphs in inverted pyramid order.",
    "- Enforce style per RULESET (capitalization, numbers, dates/times, punctuation).",
    "- Keep names/facts from TEXT; do not add information not present in TEXT.",
    "ANTI-HALLUCINATION (MANDATORY): You MUST NOT invent or infer facts, names, numbers, dates, places, quotes, or sources. Use only TEXT or explicit RULESET info. If unspecified, omit it. Never guess or add new content.",
    "INPUT: TEXT (string), RULESET (array).",
    "OUTPUT (JSON only): {",
    "  \"version\":\"ap-demo/v2\",",
    "  \"analysis\": { \"findings\":[{",
    "    \"rule_id\",\"title\",\"level\",\"severity\",\"confidence\",",
    "    \"evidence_snippet\",\"cues_matched\",\"guard_hits\"",
    "  }], \"tone\":{\"polarity\",\"confidence\"} },",
    "  \"rewrite\": { \"text\", \"rationale\":[string], \"ops\":[{ \"rule_id\",\"before\",\"after\"}] }",
    "}",
    "SCORING: base 0.6, +0.1 per extra cue beyond first; -0.2 if any guards hit.",
    "CONSTRAINTS:",
    "- Evidence snippets <= 40 chars.",
    "- Do not echo RULESET or add commentary; return JSON only.",
];

/// Progressive rule chunks. A request at stage `s` receives chunks `0..=s`;
/// later chunks override earlier ones where they conflict.
pub const STAGE_CHUNKS: [StageChunk; 8] = [
    StageChunk {
        id: 0,
        title: "Baseline extraordinary-claim handling (keep-as-claim)",
        body: "UNATTRIBUTED EXTRAORDINARY CLAIMS (BASELINE):\n\
               - If a claim is extraordinary/improbable and lacks attribution in TEXT, do not assert it as fact.\n\
               - In the rewrite, keep it as a claim (quote it or prefix \"The text says: ...\"), and move it out of the lede.\n\
               - Add a high-severity finding requiring attribution.\n\
               REWRITE SIZE: Target ~120-200 words unless more is required to preserve meaning.",
    },
    StageChunk {
        id: 1,
        title: "Topic & Relevance Gate (soft)",
        body: "TOPIC FOCUS (GUIDANCE): First, infer the primary event/topic from TEXT by salience and repetition.\n\
               RELEVANCE RULE: Keep only sentences that directly describe that event or add necessary who/what/when/where/why/how or logistics.\n\
               Omit sentences that are off-topic or non-supporting and would force external context. Do not replace them with speculation.",
    },
    StageChunk {
        id: 2,
        title: "Extraordinary Claim = Exclude (hard)",
        body: "OVERRIDE - UNATTRIBUTED EXTRAORDINARY CLAIMS (MANDATORY):\n\
               - If a claim is extraordinary/improbable and lacks attribution or corroboration in TEXT, do not include it in the rewrite at all.\n\
               - Do not paraphrase, hedge, or relocate it. Exclude it from rewrite.text.\n\
               - Record it only in analysis.findings with high severity and a brief evidence_snippet.",
    },
    StageChunk {
        id: 3,
        title: "Internal Coherence Filter",
        body: "COHERENCE CHECK (MANDATORY): Remove any sentence that creates contradictions in time, place, actors, or scale relative to the dominant topic.\n\
               If including a sentence would require unstated background or external knowledge to remain coherent, exclude it and log a finding.",
    },
    StageChunk {
        id: 4,
        title: "Harm & Panic Minimization",
        body: "HARM MINIMIZATION (MANDATORY): Exclude panic-inducing catastrophe claims that lack source attribution and are not essential to the public-service information in TEXT.\n\
               Log a high-severity finding requiring verification/attribution.",
    },
    StageChunk {
        id: 5,
        title: "Quote & Nickname Discipline",
        body: "QUOTE DISCIPLINE (GUIDANCE): Retain quotes only if they provide substantive facts or logistics about the primary event.\n\
               Omit nicknames, slogans, novelty labels, and attention-bait that do not add factual content.",
    },
    StageChunk {
        id: 6,
        title: "External Sanity Cross-Check",
        body: "EXTERNAL SANITY CROSS-CHECK (MANDATORY): An independent reviewer screens TEXT for fictional entities, jurisdiction errors, impossible scale, and nonsense, judging from common knowledge only.\n\
               Treat any statement a reasonable reader would find implausible on its face as an extraordinary claim under the rules above.\n\
               Log a finding for each such statement even when it is excluded from the rewrite.",
    },
    StageChunk {
        id: 7,
        title: "Selection-Only Constraint & Term Gating",
        body: "SELECTION-ONLY REWRITE (MANDATORY): rewrite.text must be formed solely by selecting, lightly editing for style/clarity, and re-ordering information already present in TEXT.\n\
               You may omit sentences per these rules; you may not invent new facts, entities, numbers, places, or quotes.\n\
               TERM GATING: Sentences containing terms flagged by the sanity reviewer are removed after generation. Keep doubtful terms out of sentences that carry essential logistics.",
    },
];

/// Appendix added at stage >= 5: verbatim spans and a span-built lede candidate
const SPANS_APPENDIX: &str = "SPANS (MANDATORY): Inside \"rewrite\", also return a \"spans\" object of verbatim substrings copied from TEXT, grouped by role: \"subjects\", \"actions\", \"where\", \"when\", \"context\", \"numbers\".\n\
Also return \"rewrite\".\"lede_candidate\": one sentence built ONLY from those spans plus glue words (a, an, the, in, at, on, of, for, to, and, will).\n\
SUBJECT PRIORITY for lede_candidate: explicit location > person/role tied to the action (unless flagged non-authoritative) > named office/agency > generic \"officials\" > generic subject as last resort.";

const OVERRIDE_NOTE: &str =
    "NOTE: Where any guidance conflicts, higher-stage rules override lower-stage rules.";

/// Instructions for the independent sanity-check ("SUS") agent. Deliberately
/// disjoint from the rewrite instructions: no rewriting, no new facts, only
/// suspicion flags from common-knowledge judgment.
pub const SUS_SYSTEM_PROMPT: &str = "ROLE: You are an independent sanity reviewer for news copy.\n\
You receive TEXT. Judge ONLY from common knowledge. You MUST NOT introduce, infer, or correct facts.\n\
TASK: Flag terms in TEXT that make the copy unsafe to publish as fact.\n\
CATEGORIES: fictionality | jurisdiction | impossible-scale | nonsense | other.\n\
LEVELS: none | low | medium | high. Use medium or high only when confident; sentences containing medium+ terms may be removed.\n\
OUTPUT (JSON only): {\"version\":\"sus/v1\",\"flags\":[{\"term\",\"category\",\"level\",\"reason\"}],\"block_terms\":[string],\"rationale\":[string]}\n\
CONSTRAINTS:\n\
- Every \"term\" must be a verbatim substring of TEXT.\n\
- Use block_terms only for terms that must never appear in published copy.\n\
- Do not rewrite, do not suggest replacements, do not add commentary.";

/// Clamp a raw stage number into `[0, 7]`. Non-finite values map to 0.
pub fn clamp_stage(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.trunc().clamp(0.0, MAX_STAGE as f64) as u8
}

/// Resolve an optional stage input; missing means stage 0.
pub fn resolve_stage(raw: Option<f64>) -> u8 {
    raw.map(clamp_stage).unwrap_or(0)
}

/// Assemble the system prompt for a stage: base block, chunks `0..=s`, then
/// the conditional appendices. Fully determined by the stage and the fixed
/// chunk table.
pub fn assemble_system_prompt(stage: u8) -> String {
    let s = stage.min(MAX_STAGE);
    let mut parts: Vec<String> = BASE_PROMPT.iter().map(|line| line.to_string()).collect();

    for chunk in &STAGE_CHUNKS[..=s as usize] {
        parts.push(format!(
            "\n### STAGE {}: {}\n{}",
            chunk.id, chunk.title, chunk.body
        ));
    }

    if s >= SPANS_APPENDIX_STAGE {
        parts.push(SPANS_APPENDIX.to_string());
    }
    if s >= OVERRIDE_NOTE_STAGE {
        parts.push(OVERRIDE_NOTE.to_string());
    }

    parts.join("\n")
}

/// Titles of the chunks in effect at a stage
pub fn stage_titles(stage: u8) -> Vec<String> {
    let s = stage.min(MAX_STAGE);
    STAGE_CHUNKS[..=s as usize]
        .iter()
        .map(|chunk| chunk.title.to_string())
        .collect()
}

/// User message for the rewrite call: the text, the ruleset, and a debug
/// block echoing the effective stage and ruleset source.
pub fn build_user_payload(text: &str, bundle: &RulesetBundle, stage: u8) -> String {
    let payload = json!({
        "TEXT": text,
        "RULESET": bundle.rules,
        "_debug": {
            "stage": stage,
            "ruleset_path": bundle.path.as_ref().map(|p| p.display().to_string()),
        },
    });
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
}

/// User message for the sanity-check call: the text only
pub fn build_sus_user_payload(text: &str) -> String {
    let payload = json!({ "TEXT": text });
    serde_json::to_string_pretty(&payload).unwrap_or_else(|_| "{}".to_string())
}
