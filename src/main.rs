use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use copydesk::llm::{OVERRIDE_NOTE_STAGE, SPANS_APPENDIX_STAGE};
use copydesk::pipeline::{RISK_SCORING_STAGE, SANITY_CHECK_STAGE, TERM_GATING_STAGE};
use copydesk::{
    assemble_system_prompt, clamp_stage, run_pipeline, AnthropicClient, AnthropicConfig,
    PipelineContext, PipelineOptions, RulesetCache, RunRequest, STAGE_CHUNKS,
};

#[derive(Parser)]
#[command(name = "copydesk")]
#[command(author, version, about = "Staged editorial safety pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline over a text file and print the result report
    Run {
        /// Input text file
        #[arg(short, long)]
        input: PathBuf,

        /// Editorial stage (0-7; out-of-range values are clamped)
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        stage: i64,

        /// Salvage flagged sentences instead of dropping them
        #[arg(long)]
        salvage: bool,

        /// Ruleset JSON file (defaults to $RULESET_PATH, then data/ruleset.json)
        #[arg(long)]
        ruleset: Option<PathBuf>,

        /// Write the result JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Truncate the input to this many characters before processing
        #[arg(long)]
        clip_chars: Option<usize>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the assembled system prompt for a stage
    Prompt {
        /// Editorial stage (0-7; out-of-range values are clamped)
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        stage: i64,
    },

    /// List the stage catalog
    Stages,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            stage,
            salvage,
            ruleset,
            output,
            clip_chars,
            verbose,
        } => {
            setup_logging(verbose);
            run_command(input, stage, salvage, ruleset, output, clip_chars).await
        }
        Commands::Prompt { stage } => {
            println!("{}", assemble_system_prompt(clamp_stage(stage as f64)));
            Ok(())
        }
        Commands::Stages => {
            print_stages();
            Ok(())
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn run_command(
    input: PathBuf,
    stage: i64,
    salvage: bool,
    ruleset: Option<PathBuf>,
    output: Option<PathBuf>,
    clip_chars: Option<usize>,
) -> Result<()> {
    let mut text = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read input file: {:?}", input))?;
    if text.trim().is_empty() {
        anyhow::bail!("Input file is empty: {:?}", input);
    }
    if let Some(limit) = clip_chars {
        if text.chars().count() > limit {
            info!("Clipping input to {} characters", limit);
            text = text.chars().take(limit).collect();
        }
    }

    let api_config = AnthropicConfig::from_env()?;
    let ctx = PipelineContext {
        collaborator: Arc::new(AnthropicClient::new(api_config)),
        ruleset: RulesetCache::new(resolve_ruleset_source(ruleset)),
        options: PipelineOptions { salvage },
    };

    let request = RunRequest {
        text,
        stage: Some(stage as f64),
        verification: vec![],
    };

    let mut result = run_pipeline(&ctx, &request).await;
    result.workshop.generated_at = Some(Utc::now().to_rfc3339());

    info!(
        "Result: {} finding(s), {} edit(s), tone {}, review recommended: {}",
        result.analysis.findings.len(),
        result.rewrite.ops.len(),
        result.analysis.tone.polarity,
        result.human_review_recommended.is_some()
    );

    let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write output file: {:?}", path))?;
            info!("Result written to {:?}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Resolution order: explicit flag, RULESET_PATH env var, conventional
/// data/ path. A missing file is fine - the pipeline degrades to an empty
/// ruleset.
fn resolve_ruleset_source(flag: Option<PathBuf>) -> Option<PathBuf> {
    if flag.is_some() {
        return flag;
    }
    if let Ok(path) = std::env::var("RULESET_PATH") {
        return Some(PathBuf::from(path));
    }
    Some(PathBuf::from("data/ruleset.json"))
}

fn print_stages() {
    println!("Stage catalog");
    println!("=============");
    for chunk in &STAGE_CHUNKS {
        println!("{}: {}", chunk.id, chunk.title);
    }
    println!();
    println!("Conditional behavior:");
    println!(
        "- stage >= {}: higher-stage rules override lower-stage rules",
        OVERRIDE_NOTE_STAGE
    );
    println!(
        "- stage >= {}: findings aggregated into a review recommendation",
        RISK_SCORING_STAGE
    );
    println!(
        "- stage >= {}: spans and lede candidate requested from the rewrite agent",
        SPANS_APPENDIX_STAGE
    );
    println!(
        "- stage >= {}: concurrent sanity check; fact-check gating",
        SANITY_CHECK_STAGE
    );
    println!(
        "- stage >= {}: SUS term gate and lede reconstruction",
        TERM_GATING_STAGE
    );
}
