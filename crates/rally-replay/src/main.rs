use std::path::PathBuf;

use clap::Parser;

use rally_replay::config::{ReplayScript, ResolvedOutputs};
use rally_replay::logging::init_logging;
use rally_replay::runner::ScriptRunner;

/// Replays a scripted match through the scoring engine.
#[derive(Debug, Parser)]
#[command(
    name = "rally-replay",
    author,
    version,
    about = "Deterministic match replay for the rally scoring engine"
)]
struct Cli {
    /// Path to the YAML replay script.
    #[arg(short, long, value_name = "FILE", default_value = "scripts/demo.yaml")]
    script: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the RNG seed used for the match id.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the script (nothing is replayed).
    #[arg(long)]
    validate_only: bool,

    /// Rebuild the match from its published documents after every step.
    #[arg(long)]
    verify_reconstruction: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut script = ReplayScript::from_path(&cli.script)?;

    if let Some(run_id) = cli.run_id {
        script.run_id = run_id;
    }

    if let Some(seed) = cli.seed {
        script.seed = Some(seed);
    }

    if cli.verify_reconstruction {
        script.verify_reconstruction = true;
    }

    script.validate()?;

    let outputs: ResolvedOutputs = script.resolved_outputs();
    let run_id = script.run_id.clone();
    let step_count = script.steps.len();

    println!(
        "Loaded script '{run_id}' with {step_count} step{}",
        if step_count == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        println!("Validation-only mode: replay skipped.");
        return Ok(());
    }

    let _logging_guard = init_logging(&script.logging, &outputs)?;
    let runner = ScriptRunner::new(script, outputs);
    let summary = runner.run()?;

    println!(
        "Replay complete for '{run_id}': {} steps → {} rows at {}",
        summary.steps_applied,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!(
        "Final score {} ({}), elapsed {}",
        summary.report.final_score,
        summary
            .report
            .winner
            .as_deref()
            .map_or_else(|| "in progress".to_string(), |name| format!("won by {name}")),
        summary.report.duration
    );
    println!("Summary: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
