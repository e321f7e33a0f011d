use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rally_core::game::match_state::new_match_id;
use rally_core::model::score::{GameScore, PointScore, SetScore};
use rally_core::sync::summary::score_summary;
use rally_core::{
    Clock, EventKind, ManualClock, MatchSession, MatchState, RealtimeFragment, Side, Summary,
};
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{ReplayScript, ResolvedOutputs, Step};
use crate::logging::{TELEMETRY_FILE, telemetry_dir};
use crate::report::{ReplayReport, ReportError};

/// Drives a scripted match through a session on a manual clock.
pub struct ScriptRunner {
    script: ReplayScript,
    outputs: ResolvedOutputs,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub steps_applied: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub report: ReplayReport,
}

impl ScriptRunner {
    /// Build a runner from a validated script.
    pub fn new(script: ReplayScript, outputs: ResolvedOutputs) -> Self {
        Self {
            logging_enabled: script.logging.enable_structured,
            script,
            outputs,
        }
    }

    /// Apply every step, streaming one JSONL row per step to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let session = MatchSession::new(ManualClock::new(self.script.start_time_ms));
        let mut rng = StdRng::seed_from_u64(self.script.seed.unwrap_or(0));
        let match_id = new_match_id(session.clock().now_ms(), &mut rng);

        let mut state = session
            .create(self.script.match_config.clone())
            .with_match_id(match_id.clone());
        let mut rows_written = 0usize;

        for (step_index, step) in self.script.steps.iter().enumerate() {
            state = apply_step(&session, &state, step);
            state = session.tick(&state);

            if self.script.verify_reconstruction {
                self.verify(&session, &state, &match_id, step_index)?;
            }

            let row = StepRow::new(&self.script.run_id, &match_id, step_index, step, &state);
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            rows_written += 1;

            if self.logging_enabled && tracing::enabled!(Level::INFO) {
                event!(
                    target: "rally_replay::step",
                    Level::INFO,
                    run_id = %self.script.run_id,
                    step_index = step_index as u64,
                    action = %row.action,
                    score = %row.score_summary,
                    server = %row.server,
                    match_over = row.match_over,
                    "step applied"
                );
            }
        }

        writer.flush()?;

        let steps_applied = self.script.steps.len();
        let report = ReplayReport::from_state(&self.script.run_id, &state, steps_applied);
        report.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| telemetry_dir(&self.outputs).join(TELEMETRY_FILE));

        Ok(RunSummary {
            steps_applied,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
            report,
        })
    }

    /// Publish both documents, read them back and rebuild; the rebuilt
    /// match must carry the same score.
    fn verify(
        &self,
        session: &MatchSession<ManualClock>,
        state: &MatchState,
        match_id: &str,
        step_index: usize,
    ) -> Result<(), RunnerError> {
        let summary_json =
            Summary::from_state(state, match_id, &self.script.creator_uid).to_json()?;
        let realtime_json = RealtimeFragment::from_state(state).to_json()?;
        let summary = Summary::from_json(&summary_json)?;
        let realtime = RealtimeFragment::from_json(&realtime_json)?;

        let rebuilt = session.reconstruct(&summary, Some(&realtime), &self.script.match_config);
        match drift_field(state, &rebuilt) {
            Some(field) => Err(RunnerError::Drift { step_index, field }),
            None => Ok(()),
        }
    }
}

fn apply_step(
    session: &MatchSession<ManualClock>,
    state: &MatchState,
    step: &Step,
) -> MatchState {
    match step {
        Step::Point(side) => session.score_point(state, *side),
        Step::Undo => session.undo(state),
        Step::TogglePause => session.toggle_pause(state),
        Step::Tick(seconds) => {
            session.clock().advance_secs(*seconds);
            state.clone()
        }
        Step::Edit(config) => session.edit_config(state, config.clone()),
    }
}

/// First score field that differs between the live and rebuilt match.
fn drift_field(live: &MatchState, rebuilt: &MatchState) -> Option<&'static str> {
    let checks = [
        ("sets", live.sets() == rebuilt.sets()),
        ("games", live.games() == rebuilt.games()),
        ("points", live.points() == rebuilt.points()),
        ("is_tie_break", live.is_tie_break() == rebuilt.is_tie_break()),
        ("server", live.server() == rebuilt.server()),
        ("is_paused", live.is_paused() == rebuilt.is_paused()),
        ("history", live.history().len() == rebuilt.history().len()),
    ];
    checks
        .into_iter()
        .find(|(_, matches)| !matches)
        .map(|(field, _)| field)
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct StepRow<'a> {
    run_id: &'a str,
    match_id: &'a str,
    step_index: usize,
    action: String,
    score_summary: String,
    points: PointScore,
    games: GameScore,
    sets: Vec<SetScore>,
    server: Side,
    tie_break: bool,
    switch_sides: bool,
    paused: bool,
    match_over: bool,
    winner: Option<Side>,
    duration_seconds: u64,
    history_len: usize,
    last_event: Option<EventKind>,
}

impl<'a> StepRow<'a> {
    fn new(
        run_id: &'a str,
        match_id: &'a str,
        step_index: usize,
        step: &Step,
        state: &MatchState,
    ) -> Self {
        Self {
            run_id,
            match_id,
            step_index,
            action: step.label(),
            score_summary: score_summary(state),
            points: *state.points(),
            games: *state.games(),
            sets: state.sets().to_vec(),
            server: state.server(),
            tie_break: state.is_tie_break(),
            switch_sides: state.should_switch_sides(),
            paused: state.is_paused(),
            match_over: state.is_match_over(),
            winner: state.winner(),
            duration_seconds: state.duration_seconds(),
            history_len: state.history().len(),
            last_event: state.last_event().map(|event| event.kind),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("report error: {0}")]
    Report(#[from] ReportError),
    #[error("reconstruction drifted on '{field}' after step {step_index}")]
    Drift {
        step_index: usize,
        field: &'static str,
    },
}
