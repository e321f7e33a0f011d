use std::fs;
use std::path::Path;

use rally_core::game::clock::format_duration;
use rally_core::sync::summary::score_summary;
use rally_core::{EventKind, MatchState, Side};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// End-of-run digest of a replayed match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub run_id: String,
    pub match_id: String,
    pub players: [String; 2],
    pub final_score: String,
    pub winner: Option<String>,
    pub duration: String,
    pub steps_applied: usize,
    pub event_counts: Vec<(EventKind, usize)>,
}

impl ReplayReport {
    pub fn from_state(run_id: &str, state: &MatchState, steps_applied: usize) -> Self {
        let config = state.config();
        let event_counts = EventKind::ALL
            .iter()
            .map(|kind| {
                let count = state
                    .history()
                    .iter()
                    .filter(|event| event.kind == *kind)
                    .count();
                (*kind, count)
            })
            .collect();

        Self {
            run_id: run_id.to_string(),
            match_id: state.match_id().unwrap_or_default().to_string(),
            players: Side::BOTH.map(|side| config.name(side).to_string()),
            final_score: final_score(state),
            winner: state.winner().map(|side| config.name(side).to_string()),
            duration: format_duration(state.duration_seconds()),
            steps_applied,
            event_counts,
        }
    }

    pub fn event_count(&self, kind: EventKind) -> usize {
        self.event_counts
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map_or(0, |(_, count)| *count)
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Replay Summary\n\n");
        out.push_str(&format!("Run: `{}` (match `{}`)\n\n", self.run_id, self.match_id));
        out.push_str(&format!("{} vs {}\n\n", self.players[0], self.players[1]));
        out.push_str(&format!("- Final score: {}\n", self.final_score));
        out.push_str(&format!(
            "- Winner: {}\n",
            self.winner.as_deref().unwrap_or("in progress")
        ));
        out.push_str(&format!("- Duration: {}\n", self.duration));
        out.push_str(&format!("- Steps applied: {}\n\n", self.steps_applied));

        out.push_str("| Event | Count |\n");
        out.push_str("|-------|-------|\n");
        for (kind, count) in &self.event_counts {
            out.push_str(&format!("| {} | {} |\n", kind.as_str(), count));
        }
        out
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        fs::write(path.as_ref(), self.to_markdown()).map_err(|source| ReportError::Io {
            context: "writing summary markdown",
            source,
        })
    }
}

/// Every set once the match is over, otherwise the live summary.
fn final_score(state: &MatchState) -> String {
    if !state.is_match_over() {
        return score_summary(state);
    }
    state
        .sets()
        .iter()
        .map(|set| format!("{}-{}", set[Side::A], set[Side::B]))
        .collect::<Vec<_>>()
        .join(", ")
}
