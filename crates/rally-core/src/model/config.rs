use crate::model::side::{Side, SidePair};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Points needed to take a super tie-break, whatever `tie_break_points` says.
pub const SUPER_TIE_BREAK_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinalSetType {
    Standard,
    #[default]
    SuperTieBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    #[default]
    Singles,
    Doubles,
}

/// Rules and labels of a match. Missing fields take the stock values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchConfig {
    pub names: SidePair<String>,
    pub colors: SidePair<Option<String>>,
    pub partner_names: SidePair<Option<String>>,
    pub partner_colors: SidePair<Option<String>>,
    pub sets_to_win: u8,
    pub use_advantage: bool,
    pub final_set_type: FinalSetType,
    pub tie_break_at: u32,
    pub tie_break_points: u32,
    pub mode: MatchMode,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            names: SidePair::new("Player 1".to_string(), "Player 2".to_string()),
            colors: SidePair::new(Some("blue".to_string()), Some("red".to_string())),
            partner_names: SidePair::splat(None),
            partner_colors: SidePair::splat(None),
            sets_to_win: 2,
            use_advantage: false,
            final_set_type: FinalSetType::SuperTieBreak,
            tie_break_at: 6,
            tie_break_points: 7,
            mode: MatchMode::Singles,
        }
    }
}

impl MatchConfig {
    pub fn name(&self, side: Side) -> &str {
        &self.names[side]
    }

    /// One-based number of the last possible set (best of `2n - 1`).
    pub fn deciding_set_number(&self) -> usize {
        (usize::from(self.sets_to_win) * 2).saturating_sub(1)
    }

    pub fn is_deciding_set(&self, set_index: usize) -> bool {
        set_index + 1 == self.deciding_set_number()
    }

    /// Whether the set at `set_index` is played as a single super tie-break.
    pub fn plays_super_tie_break(&self, set_index: usize) -> bool {
        self.final_set_type == FinalSetType::SuperTieBreak && self.is_deciding_set(set_index)
    }

    /// Points needed to win a tie-break in the set at `set_index`.
    pub fn tie_break_target(&self, set_index: usize) -> u32 {
        if self.plays_super_tie_break(set_index) {
            SUPER_TIE_BREAK_POINTS
        } else {
            self.tie_break_points
        }
    }

    pub fn is_doubles(&self) -> bool {
        self.mode == MatchMode::Doubles
    }

    /// Check the rule fields. The engine itself never rejects a config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3).contains(&self.sets_to_win) {
            return Err(ConfigError::SetsToWin(self.sets_to_win));
        }
        if self.tie_break_at < 1 {
            return Err(ConfigError::TieBreakAt(self.tie_break_at));
        }
        if self.tie_break_points < 1 {
            return Err(ConfigError::TieBreakPoints(self.tie_break_points));
        }
        for side in Side::BOTH {
            if self.names[side].trim().is_empty() {
                return Err(ConfigError::EmptyName(side));
            }
        }
        Ok(())
    }
}

/// A config as carried inside a published summary, where any field may be
/// missing. Absent fields leave the base config untouched on merge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialMatchConfig {
    pub names: SidePair<Option<String>>,
    pub colors: SidePair<Option<String>>,
    pub partner_names: SidePair<Option<String>>,
    pub partner_colors: SidePair<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets_to_win: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_advantage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_set_type: Option<FinalSetType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tie_break_at: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tie_break_points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<MatchMode>,
}

impl PartialMatchConfig {
    /// Overlay the present fields onto `base`.
    pub fn apply_to(&self, mut base: MatchConfig) -> MatchConfig {
        for side in Side::BOTH {
            if let Some(name) = &self.names[side] {
                base.names[side] = name.clone();
            }
            overlay(&mut base.colors[side], &self.colors[side]);
            overlay(&mut base.partner_names[side], &self.partner_names[side]);
            overlay(&mut base.partner_colors[side], &self.partner_colors[side]);
        }
        base.sets_to_win = self.sets_to_win.unwrap_or(base.sets_to_win);
        base.use_advantage = self.use_advantage.unwrap_or(base.use_advantage);
        base.final_set_type = self.final_set_type.unwrap_or(base.final_set_type);
        base.tie_break_at = self.tie_break_at.unwrap_or(base.tie_break_at);
        base.tie_break_points = self.tie_break_points.unwrap_or(base.tie_break_points);
        base.mode = self.mode.unwrap_or(base.mode);
        base
    }
}

fn overlay(slot: &mut Option<String>, value: &Option<String>) {
    if value.is_some() {
        slot.clone_from(value);
    }
}

impl From<&MatchConfig> for PartialMatchConfig {
    fn from(config: &MatchConfig) -> Self {
        Self {
            names: config.names.map(|_, name| Some(name.clone())),
            colors: config.colors.clone(),
            partner_names: config.partner_names.clone(),
            partner_colors: config.partner_colors.clone(),
            sets_to_win: Some(config.sets_to_win),
            use_advantage: Some(config.use_advantage),
            final_set_type: Some(config.final_set_type),
            tie_break_at: Some(config.tie_break_at),
            tie_break_points: Some(config.tie_break_points),
            mode: Some(config.mode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("setsToWin must be 1, 2 or 3 but was {0}")]
    SetsToWin(u8),
    #[error("tieBreakAt must be at least 1 but was {0}")]
    TieBreakAt(u32),
    #[error("tieBreakPoints must be at least 1 but was {0}")]
    TieBreakPoints(u32),
    #[error("name for side {0} must not be empty")]
    EmptyName(Side),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_best_of_three_with_super_tie_break() {
        let config = MatchConfig::default();
        assert_eq!(config.deciding_set_number(), 3);
        assert!(config.plays_super_tie_break(2));
        assert!(!config.plays_super_tie_break(1));
        assert_eq!(config.tie_break_target(0), 7);
        assert_eq!(config.tie_break_target(2), SUPER_TIE_BREAK_POINTS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn standard_final_set_keeps_configured_target() {
        let config = MatchConfig {
            final_set_type: FinalSetType::Standard,
            tie_break_points: 5,
            ..MatchConfig::default()
        };
        assert_eq!(config.tie_break_target(2), 5);
    }

    #[test]
    fn validate_rejects_out_of_range_rules() {
        let config = MatchConfig {
            sets_to_win: 4,
            ..MatchConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::SetsToWin(4)));

        let config = MatchConfig {
            tie_break_at: 0,
            ..MatchConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::TieBreakAt(0)));

        let mut config = MatchConfig::default();
        config.names[Side::B] = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyName(Side::B)));
    }

    #[test]
    fn partial_json_takes_stock_values() {
        let config: MatchConfig =
            serde_json::from_str(r#"{"setsToWin": 3, "useAdvantage": true, "mode": "doubles"}"#)
                .unwrap();
        assert_eq!(config.sets_to_win, 3);
        assert!(config.use_advantage);
        assert!(config.is_doubles());
        assert_eq!(config.name(Side::A), "Player 1");
        assert_eq!(config.final_set_type, FinalSetType::SuperTieBreak);
    }

    #[test]
    fn partial_overlays_only_present_fields() {
        let mut base = MatchConfig {
            use_advantage: true,
            tie_break_at: 4,
            ..MatchConfig::default()
        };
        base.names[Side::A] = "Home".to_string();

        let mut partial = PartialMatchConfig {
            sets_to_win: Some(3),
            ..PartialMatchConfig::default()
        };
        partial.names[Side::B] = Some("Away".to_string());
        partial.colors[Side::A] = Some("teal".to_string());

        let merged = partial.apply_to(base);
        assert_eq!(merged.sets_to_win, 3);
        assert!(merged.use_advantage);
        assert_eq!(merged.tie_break_at, 4);
        assert_eq!(merged.name(Side::A), "Home");
        assert_eq!(merged.name(Side::B), "Away");
        assert_eq!(merged.colors[Side::A].as_deref(), Some("teal"));
        assert_eq!(merged.colors[Side::B].as_deref(), Some("red"));
    }

    #[test]
    fn full_partial_reproduces_config() {
        let config = MatchConfig {
            sets_to_win: 1,
            final_set_type: FinalSetType::Standard,
            mode: MatchMode::Doubles,
            ..MatchConfig::default()
        };
        let partial = PartialMatchConfig::from(&config);
        let mut base = MatchConfig::default();
        base.names[Side::A] = "Other".to_string();
        assert_eq!(partial.apply_to(base), config);
    }
}
