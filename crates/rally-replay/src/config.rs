use rally_core::{MatchConfig, Side};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_START_TIME_MS: i64 = 1_700_000_000_000;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root replay script loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ReplayScript {
    pub run_id: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default, rename = "match")]
    pub match_config: MatchConfig,
    #[serde(default = "default_start_time_ms")]
    pub start_time_ms: i64,
    #[serde(default = "default_creator_uid")]
    pub creator_uid: String,
    pub steps: Vec<Step>,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub verify_reconstruction: bool,
}

impl ReplayScript {
    /// Load a script from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ScriptError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut script: ReplayScript =
            serde_yaml::from_reader(reader).map_err(|source| ScriptError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        script.validate().map_err(|source| ScriptError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(script)
    }

    /// Validate the script without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.match_config
            .validate()
            .map_err(|err| ValidationError::InvalidField {
                field: "match".to_string(),
                message: err.to_string(),
            })?;
        validate_steps(&self.steps)?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// One scripted action, applied through the match session.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Point(Side),
    Undo,
    TogglePause,
    Tick(u64),
    Edit(MatchConfig),
}

impl Step {
    pub fn label(&self) -> String {
        match self {
            Step::Point(side) => format!("point:{side}"),
            Step::Undo => "undo".to_string(),
            Step::TogglePause => "toggle_pause".to_string(),
            Step::Tick(seconds) => format!("tick:{seconds}"),
            Step::Edit(_) => "edit".to_string(),
        }
    }
}

fn validate_steps(steps: &[Step]) -> Result<(), ValidationError> {
    if steps.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "steps".to_string(),
            message: "at least one step must be specified".to_string(),
        });
    }

    for (index, step) in steps.iter().enumerate() {
        if let Step::Edit(config) = step {
            config
                .validate()
                .map_err(|err| ValidationError::InvalidField {
                    field: format!("steps[{index}].edit"),
                    message: err.to_string(),
                })?;
        }
    }

    Ok(())
}

fn default_start_time_ms() -> i64 {
    DEFAULT_START_TIME_MS
}

fn default_creator_uid() -> String {
    "replay".to_string()
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    PathBuf::from(template.replace("{run_id}", run_id))
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading replay scripts.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse script {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid script {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ScriptError {
    pub fn path(&self) -> &Path {
        match self {
            ScriptError::Read { path, .. }
            | ScriptError::Parse { path, .. }
            | ScriptError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}
