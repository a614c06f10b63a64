use coeo_types::{CoeoError, CoeoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Where and how engine events are logged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Baseline level for every target.
    pub level: LogLevel,
    /// Per-module overrides in `target=level` form, e.g.
    /// `coeo_governance::voting=debug` to trace tallies only.
    pub directives: Vec<String>,
    pub format: LogFormat,
    /// Appends to this file instead of stdout.
    pub file: Option<PathBuf>,
    pub timestamps: bool,
    pub source_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            directives: Vec::new(),
            format: LogFormat::Plain,
            file: None,
            timestamps: true,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Filter string for `EnvFilter`: the baseline level followed by the overrides.
    pub fn filter(&self) -> String {
        std::iter::once(self.level.to_string())
            .chain(self.directives.iter().cloned())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn validate(&self) -> CoeoResult<()> {
        if let Some(ref file) = self.file {
            if file.as_os_str().is_empty() {
                return Err(CoeoError::Config("logging.file cannot be empty".into()));
            }
        }

        for directive in &self.directives {
            let Some((target, level)) = directive.split_once('=') else {
                return Err(CoeoError::Config(format!(
                    "logging directive {:?} must look like target=level",
                    directive
                )));
            };
            if target.is_empty() || target.contains(',') || level.parse::<LogLevel>().is_err() {
                return Err(CoeoError::Config(format!(
                    "invalid logging directive {:?}",
                    directive
                )));
            }
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl FromStr for LogFormat {
    type Err = CoeoError;

    fn from_str(s: &str) -> CoeoResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(LogFormat::Plain),
            "json" => Ok(LogFormat::Json),
            other => Err(CoeoError::Config(format!("unknown log format {:?}", other))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = CoeoError;

    fn from_str(s: &str) -> CoeoResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(CoeoError::Config(format!("unknown log level {:?}", other))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}
