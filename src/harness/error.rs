//! Harness error taxonomy.
//!
//! Only configuration problems surface as errors. Network-layer failures
//! (unreachable host, timeout, protocol breakage, auth refusal) are never
//! errors here: they are classified into outcome kinds and absorbed into
//! scenario results.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Malformed or incomplete scenario definition. Names the scenario and
    /// the offending field so a config author can fix it directly.
    #[error("scenario `{scenario}`: {message}")]
    Configuration { scenario: String, message: String },

    /// The same scenario name was recorded twice into one report.
    #[error("duplicate scenario result recorded for `{name}`")]
    DuplicateScenario { name: String },

    /// The configuration file itself could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Shorthand for a per-scenario configuration failure.
    pub fn configuration(scenario: impl Into<String>, message: impl Into<String>) -> Self {
        HarnessError::Configuration {
            scenario: scenario.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a missing required field.
    pub fn missing_field(scenario: impl Into<String>, field: &str) -> Self {
        HarnessError::Configuration {
            scenario: scenario.into(),
            message: format!("missing required field `{field}`"),
        }
    }
}
