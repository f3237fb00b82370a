//! Scenario configuration for the conformance harness.
//!
//! The harness consumes a JSON file listing scenario definitions:
//!
//! ```json
//! {
//!   "scenarios": [
//!     {
//!       "name": "pw-valid",
//!       "host": "10.0.0.5",
//!       "port": 22,
//!       "username": "alice",
//!       "auth_type": "password",
//!       "secret_ref": "secrets/alice.pass",
//!       "expected": "authenticate",
//!       "retries": 2,
//!       "timeout": 15
//!     }
//!   ]
//! }
//! ```
//!
//! Unknown fields are ignored. Missing required fields produce a
//! configuration error naming the scenario and the field. Secrets are
//! referenced by file path only; no ambient environment variables are
//! consulted for credential material.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::harness::error::HarnessError;
use crate::harness::types::{Endpoint, ExpectedOutcome, RetryPolicy};

/// Default SSH port when a scenario does not specify one.
pub(crate) const DEFAULT_SSH_PORT: u16 = 22;

/// Default per-attempt timeout in seconds, unless overridden per scenario or
/// via the CLI.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Initial delay between re-attempts.
pub(crate) const RETRY_MIN_DELAY: Duration = Duration::from_millis(500);

/// Maximum delay between re-attempts (backoff cap).
pub(crate) const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Credential mechanism exercised by a scenario. Exactly one per scenario;
/// mixed-auth negotiation is out of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    Password,
    Key,
}

/// Expected verdict side of a scenario, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    Authenticate,
    Reject,
}

impl From<Expectation> for ExpectedOutcome {
    fn from(value: Expectation) -> Self {
        match value {
            Expectation::Authenticate => ExpectedOutcome::MustAuthenticate,
            Expectation::Reject => ExpectedOutcome::MustReject,
        }
    }
}

/// One scenario definition as written in the configuration file.
///
/// All fields are optional at parse time so that validation can name the
/// scenario and field precisely instead of failing with a generic serde
/// error. Unknown fields are ignored by design.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub auth_type: Option<AuthType>,
    /// Path to a file holding the password (password auth).
    #[serde(default)]
    pub secret_ref: Option<PathBuf>,
    /// Path to a PEM private key file (key auth).
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    /// Path to a file holding the key passphrase, if the key is encrypted.
    #[serde(default)]
    pub key_passphrase_ref: Option<PathBuf>,
    #[serde(default)]
    pub expected: Option<Expectation>,
    /// Re-attempt budget for transient failures; defaults depend on
    /// `expected` when absent.
    #[serde(default)]
    pub retries: Option<u32>,
    /// Per-attempt timeout in seconds, overriding the run default.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl ScenarioSpec {
    /// Name used in error messages before validation has confirmed one.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Validated scenario name.
    pub fn scenario_name(&self) -> Result<&str, HarnessError> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(HarnessError::missing_field(self.display_name(), "name")),
        }
    }

    /// Build the target endpoint, applying the run-level timeout default.
    pub fn endpoint(&self, default_timeout: Duration) -> Result<Endpoint, HarnessError> {
        let host = match self.host.as_deref() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(HarnessError::missing_field(self.display_name(), "host")),
        };
        let connect_timeout = self
            .timeout
            .map(Duration::from_secs)
            .unwrap_or(default_timeout);
        Ok(Endpoint {
            host,
            port: self.port.unwrap_or(DEFAULT_SSH_PORT),
            connect_timeout,
        })
    }

    /// Expected outcome, required for every scenario.
    pub fn expected_outcome(&self) -> Result<ExpectedOutcome, HarnessError> {
        self.expected
            .map(ExpectedOutcome::from)
            .ok_or_else(|| HarnessError::missing_field(self.display_name(), "expected"))
    }

    /// Retry budget: explicit `retries` wins, otherwise the default for the
    /// scenario's expectation.
    pub fn retry_policy(&self, expected: ExpectedOutcome) -> RetryPolicy {
        self.retries
            .map(RetryPolicy::new)
            .unwrap_or_else(|| RetryPolicy::default_for(expected))
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

impl HarnessConfig {
    /// Load and parse the configuration file. A malformed document is fatal
    /// to the run (exit code 2), unlike per-scenario field problems which
    /// only fail the affected scenario.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            HarnessError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: HarnessConfig = serde_json::from_str(&raw)
            .map_err(|e| HarnessError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.check_names()?;
        Ok(config)
    }

    /// Scenario names must be present and unique: the report aggregator is
    /// keyed by name, and a duplicate would make `record` ambiguous.
    fn check_names(&self) -> Result<(), HarnessError> {
        let mut seen = HashSet::new();
        for spec in &self.scenarios {
            let name = spec.scenario_name()?;
            if !seen.insert(name.to_string()) {
                return Err(HarnessError::DuplicateScenario {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}
