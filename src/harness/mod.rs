//! SSH authentication conformance harness.
//!
//! Drives SSH connection attempts against a target host with each configured
//! credential mechanism, classifies the outcome, asserts it against the
//! scenario's expected verdict, and aggregates a structured report.
//!
//! Submodules:
//!
//! - `types`: core data model (endpoints, credentials, outcomes, report)
//! - `config`: scenario configuration file parsing and validation
//! - `credentials`: credential provider resolving secret material from disk
//! - `classify`: raw signal to outcome kind classification
//! - `session`: russh client handler
//! - `auth`: credential offering strategies (password, key)
//! - `attempt`: bounded-time connection attempt executor
//! - `runner`: per-scenario state machine and concurrent orchestration
//! - `report`: result aggregation and report finalization
//! - `error`: harness error taxonomy

pub mod attempt;
pub mod auth;
pub mod classify;
pub mod config;
pub mod credentials;
pub mod error;
pub mod report;
pub mod runner;
pub mod session;
pub mod types;

pub use attempt::{Attempter, SshAttempter};
pub use config::{DEFAULT_CONNECT_TIMEOUT_SECS, HarnessConfig, ScenarioSpec};
pub use error::HarnessError;
pub use report::ReportAggregator;
pub use runner::{RunOptions, run_scenarios};
pub use types::{Report, Verdict};
