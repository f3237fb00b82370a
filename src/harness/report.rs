//! Report aggregation.
//!
//! Collects scenario results in completion order and finalizes them into a
//! read-only [`Report`]. The aggregator is owned by a single collector task;
//! results arrive over a channel, so no mutual exclusion is needed beyond
//! that single-writer discipline.

use std::collections::HashSet;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::harness::error::HarnessError;
use crate::harness::types::{
    Report, ReportSummary, ScenarioReportEntry, ScenarioResult, Verdict,
};

/// Accumulates scenario results for one run.
pub struct ReportAggregator {
    started: Instant,
    started_at: String,
    results: Vec<ScenarioResult>,
    seen: HashSet<String>,
}

impl ReportAggregator {
    /// Create an empty aggregator stamped with the run start time.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            results: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Record one completed scenario.
    ///
    /// Recording the same scenario name twice is a configuration error:
    /// entries are keyed by name and a duplicate would make the report
    /// ambiguous.
    pub fn record(&mut self, result: ScenarioResult) -> Result<(), HarnessError> {
        if !self.seen.insert(result.scenario.clone()) {
            return Err(HarnessError::DuplicateScenario {
                name: result.scenario,
            });
        }
        info!(
            scenario = %result.scenario,
            verdict = %result.verdict,
            attempts = result.attempts.len(),
            "scenario recorded"
        );
        self.results.push(result);
        Ok(())
    }

    /// Number of results recorded so far.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Finalize into a read-only report. Entries keep completion order.
    pub fn finalize(self) -> Report {
        let total_elapsed_ms = self.started.elapsed().as_millis() as u64;
        let mut passed = 0usize;
        let mut failed = 0usize;
        let scenarios: Vec<ScenarioReportEntry> = self
            .results
            .into_iter()
            .map(|result| {
                match result.verdict {
                    Verdict::Pass => passed += 1,
                    Verdict::Fail => failed += 1,
                }
                ScenarioReportEntry {
                    name: result.scenario.clone(),
                    verdict: result.verdict,
                    outcome: result.final_outcome(),
                    attempts: result.attempts.len(),
                    elapsed_ms: result.total_elapsed().as_millis() as u64,
                    failure_reason: result.failure_reason,
                }
            })
            .collect();

        Report {
            started_at: self.started_at,
            total_elapsed_ms,
            summary: ReportSummary {
                total: scenarios.len(),
                passed,
                failed,
            },
            scenarios,
        }
    }
}

impl Default for ReportAggregator {
    fn default() -> Self {
        Self::new()
    }
}
