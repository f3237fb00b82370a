//! Scenario execution.
//!
//! Each scenario walks a fixed sequence: Setup (resolve credentials) ->
//! Attempting (bounded attempts with retry on transient failures) ->
//! Verifying (compare final outcome to expectation) -> Teardown -> Done.
//! A configuration error short-circuits into the Failed state before any
//! network activity.
//!
//! Scenarios are isolated: each resolves its own credential descriptor and
//! every attempt opens its own connection. Across scenarios, execution is
//! parallel up to a configured concurrency bound; within one scenario, steps
//! are strictly sequential.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use futures::future::join_all;
use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::harness::attempt::Attempter;
use crate::harness::config::{MAX_RETRY_DELAY, RETRY_MIN_DELAY, ScenarioSpec};
use crate::harness::credentials;
use crate::harness::error::HarnessError;
use crate::harness::report::ReportAggregator;
use crate::harness::types::{
    AttemptResult, ExpectedOutcome, OutcomeKind, Report, Scenario, ScenarioResult, Verdict,
};

/// Runner states, logged as the scenario progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunnerState {
    Setup,
    Attempting,
    Verifying,
    Teardown,
    Done,
    Failed,
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerState::Setup => write!(f, "setup"),
            RunnerState::Attempting => write!(f, "attempting"),
            RunnerState::Verifying => write!(f, "verifying"),
            RunnerState::Teardown => write!(f, "teardown"),
            RunnerState::Done => write!(f, "done"),
            RunnerState::Failed => write!(f, "failed"),
        }
    }
}

/// Run-level options applied to every scenario.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Maximum scenarios in flight at once.
    pub concurrency: usize,
    /// Per-attempt timeout unless a scenario overrides it.
    pub default_timeout: Duration,
}

/// Resolve a scenario definition into a runnable [`Scenario`].
///
/// This is the Setup phase: any failure here is a configuration error and
/// the scenario never touches the network.
fn prepare(spec: &ScenarioSpec, default_timeout: Duration) -> Result<Scenario, HarnessError> {
    let name = spec.scenario_name()?.to_string();
    let endpoint = spec.endpoint(default_timeout)?;
    let expected = spec.expected_outcome()?;
    let credential = credentials::resolve(spec)?;
    let retry_policy = spec.retry_policy(expected);
    Ok(Scenario {
        name,
        endpoint,
        credential,
        expected,
        retry_policy,
    })
}

/// Execute one scenario to completion.
///
/// Returns `None` when the run was cancelled before the scenario issued its
/// first attempt: such a scenario never completed and must not appear in the
/// report. An in-flight attempt is never force-killed; cancellation only
/// stops further attempts from being issued.
pub async fn run_scenario(
    spec: &ScenarioSpec,
    default_timeout: Duration,
    attempter: &dyn Attempter,
    cancel: &CancellationToken,
) -> Option<ScenarioResult> {
    // Not named `display`: tracing's event macros bring
    // `tracing::field::display` into scope, which would shadow the local.
    let label = spec.display_name().to_string();
    debug!(scenario = %label, state = %RunnerState::Setup, "scenario starting");

    let scenario = match prepare(spec, default_timeout) {
        Ok(scenario) => scenario,
        Err(e) => {
            warn!(scenario = %label, state = %RunnerState::Failed, error = %e, "setup failed");
            return Some(ScenarioResult::failed_before_attempt(label, e.to_string()));
        }
    };

    if cancel.is_cancelled() {
        info!(scenario = %scenario.name, "run cancelled before first attempt; scenario skipped");
        return None;
    }

    debug!(scenario = %scenario.name, state = %RunnerState::Attempting, "issuing attempts");
    let attempts = attempt_with_retry(&scenario, attempter, cancel).await;

    debug!(scenario = %scenario.name, state = %RunnerState::Verifying, "verifying outcome");
    let (verdict, failure_reason) = verify(scenario.expected, &attempts);

    // Teardown: the executor already closed its connection; nothing touches
    // the network from here on.
    debug!(scenario = %scenario.name, state = %RunnerState::Teardown, "teardown");
    info!(
        scenario = %scenario.name,
        state = %RunnerState::Done,
        %verdict,
        attempts = attempts.len(),
        "scenario finished"
    );

    Some(ScenarioResult {
        scenario: scenario.name,
        attempts,
        verdict,
        failure_reason,
    })
}

/// Issue attempts until a definitive outcome or the retry budget runs out.
///
/// Only `Unreachable` and `Timeout` are retried; `Rejected` and
/// `Authenticated` are definitive and `ProtocolError` will not self-correct.
/// `max_retries = n` bounds the loop at `n + 1` total attempts. Delays
/// between attempts come from a jittered exponential backoff.
async fn attempt_with_retry(
    scenario: &Scenario,
    attempter: &dyn Attempter,
    cancel: &CancellationToken,
) -> Vec<AttemptResult> {
    let budget = scenario.retry_policy.max_retries;
    let mut backoff = ExponentialBuilder::default()
        .with_min_delay(RETRY_MIN_DELAY)
        .with_max_delay(MAX_RETRY_DELAY)
        .with_max_times(budget as usize)
        .with_jitter()
        .build();

    let mut attempts = Vec::with_capacity(budget as usize + 1);
    for attempt_no in 0..=budget {
        if attempt_no > 0 && cancel.is_cancelled() {
            warn!(
                scenario = %scenario.name,
                "run cancelled; not issuing further attempts"
            );
            break;
        }

        let result = attempter
            .attempt(&scenario.endpoint, &scenario.credential)
            .await;
        let outcome = result.outcome;
        attempts.push(result);

        if !outcome.is_retryable() || attempt_no == budget {
            break;
        }

        let delay = backoff.next().unwrap_or(RETRY_MIN_DELAY);
        warn!(
            scenario = %scenario.name,
            %outcome,
            attempt = attempt_no + 1,
            ?delay,
            "transient outcome; re-attempting"
        );
        // A cancellation raised during the backoff pause must not wait the
        // pause out before being observed.
        tokio::select! {
            _ = cancel.cancelled() => {
                warn!(
                    scenario = %scenario.name,
                    "run cancelled during backoff; not issuing further attempts"
                );
                break;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
    attempts
}

/// Compare the final outcome to the expectation.
///
/// `MustAuthenticate` is satisfied only by `Authenticated`, `MustReject`
/// only by `Rejected`. Infrastructure failures (unreachable, timeout,
/// protocol breakage) always fail the scenario regardless of expectation:
/// an unreachable server is not evidence of correct rejection.
fn verify(
    expected: ExpectedOutcome,
    attempts: &[AttemptResult],
) -> (Verdict, Option<String>) {
    let Some(last) = attempts.last() else {
        return (
            Verdict::Fail,
            Some("no attempt was issued".to_string()),
        );
    };
    let total = attempts.len();

    match (last.outcome, expected) {
        (OutcomeKind::Authenticated, ExpectedOutcome::MustAuthenticate)
        | (OutcomeKind::Rejected, ExpectedOutcome::MustReject) => (Verdict::Pass, None),
        (OutcomeKind::Authenticated, ExpectedOutcome::MustReject) => (
            Verdict::Fail,
            Some("server granted access but rejection was expected".to_string()),
        ),
        (OutcomeKind::Rejected, ExpectedOutcome::MustAuthenticate) => (
            Verdict::Fail,
            Some("server rejected the credential but authentication was expected".to_string()),
        ),
        (OutcomeKind::Unreachable, _) => (
            Verdict::Fail,
            Some(format!("target unreachable after {total} attempt(s)")),
        ),
        (OutcomeKind::Timeout, _) => (
            Verdict::Fail,
            Some(format!(
                "no definitive response within the timeout after {total} attempt(s)"
            )),
        ),
        (OutcomeKind::ProtocolError, _) => (
            Verdict::Fail,
            Some(format!("protocol failure: {}", last.detail)),
        ),
    }
}

/// Run every scenario and aggregate the results into a finalized report.
///
/// Scenarios run as parallel tasks bounded by a semaphore. Results flow over
/// a channel to a single collector that owns the aggregator, so report
/// writes are serialized without shared-state locking.
pub async fn run_scenarios(
    specs: Vec<ScenarioSpec>,
    options: RunOptions,
    attempter: Arc<dyn Attempter>,
    cancel: CancellationToken,
) -> Result<Report, HarnessError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ScenarioResult>();

    let collector = tokio::spawn(async move {
        let mut aggregator = ReportAggregator::new();
        while let Some(result) = rx.recv().await {
            aggregator.record(result)?;
        }
        Ok::<ReportAggregator, HarnessError>(aggregator)
    });

    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let mut tasks = Vec::with_capacity(specs.len());
    for spec in specs {
        let semaphore = semaphore.clone();
        let attempter = attempter.clone();
        let cancel = cancel.clone();
        let tx = tx.clone();
        let default_timeout = options.default_timeout;
        tasks.push(tokio::spawn(async move {
            // The semaphore is never closed, so a failed acquire means the
            // run is tearing down; just bail.
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return;
            };
            if let Some(result) =
                run_scenario(&spec, default_timeout, attempter.as_ref(), &cancel).await
            {
                let _ = tx.send(result);
            }
        }));
    }
    drop(tx);

    join_all(tasks).await;

    let aggregator = collector
        .await
        .map_err(|e| HarnessError::InvalidConfig(format!("result collector panicked: {e}")))??;
    Ok(aggregator.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::config::AuthType;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted attempter: pops one outcome per call, repeating the last
    /// script entry once the script is exhausted.
    struct FakeAttempter {
        script: Mutex<VecDeque<OutcomeKind>>,
        last: OutcomeKind,
        calls: AtomicUsize,
    }

    impl FakeAttempter {
        fn new(script: &[OutcomeKind]) -> Self {
            let last = *script.last().unwrap_or(&OutcomeKind::ProtocolError);
            Self {
                script: Mutex::new(script.iter().copied().collect()),
                last,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Attempter for FakeAttempter {
        async fn attempt(
            &self,
            _endpoint: &crate::harness::types::Endpoint,
            _credential: &crate::harness::types::CredentialDescriptor,
        ) -> AttemptResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(self.last);
            AttemptResult {
                outcome,
                elapsed: Duration::from_millis(10),
                detail: "scripted".to_string(),
            }
        }
    }

    /// A scenario spec backed by a real temporary password file so Setup
    /// succeeds.
    fn spec_with_secret(
        dir: &tempfile::TempDir,
        name: &str,
        expected: crate::harness::config::Expectation,
        retries: Option<u32>,
    ) -> ScenarioSpec {
        let secret = dir.path().join(format!("{name}.pass"));
        fs::write(&secret, "s3cret-material\n").unwrap();
        ScenarioSpec {
            name: Some(name.to_string()),
            host: Some("198.51.100.7".to_string()),
            port: Some(22),
            username: Some("alice".to_string()),
            auth_type: Some(AuthType::Password),
            secret_ref: Some(secret),
            expected: Some(expected),
            retries,
            ..ScenarioSpec::default()
        }
    }

    use crate::harness::config::Expectation;

    mod verdicts {
        use super::*;

        #[tokio::test]
        async fn test_authenticated_satisfies_must_authenticate() {
            let dir = tempfile::tempdir().unwrap();
            let spec = spec_with_secret(&dir, "pw-valid", Expectation::Authenticate, None);
            let fake = FakeAttempter::new(&[OutcomeKind::Authenticated]);
            let cancel = CancellationToken::new();

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            assert_eq!(result.verdict, Verdict::Pass);
            assert_eq!(result.final_outcome(), Some(OutcomeKind::Authenticated));
            assert!(result.failure_reason.is_none());
        }

        #[tokio::test]
        async fn test_rejected_satisfies_must_reject() {
            let dir = tempfile::tempdir().unwrap();
            let spec = spec_with_secret(&dir, "pw-invalid", Expectation::Reject, None);
            let fake = FakeAttempter::new(&[OutcomeKind::Rejected]);
            let cancel = CancellationToken::new();

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            assert_eq!(result.verdict, Verdict::Pass);
        }

        #[tokio::test]
        async fn test_unexpected_grant_fails_must_reject() {
            let dir = tempfile::tempdir().unwrap();
            let spec = spec_with_secret(&dir, "pw-invalid", Expectation::Reject, None);
            let fake = FakeAttempter::new(&[OutcomeKind::Authenticated]);
            let cancel = CancellationToken::new();

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            assert_eq!(result.verdict, Verdict::Fail);
            assert!(result.failure_reason.unwrap().contains("granted"));
        }

        #[tokio::test]
        async fn test_unreachable_fails_regardless_of_expectation() {
            let dir = tempfile::tempdir().unwrap();
            for expected in [Expectation::Authenticate, Expectation::Reject] {
                let spec = spec_with_secret(&dir, "unreachable", expected, Some(0));
                let fake = FakeAttempter::new(&[OutcomeKind::Unreachable]);
                let cancel = CancellationToken::new();

                let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                    .await
                    .unwrap();
                assert_eq!(result.verdict, Verdict::Fail);
                assert!(result.failure_reason.unwrap().contains("unreachable"));
            }
        }
    }

    mod retry_policy {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_retry_bound_is_retries_plus_one() {
            let dir = tempfile::tempdir().unwrap();
            let spec = spec_with_secret(&dir, "flaky", Expectation::Authenticate, Some(2));
            let fake = FakeAttempter::new(&[OutcomeKind::Unreachable]);
            let cancel = CancellationToken::new();

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            assert_eq!(fake.calls(), 3);
            assert_eq!(result.attempts.len(), 3);
            assert_eq!(result.verdict, Verdict::Fail);
        }

        #[tokio::test(start_paused = true)]
        async fn test_transient_failure_then_success_passes() {
            let dir = tempfile::tempdir().unwrap();
            let spec = spec_with_secret(&dir, "flaky-ok", Expectation::Authenticate, Some(2));
            let fake = FakeAttempter::new(&[
                OutcomeKind::Timeout,
                OutcomeKind::Unreachable,
                OutcomeKind::Authenticated,
            ]);
            let cancel = CancellationToken::new();

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            assert_eq!(result.verdict, Verdict::Pass);
            assert_eq!(result.attempts.len(), 3);
            // Attempt ordering is total: retries follow prior classification.
            assert_eq!(result.attempts[0].outcome, OutcomeKind::Timeout);
            assert_eq!(result.attempts[1].outcome, OutcomeKind::Unreachable);
            assert_eq!(result.attempts[2].outcome, OutcomeKind::Authenticated);
        }

        #[tokio::test]
        async fn test_rejected_is_never_retried() {
            let dir = tempfile::tempdir().unwrap();
            let spec = spec_with_secret(&dir, "reject-fast", Expectation::Authenticate, Some(2));
            let fake = FakeAttempter::new(&[OutcomeKind::Rejected]);
            let cancel = CancellationToken::new();

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            assert_eq!(fake.calls(), 1);
            assert_eq!(result.verdict, Verdict::Fail);
        }

        #[tokio::test]
        async fn test_protocol_error_is_never_retried() {
            let dir = tempfile::tempdir().unwrap();
            let spec = spec_with_secret(&dir, "proto", Expectation::Authenticate, Some(2));
            let fake = FakeAttempter::new(&[OutcomeKind::ProtocolError]);
            let cancel = CancellationToken::new();

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            assert_eq!(fake.calls(), 1);
            assert!(result.failure_reason.unwrap().contains("protocol"));
        }

        #[tokio::test]
        async fn test_default_reject_scenario_does_not_retry_transients() {
            let dir = tempfile::tempdir().unwrap();
            let spec = spec_with_secret(&dir, "reject-default", Expectation::Reject, None);
            let fake = FakeAttempter::new(&[OutcomeKind::Timeout]);
            let cancel = CancellationToken::new();

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            assert_eq!(fake.calls(), 1);
            assert_eq!(result.verdict, Verdict::Fail);
        }
    }

    mod setup_failures {
        use super::*;

        #[tokio::test]
        async fn test_missing_secret_file_fails_without_attempts() {
            let spec = ScenarioSpec {
                name: Some("broken".to_string()),
                host: Some("h".to_string()),
                username: Some("u".to_string()),
                auth_type: Some(AuthType::Password),
                secret_ref: Some(PathBuf::from("/nonexistent/secret")),
                expected: Some(Expectation::Authenticate),
                ..ScenarioSpec::default()
            };
            let fake = FakeAttempter::new(&[OutcomeKind::Authenticated]);
            let cancel = CancellationToken::new();

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            assert_eq!(fake.calls(), 0);
            assert!(result.attempts.is_empty());
            assert_eq!(result.verdict, Verdict::Fail);
            assert!(result.failure_reason.unwrap().contains("secret_ref"));
        }

        #[tokio::test]
        async fn test_missing_expected_field_fails_setup() {
            let dir = tempfile::tempdir().unwrap();
            let mut spec = spec_with_secret(&dir, "no-expected", Expectation::Reject, None);
            spec.expected = None;
            let fake = FakeAttempter::new(&[OutcomeKind::Rejected]);
            let cancel = CancellationToken::new();

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            assert_eq!(fake.calls(), 0);
            assert!(result.failure_reason.unwrap().contains("expected"));
        }
    }

    mod cancellation {
        use super::*;

        #[tokio::test]
        async fn test_cancelled_before_start_issues_no_attempts() {
            let dir = tempfile::tempdir().unwrap();
            let spec = spec_with_secret(&dir, "cancelled", Expectation::Authenticate, None);
            let fake = FakeAttempter::new(&[OutcomeKind::Authenticated]);
            let cancel = CancellationToken::new();
            cancel.cancel();

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel).await;
            assert!(result.is_none());
            assert_eq!(fake.calls(), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn test_cancellation_interrupts_backoff_pause() {
            let dir = tempfile::tempdir().unwrap();
            let spec = spec_with_secret(&dir, "slow-cancel", Expectation::Authenticate, Some(2));
            let fake = FakeAttempter::new(&[OutcomeKind::Unreachable]);
            let cancel = CancellationToken::new();

            let canceller = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(1)).await;
                canceller.cancel();
            });

            let started = tokio::time::Instant::now();
            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            // The cancellation fires 1ms into the first backoff pause and
            // must end the scenario there, well before the minimum delay.
            assert!(started.elapsed() < RETRY_MIN_DELAY);
            assert_eq!(fake.calls(), 1);
            assert_eq!(result.attempts.len(), 1);
            assert_eq!(result.verdict, Verdict::Fail);
        }

        #[tokio::test(start_paused = true)]
        async fn test_cancellation_stops_retries_but_keeps_completed_attempts() {
            let dir = tempfile::tempdir().unwrap();
            let spec = spec_with_secret(&dir, "mid-cancel", Expectation::Authenticate, Some(2));

            /// Cancels the token as a side effect of the first attempt.
            struct CancellingAttempter {
                cancel: CancellationToken,
                calls: AtomicUsize,
            }

            #[async_trait]
            impl Attempter for CancellingAttempter {
                async fn attempt(
                    &self,
                    _endpoint: &crate::harness::types::Endpoint,
                    _credential: &crate::harness::types::CredentialDescriptor,
                ) -> AttemptResult {
                    self.calls.fetch_add(1, Ordering::SeqCst);
                    self.cancel.cancel();
                    AttemptResult {
                        outcome: OutcomeKind::Unreachable,
                        elapsed: Duration::from_millis(10),
                        detail: "scripted".to_string(),
                    }
                }
            }

            let cancel = CancellationToken::new();
            let fake = CancellingAttempter {
                cancel: cancel.clone(),
                calls: AtomicUsize::new(0),
            };

            let result = run_scenario(&spec, Duration::from_secs(5), &fake, &cancel)
                .await
                .unwrap();
            // First attempt completed and is recorded; no further attempts.
            assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
            assert_eq!(result.attempts.len(), 1);
            assert_eq!(result.verdict, Verdict::Fail);
        }
    }

    mod orchestration {
        use super::*;

        #[tokio::test]
        async fn test_run_scenarios_aggregates_all_results() {
            let dir = tempfile::tempdir().unwrap();
            let specs = vec![
                spec_with_secret(&dir, "a", Expectation::Authenticate, Some(0)),
                spec_with_secret(&dir, "b", Expectation::Reject, Some(0)),
            ];
            let fake = Arc::new(FakeAttempter::new(&[
                OutcomeKind::Authenticated,
                OutcomeKind::Authenticated,
            ]));
            let options = RunOptions {
                concurrency: 1,
                default_timeout: Duration::from_secs(5),
            };

            let report = run_scenarios(specs, options, fake, CancellationToken::new())
                .await
                .unwrap();
            assert_eq!(report.summary.total, 2);
            assert_eq!(report.summary.passed, 1);
            assert_eq!(report.summary.failed, 1);
        }

        #[tokio::test]
        async fn test_cancelled_run_produces_empty_report() {
            let dir = tempfile::tempdir().unwrap();
            let specs = vec![spec_with_secret(
                &dir,
                "never-runs",
                Expectation::Authenticate,
                None,
            )];
            let fake = Arc::new(FakeAttempter::new(&[OutcomeKind::Authenticated]));
            let cancel = CancellationToken::new();
            cancel.cancel();
            let options = RunOptions {
                concurrency: 4,
                default_timeout: Duration::from_secs(5),
            };

            let report = run_scenarios(specs, options, fake.clone(), cancel).await.unwrap();
            assert_eq!(report.summary.total, 0);
            assert_eq!(fake.calls(), 0);
        }

        #[tokio::test]
        async fn test_parallel_scenarios_all_complete() {
            let dir = tempfile::tempdir().unwrap();
            let specs: Vec<ScenarioSpec> = (0..8)
                .map(|i| {
                    spec_with_secret(
                        &dir,
                        &format!("scenario-{i}"),
                        Expectation::Authenticate,
                        Some(0),
                    )
                })
                .collect();
            let fake = Arc::new(FakeAttempter::new(&[OutcomeKind::Authenticated]));
            let options = RunOptions {
                concurrency: 4,
                default_timeout: Duration::from_secs(5),
            };

            let report = run_scenarios(specs, options, fake.clone(), CancellationToken::new())
                .await
                .unwrap();
            assert_eq!(report.summary.total, 8);
            assert_eq!(report.summary.passed, 8);
            assert_eq!(fake.calls(), 8);
        }

        #[tokio::test]
        async fn test_secret_material_never_reaches_the_report() {
            let dir = tempfile::tempdir().unwrap();
            let specs = vec![
                spec_with_secret(&dir, "iso-a", Expectation::Authenticate, Some(0)),
                spec_with_secret(&dir, "iso-b", Expectation::Reject, Some(0)),
            ];
            let fake = Arc::new(FakeAttempter::new(&[OutcomeKind::Rejected]));
            let options = RunOptions {
                concurrency: 2,
                default_timeout: Duration::from_secs(5),
            };

            let report = run_scenarios(specs, options, fake, CancellationToken::new())
                .await
                .unwrap();
            let rendered = serde_json::to_string(&report).unwrap();
            assert!(!rendered.contains("s3cret-material"));
        }
    }

    mod verification {
        use super::*;

        fn one(outcome: OutcomeKind) -> Vec<AttemptResult> {
            vec![AttemptResult {
                outcome,
                elapsed: Duration::from_millis(1),
                detail: "detail text".to_string(),
            }]
        }

        #[test]
        fn test_verify_matrix() {
            use ExpectedOutcome::{MustAuthenticate, MustReject};
            let cases = [
                (OutcomeKind::Authenticated, MustAuthenticate, Verdict::Pass),
                (OutcomeKind::Rejected, MustReject, Verdict::Pass),
                (OutcomeKind::Authenticated, MustReject, Verdict::Fail),
                (OutcomeKind::Rejected, MustAuthenticate, Verdict::Fail),
                (OutcomeKind::Unreachable, MustAuthenticate, Verdict::Fail),
                (OutcomeKind::Unreachable, MustReject, Verdict::Fail),
                (OutcomeKind::Timeout, MustAuthenticate, Verdict::Fail),
                (OutcomeKind::Timeout, MustReject, Verdict::Fail),
                (OutcomeKind::ProtocolError, MustAuthenticate, Verdict::Fail),
                (OutcomeKind::ProtocolError, MustReject, Verdict::Fail),
            ];
            for (outcome, expected, verdict) in cases {
                let (got, _) = verify(expected, &one(outcome));
                assert_eq!(got, verdict, "outcome {outcome} expected {expected:?}");
            }
        }

        #[test]
        fn test_failure_reasons_distinguish_infrastructure_faults() {
            let (_, unreachable) = verify(ExpectedOutcome::MustReject, &one(OutcomeKind::Unreachable));
            let (_, timeout) = verify(ExpectedOutcome::MustReject, &one(OutcomeKind::Timeout));
            let (_, protocol) = verify(ExpectedOutcome::MustReject, &one(OutcomeKind::ProtocolError));
            assert!(unreachable.unwrap().contains("unreachable"));
            assert!(timeout.unwrap().contains("response"));
            assert!(protocol.unwrap().contains("protocol"));
        }

        #[test]
        fn test_no_attempts_is_a_failure() {
            let (verdict, reason) = verify(ExpectedOutcome::MustAuthenticate, &[]);
            assert_eq!(verdict, Verdict::Fail);
            assert!(reason.is_some());
        }
    }
}
