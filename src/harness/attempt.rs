//! Connection attempt execution.
//!
//! One bounded-time SSH authentication attempt against a target endpoint:
//! connect, negotiate, offer exactly one credential, wait for a definitive
//! response, classify. Every blocking network call is wrapped in
//! `tokio::time::timeout`; there is no unbounded wait anywhere on this path.
//!
//! The executor never returns an error. Whatever the network does, the
//! observation is funneled through the classifier into exactly one
//! [`OutcomeKind`], and the raw signal text is preserved for diagnosis.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use russh::{Disconnect, client};
use tracing::debug;

use crate::harness::auth::{AuthOutcome, strategy_for};
use crate::harness::classify::{RawSignal, classify};
use crate::harness::session::AcceptingHandler;
use crate::harness::types::{AttemptResult, CredentialDescriptor, Endpoint};

/// Seam for the scenario runner: one bounded authentication attempt.
///
/// The production implementation is [`SshAttempter`]; tests substitute
/// scripted outcomes.
#[async_trait]
pub trait Attempter: Send + Sync {
    async fn attempt(&self, endpoint: &Endpoint, credential: &CredentialDescriptor)
    -> AttemptResult;
}

/// Executes real SSH attempts with russh.
///
/// Holds no state: every attempt opens its own connection, so no connection
/// handle or credential material is ever shared between scenarios.
pub struct SshAttempter;

/// Build the russh client configuration for one attempt.
///
/// The inactivity timeout matches the attempt timeout so a stalled server
/// cannot hold the transport open past the attempt bound.
fn build_client_config(timeout: Duration) -> Arc<client::Config> {
    Arc::new(client::Config {
        inactivity_timeout: Some(timeout),
        keepalive_interval: Some(Duration::from_secs(30)),
        keepalive_max: 3,
        ..Default::default()
    })
}

#[async_trait]
impl Attempter for SshAttempter {
    async fn attempt(
        &self,
        endpoint: &Endpoint,
        credential: &CredentialDescriptor,
    ) -> AttemptResult {
        let started = Instant::now();
        let signal = drive_attempt(endpoint, credential).await;
        let outcome = classify(&signal);
        let elapsed = started.elapsed();
        debug!(
            endpoint = %endpoint,
            mechanism = credential.mechanism(),
            %outcome,
            ?elapsed,
            "attempt classified"
        );
        AttemptResult {
            outcome,
            elapsed,
            detail: signal.detail(),
        }
    }
}

/// Run one attempt to its raw signal.
///
/// Signal precedence follows the classifier's documented order; the first
/// definitive observation wins.
async fn drive_attempt(endpoint: &Endpoint, credential: &CredentialDescriptor) -> RawSignal {
    let timeout = endpoint.connect_timeout;
    let config = build_client_config(timeout);

    // TCP connect + protocol handshake. russh reports transport-level
    // failures as I/O errors and negotiation failures as protocol errors;
    // keep the two apart so classification stays deterministic.
    let connect = client::connect(
        config,
        (endpoint.host.as_str(), endpoint.port),
        AcceptingHandler,
    );
    let mut handle = match tokio::time::timeout(timeout, connect).await {
        Err(_) => return RawSignal::ConnectTimedOut,
        Ok(Err(russh::Error::IO(e))) => return RawSignal::ConnectFailed(e.to_string()),
        Ok(Err(e)) => return RawSignal::HandshakeFailed(e.to_string()),
        Ok(Ok(handle)) => handle,
    };

    let strategy = strategy_for(credential);
    let offer = tokio::time::timeout(timeout, strategy.offer(&mut handle, credential.username()));
    let signal = match offer.await {
        Err(_) => RawSignal::ResponseTimedOut,
        Ok(Err(message)) => RawSignal::AuthErrored(message),
        Ok(Ok(AuthOutcome::Refused(detail))) => RawSignal::AuthRefused(detail),
        Ok(Ok(AuthOutcome::Accepted)) => confirm_session(&handle, timeout).await,
    };

    // Close the transport cleanly whatever happened; the attempt keeps no
    // interactive session open.
    let _ = handle
        .disconnect(Disconnect::ByApplication, "conformance attempt complete", "en")
        .await;

    signal
}

/// `Authenticated` requires more than an auth success message: a session
/// channel must actually open. Close it immediately after confirmation.
async fn confirm_session(
    handle: &client::Handle<AcceptingHandler>,
    timeout: Duration,
) -> RawSignal {
    match tokio::time::timeout(timeout, handle.channel_open_session()).await {
        Err(_) => RawSignal::ResponseTimedOut,
        Ok(Err(e)) => RawSignal::AuthErrored(format!("session channel did not open: {e}")),
        Ok(Ok(channel)) => {
            // Recording success is enough; close immediately, keep nothing open.
            let _ = channel.close().await;
            RawSignal::SessionOpened
        }
    }
}
