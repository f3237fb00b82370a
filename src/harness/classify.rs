//! Outcome classification for connection attempts.
//!
//! Maps every raw transport/protocol signal to exactly one [`OutcomeKind`],
//! with a fixed precedence so classification is deterministic:
//!
//! 1. Network connection not established within the timeout -> `Unreachable`
//! 2. Transport connects but the handshake fails -> `ProtocolError`
//! 3. Authentication explicitly refused by the server -> `Rejected`
//! 4. Authentication succeeds and a session channel opens -> `Authenticated`
//! 5. No definitive response after the handshake -> `Timeout`
//!
//! The classifier is total and never panics: signals that match no known
//! pattern fall through to `ProtocolError`, with the original text preserved
//! in the attempt detail for diagnosis.

use crate::harness::types::OutcomeKind;

/// Raw signal observed by the connection attempt executor, before
/// classification. Each variant carries the underlying message verbatim
/// where one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawSignal {
    /// TCP connect + handshake did not finish within the timeout.
    ConnectTimedOut,
    /// The transport could not be established (I/O level failure).
    ConnectFailed(String),
    /// Transport came up but protocol negotiation failed or was malformed.
    HandshakeFailed(String),
    /// The server gave a definitive "no" to the offered credential.
    AuthRefused(String),
    /// The authentication exchange errored without a definitive refusal.
    AuthErrored(String),
    /// Authentication succeeded and a session channel opened.
    SessionOpened,
    /// Handshake succeeded but no definitive response arrived in time.
    ResponseTimedOut,
}

impl RawSignal {
    /// Human-readable detail preserved in the attempt result.
    pub fn detail(&self) -> String {
        match self {
            RawSignal::ConnectTimedOut => "connection not established within timeout".to_string(),
            RawSignal::ConnectFailed(msg) => format!("connect failed: {msg}"),
            RawSignal::HandshakeFailed(msg) => format!("handshake failed: {msg}"),
            RawSignal::AuthRefused(msg) => msg.clone(),
            RawSignal::AuthErrored(msg) => msg.clone(),
            RawSignal::SessionOpened => "session channel opened".to_string(),
            RawSignal::ResponseTimedOut => {
                "no definitive response within timeout".to_string()
            }
        }
    }
}

/// Network-level failure patterns that mean the target was never reached.
///
/// Matching is on lowercased message text; these cover the common error
/// strings produced by the OS and the SSH client library.
const UNREACHABLE_PATTERNS: &[&str] = &[
    "connection refused",
    "connection reset",
    "connection timed out",
    "network is unreachable",
    "no route to host",
    "host is down",
    "temporary failure",
    "name resolution",
    "resource temporarily unavailable",
    "timed out",
];

/// Wording that indicates a definitive authentication refusal.
const REFUSAL_PATTERNS: &[&str] = &[
    "authentication failed",
    "permission denied",
    "publickey",
    "auth fail",
    "no authentication",
    "refused",
];

/// Wording that indicates the exchange stalled rather than broke.
const TIMEOUT_PATTERNS: &[&str] = &["timed out", "timeout"];

fn matches_any(message: &str, patterns: &[&str]) -> bool {
    let lower = message.to_lowercase();
    patterns.iter().any(|p| lower.contains(p))
}

/// Classify a raw signal into exactly one outcome kind.
///
/// Pure and deterministic: the same signal always yields the same kind.
pub fn classify(signal: &RawSignal) -> OutcomeKind {
    match signal {
        RawSignal::ConnectTimedOut => OutcomeKind::Unreachable,
        RawSignal::ConnectFailed(msg) => {
            if matches_any(msg, UNREACHABLE_PATTERNS) {
                OutcomeKind::Unreachable
            } else {
                // An I/O failure we cannot attribute to the network layer is
                // treated as protocol breakage, never retried.
                OutcomeKind::ProtocolError
            }
        }
        RawSignal::HandshakeFailed(_) => OutcomeKind::ProtocolError,
        RawSignal::AuthRefused(_) => OutcomeKind::Rejected,
        RawSignal::SessionOpened => OutcomeKind::Authenticated,
        RawSignal::ResponseTimedOut => OutcomeKind::Timeout,
        RawSignal::AuthErrored(msg) => {
            // Refusal wording takes precedence over timeout wording: an error
            // like "authentication failed: timeout waiting for reply" is a
            // definitive refusal, not a stall.
            if matches_any(msg, REFUSAL_PATTERNS) {
                OutcomeKind::Rejected
            } else if matches_any(msg, TIMEOUT_PATTERNS) {
                OutcomeKind::Timeout
            } else {
                OutcomeKind::ProtocolError
            }
        }
    }
}
