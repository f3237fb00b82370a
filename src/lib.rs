//! Automated SSH authentication conformance harness.
//!
//! Validates that an SSH server accepts the credentials it should accept and
//! rejects the ones it should reject, distinguishing authentication
//! rejections from network timeouts, unreachable hosts, and protocol
//! failures.

pub mod harness;
