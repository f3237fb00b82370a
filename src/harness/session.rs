//! SSH client handler used by the connection attempt executor.

use russh::{client, keys};

/// Client handler for russh that accepts all host keys.
///
/// Host-key distribution is a precondition supplied to the harness, not a
/// behavior under test, so server keys are accepted without verification
/// (the `StrictHostKeyChecking=no` posture). A host-key mismatch against a
/// pinned key would otherwise surface as a handshake failure and be
/// classified as a protocol error.
pub struct AcceptingHandler;

impl client::Handler for AcceptingHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}
