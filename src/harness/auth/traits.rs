//! Authentication strategy trait definition.

use async_trait::async_trait;
use russh::client;

use crate::harness::session::AcceptingHandler;

/// Definitive answer from the server to one credential offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The server granted access.
    Accepted,
    /// The server gave a definitive "no" to this credential.
    Refused(String),
}

/// Trait for credential offering strategies.
///
/// Implementations must be thread-safe (`Send + Sync`) for use across
/// async tasks.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Offer the credential to the server for the given username.
    ///
    /// # Returns
    ///
    /// * `Ok(AuthOutcome::Accepted)` - the server granted access
    /// * `Ok(AuthOutcome::Refused(_))` - the server refused the credential
    /// * `Err(message)` - the exchange errored without a definitive answer
    async fn offer(
        &self,
        handle: &mut client::Handle<AcceptingHandler>,
        username: &str,
    ) -> Result<AuthOutcome, String>;

    /// Mechanism name, used for logging only.
    fn name(&self) -> &'static str;
}
