//! Password credential offering.

use async_trait::async_trait;
use russh::client;

use crate::harness::session::AcceptingHandler;

use super::traits::{AuthOutcome, AuthStrategy};

/// Offers username/password credentials to the server.
pub struct PasswordOffer {
    secret: String,
}

impl PasswordOffer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl AuthStrategy for PasswordOffer {
    async fn offer(
        &self,
        handle: &mut client::Handle<AcceptingHandler>,
        username: &str,
    ) -> Result<AuthOutcome, String> {
        let result = handle
            .authenticate_password(username, &self.secret)
            .await
            .map_err(|e| format!("password exchange errored: {e}"))?;

        if result.success() {
            Ok(AuthOutcome::Accepted)
        } else {
            // Username may appear in diagnostics; the secret never does.
            Ok(AuthOutcome::Refused(format!(
                "server refused password credential for user `{username}`"
            )))
        }
    }

    fn name(&self) -> &'static str {
        "password"
    }
}
