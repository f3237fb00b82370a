//! Private key credential offering.

use std::sync::Arc;

use async_trait::async_trait;
use russh::{client, keys};
use tracing::debug;

use crate::harness::session::AcceptingHandler;

use super::traits::{AuthOutcome, AuthStrategy};

/// Offers an in-memory private key for public key authentication.
///
/// The key is decoded lazily at offer time: a malformed key is a legitimate
/// test input and must surface as an attempt-level signal, not a harness
/// crash.
pub struct KeyOffer {
    key_material: String,
    passphrase: Option<String>,
}

impl KeyOffer {
    pub fn new(key_material: impl Into<String>, passphrase: Option<String>) -> Self {
        Self {
            key_material: key_material.into(),
            passphrase,
        }
    }
}

#[async_trait]
impl AuthStrategy for KeyOffer {
    async fn offer(
        &self,
        handle: &mut client::Handle<AcceptingHandler>,
        username: &str,
    ) -> Result<AuthOutcome, String> {
        let key_pair = keys::decode_secret_key(&self.key_material, self.passphrase.as_deref())
            .map_err(|e| format!("could not decode private key: {e}"))?;

        // For RSA keys, use the best hash algorithm the server supports.
        let hash_alg = handle
            .best_supported_rsa_hash()
            .await
            .ok()
            .flatten()
            .flatten();
        debug!(?hash_alg, "negotiated RSA hash algorithm for key offer");

        let key_with_hash = keys::PrivateKeyWithHashAlg::new(Arc::new(key_pair), hash_alg);

        let result = handle
            .authenticate_publickey(username, key_with_hash)
            .await
            .map_err(|e| format!("public key exchange errored: {e}"))?;

        if result.success() {
            Ok(AuthOutcome::Accepted)
        } else {
            Ok(AuthOutcome::Refused(format!(
                "server refused public key credential for user `{username}`"
            )))
        }
    }

    fn name(&self) -> &'static str {
        "key"
    }
}
