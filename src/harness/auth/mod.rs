//! Credential offering strategies.
//!
//! Each strategy offers exactly one credential mechanism to the server and
//! reports whether the server accepted or refused it. Scenarios exercise a
//! single mechanism per attempt; there is no fallback chaining between
//! mechanisms.

mod key;
mod password;
mod traits;

pub use key::KeyOffer;
pub use password::PasswordOffer;
pub use traits::{AuthOutcome, AuthStrategy};

use crate::harness::types::CredentialDescriptor;

/// Build the strategy matching a resolved credential descriptor.
pub fn strategy_for(credential: &CredentialDescriptor) -> Box<dyn AuthStrategy> {
    match credential {
        CredentialDescriptor::Password { secret, .. } => Box::new(PasswordOffer::new(secret)),
        CredentialDescriptor::PrivateKey {
            key_material,
            passphrase,
            ..
        } => Box::new(KeyOffer::new(key_material, passphrase.clone())),
    }
}
