//! Bearer-credential provider and JWT claim decoding
//!
//! The client never verifies token signatures (it holds no secret); it only
//! needs the `sub` claim to stamp outgoing messages with the sender id. The
//! token is read through an injected [`CredentialProvider`] on every operation
//! that needs it, never cached, so a refresh elsewhere in the app is picked up
//! on the next call.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Capability to read the current bearer token
///
/// Implementations back onto whatever the host app uses as its session slot
/// (local storage in the web shell, a keychain entry on mobile).
pub trait CredentialProvider: Send + Sync {
    /// The current bearer token, or None when signed out
    fn bearer_token(&self) -> Option<String>;
}

/// In-memory credential slot
///
/// The per-tab session store: one replaceable token behind a lock, shared by
/// reference with every component that attaches credentials.
#[derive(Debug, Default)]
pub struct StaticCredentials {
    token: RwLock<Option<String>>,
}

impl StaticCredentials {
    /// Create an empty (signed-out) slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a slot holding a token
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// Replace the stored token (token refresh, re-login)
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Clear the stored token (sign-out)
    pub fn clear(&self) {
        *self.token.write() = None;
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().clone()
    }
}

/// JWT claims the client cares about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub exp: i64,
}

/// Recover the user id from a bearer token's payload segment
///
/// Signature validation is disabled: the backend verifies tokens, the client
/// only decodes them. Fails closed with `CredentialDecode` when the token is
/// malformed or `sub` is not a numeric user id, so a message is never
/// published with a null sender.
pub fn decode_user_id(token: &str) -> Result<i64, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| AppError::CredentialDecode(e.to_string()))?;

    data.claims
        .sub
        .parse::<i64>()
        .map_err(|_| AppError::CredentialDecode("subject is not a numeric user id".to_string()))
}
