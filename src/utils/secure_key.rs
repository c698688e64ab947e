//! A credential wrapper that never leaks its contents through `Debug` and
//! zeroes its backing memory on drop.

use crate::error::{Error, Result};
use zeroize::ZeroizeOnDrop;

const MIN_KEY_LENGTH: usize = 8;

/// An API key or bearer token held for the lifetime of a [`crate::factory::ServiceConfig`].
///
/// Constructing one validates that the value is non-empty and of a
/// plausible minimum length; callers that need stricter per-provider
/// format checks (e.g. an `sk-`/`or-` prefix) should validate before
/// wrapping. Zeroes its backing buffer on drop.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecureApiKey {
    inner: String,
}

impl SecureApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::validation("API key cannot be empty"));
        }
        if key.len() < MIN_KEY_LENGTH {
            return Err(Error::validation(format!(
                "API key is too short, expected at least {MIN_KEY_LENGTH} characters"
            )));
        }
        Ok(SecureApiKey { inner: key })
    }

    /// The authorization header value this key should be sent as.
    pub fn bearer_header_value(&self) -> String {
        format!("Bearer {}", self.inner)
    }
}

impl std::fmt::Debug for SecureApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureApiKey")
            .field("inner", &"[REDACTED]")
            .finish()
    }
}
