//! API key handling.
//!
//! The key is wrapped in [`secrecy::SecretBox`] from the moment the
//! client receives it, so no `Debug` or log statement anywhere in the
//! request path can leak it. It is unwrapped exactly once, when the
//! Authorization header is built.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// A bearer API key. Redacted in `Debug`; has no `Display`.
pub struct ApiKey {
    inner: SecretBox<str>,
}

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            inner: SecretBox::new(Box::from(key.into().as_str())),
        }
    }

    /// The raw key, for building the Authorization header.
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(..)")
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}
