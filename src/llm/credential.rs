//! API credential held in UI state

use crate::llm::ApiError;
use std::fmt;

/// An API key as typed into the sidebar.
///
/// Never persisted, never printed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read `OPENAI_API_KEY` from the environment, empty if unset
    pub fn from_env() -> Self {
        Self(std::env::var("OPENAI_API_KEY").unwrap_or_default())
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The value for an `Authorization` header.
    ///
    /// An empty key is rejected here so no request is sent without one.
    pub fn bearer(&self) -> Result<String, ApiError> {
        let key = self.0.trim();
        if key.is_empty() {
            return Err(ApiError::Authentication("No API key provided".into()));
        }
        Ok(format!("Bearer {}", key))
    }

    /// Mutable access for the password field
    pub fn as_mut_string(&mut self) -> &mut String {
        &mut self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}
