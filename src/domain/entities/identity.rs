//! Authenticated caller identity.

use std::fmt;

/// Identity of the authenticated caller, as supplied by the identity provider.
///
/// Treated as an opaque string. It is passed explicitly to every operation that
/// needs an owner and never stored in shared state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
