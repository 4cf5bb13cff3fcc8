//! Alias generation and validation.
//!
//! Generated aliases are 8 characters of the URL-safe base64 alphabet
//! (`A-Z a-z 0-9 - _`), produced from 6 random bytes. The random source is a
//! seedable [`StdRng`] so tests can reproduce an exact sequence of aliases.

use base64::Engine as _;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde_json::json;
use std::sync::Mutex;

use crate::error::AppError;

/// Length of every generated alias.
pub const ALIAS_LENGTH: usize = 8;

/// Random bytes consumed per alias. 6 bytes encode to exactly 8 base64 characters.
const ALIAS_BYTES: usize = 6;

/// Upper bound for custom alias length.
pub const MAX_CUSTOM_ALIAS_LENGTH: usize = 32;

/// Path segments used by the router that must never be claimed as aliases.
const RESERVED_ALIASES: &[&str] = &["api", "health", "analytics", "shorten", "overall", "topic"];

/// Produces random aliases from a shared, seedable generator.
pub struct AliasGenerator {
    rng: Mutex<StdRng>,
}

impl AliasGenerator {
    /// Creates a generator seeded from the operating system's entropy source.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the system RNG is unavailable.
    pub fn from_entropy() -> Result<Self, getrandom::Error> {
        let mut seed = [0u8; 32];
        getrandom::fill(&mut seed)?;
        Ok(Self {
            rng: Mutex::new(StdRng::from_seed(seed)),
        })
    }

    /// Creates a deterministic generator. Two generators built from the same seed
    /// yield the same alias sequence.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Returns the next alias.
    pub fn generate(&self) -> String {
        let mut buffer = [0u8; ALIAS_BYTES];
        self.rng
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .fill_bytes(&mut buffer);

        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer)
    }
}

/// Returns true if `c` belongs to the alias alphabet.
fn is_alias_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Validates a caller-chosen alias.
///
/// # Rules
///
/// - 1 to 32 characters
/// - only `A-Z a-z 0-9 - _`
/// - not a reserved route segment (case-insensitive)
///
/// # Errors
///
/// Returns [`AppError::Validation`] naming the violated rule.
pub fn validate_custom_alias(alias: &str) -> Result<(), AppError> {
    if alias.is_empty() || alias.len() > MAX_CUSTOM_ALIAS_LENGTH {
        return Err(AppError::bad_request(
            format!("Custom alias must be 1-{MAX_CUSTOM_ALIAS_LENGTH} characters"),
            json!({ "provided_length": alias.len() }),
        ));
    }

    if !alias.chars().all(is_alias_char) {
        return Err(AppError::bad_request(
            "Custom alias can only contain letters, digits, hyphens and underscores",
            json!({ "alias": alias }),
        ));
    }

    if RESERVED_ALIASES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(alias))
    {
        return Err(AppError::bad_request(
            "This alias is reserved",
            json!({ "alias": alias }),
        ));
    }

    Ok(())
}
