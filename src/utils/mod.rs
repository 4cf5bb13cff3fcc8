//! Utility functions shared across layers.
//!
//! - [`alias_generator`] - Random alias generation and custom alias validation
//! - [`client_ip`] - Caller IP extraction from headers and socket address
//! - [`clock`] - Injectable wall clock
//! - [`url_validator`] - Redirect target validation

pub mod alias_generator;
pub mod client_ip;
pub mod clock;
pub mod url_validator;
