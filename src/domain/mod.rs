//! Domain layer containing business entities and logic.
//!
//! Independent of infrastructure and presentation concerns. Repository and
//! rate limiter traits define the contracts implemented by the infrastructure
//! layer.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`analytics`] - Pure click aggregation
//! - [`user_agent`] - OS and device classification
//! - [`identity_provider`] - Credential to identity resolution
//! - [`rate_limit`] - Per-client rate limiting contract

pub mod analytics;
pub mod entities;
pub mod identity_provider;
pub mod rate_limit;
pub mod repositories;
pub mod user_agent;
