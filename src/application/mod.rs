//! Application layer services implementing business logic.
//!
//! Services coordinate repository calls, caching and validation, and expose a
//! small API to the HTTP handlers. They hold their collaborators as trait
//! objects so the same service runs against PostgreSQL, in-memory fakes or
//! mocks.

pub mod services;
