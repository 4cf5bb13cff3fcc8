//! Data Transfer Objects for API requests and responses.
//!
//! Analytics responses serialize the domain snapshots in
//! [`crate::domain::analytics`] directly.

pub mod health;
pub mod shorten;
