//! Application services orchestrating domain logic and infrastructure.
//!
//! - [`AliasService`] - Alias creation and cached resolution
//! - [`ClickRecorder`] - Click classification and persistence
//! - [`RedirectService`] - Redirect resolution with click capture
//! - [`AnalyticsService`] - Cached click analytics
//! - [`AuthService`] - Bearer token identity provider

pub mod alias_service;
pub mod analytics_service;
pub mod auth_service;
pub mod click_recorder;
pub mod redirect_service;

pub use alias_service::{AliasService, CreateAlias, CreatedAlias};
pub use analytics_service::AnalyticsService;
pub use auth_service::{AuthService, hash_token};
pub use click_recorder::{ClickRecorder, RequestContext};
pub use redirect_service::RedirectService;
