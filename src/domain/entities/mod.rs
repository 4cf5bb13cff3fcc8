//! Core domain entities.
//!
//! Entities are plain data structures. Separate `New*` structs describe records
//! that have not been persisted yet.
//!
//! - [`UrlMapping`] - An alias and the URL it redirects to
//! - [`ClickEvent`] - One served redirect with caller metadata
//! - [`Identity`] - The authenticated caller

pub mod click;
pub mod identity;
pub mod url_mapping;

pub use click::{ClickEvent, NewClick};
pub use identity::Identity;
pub use url_mapping::{NewUrlMapping, UrlMapping, short_url};
