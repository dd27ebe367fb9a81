//! DigitalOcean v1 API access
//!
//! This module provides the resource-access layer: the authenticated HTTP
//! transport, typed resource records, and the [`Account`] that fetches them
//! and caches id -> name lookups.
//!
//! # Module Structure
//!
//! - [`http`] - Authenticated GET requests and status classification
//! - [`account`] - Resource listings, droplet actions and name caches
//! - [`cache`] - Lazily populated id -> name mappings
//! - [`types`] - Resource records and response envelopes
//! - [`error`] - Error taxonomy shared by all of the above
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use digo::api::Account;
//!
//! async fn example() -> digo::api::Result<()> {
//!     let account = Arc::new(Account::new("client-id", "api-key")?);
//!     for droplet in account.droplets().await? {
//!         println!("{} {}", droplet.name, droplet.region_name().await);
//!     }
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod cache;
pub mod error;
pub mod http;
pub mod types;

pub use account::Account;
pub use error::{ApiError, Result};
pub use http::{ApiHttpClient, Credentials, API_ROOT};
pub use types::*;
