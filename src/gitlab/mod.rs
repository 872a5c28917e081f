//! Client for the hosted service's REST API
//!
//! - `pagination` - Link-header driven "fetch every page" loop
//! - `client` - `GroupApi` trait and its HTTP implementation
//! - `types` - Group, member, and access-level models
//! - `mock` - In-memory `GroupApi` for tests

pub mod client;
pub mod mock;
pub mod pagination;
pub mod types;

pub use client::{GitlabClient, GroupApi};
pub use mock::MockGroupApi;
pub use pagination::{next_page_url, parse_link_header, Link, PaginatedFetcher};
pub use types::{AccessLevel, Group, Member};
