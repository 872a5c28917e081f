//! # group-prune
//!
//! Audit and prune group memberships on a hosted GitLab-style service.
//! Members at or above the developer access level are removed from the
//! selected groups unless their username is whitelisted.
//!
//! ## Usage
//!
//! ```bash
//! PRIVATE_TOKEN=... group-prune [--config group-prune.toml] [--group acme/eng] [--yes]
//! ```
//!
//! ## Modules
//!
//! - `app` - A complete run from confirmation to report
//! - `config` - Layered configuration (defaults, TOML file, environment)
//! - `error` - Crate-wide error type
//! - `gitlab` - Paginated REST client and resource models
//! - `interaction` - Prompts and group selection
//! - `prune` - Whitelist filtering and the concurrent removal coordinator
pub mod app;
pub mod config;
pub mod error;
pub mod gitlab;
pub mod interaction;
pub mod prune;

pub use error::{Error, Result};
