//! Sentry provider core.
//!
//! A Rust library that reconciles declared Sentry configuration (projects,
//! teams, keys, alert rules, monitors, integrations, ...) against the Sentry
//! REST API. Each resource kind implements [`Resource`]; each read-only
//! lookup implements [`DataSource`]. Wire entities implement the [`Get`]
//! and [`List`] traits for the endpoints they support.
//!
//! # Quick Start
//!
//! ```no_run
//! use sentry_provider::{Resource, SentryClient, TeamModel, TeamResource, Value};
//!
//! #[tokio::main]
//! async fn main() -> sentry_provider::Result<()> {
//!     // Token and base URL come from the environment
//!     let client = SentryClient::from_env()?;
//!
//!     let teams = TeamResource::new(client);
//!     let plan = TeamModel {
//!         organization: Value::from("my-org"),
//!         name: Value::from("Backend"),
//!         slug: Value::Unknown,
//!         ..Default::default()
//!     };
//!     let outcome = teams.create(plan).await;
//!     for diagnostic in outcome.diagnostics.iter() {
//!         eprintln!("{diagnostic}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`transport`]: the request pipeline (bearer auth, User-Agent,
//!   concurrency limit calibration, rate-limit retry, logging)
//! - [`pagination`]: `Link` header cursors
//! - [`id`]: composite `a/b/c` identifiers
//! - [`types`]: semantic JSON strings, trimmed strings, comma string sets
//! - [`diagnostics`]: errors and warnings returned to the host
//! - [`codec`]: polymorphic alert rule elements, monitor schedules and
//!   integration tables
//! - [`resources`] and [`data_sources`]: lifecycle handlers
//!
//! # Configuration
//!
//! - `SENTRY_AUTH_TOKEN` / `SENTRY_TOKEN` - API token
//! - `SENTRY_BASE_URL` (optional) - API root (defaults to `https://sentry.io/api/`)
//! - `SENTRY_PROVIDER_LOG` (optional) - log filter

pub mod attr;
pub mod cli;
mod client;
pub mod codec;
pub mod config;
pub mod data_sources;
pub mod diagnostics;
mod error;
pub mod id;
pub mod logging;
mod models;
pub mod pagination;
pub mod provider;
pub mod resources;
pub mod schema;
mod traits;
pub mod transport;
pub mod types;
pub mod validation;

// Re-export core types
pub use attr::Value;
pub use client::{SentryClient, SentryClientBuilder};
pub use config::ProviderConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{Result, SentryError};
pub use pagination::Page;

// Re-export traits
pub use data_sources::DataSource;
pub use resources::{Outcome, Resource, StateChange};
pub use traits::{Get, List};

// Re-export wire models
pub use models::*;

// Re-export resource and data-source handlers
pub use data_sources::*;
pub use resources::*;
