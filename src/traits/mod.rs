//! Trait definitions for Sentry read operations.
//!
//! Each wire entity implements the traits its endpoints support.

mod get;
mod list;

pub use get::Get;
pub use list::List;
