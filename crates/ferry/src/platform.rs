//! Platform-agnostic trait for code forge clients.
//!
//! This module defines the `PlatformClient` trait that provides a unified
//! interface for the two hosting platforms an export run talks to: the
//! source (GitLab) and the destination (GitHub). The export engine only ever
//! sees this trait, which is what lets the integration tests drive a whole
//! run against scripted in-memory clients.
//!
//! # Example
//!
//! ```ignore
//! use ferry::platform::{PlatformClient, PlatformError};
//!
//! async fn who_am_i<C: PlatformClient>(client: &C) -> Result<String, PlatformError> {
//!     Ok(client.current_user().await?.login)
//! }
//! ```

mod errors;
mod types;

pub use errors::{PlatformError, Result, short_error_message};
pub use types::{CreateRepoOptions, PlatformClient, SourceProject, UserIdentity};
