use thiserror::Error;

/// Errors that can occur when interacting with a code platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Authentication required or failed (bad credential on either platform).
    #[error("Authentication failed: invalid or expired token")]
    Auth,

    /// A repository with that name already exists for the authenticated user.
    #[error("Repository '{name}' already exists on the destination")]
    Conflict { name: String },

    /// Resource not found (project, repo, user).
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Network or connection error.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Any other API error, with the HTTP status the platform returned.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl PlatformError {
    /// Create a conflict error for a repository name.
    #[inline]
    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict { name: name.into() }
    }

    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a network error.
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an API error.
    #[inline]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a destination name conflict (policy-driven,
    /// not unconditionally fatal).
    #[inline]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which keeps progress labels and
/// skip/fail notices to one terminal row even when the underlying error
/// carries multi-line detail (git stderr, JSON bodies).
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
