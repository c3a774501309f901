use async_trait::async_trait;

use super::errors::Result;

/// Identity of the authenticated user on a platform.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    /// Username/login.
    pub login: String,
    /// Display name (if available).
    pub name: Option<String>,
}

/// A project on the source platform, as returned by a search or listing.
#[derive(Debug, Clone)]
pub struct SourceProject {
    /// Platform-specific numeric ID.
    pub id: i64,
    /// Project name.
    pub name: String,
    /// Login of the owning user, or the namespace path for group-owned
    /// projects. This is the username inlined into authenticated clone URLs.
    pub owner_login: String,
    /// Plain HTTP clone URL.
    pub http_url_to_repo: String,
    /// Project description.
    pub description: Option<String>,
}

/// Options for creating a repository on the destination platform.
#[derive(Debug, Clone, Default)]
pub struct CreateRepoOptions {
    /// Repository description.
    pub description: Option<String>,
    /// Create the repository as private.
    pub private: bool,
}

/// Trait for code hosting platform clients.
///
/// Implemented by [`crate::gitlab::GitlabClient`] (source) and
/// [`crate::github::GithubClient`] (destination). Implementors attach their
/// platform's credential scheme to every request, handle pagination
/// internally for list operations (preserving page order, aborting the whole
/// listing if any page fetch fails), and convert platform responses into
/// [`super::PlatformError`].
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Host the platform's repositories live on (e.g. "github.com"), used to
    /// build authenticated push URLs.
    fn host(&self) -> &str;

    /// The credential this client authenticates with. Export tasks read it
    /// to inline credentials into clone and push URLs.
    fn token(&self) -> &str;

    /// Get the identity of the authenticated user.
    ///
    /// Fails with [`super::PlatformError::Auth`] on an invalid credential.
    async fn current_user(&self) -> Result<UserIdentity>;

    /// Search the authenticated user's projects by name.
    ///
    /// Returns an ordered, fully-paginated candidate list. The caller decides
    /// how to interpret zero or multiple candidates.
    async fn search_projects(&self, name: &str) -> Result<Vec<SourceProject>>;

    /// List all projects owned by the authenticated user.
    async fn list_projects(&self) -> Result<Vec<SourceProject>>;

    /// Create a repository under the authenticated user.
    ///
    /// Fails with [`super::PlatformError::Conflict`] if a repository with
    /// that name already exists.
    async fn create_repo(&self, name: &str, options: &CreateRepoOptions) -> Result<()>;

    /// Delete a repository.
    ///
    /// Fails with [`super::PlatformError::NotFound`] if it does not exist.
    async fn delete_repo(&self, owner: &str, name: &str) -> Result<()>;
}
