//! GitHub API data types.

use serde::{Deserialize, Serialize};

use crate::platform::SourceProject;

/// GitHub user - fields we need from the API response.
///
/// Only the fields this crate consumes are declared, which keeps the structs
/// resilient to API changes.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubUser {
    /// Username/login.
    pub login: String,
    /// Display name (may be null).
    pub name: Option<String>,
}

/// GitHub repository - fields we need from the API response.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRepo {
    /// Repository ID.
    pub id: i64,
    /// Repository name.
    pub name: String,
    /// Owner information.
    pub owner: GithubUser,
    /// HTTPS clone URL.
    pub clone_url: String,
    /// Repository description.
    pub description: Option<String>,
}

impl GithubRepo {
    /// Convert to the platform-agnostic project representation.
    #[must_use]
    pub fn to_source_project(&self) -> SourceProject {
        SourceProject {
            id: self.id,
            name: self.name.clone(),
            owner_login: self.owner.login.clone(),
            http_url_to_repo: self.clone_url.clone(),
            description: self.description.clone(),
        }
    }
}

/// Request body for `POST /user/repos`.
#[derive(Debug, Serialize)]
pub struct CreateRepoRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    pub private: bool,
}
