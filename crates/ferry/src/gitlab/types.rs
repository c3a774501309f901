//! GitLab API data types.

use serde::Deserialize;

use crate::platform::SourceProject;

/// GitLab user - fields we need from the API response.
#[derive(Debug, Clone, Deserialize)]
pub struct GitlabUser {
    /// Username/login.
    pub username: String,
    /// Display name (may be null).
    pub name: Option<String>,
}

/// GitLab namespace (user or group a project lives under).
#[derive(Debug, Clone, Deserialize)]
pub struct GitlabNamespace {
    /// URL path segment of the namespace.
    pub path: String,
}

/// GitLab project - fields we need from the API response.
///
/// `owner` is absent for group-owned projects; the namespace path stands in
/// for the clone-URL username in that case.
#[derive(Debug, Clone, Deserialize)]
pub struct GitlabProject {
    /// Project ID.
    pub id: i64,
    /// Project name.
    pub name: String,
    /// Owning user, when the project belongs to a user. Group projects omit
    /// the field entirely.
    #[serde(default)]
    pub owner: Option<GitlabUser>,
    /// Namespace the project lives under.
    pub namespace: GitlabNamespace,
    /// Plain HTTP clone URL.
    pub http_url_to_repo: String,
    /// Project description.
    pub description: Option<String>,
}

impl GitlabProject {
    /// Convert to the platform-agnostic project representation.
    #[must_use]
    pub fn to_source_project(&self) -> SourceProject {
        let owner_login = self
            .owner
            .as_ref()
            .map(|o| o.username.clone())
            .unwrap_or_else(|| self.namespace.path.clone());

        SourceProject {
            id: self.id,
            name: self.name.clone(),
            owner_login,
            http_url_to_repo: self.http_url_to_repo.clone(),
            description: self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_login_falls_back_to_namespace_path() {
        let project = GitlabProject {
            id: 5,
            name: "widget".to_string(),
            owner: None,
            namespace: GitlabNamespace {
                path: "widgets-team".to_string(),
            },
            http_url_to_repo: "https://gitlab.com/widgets-team/widget.git".to_string(),
            description: None,
        };
        assert_eq!(project.to_source_project().owner_login, "widgets-team");

        let project = GitlabProject {
            owner: Some(GitlabUser {
                username: "mia".to_string(),
                name: None,
            }),
            ..project
        };
        assert_eq!(project.to_source_project().owner_login, "mia");
    }
}
