//! GitLab API client creation and management.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{GitlabProject, GitlabUser};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, next_page_url};
use crate::platform::{
    self, CreateRepoOptions, PlatformClient, PlatformError, SourceProject, UserIdentity,
};

/// Page size for list endpoints.
const PAGE_SIZE: u32 = 100;

/// GitLab API client.
///
/// Authenticates with a personal access token via the `Private-Token`
/// header scheme.
#[derive(Clone)]
pub struct GitlabClient {
    transport: Arc<dyn HttpTransport>,
    /// Bare host (e.g. "gitlab.com").
    host: String,
    /// API base, `https://<host>/api/v4`.
    api_url: String,
    token: String,
}

impl GitlabClient {
    /// Create a new GitLab client.
    ///
    /// # Arguments
    ///
    /// * `host` - GitLab host (e.g. "gitlab.com" or "https://gitlab.example.com")
    /// * `token` - Personal access token
    pub fn new(host: &str, token: &str) -> Result<Self, PlatformError> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(30))
            .map_err(|e| PlatformError::network(e.to_string()))?;
        Ok(Self::new_with_transport(host, token, Arc::new(transport)))
    }

    pub fn new_with_transport(
        host: &str,
        token: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        // Accept a bare hostname or a full URL; the API base is always https.
        let host = host
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();
        let api_url = format!("https://{}/api/v4", host);

        Self {
            transport,
            host,
            api_url,
            token: token.to_string(),
        }
    }

    fn request(&self, method: HttpMethod, url: String, body: Vec<u8>) -> HttpRequest {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), "ferry".to_string()),
            ("Private-Token".to_string(), self.token.clone()),
        ];
        if !body.is_empty() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, PlatformError> {
        self.transport
            .send(request)
            .await
            .map_err(|e| PlatformError::network(e.to_string()))
    }

    fn classify(response: &HttpResponse, resource: &str) -> PlatformError {
        let message = String::from_utf8_lossy(&response.body).to_string();
        match response.status {
            401 | 403 => PlatformError::Auth,
            404 => PlatformError::not_found(resource),
            status => PlatformError::api(status, message),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> platform::Result<T> {
        let url = format!("{}{}", self.api_url, path);
        let response = self.send(self.request(HttpMethod::Get, url, Vec::new())).await?;

        if !(200..300).contains(&response.status) {
            return Err(Self::classify(&response, path));
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| PlatformError::api(response.status, e.to_string()))
    }

    /// Fetch every page of the owned-projects listing, optionally filtered
    /// server-side by a search term. Follows `Link: rel="next"`; page order
    /// is preserved and any page failure aborts the whole listing.
    async fn owned_projects(&self, search: Option<&str>) -> platform::Result<Vec<GitlabProject>> {
        let mut first = Url::parse(&format!("{}/projects", self.api_url))
            .map_err(|e| PlatformError::network(e.to_string()))?;
        {
            let mut pairs = first.query_pairs_mut();
            pairs.append_pair("owned", "true");
            pairs.append_pair("per_page", &PAGE_SIZE.to_string());
            if let Some(search) = search {
                pairs.append_pair("search", search);
            }
        }

        let mut url = first.to_string();
        let mut projects: Vec<GitlabProject> = Vec::new();

        loop {
            let response = self
                .send(self.request(HttpMethod::Get, url.clone(), Vec::new()))
                .await?;

            if !(200..300).contains(&response.status) {
                return Err(Self::classify(&response, "/projects"));
            }

            let page: Vec<GitlabProject> = serde_json::from_slice(&response.body)
                .map_err(|e| PlatformError::api(response.status, e.to_string()))?;
            projects.extend(page);

            match next_page_url(&response.headers) {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(projects)
    }

    /// Resolve a project id from its owner login and name.
    async fn project_id(&self, owner: &str, name: &str) -> platform::Result<i64> {
        let candidates = self.owned_projects(Some(name)).await?;
        candidates
            .iter()
            .find(|p| {
                p.name == name
                    && p.owner
                        .as_ref()
                        .map(|o| o.username == owner)
                        .unwrap_or(p.namespace.path == owner)
            })
            .map(|p| p.id)
            .ok_or_else(|| PlatformError::not_found(format!("{}/{}", owner, name)))
    }
}

#[async_trait]
impl PlatformClient for GitlabClient {
    fn host(&self) -> &str {
        &self.host
    }

    fn token(&self) -> &str {
        &self.token
    }

    async fn current_user(&self) -> platform::Result<UserIdentity> {
        let user: GitlabUser = self.get("/user").await?;
        Ok(UserIdentity {
            login: user.username,
            name: user.name,
        })
    }

    async fn search_projects(&self, name: &str) -> platform::Result<Vec<SourceProject>> {
        let projects = self.owned_projects(Some(name)).await?;
        Ok(projects.iter().map(GitlabProject::to_source_project).collect())
    }

    async fn list_projects(&self) -> platform::Result<Vec<SourceProject>> {
        let projects = self.owned_projects(None).await?;
        Ok(projects.iter().map(GitlabProject::to_source_project).collect())
    }

    async fn create_repo(
        &self,
        name: &str,
        options: &CreateRepoOptions,
    ) -> platform::Result<()> {
        let body = serde_json::json!({
            "name": name,
            "description": options.description,
            "visibility": if options.private { "private" } else { "public" },
        });
        let body = serde_json::to_vec(&body)
            .map_err(|e| PlatformError::api(0, e.to_string()))?;

        let url = format!("{}/projects", self.api_url);
        let response = self.send(self.request(HttpMethod::Post, url, body)).await?;

        match response.status {
            s if (200..300).contains(&s) => Ok(()),
            // GitLab reports a taken name as a 400 validation error.
            400 | 409 => Err(PlatformError::conflict(name)),
            _ => Err(Self::classify(&response, name)),
        }
    }

    async fn delete_repo(&self, owner: &str, name: &str) -> platform::Result<()> {
        let id = self.project_id(owner, name).await?;
        let url = format!("{}/projects/{}", self.api_url, id);
        let response = self
            .send(self.request(HttpMethod::Delete, url, Vec::new()))
            .await?;

        match response.status {
            s if (200..300).contains(&s) => Ok(()),
            404 => Err(PlatformError::not_found(format!("{}/{}", owner, name))),
            _ => Err(Self::classify(&response, name)),
        }
    }
}
