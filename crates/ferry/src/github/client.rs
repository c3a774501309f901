//! GitHub API client creation and management.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::types::{CreateRepoRequest, GithubRepo, GithubUser};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, next_page_url};
use crate::platform::{
    self, CreateRepoOptions, PlatformClient, PlatformError, SourceProject, UserIdentity,
};

/// Default GitHub API endpoint.
const API_URL: &str = "https://api.github.com";

/// Host GitHub repositories are pushed to.
const WEB_HOST: &str = "github.com";

/// Page size for list endpoints.
const PAGE_SIZE: u32 = 100;

/// GitHub API client.
///
/// Authenticates with a personal access token via the
/// `Authorization: token <tok>` header scheme.
#[derive(Clone)]
pub struct GithubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    host: String,
    token: String,
}

impl GithubClient {
    /// Create a new GitHub client for github.com.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = GithubClient::new("ghp_token")?;
    /// ```
    pub fn new(token: &str) -> Result<Self, PlatformError> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(30))
            .map_err(|e| PlatformError::network(e.to_string()))?;
        Ok(Self::new_with_transport(token, Arc::new(transport)))
    }

    pub fn new_with_transport(token: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_url: API_URL.to_string(),
            host: WEB_HOST.to_string(),
            token: token.to_string(),
        }
    }

    fn request(&self, method: HttpMethod, url: String, body: Vec<u8>) -> HttpRequest {
        let mut headers = vec![
            (
                "Accept".to_string(),
                "application/vnd.github+json".to_string(),
            ),
            ("User-Agent".to_string(), "ferry".to_string()),
            (
                "Authorization".to_string(),
                format!("token {}", self.token),
            ),
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

    /// Classify a non-2xx response into a typed error.
    fn classify(response: &HttpResponse, resource: &str) -> PlatformError {
        let message = String::from_utf8_lossy(&response.body).to_string();
        match response.status {
            401 | 403 => PlatformError::Auth,
            404 => PlatformError::not_found(resource),
            status => PlatformError::api(status, message),
        }
    }

    /// Make an authenticated GET request and deserialize the response.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> platform::Result<T> {
        let url = format!("{}{}", self.api_url, path);
        let response = self.send(self.request(HttpMethod::Get, url, Vec::new())).await?;

        if !(200..300).contains(&response.status) {
            return Err(Self::classify(&response, path));
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| PlatformError::api(response.status, e.to_string()))
    }

    /// Fetch every page of a list endpoint, following `Link: rel="next"`.
    ///
    /// Page order is preserved and any page failure aborts the whole listing.
    async fn get_paginated<T: DeserializeOwned>(&self, path: &str) -> platform::Result<Vec<T>> {
        let mut url = format!("{}{}?per_page={}", self.api_url, path, PAGE_SIZE);
        let mut items: Vec<T> = Vec::new();

        loop {
            let response = self
                .send(self.request(HttpMethod::Get, url.clone(), Vec::new()))
                .await?;

            if !(200..300).contains(&response.status) {
                return Err(Self::classify(&response, path));
            }

            let page: Vec<T> = serde_json::from_slice(&response.body)
                .map_err(|e| PlatformError::api(response.status, e.to_string()))?;
            items.extend(page);

            match next_page_url(&response.headers) {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl PlatformClient for GithubClient {
    fn host(&self) -> &str {
        &self.host
    }

    fn token(&self) -> &str {
        &self.token
    }

    async fn current_user(&self) -> platform::Result<UserIdentity> {
        let user: GithubUser = self.get("/user").await?;
        Ok(UserIdentity {
            login: user.login,
            name: user.name,
        })
    }

    async fn search_projects(&self, name: &str) -> platform::Result<Vec<SourceProject>> {
        // GitHub has no substring filter on the owned-repos listing, so the
        // search semantics (substring match, page order preserved) are
        // applied client-side over the full listing.
        let repos = self.list_projects().await?;
        Ok(repos
            .into_iter()
            .filter(|repo| repo.name.contains(name))
            .collect())
    }

    async fn list_projects(&self) -> platform::Result<Vec<SourceProject>> {
        let repos: Vec<GithubRepo> = self.get_paginated("/user/repos").await?;
        Ok(repos.iter().map(GithubRepo::to_source_project).collect())
    }

    async fn create_repo(
        &self,
        name: &str,
        options: &CreateRepoOptions,
    ) -> platform::Result<()> {
        let body = serde_json::to_vec(&CreateRepoRequest {
            name,
            description: options.description.as_deref(),
            private: options.private,
        })
        .map_err(|e| PlatformError::api(0, e.to_string()))?;

        let url = format!("{}/user/repos", self.api_url);
        let response = self.send(self.request(HttpMethod::Post, url, body)).await?;

        match response.status {
            s if (200..300).contains(&s) => Ok(()),
            // 422 is GitHub's "name already exists on this account"
            // validation failure; 409 is kept for Gitea-compatible APIs.
            409 | 422 => Err(PlatformError::conflict(name)),
            _ => Err(Self::classify(&response, name)),
        }
    }

    async fn delete_repo(&self, owner: &str, name: &str) -> platform::Result<()> {
        let url = format!("{}/repos/{}/{}", self.api_url, owner, name);
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
