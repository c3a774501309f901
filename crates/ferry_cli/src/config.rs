//! Configuration file support for ferry.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `FERRY_`, e.g., `FERRY_GITHUB_TOKEN`)
//! 3. Config file (~/.config/ferry/config.toml or ./ferry.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [gitlab]
//! host = "gitlab.com"  # or a self-hosted instance
//! token = "glpat-..."  # or use FERRY_GITLAB_TOKEN env var
//!
//! [github]
//! token = "ghp_..."    # or use FERRY_GITHUB_TOKEN env var
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitLab (source platform) configuration.
    pub gitlab: GitlabConfig,
    /// GitHub (destination platform) configuration.
    pub github: GithubConfig,
}

/// GitLab configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitlabConfig {
    /// GitLab host (e.g., "gitlab.com" or "https://gitlab.example.com").
    /// Can also be set via FERRY_GITLAB_HOST environment variable.
    pub host: Option<String>,
    /// GitLab API token (personal access token).
    /// Can also be set via FERRY_GITLAB_TOKEN environment variable.
    pub token: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// GitHub API token.
    /// Can also be set via FERRY_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/ferry/config.toml)
    /// 3. Local config file (./ferry.toml)
    /// 4. Environment variables with FERRY_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "ferry") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        // Local config file takes priority over the XDG one.
        let local_config = PathBuf::from("ferry.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./ferry.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // FERRY_ prefixed environment variables,
        // e.g., FERRY_GITLAB_TOKEN -> gitlab.token
        builder = builder.add_source(
            Environment::with_prefix("FERRY")
                .separator("_")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Get the GitLab host, defaulting to gitlab.com.
    pub fn gitlab_host(&self) -> String {
        self.gitlab
            .host
            .clone()
            .unwrap_or_else(|| "gitlab.com".to_string())
    }

    /// Get the GitLab token.
    pub fn gitlab_token(&self) -> Option<String> {
        self.gitlab.token.clone()
    }

    /// Get the GitHub token.
    pub fn github_token(&self) -> Option<String> {
        self.github.token.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_tokens() {
        let config = Config::default();
        assert!(config.gitlab_token().is_none());
        assert!(config.github_token().is_none());
        assert_eq!(config.gitlab_host(), "gitlab.com");
    }

    #[test]
    fn config_deserializes_from_toml() {
        let config: Config = toml_str(
            r#"
            [gitlab]
            host = "gitlab.example.com"
            token = "glpat-abc"

            [github]
            token = "ghp-def"
            "#,
        );
        assert_eq!(config.gitlab_host(), "gitlab.example.com");
        assert_eq!(config.gitlab_token().as_deref(), Some("glpat-abc"));
        assert_eq!(config.github_token().as_deref(), Some("ghp-def"));
    }

    fn toml_str(s: &str) -> Config {
        ConfigBuilder::builder()
            .add_source(File::from_str(s, FileFormat::Toml))
            .build()
            .expect("config builds")
            .try_deserialize()
            .expect("config deserializes")
    }
}
