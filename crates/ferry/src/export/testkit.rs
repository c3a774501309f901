//! Scripted in-memory platform and VCS doubles for pipeline tests.

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::platform::{
    self, CreateRepoOptions, PlatformClient, PlatformError, SourceProject, UserIdentity,
};
use crate::vcs::{Vcs, VcsError, WorkingCopy};

/// Call log shared between doubles and assertions.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }
}

pub fn source_project(name: &str) -> SourceProject {
    SourceProject {
        id: 1,
        name: name.to_string(),
        owner_login: "mia".to_string(),
        http_url_to_repo: format!("https://gitlab.com/mia/{name}.git"),
        description: None,
    }
}

/// Platform double serving a fixed project list (search is a substring
/// filter, like the real source) and an in-memory destination repo set.
pub struct ScriptedPlatform {
    pub host: String,
    pub token: String,
    pub login: String,
    pub projects: Vec<SourceProject>,
    pub existing: Mutex<HashSet<String>>,
    pub fail_auth: bool,
    pub log: CallLog,
}

impl ScriptedPlatform {
    pub fn source(projects: Vec<SourceProject>, log: CallLog) -> Self {
        Self {
            host: "gitlab.com".to_string(),
            token: "glpat-secret".to_string(),
            login: "mia".to_string(),
            projects,
            existing: Mutex::new(HashSet::new()),
            fail_auth: false,
            log,
        }
    }

    pub fn destination(existing: &[&str], log: CallLog) -> Self {
        Self {
            host: "github.com".to_string(),
            token: "ghp-secret".to_string(),
            login: "octocat".to_string(),
            projects: Vec::new(),
            existing: Mutex::new(existing.iter().map(|s| s.to_string()).collect()),
            fail_auth: false,
            log,
        }
    }

    pub fn repo_exists(&self, name: &str) -> bool {
        self.existing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(name)
    }
}

#[async_trait]
impl PlatformClient for ScriptedPlatform {
    fn host(&self) -> &str {
        &self.host
    }

    fn token(&self) -> &str {
        &self.token
    }

    async fn current_user(&self) -> platform::Result<UserIdentity> {
        if self.fail_auth {
            return Err(PlatformError::Auth);
        }
        Ok(UserIdentity {
            login: self.login.clone(),
            name: None,
        })
    }

    async fn search_projects(&self, name: &str) -> platform::Result<Vec<SourceProject>> {
        self.log.push(format!("search:{name}"));
        Ok(self
            .projects
            .iter()
            .filter(|p| p.name.contains(name))
            .cloned()
            .collect())
    }

    async fn list_projects(&self) -> platform::Result<Vec<SourceProject>> {
        Ok(self.projects.clone())
    }

    async fn create_repo(
        &self,
        name: &str,
        _options: &CreateRepoOptions,
    ) -> platform::Result<()> {
        self.log.push(format!("create:{name}"));
        let mut existing = self.existing.lock().unwrap_or_else(|e| e.into_inner());
        if existing.contains(name) {
            return Err(PlatformError::conflict(name));
        }
        existing.insert(name.to_string());
        Ok(())
    }

    async fn delete_repo(&self, owner: &str, name: &str) -> platform::Result<()> {
        self.log.push(format!("delete:{owner}/{name}"));
        let mut existing = self.existing.lock().unwrap_or_else(|e| e.into_inner());
        if existing.remove(name) {
            Ok(())
        } else {
            Err(PlatformError::not_found(format!("{owner}/{name}")))
        }
    }
}

/// VCS double that records operations instead of touching git.
pub struct ScriptedVcs {
    /// Clone fails for any destination whose final path component is listed.
    pub fail_clone_for: HashSet<String>,
    pub fail_lfs: bool,
    pub fail_push: bool,
    pub log: CallLog,
}

impl ScriptedVcs {
    pub fn new(log: CallLog) -> Self {
        Self {
            fail_clone_for: HashSet::new(),
            fail_lfs: false,
            fail_push: false,
            log,
        }
    }
}

#[async_trait]
impl Vcs for ScriptedVcs {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<Box<dyn WorkingCopy>, VcsError> {
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.log.push(format!("clone:{name}"));

        // Credentials must have been inlined by the task.
        assert!(url.contains('@'), "clone URL should carry credentials");

        if self.fail_clone_for.contains(&name) {
            return Err(VcsError::CloneFailed {
                message: format!("repository '{name}' not found"),
            });
        }

        Ok(Box::new(ScriptedWorkingCopy {
            path: dest.to_path_buf(),
            name,
            fail_lfs: self.fail_lfs,
            fail_push: self.fail_push,
            log: self.log.clone(),
        }))
    }
}

pub struct ScriptedWorkingCopy {
    path: PathBuf,
    name: String,
    fail_lfs: bool,
    fail_push: bool,
    log: CallLog,
}

#[async_trait]
impl WorkingCopy for ScriptedWorkingCopy {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn fetch_lfs_all(&self) -> Result<(), VcsError> {
        self.log.push(format!("lfs:{}", self.name));
        if self.fail_lfs {
            return Err(VcsError::LfsFetchFailed {
                message: "lfs object missing".to_string(),
            });
        }
        Ok(())
    }

    async fn add_remote(&mut self, name: &str, url: &str) -> Result<(), VcsError> {
        self.log.push(format!("remote:{name}"));
        assert!(url.contains('@'), "push URL should carry credentials");
        Ok(())
    }

    async fn push(&self, remote: &str) -> Result<(), VcsError> {
        self.log.push(format!("push:{remote}"));
        if self.fail_push {
            return Err(VcsError::PushFailed {
                name: remote.to_string(),
                message: "remote hung up".to_string(),
            });
        }
        Ok(())
    }
}
