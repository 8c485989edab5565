//! Workflow configuration and author identity defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Author name used when none is configured.
pub const DEFAULT_USER_NAME: &str = "with_git_repo";

/// Author email used when none is configured.
pub const DEFAULT_USER_EMAIL: &str = "with_git_repo@everypolitician.org";

/// Remote that branches are looked up on and pushed to.
pub const DEFAULT_REMOTE: &str = "origin";

/// Author identity written to `user.name` / `user.email`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: DEFAULT_USER_NAME.into(),
            email: DEFAULT_USER_EMAIL.into(),
        }
    }
}

/// Options recognised by every construction path.
///
/// Loadable from TOML; every field is optional there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Remote to clone. Required unless a handle is injected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone_url: Option<String>,

    /// Clone target. A fresh temporary directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Author display name.
    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Author contact address.
    #[serde(default = "default_user_email")]
    pub user_email: String,

    /// Remote for tracking-branch lookup and push.
    #[serde(default = "default_remote")]
    pub remote: String,
}

impl WorkflowConfig {
    /// Config for cloning `url` with default identity.
    #[must_use]
    pub fn for_clone(url: impl Into<String>) -> Self {
        Self {
            clone_url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Load config from a TOML file.
    ///
    /// # Errors
    /// Returns error if file can't be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Set the author display name.
    #[must_use]
    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = name.into();
        self
    }

    /// Set the author contact address.
    #[must_use]
    pub fn with_user_email(mut self, email: impl Into<String>) -> Self {
        self.user_email = email.into();
        self
    }

    /// Set the clone target directory.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The identity this config asks for.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            name: self.user_name.clone(),
            email: self.user_email.clone(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let identity = Identity::default();
        Self {
            clone_url: None,
            path: None,
            user_name: identity.name,
            user_email: identity.email,
            remote: default_remote(),
        }
    }
}

fn default_user_name() -> String {
    Identity::default().name
}

fn default_user_email() -> String {
    Identity::default().email
}

fn default_remote() -> String {
    DEFAULT_REMOTE.into()
}
