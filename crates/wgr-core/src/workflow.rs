//! The commit workflow: checkout-or-create, mutate, commit-if-dirty, push.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use wgr_git::{GitOps, Oid, Repository};

use crate::config::{Identity, WorkflowConfig};
use crate::error::{Error, Result};
use crate::workdir::with_workdir;

const MISSING_SOURCE: &str = "must provide a clone source or a handle";

/// Result of a commit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The mutation changed the tree and a commit was created.
    Committed {
        /// The new commit.
        commit: Oid,
        /// Branch the commit landed on, if HEAD is on one.
        branch: Option<String>,
        /// Whether the branch was pushed.
        pushed: bool,
    },
    /// The mutation left the tree clean. Nothing was committed or pushed.
    Unchanged,
}

impl CommitOutcome {
    /// Whether a commit was created.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Commit workflow bound to one working copy.
///
/// One workflow serves one logical sequence of commits. The working
/// directory, checked-out branch and index are mutated without locking, so
/// concurrent commits need separate workflows on separate paths.
pub struct CommitWorkflow<G: GitOps = Repository> {
    repo: G,
    remote: String,
    clone_url: Option<String>,
}

impl<G: GitOps> CommitWorkflow<G> {
    /// Clone the configured remote and bind to it.
    ///
    /// # Errors
    /// Returns `Configuration` if `config.clone_url` is unset, otherwise
    /// whatever [`Self::clone_remote`] returns.
    pub fn from_config(config: &WorkflowConfig) -> Result<Self> {
        let url = config
            .clone_url
            .as_deref()
            .ok_or_else(|| Error::Configuration(MISSING_SOURCE.into()))?;
        Self::clone_remote(url, config)
    }

    /// Clone `url` into `config.path` (or a fresh temporary directory) and
    /// configure the author identity.
    ///
    /// The temporary directory is not removed by the workflow.
    ///
    /// # Errors
    /// Returns `Clone` if the directory cannot be created or cloning fails,
    /// `Identity` if the identity cannot be written.
    pub fn clone_remote(url: &str, config: &WorkflowConfig) -> Result<Self> {
        let path = match &config.path {
            Some(path) => path.clone(),
            None => temp_clone_dir(url, &env::temp_dir())?,
        };

        let repo = G::clone_into(url, &path).map_err(|source| Error::Clone {
            url: url.to_string(),
            source,
        })?;
        info!(url, path = %path.display(), "cloned repository");

        configure_identity(&repo, &config.identity())?;

        Ok(Self {
            repo,
            remote: config.remote.clone(),
            clone_url: Some(url.to_string()),
        })
    }

    /// Open an existing working copy (the current directory when `path` is
    /// `None`) and configure the author identity.
    ///
    /// `path` must be the root of the working copy; parent directories are
    /// not searched.
    ///
    /// # Errors
    /// Returns `Open` if the path is not a working copy root or the current
    /// directory cannot be read, `Identity` if the identity cannot be
    /// written.
    pub fn open(path: Option<&Path>, config: &WorkflowConfig) -> Result<Self> {
        let path: PathBuf = match path {
            Some(path) => path.to_path_buf(),
            None => env::current_dir().map_err(|e| Error::Open {
                path: PathBuf::from("."),
                source: e.into(),
            })?,
        };

        let repo = G::open(&path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "opened working copy");

        configure_identity(&repo, &config.identity())?;

        Ok(Self::bind(repo, &config.remote))
    }

    /// Bind to a pre-built handle.
    ///
    /// No clone, no open and no identity configuration happen here; the
    /// caller sets up `user.name` / `user.email` on the handle.
    #[must_use]
    pub fn with_handle(repo: G) -> Self {
        Self::bind(repo, crate::config::DEFAULT_REMOTE)
    }

    fn bind(repo: G, remote: &str) -> Self {
        let clone_url = repo.remote_url(remote).ok();
        Self {
            repo,
            remote: remote.to_string(),
            clone_url,
        }
    }

    /// The underlying handle.
    #[must_use]
    pub const fn repo(&self) -> &G {
        &self.repo
    }

    /// Remote used for tracking lookups and pushes.
    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// URL cloned from, or the remote's URL for an opened working copy.
    #[must_use]
    pub fn clone_url(&self) -> Option<&str> {
        self.clone_url.as_deref()
    }

    /// Working directory of the bound working copy.
    ///
    /// # Errors
    /// Returns `NoWorkdir` for a bare repository.
    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or(Error::NoWorkdir)
    }

    /// Configured `user.name`.
    ///
    /// # Errors
    /// Returns error if the config cannot be read.
    pub fn user_name(&self) -> Result<Option<String>> {
        self.repo
            .config("user.name")
            .map_err(|source| Error::Identity {
                key: "user.name".into(),
                source,
            })
    }

    /// Configured `user.email`.
    ///
    /// # Errors
    /// Returns error if the config cannot be read.
    pub fn user_email(&self) -> Result<Option<String>> {
        self.repo
            .config("user.email")
            .map_err(|source| Error::Identity {
                key: "user.email".into(),
                source,
            })
    }

    /// Check out (or create) `branch`, run `mutation` inside the working
    /// directory, and commit and push if anything changed.
    ///
    /// With `branch` set to `None` the current branch is used and pushed.
    /// The mutation receives the working directory, which is also the
    /// current directory while it runs.
    ///
    /// # Errors
    /// Returns `Branch`, `Mutation`, `Stage`, `Status`, `Commit` or `Push`
    /// for a failure at that step. Later steps are not attempted.
    pub fn commit_to_branch<F>(
        &self,
        branch: Option<&str>,
        message: &str,
        mutation: F,
    ) -> Result<CommitOutcome>
    where
        F: FnOnce(&Path) -> io::Result<()>,
    {
        if let Some(branch) = branch {
            self.resolve_branch(branch)?;
        }

        let Some(commit) = self.mutate_and_commit(message, mutation)? else {
            return Ok(CommitOutcome::Unchanged);
        };

        let branch = match branch {
            Some(branch) => branch.to_string(),
            None => self
                .repo
                .current_branch()
                .map_err(|source| Error::Branch {
                    branch: "HEAD".into(),
                    source,
                })?,
        };

        self.repo
            .push(&self.remote, &branch)
            .map_err(|source| Error::Push {
                remote: self.remote.clone(),
                branch: branch.clone(),
                source,
            })?;
        info!(remote = %self.remote, branch = %branch, "pushed");

        Ok(CommitOutcome::Committed {
            commit,
            branch: Some(branch),
            pushed: true,
        })
    }

    /// Run `mutation` on the current branch and commit if anything
    /// changed. Never checks out and never pushes.
    ///
    /// # Errors
    /// Returns `Mutation`, `Stage`, `Status` or `Commit` for a failure at
    /// that step.
    pub fn commit_in_place<F>(&self, message: &str, mutation: F) -> Result<CommitOutcome>
    where
        F: FnOnce(&Path) -> io::Result<()>,
    {
        let Some(commit) = self.mutate_and_commit(message, mutation)? else {
            return Ok(CommitOutcome::Unchanged);
        };

        Ok(CommitOutcome::Committed {
            commit,
            branch: self.repo.current_branch().ok(),
            pushed: false,
        })
    }

    /// Check out `branch` if it exists locally or on the bound remote,
    /// otherwise create it at HEAD and switch to it.
    ///
    /// A branch only on the remote is tracked from `<remote>/<branch>` by
    /// the handle's checkout.
    fn resolve_branch(&self, branch: &str) -> Result<()> {
        let exists = self.repo.branch_exists(branch)
            || self.repo.remote_branch_exists(&self.remote, branch);

        let checked_out = if exists {
            debug!(branch, remote = %self.remote, "checking out existing branch");
            self.repo.checkout(&self.remote, branch)
        } else {
            debug!(branch, "creating branch");
            self.repo.create_and_checkout(branch)
        };

        checked_out.map_err(|source| Error::Branch {
            branch: branch.to_string(),
            source,
        })
    }

    /// Steps shared by both variants. `None` means the tree stayed clean.
    fn mutate_and_commit<F>(&self, message: &str, mutation: F) -> Result<Option<Oid>>
    where
        F: FnOnce(&Path) -> io::Result<()>,
    {
        let workdir = self.workdir()?.to_path_buf();
        with_workdir(&workdir, || mutation(&workdir))?.map_err(Error::Mutation)?;

        self.repo.stage_all().map_err(Error::Stage)?;

        if !self.is_committable()? {
            info!("no changes to commit");
            return Ok(None);
        }

        let commit = self.repo.create_commit(message).map_err(Error::Commit)?;
        info!(%commit, "committed changes");
        Ok(Some(commit))
    }

    fn is_committable(&self) -> Result<bool> {
        let changed = self.repo.changed_paths().map_err(Error::Status)?;
        let added = self.repo.added_paths().map_err(Error::Status)?;
        debug!(changed = changed.len(), added = added.len(), "working tree status");
        Ok(!changed.is_empty() || !added.is_empty())
    }
}

impl<G: GitOps> std::fmt::Debug for CommitWorkflow<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitWorkflow")
            .field("workdir", &self.repo.workdir())
            .field("remote", &self.remote)
            .field("clone_url", &self.clone_url)
            .finish()
    }
}

fn temp_clone_dir(url: &str, base: &Path) -> Result<PathBuf> {
    tempfile::Builder::new()
        .prefix("with_git_repo")
        .tempdir_in(base)
        .map(tempfile::TempDir::keep)
        .map_err(|e| Error::Clone {
            url: url.to_string(),
            source: e.into(),
        })
}

fn configure_identity<G: GitOps>(repo: &G, identity: &Identity) -> Result<()> {
    for (key, value) in [("user.name", &identity.name), ("user.email", &identity.email)] {
        repo.set_config(key, value)
            .map_err(|source| Error::Identity {
                key: key.to_string(),
                source,
            })?;
    }
    Ok(())
}

/// Builder choosing between an injected handle and a clone source.
///
/// ```no_run
/// use wgr_core::{WorkflowBuilder, WorkflowConfig};
///
/// let workflow = WorkflowBuilder::new()
///     .config(WorkflowConfig::default().with_user_name("bot"))
///     .clone_url("https://example.com/data.git")
///     .build()?;
/// # Ok::<(), wgr_core::Error>(())
/// ```
#[derive(Debug)]
pub struct WorkflowBuilder<G: GitOps = Repository> {
    config: WorkflowConfig,
    handle: Option<G>,
}

impl WorkflowBuilder {
    /// Builder producing a workflow over a git2-backed [`Repository`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: GitOps> Default for WorkflowBuilder<G> {
    fn default() -> Self {
        Self {
            config: WorkflowConfig::default(),
            handle: None,
        }
    }
}

impl<G: GitOps> WorkflowBuilder<G> {
    /// Replace the whole config. A clone URL set earlier is kept unless the
    /// new config carries its own.
    #[must_use]
    pub fn config(mut self, config: WorkflowConfig) -> Self {
        let clone_url = config.clone_url.clone().or(self.config.clone_url);
        self.config = WorkflowConfig { clone_url, ..config };
        self
    }

    /// Remote to clone.
    #[must_use]
    pub fn clone_url(mut self, url: impl Into<String>) -> Self {
        self.config.clone_url = Some(url.into());
        self
    }

    /// Use a pre-built handle instead of cloning.
    #[must_use]
    pub fn handle<H: GitOps>(self, handle: H) -> WorkflowBuilder<H> {
        WorkflowBuilder {
            config: self.config,
            handle: Some(handle),
        }
    }

    /// Build the workflow: an injected handle wins, then the clone URL.
    ///
    /// # Errors
    /// Returns `Configuration` when neither is supplied, or any clone error.
    pub fn build(self) -> Result<CommitWorkflow<G>> {
        match (self.handle, self.config.clone_url.as_deref()) {
            (Some(handle), _) => Ok(CommitWorkflow::bind(handle, &self.config.remote)),
            (None, Some(url)) => CommitWorkflow::clone_remote(url, &self.config),
            (None, None) => Err(Error::Configuration(MISSING_SOURCE.into())),
        }
    }
}
