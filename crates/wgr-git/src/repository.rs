//! Repository wrapper providing the git operations behind a workflow.

use std::path::Path;

use git2::{BranchType, ErrorCode, IndexAddOption, Oid, Status, StatusOptions};
use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::GitOps;

/// High-level wrapper around a git working copy.
pub struct Repository {
    inner: git2::Repository,
}

impl Repository {
    /// Clone `url` into `path`.
    ///
    /// # Errors
    /// Returns `CloneFailed` if the remote is unreachable or the path is unusable.
    pub fn clone_into(url: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(url, path = %path.display(), "cloning");
        let inner = git2::build::RepoBuilder::new()
            .clone(url, path)
            .map_err(|e| Error::CloneFailed {
                url: url.to_string(),
                message: e.message().to_string(),
            })?;
        Ok(Self { inner })
    }

    /// Open the working copy rooted at `path`.
    ///
    /// Parent directories are not searched, so `path` must be the root of
    /// the working copy (or its `.git` directory).
    ///
    /// # Errors
    /// Returns `NotARepository` if `path` is not a repository root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = git2::Repository::open(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => Error::NotARepository,
            _ => Error::Git2(e),
        })?;
        Ok(Self { inner })
    }

    /// Get the path to the repository root (workdir).
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.inner.workdir()
    }

    /// Get the path to the .git directory.
    #[must_use]
    pub fn git_dir(&self) -> &Path {
        self.inner.path()
    }

    // === Branch operations ===

    /// Get the name of the current branch.
    ///
    /// An unborn branch (fresh clone of an empty remote) is reported by the
    /// name HEAD points at.
    ///
    /// # Errors
    /// Returns error if HEAD is detached.
    pub fn current_branch(&self) -> Result<String> {
        match self.inner.head() {
            Ok(head) => {
                if !head.is_branch() {
                    return Err(Error::DetachedHead);
                }
                head.shorthand()
                    .map(String::from)
                    .ok_or(Error::DetachedHead)
            }
            Err(e) if is_unborn(&e) => {
                let head = self.inner.find_reference("HEAD")?;
                head.symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .map(String::from)
                    .ok_or(Error::DetachedHead)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a local branch exists.
    #[must_use]
    pub fn branch_exists(&self, name: &str) -> bool {
        self.inner.find_branch(name, BranchType::Local).is_ok()
    }

    /// Check if `<remote>/<name>` exists as a remote-tracking branch.
    #[must_use]
    pub fn remote_branch_exists(&self, remote: &str, name: &str) -> bool {
        self.inner
            .find_branch(&format!("{remote}/{name}"), BranchType::Remote)
            .is_ok()
    }

    /// List local branches and remote-tracking branches.
    ///
    /// Remote-tracking names carry their remote prefix (`origin/main`).
    /// Symbolic `<remote>/HEAD` entries are skipped.
    ///
    /// # Errors
    /// Returns error if branch listing fails.
    pub fn list_branches(&self) -> Result<Vec<String>> {
        let branches = self.inner.branches(None)?;

        let names: Vec<String> = branches
            .filter_map(|b| b.ok())
            .filter_map(|(b, _)| b.name().ok().flatten().map(String::from))
            .filter(|name| !name.ends_with("/HEAD"))
            .collect();

        Ok(names)
    }

    /// Checkout a branch.
    ///
    /// When no local branch exists but `<remote>/<branch_name>` does, a
    /// local branch tracking it is created first.
    ///
    /// # Errors
    /// Returns `BranchNotFound` if neither exists, or error if checkout fails.
    pub fn checkout(&self, remote: &str, branch_name: &str) -> Result<()> {
        if !self.branch_exists(branch_name) && self.remote_branch_exists(remote, branch_name) {
            self.track_remote_branch(remote, branch_name)?;
        }

        let branch = self
            .inner
            .find_branch(branch_name, BranchType::Local)
            .map_err(|_| Error::BranchNotFound(branch_name.into()))?;

        let reference = branch.get();
        let object = reference.peel(git2::ObjectType::Commit)?;

        self.inner.checkout_tree(&object, None)?;
        self.inner.set_head(&format!("refs/heads/{branch_name}"))?;

        Ok(())
    }

    /// Create a branch at HEAD and make it current.
    ///
    /// The working tree is left untouched. On an unborn HEAD only the
    /// symbolic HEAD is moved; the branch comes into being with the first
    /// commit.
    ///
    /// # Errors
    /// Returns error if branch creation fails.
    pub fn create_and_checkout(&self, name: &str) -> Result<()> {
        match self.inner.head() {
            Ok(head) => {
                let head_commit = head.peel_to_commit()?;
                self.inner.branch(name, &head_commit, false)?;
            }
            Err(e) if is_unborn(&e) => {}
            Err(e) => return Err(e.into()),
        }

        self.inner.set_head(&format!("refs/heads/{name}"))?;
        Ok(())
    }

    /// Create local branch `name` at the tip of `<remote>/<name>` with that
    /// remote-tracking branch as upstream. HEAD is not moved.
    ///
    /// # Errors
    /// Returns `BranchNotFound` if `<remote>/<name>` doesn't exist, or error
    /// if the branch cannot be created.
    pub fn track_remote_branch(&self, remote: &str, name: &str) -> Result<()> {
        let upstream = format!("{remote}/{name}");
        let commit = self
            .inner
            .find_branch(&upstream, BranchType::Remote)
            .map_err(|_| Error::BranchNotFound(upstream.clone()))?
            .get()
            .peel_to_commit()?;

        let mut local = self.inner.branch(name, &commit, false)?;
        local.set_upstream(Some(upstream.as_str()))?;
        debug!(branch = name, upstream = %upstream, "created local tracking branch");

        Ok(())
    }

    // === Config ===

    /// Set a value in the repository-local config.
    ///
    /// # Errors
    /// Returns error if the config cannot be written.
    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.inner.config()?.set_str(key, value)?;
        Ok(())
    }

    /// Read a config value across all config levels.
    ///
    /// # Errors
    /// Returns error if the config cannot be read.
    pub fn config(&self, key: &str) -> Result<Option<String>> {
        match self.inner.config()?.get_string(key) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // === Working directory state ===

    /// Stage every change in the working tree, deletions included.
    ///
    /// # Errors
    /// Returns error if the index cannot be updated.
    pub fn stage_all(&self) -> Result<()> {
        let mut index = self.inner.index()?;
        index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"], None)?;
        index.write()?;
        Ok(())
    }

    /// Paths modified, deleted, renamed or type-changed in index or worktree.
    ///
    /// # Errors
    /// Returns error if status check fails.
    pub fn changed_paths(&self) -> Result<Vec<String>> {
        self.paths_with_status(
            Status::INDEX_MODIFIED
                | Status::INDEX_DELETED
                | Status::INDEX_RENAMED
                | Status::INDEX_TYPECHANGE
                | Status::WT_MODIFIED
                | Status::WT_DELETED
                | Status::WT_RENAMED
                | Status::WT_TYPECHANGE,
        )
    }

    /// Paths new in the index or untracked in the worktree.
    ///
    /// # Errors
    /// Returns error if status check fails.
    pub fn added_paths(&self) -> Result<Vec<String>> {
        self.paths_with_status(Status::INDEX_NEW | Status::WT_NEW)
    }

    fn paths_with_status(&self, mask: Status) -> Result<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(true);

        let statuses = self.inner.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter(|entry| entry.status().intersects(mask))
            .filter_map(|entry| entry.path().map(String::from))
            .collect())
    }

    // === Commit operations ===

    /// Commit the index on top of HEAD using `user.name`/`user.email`.
    ///
    /// # Errors
    /// Returns error if the identity is not configured or the commit fails.
    pub fn create_commit(&self, message: &str) -> Result<Oid> {
        let sig = self.inner.signature()?;
        let tree_id = self.inner.index()?.write_tree()?;
        let tree = self.inner.find_tree(tree_id)?;

        let parent = match self.inner.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if is_unborn(&e) => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self
            .inner
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
        Ok(oid)
    }

    // === Remote operations ===

    /// Get the URL of a remote.
    ///
    /// # Errors
    /// Returns `RemoteNotFound` if the remote doesn't exist or has no URL.
    pub fn remote_url(&self, remote: &str) -> Result<String> {
        let found = self
            .inner
            .find_remote(remote)
            .map_err(|_| Error::RemoteNotFound(remote.into()))?;

        found
            .url()
            .map(String::from)
            .ok_or_else(|| Error::RemoteNotFound(remote.into()))
    }

    /// Push `refs/heads/<branch>` to the same ref on `remote`.
    ///
    /// # Errors
    /// Returns `PushFailed` if the transfer fails or the remote rejects the update.
    pub fn push(&self, remote: &str, branch: &str) -> Result<()> {
        let mut found = self
            .inner
            .find_remote(remote)
            .map_err(|_| Error::RemoteNotFound(remote.into()))?;

        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        let mut rejected: Option<String> = None;

        {
            let mut callbacks = git2::RemoteCallbacks::new();
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    rejected = Some(format!("{refname}: {message}"));
                }
                Ok(())
            });

            let mut opts = git2::PushOptions::new();
            opts.remote_callbacks(callbacks);

            found
                .push(&[refspec.as_str()], Some(&mut opts))
                .map_err(|e| Error::PushFailed(e.message().to_string()))?;
        }

        match rejected {
            Some(reason) => Err(Error::PushFailed(reason)),
            None => Ok(()),
        }
    }

    // === Low-level access ===

    /// Get a reference to the underlying git2 repository.
    ///
    /// Use sparingly - prefer high-level methods.
    #[must_use]
    pub const fn inner(&self) -> &git2::Repository {
        &self.inner
    }
}

fn is_unborn(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

impl GitOps for Repository {
    fn clone_into(url: &str, path: &Path) -> Result<Self> {
        Self::clone_into(url, path)
    }

    fn open(path: &Path) -> Result<Self> {
        Self::open(path)
    }

    fn workdir(&self) -> Option<&Path> {
        self.workdir()
    }

    fn current_branch(&self) -> Result<String> {
        self.current_branch()
    }

    fn remote_url(&self, remote: &str) -> Result<String> {
        self.remote_url(remote)
    }

    fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.set_config(key, value)
    }

    fn config(&self, key: &str) -> Result<Option<String>> {
        self.config(key)
    }

    fn branch_exists(&self, name: &str) -> bool {
        self.branch_exists(name)
    }

    fn remote_branch_exists(&self, remote: &str, name: &str) -> bool {
        self.remote_branch_exists(remote, name)
    }

    fn list_branches(&self) -> Result<Vec<String>> {
        self.list_branches()
    }

    fn checkout(&self, remote: &str, branch: &str) -> Result<()> {
        self.checkout(remote, branch)
    }

    fn create_and_checkout(&self, branch: &str) -> Result<()> {
        self.create_and_checkout(branch)
    }

    fn stage_all(&self) -> Result<()> {
        self.stage_all()
    }

    fn changed_paths(&self) -> Result<Vec<String>> {
        self.changed_paths()
    }

    fn added_paths(&self) -> Result<Vec<String>> {
        self.added_paths()
    }

    fn create_commit(&self, message: &str) -> Result<Oid> {
        self.create_commit(message)
    }

    fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.push(remote, branch)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.git_dir())
            .finish()
    }
}
