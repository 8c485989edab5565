//! Trait abstractions for git operations.
//!
//! This module defines the `GitOps` trait, the capability surface the commit
//! workflow consumes. It enables dependency injection and testability.

use std::path::Path;

use git2::Oid;

use crate::Result;

/// Trait for git repository operations.
///
/// This trait abstracts git operations, allowing for:
/// - Dependency injection of a pre-built handle into a workflow
/// - Mock implementations for testing
///
/// All operations block the calling thread until git2 returns.
#[allow(clippy::missing_errors_doc)]
pub trait GitOps {
    // === Construction ===

    /// Clone `url` into `path` and return a handle on the new working copy.
    fn clone_into(url: &str, path: &Path) -> Result<Self>
    where
        Self: Sized;

    /// Open an existing working copy at `path`.
    fn open(path: &Path) -> Result<Self>
    where
        Self: Sized;

    // === Repository Info ===

    /// Get the working directory path.
    fn workdir(&self) -> Option<&Path>;

    /// Get the current branch name.
    fn current_branch(&self) -> Result<String>;

    /// Get the URL of a remote.
    fn remote_url(&self, remote: &str) -> Result<String>;

    // === Config ===

    /// Set a config value in the repository-local config.
    fn set_config(&self, key: &str, value: &str) -> Result<()>;

    /// Read a config value; `None` when unset.
    fn config(&self, key: &str) -> Result<Option<String>>;

    // === Branch Operations ===

    /// Check if a local branch exists.
    fn branch_exists(&self, name: &str) -> bool;

    /// Check if the remote-tracking branch `<remote>/<name>` exists.
    fn remote_branch_exists(&self, remote: &str, name: &str) -> bool;

    /// List local branch names and remote-tracking names (`origin/<name>`).
    fn list_branches(&self) -> Result<Vec<String>>;

    /// Checkout an existing branch.
    ///
    /// If only `<remote>/<branch>` exists, a local branch tracking it is
    /// created first.
    fn checkout(&self, remote: &str, branch: &str) -> Result<()>;

    /// Create a branch at HEAD and switch to it.
    fn create_and_checkout(&self, branch: &str) -> Result<()>;

    // === Working Directory ===

    /// Stage all changes, including deletions.
    fn stage_all(&self) -> Result<()>;

    /// Paths that are modified, deleted, renamed or type-changed.
    fn changed_paths(&self) -> Result<Vec<String>>;

    /// Paths that are new, staged or untracked.
    fn added_paths(&self) -> Result<Vec<String>>;

    /// Create a commit from the index using the configured identity.
    fn create_commit(&self, message: &str) -> Result<Oid>;

    // === Remote Operations ===

    /// Push `branch` to the same name on `remote`.
    fn push(&self, remote: &str, branch: &str) -> Result<()>;
}
