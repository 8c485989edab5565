//! Error types for wgr-git.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not inside a git repository.
    #[error("not a git repository")]
    NotARepository,

    /// Branch not found, neither locally nor as a remote-tracking branch.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// HEAD is detached (not on a branch).
    #[error("HEAD is detached - checkout a branch first")]
    DetachedHead,

    /// Remote not found.
    #[error("remote not found: {0}")]
    RemoteNotFound(String),

    /// Clone failed.
    #[error("clone of {url} failed: {message}")]
    CloneFailed {
        /// The URL being cloned.
        url: String,
        /// Underlying failure.
        message: String,
    },

    /// Push failed or a reference update was rejected.
    #[error("push failed: {0}")]
    PushFailed(String),

    /// Filesystem error while preparing a working copy.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying git2 error.
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}
