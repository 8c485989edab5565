//! Error types for wgr-core.

use std::path::PathBuf;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running a commit workflow.
///
/// Collaborator failures keep the originating [`wgr_git::Error`] as their
/// source. Nothing is retried; the caller owns recovery.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither a clone source nor a handle was supplied.
    #[error("{0}")]
    Configuration(String),

    /// Cloning the remote failed.
    #[error("failed to clone {url}")]
    Clone {
        url: String,
        #[source]
        source: wgr_git::Error,
    },

    /// The path is not a usable working copy.
    #[error("failed to open working copy at {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: wgr_git::Error,
    },

    /// Writing the author identity to the repository config failed.
    #[error("failed to set {key}")]
    Identity {
        key: String,
        #[source]
        source: wgr_git::Error,
    },

    /// Checkout or creation of the target branch failed.
    #[error("failed to check out branch '{branch}'")]
    Branch {
        branch: String,
        #[source]
        source: wgr_git::Error,
    },

    /// Staging the working tree failed.
    #[error("failed to stage changes")]
    Stage(#[source] wgr_git::Error),

    /// Querying working tree status failed.
    #[error("failed to read working tree status")]
    Status(#[source] wgr_git::Error),

    /// Creating the commit failed.
    #[error("failed to commit")]
    Commit(#[source] wgr_git::Error),

    /// Pushing the branch failed.
    #[error("failed to push '{branch}' to {remote}")]
    Push {
        remote: String,
        branch: String,
        #[source]
        source: wgr_git::Error,
    },

    /// The handle has no working directory (bare repository).
    #[error("repository has no working directory")]
    NoWorkdir,

    /// The mutation callback failed.
    #[error("mutation failed")]
    Mutation(#[source] std::io::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
