//! # wgr-core
//!
//! Checkout-or-create, mutate, commit-if-dirty, push.
//!
//! A [`CommitWorkflow`] is bound to one working copy, obtained by cloning a
//! remote, opening an existing checkout, or injecting a pre-built handle.
//! Each commit operation runs a caller-supplied mutation inside the working
//! directory and only commits (and pushes) when the tree actually changed.

pub mod config;
pub mod error;
pub mod workdir;
pub mod workflow;

#[cfg(test)]
mod test_mocks;

pub use config::{DEFAULT_REMOTE, DEFAULT_USER_EMAIL, DEFAULT_USER_NAME, Identity, WorkflowConfig};
pub use error::{Error, Result};
pub use workdir::WorkdirGuard;
pub use workflow::{CommitOutcome, CommitWorkflow, WorkflowBuilder};

pub use wgr_git::{GitOps, Oid, Repository};
